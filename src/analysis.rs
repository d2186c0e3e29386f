use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use itertools::Itertools;

use crate::model::{FundamentalsRow, NewsRow, NewsTickerRow, PortfolioRow, Price};

/// Percentage change of each date's price against the previous date in `series`.
///
/// The first date has no predecessor and yields `None`, as does any pair where either price is
/// missing or the previous price is zero.
pub fn daily_returns(series: &BTreeMap<NaiveDate, Option<Price>>) -> Vec<(NaiveDate, Option<f64>)> {
    let Some((first, _)) = series.first_key_value() else {
        return Vec::new();
    };

    let mut returns = vec![(*first, None)];

    for (prev, next) in series.iter().tuple_windows() {
        let r = match (prev.1, next.1) {
            (Some(prev), Some(next)) if *prev != 0.0 => Some(next / prev - 1.0),
            _ => None,
        };

        returns.push((*next.0, r));
    }

    returns
}

/// Portfolio companies paired with their capitalization, largest first.
pub fn top_by_market_cap<'a>(
    portfolio: &'a [PortfolioRow],
    fundamentals: &[FundamentalsRow],
    n: usize,
) -> Vec<(&'a PortfolioRow, f64)> {
    let caps: HashMap<&str, f64> = fundamentals
        .iter()
        .filter_map(|f| Some((f.ticker.as_str(), f.market_capitalization?)))
        .collect();

    portfolio
        .iter()
        .filter_map(|p| Some((p, *caps.get(p.ticker.as_str())?)))
        .sorted_by(|(_, l), (_, r)| r.total_cmp(l))
        .take(n)
        .collect()
}

/// Mean article sentiment for `ticker`, `None` when no linked article carries a score.
pub fn average_sentiment(
    news_ticker: &[NewsTickerRow],
    news: &[NewsRow],
    ticker: &str,
) -> Option<f64> {
    let articles: HashSet<&str> = news_ticker
        .iter()
        .filter(|l| l.ticker.as_deref() == Some(ticker))
        .filter_map(|l| l.article_id.as_deref())
        .collect();

    let scores = news
        .iter()
        .filter(|n| n.article_id.as_deref().is_some_and(|id| articles.contains(id)))
        .filter_map(|n| n.sentiment)
        .collect_vec();

    if scores.is_empty() {
        return None;
    }

    Some(scores.iter().sum::<f64>() / scores.len() as f64)
}

pub fn articles_per_day(news: &[NewsRow]) -> BTreeMap<NaiveDate, usize> {
    news.iter()
        .filter_map(|n| n.published_time.map(|t| t.date()))
        .counts()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::NaiveDate;

    use crate::model::{FundamentalsRow, NewsRow, NewsTickerRow, PortfolioRow};

    use super::{articles_per_day, average_sentiment, daily_returns, top_by_market_cap};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn unittest_daily_returns() {
        let series = BTreeMap::from([(day(2), Some(110.0)), (day(1), Some(100.0))]);
        let returns = daily_returns(&series);

        assert_eq!(returns.len(), 2);
        assert_eq!(returns[0], (day(1), None));
        assert_eq!(returns[1].0, day(2));
        assert!((returns[1].1.unwrap() - 0.10).abs() < 1e-12);
    }

    #[test]
    fn unittest_daily_returns_missing_or_zero_price() {
        let series = BTreeMap::from([
            (day(1), Some(0.0)),
            (day(2), Some(50.0)),
            (day(3), None),
            (day(4), Some(60.0)),
            (day(5), Some(45.0)),
        ]);
        let returns = daily_returns(&series);

        assert_eq!(
            returns.iter().map(|(_, r)| *r).collect::<Vec<_>>(),
            vec![None, None, None, None, Some(-0.25)]
        );
        assert!(daily_returns(&BTreeMap::new()).is_empty());
    }

    #[test]
    fn unittest_top_by_market_cap() {
        let portfolio = ["A", "B", "C"]
            .map(|t| PortfolioRow {
                ticker: t.to_owned(),
                company_name: format!("{t} Inc"),
                ..Default::default()
            })
            .to_vec();
        let fundamentals = vec![
            FundamentalsRow {
                ticker: "A".to_owned(),
                market_capitalization: Some(10.0),
                outstanding_shares: None,
            },
            FundamentalsRow {
                ticker: "B".to_owned(),
                market_capitalization: None,
                outstanding_shares: None,
            },
            FundamentalsRow {
                ticker: "C".to_owned(),
                market_capitalization: Some(30.0),
                outstanding_shares: None,
            },
        ];

        let top = top_by_market_cap(&portfolio, &fundamentals, 5);

        assert_eq!(
            top.iter().map(|(p, cap)| (p.ticker.as_str(), *cap)).collect::<Vec<_>>(),
            vec![("C", 30.0), ("A", 10.0)]
        );
        assert_eq!(top_by_market_cap(&portfolio, &fundamentals, 1).len(), 1);
    }

    #[test]
    fn unittest_news_questions() {
        let link = |ticker: &str, id: &str| NewsTickerRow {
            ticker: Some(ticker.to_owned()),
            article_id: Some(id.to_owned()),
        };
        let article = |id: &str, d: u32, sentiment: Option<f64>| NewsRow {
            article_id: Some(id.to_owned()),
            published_time: day(d).and_hms_opt(9, 30, 0),
            sentiment,
            ..Default::default()
        };

        let links = vec![link("GOOGL", "a1"), link("GOOGL", "a2"), link("MSFT", "a3")];
        let news = vec![
            article("a1", 1, Some(0.5)),
            article("a2", 1, Some(-0.1)),
            article("a3", 2, None),
        ];

        assert!((average_sentiment(&links, &news, "GOOGL").unwrap() - 0.2).abs() < 1e-12);
        assert_eq!(average_sentiment(&links, &news, "MSFT"), None);
        assert_eq!(average_sentiment(&links, &news, "ACME"), None);
        assert_eq!(
            articles_per_day(&news),
            BTreeMap::from([(day(1), 2), (day(2), 1)])
        );
    }
}
