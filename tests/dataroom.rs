use std::cell::Cell;

use chrono::NaiveDate;
use itertools::Itertools;

use market_dataroom::{
    config::DataRoomConfig,
    error::LoadError,
    ingest::{create_data_model, ingest},
    loader::{InMemoryLoader, SourceDataLoader},
    model::{
        CompanyProfile, DailyPrice, FundamentalsRow, MarketSentiment, NewsArticle, NewsRow,
        NewsTickerRow, NewsTickerSentiment, PortfolioRow, PriceRow,
    },
    schema::TableKind,
    warehouse::Warehouse,
};

fn stub_describer(name: &str, industry: Option<&str>) -> eyre::Result<String> {
    Ok(format!("{name} operates in {}.", industry.unwrap_or("an unknown")))
}

fn acme() -> CompanyProfile {
    CompanyProfile {
        ticker: Some("ACME".to_owned()),
        company_name: Some("Acme Corp".to_owned()),
        website: Some("acme.com".to_owned()),
        logo: Some("acme.png".to_owned()),
        industry: Some("Manufacturing".to_owned()),
        market_cap: Some(5_000_000.0),
        shares_outstanding: Some(1_000_000.0),
    }
}

fn daily(ticker: &str, d: u32, adj_close: f64) -> DailyPrice {
    DailyPrice {
        ticker: Some(ticker.to_owned()),
        date: NaiveDate::from_ymd_opt(2024, 3, d).unwrap(),
        close: Some(adj_close),
        adj_close: Some(adj_close),
        vol: Some(1_000.0),
        split_factor: Some(1.0),
        ..Default::default()
    }
}

fn article(id: &str, score: f64, label: &str) -> NewsArticle {
    NewsArticle {
        article_id: Some(id.to_owned()),
        published_time: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(8, 0, 0),
        source: Some("Wire".to_owned()),
        url: Some(format!("https://news.example/{id}")),
        title: Some(format!("Story {id}")),
        article_sentiment_score: Some(score),
        article_sentiment_label: Some(label.to_owned()),
    }
}

fn source() -> InMemoryLoader {
    InMemoryLoader {
        company_profile: vec![
            acme(),
            CompanyProfile {
                ticker: Some("NaN".to_owned()),
                ..acme()
            },
        ],
        daily_price: vec![daily("ACME", 2, 110.0), daily("ACME", 1, 100.0)],
        news_ticker_sentiment: vec![NewsTickerSentiment {
            ticker: Some("ACME".to_owned()),
            article_id: Some("a1".to_owned()),
        }],
        news: vec![
            article("a1", 0.35, "Bullish"),
            article("a1", 0.35, "Bullish"),
            article("a2", -0.2, "Neutral"),
        ],
    }
}

fn provisioned(config: &DataRoomConfig) -> eyre::Result<Warehouse> {
    let mut warehouse = Warehouse::new();
    create_data_model(config, &mut warehouse)?;
    Ok(warehouse)
}

#[test]
fn integration_acme_end_to_end() -> eyre::Result<()> {
    let config = DataRoomConfig::default();
    let mut warehouse = provisioned(&config)?;

    let report = ingest(&config, &mut warehouse, &source(), &stub_describer)?;

    assert_eq!(report.affected(TableKind::Portfolio), Some(1));
    assert_eq!(report.affected(TableKind::Fundamentals), Some(1));
    assert_eq!(report.affected(TableKind::Prices), Some(2));
    assert_eq!(report.affected(TableKind::NewsTicker), Some(1));
    assert_eq!(report.affected(TableKind::News), Some(2));

    let portfolio = warehouse.scan::<PortfolioRow>(&config.target)?;
    assert_eq!(portfolio.len(), 1);
    assert_eq!(portfolio[0].ticker, "ACME");
    assert_eq!(portfolio[0].company_website.as_deref(), Some("acme.com"));
    assert_eq!(
        portfolio[0].company_description.as_deref(),
        Some("Acme Corp operates in Manufacturing.")
    );

    let fundamentals = warehouse.scan::<FundamentalsRow>(&config.target)?;
    assert_eq!(fundamentals.len(), 1);
    assert_eq!(fundamentals[0].market_capitalization, Some(5_000_000.0));

    let prices = warehouse.scan::<PriceRow>(&config.target)?;
    assert_eq!(prices[0].r#return, None);
    assert!((prices[1].r#return.unwrap() - 0.10).abs() < 1e-12);

    let news = warehouse.scan::<NewsRow>(&config.target)?;
    assert!(news.iter().map(|n| &n.article_id).all_unique());
    assert!(news
        .iter()
        .filter_map(|n| n.sentiment)
        .all(|s| (-1.0..=1.0).contains(&s)));
    assert_eq!(
        news.iter().filter_map(|n| n.market_sentiment).collect_vec(),
        vec![MarketSentiment::Bullish, MarketSentiment::Neutral]
    );

    let links = warehouse.scan::<NewsTickerRow>(&config.target)?;
    assert_eq!(links[0].article_id.as_deref(), Some("a1"));

    Ok(())
}

#[test]
fn integration_recreate_and_reload() -> eyre::Result<()> {
    let config = DataRoomConfig::default().with_target("research", "dataroom");
    let mut warehouse = provisioned(&config)?;

    ingest(&config, &mut warehouse, &source(), &stub_describer)?;
    ingest(&config, &mut warehouse, &source(), &stub_describer)?;

    assert_eq!(warehouse.row_count(&config.target, TableKind::Portfolio)?, 2);
    assert_eq!(warehouse.row_count(&config.target, TableKind::Fundamentals)?, 2);
    assert_eq!(warehouse.row_count(&config.target, TableKind::Prices)?, 4);
    assert_eq!(warehouse.row_count(&config.target, TableKind::NewsTicker)?, 2);
    assert_eq!(warehouse.row_count(&config.target, TableKind::News)?, 2);

    create_data_model(&config, &mut warehouse)?;
    create_data_model(&config, &mut warehouse)?;

    for kind in TableKind::ALL {
        assert_eq!(warehouse.row_count(&config.target, kind)?, 0, "{kind}");
    }
    assert_eq!(warehouse.table_names(&config.target)?.len(), 5);

    Ok(())
}

#[test]
fn integration_failure_aborts_remaining_statements() -> eyre::Result<()> {
    struct BrokenPrices(InMemoryLoader);

    impl SourceDataLoader for BrokenPrices {
        fn company_profile(&self) -> eyre::Result<Vec<CompanyProfile>> {
            self.0.company_profile()
        }

        fn daily_price(&self) -> eyre::Result<Vec<DailyPrice>> {
            Err(LoadError::MissingSource {
                table: "dailyprice".to_owned(),
                reason: "share revoked".to_owned(),
            }
            .into())
        }

        fn news_ticker_sentiment(&self) -> eyre::Result<Vec<NewsTickerSentiment>> {
            self.0.news_ticker_sentiment()
        }

        fn news(&self) -> eyre::Result<Vec<NewsArticle>> {
            self.0.news()
        }
    }

    let config = DataRoomConfig::default();
    let mut warehouse = provisioned(&config)?;

    let err = ingest(&config, &mut warehouse, &BrokenPrices(source()), &stub_describer).unwrap_err();

    assert_eq!(err.to_string(), "statement 3 (insert into prices) failed");
    assert!(matches!(
        err.downcast_ref::<LoadError>(),
        Some(LoadError::MissingSource { .. })
    ));
    assert_eq!(warehouse.row_count(&config.target, TableKind::Portfolio)?, 1);
    assert_eq!(warehouse.row_count(&config.target, TableKind::Prices)?, 0);
    assert_eq!(warehouse.row_count(&config.target, TableKind::News)?, 0);

    Ok(())
}

#[test]
fn integration_ingest_requires_data_model() {
    let config = DataRoomConfig::default();
    let mut warehouse = Warehouse::new();
    let calls = Cell::new(0);
    let counting = |name: &str, industry: Option<&str>| -> eyre::Result<String> {
        calls.set(calls.get() + 1);
        stub_describer(name, industry)
    };

    let err = ingest(&config, &mut warehouse, &source(), &counting).unwrap_err();

    assert_eq!(err.to_string(), "statement 1 (insert into portfolio) failed");
    assert!(matches!(
        err.downcast_ref::<LoadError>(),
        Some(LoadError::MissingNamespace(_))
    ));
    assert_eq!(calls.get(), 0);
}
