use std::{
    collections::{BTreeMap, HashSet},
    fmt,
};

use eyre::WrapErr;
use tracing::{debug, info};

use crate::{
    analysis::daily_returns,
    config::DataRoomConfig,
    describer::CompanyDescriber,
    error::LoadError,
    loader::{SourceDataLoader, DAILY_PRICE, NEWS},
    model::{
        CompanyProfile, DailyPrice, FundamentalsRow, MarketSentiment, NewsArticle, NewsRow,
        NewsTickerRow, NewsTickerSentiment, PortfolioRow, PriceRow,
    },
    schema::{data_model, TableKind},
    warehouse::{TableRow, Warehouse},
};

pub fn project_portfolio(
    profiles: &[CompanyProfile],
    describer: &dyn CompanyDescriber,
) -> eyre::Result<Vec<PortfolioRow>> {
    let mut rows = Vec::new();

    for profile in profiles {
        let (Some(ticker), Some(company_name)) = (profile.valid_ticker(), &profile.company_name)
        else {
            continue;
        };

        let description = describer.describe(company_name, profile.industry.as_deref())?;

        rows.push(PortfolioRow {
            ticker: ticker.to_owned(),
            company_name: company_name.clone(),
            company_description: Some(description),
            company_website: profile.website.clone(),
            company_logo: profile.logo.clone(),
            industry: profile.industry.clone(),
        });
    }

    debug!(kept = rows.len(), dropped = profiles.len() - rows.len(), "projected portfolio");
    Ok(rows)
}

pub fn project_fundamentals(profiles: &[CompanyProfile]) -> Vec<FundamentalsRow> {
    profiles
        .iter()
        .filter_map(|p| {
            Some(FundamentalsRow {
                ticker: p.valid_ticker()?.to_owned(),
                market_capitalization: p.market_cap,
                outstanding_shares: p.shares_outstanding,
            })
        })
        .collect()
}

/// Rows ordered by ticker then date, each carrying its return against the ticker's previous date.
pub fn project_prices(daily: Vec<DailyPrice>) -> eyre::Result<Vec<PriceRow>> {
    let mut partitions: BTreeMap<String, BTreeMap<_, DailyPrice>> = BTreeMap::new();

    for row in daily {
        let Some(ticker) = row.ticker.clone() else {
            continue;
        };

        let date = row.date;
        if partitions.entry(ticker.clone()).or_default().insert(date, row).is_some() {
            return Err(LoadError::data(DAILY_PRICE, format!("duplicate row for {ticker} on {date}")).into());
        }
    }

    let mut rows = Vec::new();

    for (ticker, trades) in partitions {
        let adjusted: BTreeMap<_, _> = trades.iter().map(|(date, d)| (*date, d.adj_close)).collect();
        let returns = daily_returns(&adjusted);

        for ((date, d), (_, r)) in trades.into_iter().zip(returns) {
            rows.push(PriceRow {
                ticker: ticker.clone(),
                date,
                open: d.open,
                high: d.high,
                low: d.low,
                close: d.close,
                adjusted_close: d.adj_close,
                r#return: r,
                volume: d.vol,
                split_factor: d.split_factor,
            });
        }
    }

    Ok(rows)
}

pub fn project_news_ticker(links: Vec<NewsTickerSentiment>) -> Vec<NewsTickerRow> {
    links
        .into_iter()
        .map(|l| NewsTickerRow {
            ticker: l.ticker,
            article_id: l.article_id,
        })
        .collect()
}

/// Collapses articles to one row per id, skipping ids already present in `existing`.
pub fn project_news(articles: Vec<NewsArticle>, existing: &[NewsRow]) -> eyre::Result<Vec<NewsRow>> {
    let mut seen: HashSet<Option<String>> = existing.iter().map(|n| n.article_id.clone()).collect();
    let mut rows = Vec::new();

    for article in articles {
        if !seen.insert(article.article_id.clone()) {
            continue;
        }

        if let Some(score) = article.article_sentiment_score {
            if !(-1.0..=1.0).contains(&score) {
                return Err(LoadError::data(
                    NEWS,
                    format!("sentiment {score} of {:?} is outside [-1, 1]", article.article_id),
                )
                .into());
            }
        }

        let market_sentiment = match article.article_sentiment_label.as_deref() {
            Some(label) => Some(MarketSentiment::from_label(label).ok_or_else(|| {
                LoadError::data(NEWS, format!("unknown market sentiment `{label}`"))
            })?),
            None => None,
        };

        rows.push(NewsRow {
            article_id: article.article_id,
            published_time: article.published_time,
            source: article.source,
            source_url: article.url,
            title: article.title,
            sentiment: article.article_sentiment_score,
            market_sentiment,
        });
    }

    Ok(rows)
}

/// Rows affected per table, in statement order.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub tables: Vec<(TableKind, usize)>,
}

impl LoadReport {
    pub fn affected(&self, kind: TableKind) -> Option<usize> {
        self.tables.iter().find(|(k, _)| *k == kind).map(|(_, n)| *n)
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<14} num_affected_rows", "table")?;
        for (kind, affected) in &self.tables {
            writeln!(f, "{:<14} {affected}", kind.name())?;
        }
        Ok(())
    }
}

/// Numbers statements and stops at the first failure.
struct Run<'a> {
    config: &'a DataRoomConfig,
    warehouse: &'a mut Warehouse,
    statement: usize,
}

impl<'a> Run<'a> {
    fn new(config: &'a DataRoomConfig, warehouse: &'a mut Warehouse) -> Self {
        Self {
            config,
            warehouse,
            statement: 0,
        }
    }

    fn execute<T>(
        &mut self,
        label: &str,
        statement: impl FnOnce(&DataRoomConfig, &mut Warehouse) -> eyre::Result<T>,
    ) -> eyre::Result<T> {
        self.statement += 1;
        let n = self.statement;

        statement(self.config, self.warehouse)
            .wrap_err_with(|| format!("statement {n} ({label}) failed"))
    }

    fn insert<R: TableRow>(
        &mut self,
        project: impl FnOnce(&DataRoomConfig, &Warehouse) -> eyre::Result<Vec<R>>,
    ) -> eyre::Result<usize> {
        let label = format!("insert into {}", R::KIND.name());

        let affected = self.execute(&label, |config, warehouse| {
            warehouse.table(&config.target, R::KIND)?;
            let rows = project(config, warehouse)?;
            warehouse.insert_into(&config.target, rows)
        })?;

        info!(table = %self.config.target.qualify(R::KIND.name()), affected, "inserted rows");
        Ok(affected)
    }
}

/// Creates the target namespace and recreates every table empty.
pub fn create_data_model(config: &DataRoomConfig, warehouse: &mut Warehouse) -> eyre::Result<()> {
    let mut run = Run::new(config, warehouse);

    run.execute("create catalog", |config, warehouse| {
        warehouse.create_catalog_if_not_exists(&config.target.catalog);
        Ok(())
    })?;
    run.execute("create schema", |config, warehouse| {
        warehouse.create_schema_if_not_exists(&config.target)
    })?;

    for schema in data_model() {
        run.execute(&format!("create table {}", schema.name()), |config, warehouse| {
            warehouse.create_or_replace_table(&config.target, schema.kind)
        })?;
    }

    info!(namespace = %config.target, "created data model");
    Ok(())
}

/// Populates the five tables from `source`. Statements already applied stay applied on failure.
pub fn ingest(
    config: &DataRoomConfig,
    warehouse: &mut Warehouse,
    source: &dyn SourceDataLoader,
    describer: &dyn CompanyDescriber,
) -> eyre::Result<LoadReport> {
    let mut run = Run::new(config, warehouse);
    let mut report = LoadReport::default();

    let affected = run.insert(|_, _| project_portfolio(&source.company_profile()?, describer))?;
    report.tables.push((TableKind::Portfolio, affected));

    let affected = run.insert(|_, _| Ok(project_fundamentals(&source.company_profile()?)))?;
    report.tables.push((TableKind::Fundamentals, affected));

    let affected = run.insert(|_, _| project_prices(source.daily_price()?))?;
    report.tables.push((TableKind::Prices, affected));

    let affected = run.insert(|_, _| Ok(project_news_ticker(source.news_ticker_sentiment()?)))?;
    report.tables.push((TableKind::NewsTicker, affected));

    let affected = run.insert(|config, warehouse| {
        project_news(source.news()?, warehouse.scan::<NewsRow>(&config.target)?)
    })?;
    report.tables.push((TableKind::News, affected));

    Ok(report)
}
