use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    config::DataRoomConfig,
    error::LoadError,
    model::{CompanyProfile, DailyPrice, NewsArticle, NewsTickerSentiment},
};

pub const COMPANY_PROFILE: &str = "company_profile";
pub const DAILY_PRICE: &str = "dailyprice";
pub const NEWS_TICKER_SENTIMENT: &str = "news_ticker_sentiment";
pub const NEWS: &str = "news";

/// Read access to the market and news shares.
pub trait SourceDataLoader {
    fn company_profile(&self) -> eyre::Result<Vec<CompanyProfile>>;
    fn daily_price(&self) -> eyre::Result<Vec<DailyPrice>>;
    fn news_ticker_sentiment(&self) -> eyre::Result<Vec<NewsTickerSentiment>>;
    fn news(&self) -> eyre::Result<Vec<NewsArticle>>;
}

#[derive(Default, Debug, Clone)]
pub struct InMemoryLoader {
    pub company_profile: Vec<CompanyProfile>,
    pub daily_price: Vec<DailyPrice>,
    pub news_ticker_sentiment: Vec<NewsTickerSentiment>,
    pub news: Vec<NewsArticle>,
}

impl SourceDataLoader for InMemoryLoader {
    fn company_profile(&self) -> eyre::Result<Vec<CompanyProfile>> {
        Ok(self.company_profile.clone())
    }

    fn daily_price(&self) -> eyre::Result<Vec<DailyPrice>> {
        Ok(self.daily_price.clone())
    }

    fn news_ticker_sentiment(&self) -> eyre::Result<Vec<NewsTickerSentiment>> {
        Ok(self.news_ticker_sentiment.clone())
    }

    fn news(&self) -> eyre::Result<Vec<NewsArticle>> {
        Ok(self.news.clone())
    }
}

/// Shares exported as JSON lines, one file per table:
/// `<root>/<catalog>/<schema>/<table>.jsonl`.
#[derive(Debug, Clone)]
pub struct ShareDirectoryLoader {
    market: PathBuf,
    news: PathBuf,
}

impl ShareDirectoryLoader {
    pub fn new(config: &DataRoomConfig) -> Self {
        Self {
            market: config
                .data_root
                .join(&config.market_catalog)
                .join(&config.source_schema),
            news: config
                .data_root
                .join(&config.news_catalog)
                .join(&config.source_schema),
        }
    }
}

impl SourceDataLoader for ShareDirectoryLoader {
    fn company_profile(&self) -> eyre::Result<Vec<CompanyProfile>> {
        load_table(&self.market, COMPANY_PROFILE)
    }

    fn daily_price(&self) -> eyre::Result<Vec<DailyPrice>> {
        load_table(&self.market, DAILY_PRICE)
    }

    fn news_ticker_sentiment(&self) -> eyre::Result<Vec<NewsTickerSentiment>> {
        load_table(&self.news, NEWS_TICKER_SENTIMENT)
    }

    fn news(&self) -> eyre::Result<Vec<NewsArticle>> {
        load_table(&self.news, NEWS)
    }
}

fn load_table<T: DeserializeOwned>(dir: impl AsRef<Path>, table: &str) -> eyre::Result<Vec<T>> {
    let path = dir.as_ref().join(format!("{table}.jsonl"));
    let file = File::open(&path).map_err(|e| LoadError::MissingSource {
        table: table.to_owned(),
        reason: format!("{}: {e}", path.display()),
    })?;
    let reader = BufReader::new(file);
    let mut rows: Vec<T> = vec![];

    for (ix, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| {
            LoadError::data(table, format!("{}:{}: {e}", path.display(), ix + 1))
        })?;

        if line.trim().is_empty() {
            continue;
        }

        let row = serde_json::from_str(&line).map_err(|e| {
            LoadError::data(table, format!("{}:{}: {e}", path.display(), ix + 1))
        })?;
        rows.push(row);
    }

    debug!(table, rows = rows.len(), path = %path.display(), "read source table");

    Ok(rows)
}
