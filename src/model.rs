use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{de, Deserialize, Deserializer, Serialize};

pub type Price = f64;

/// Ticker value the market share uses for rows it could not resolve.
pub const INVALID_TICKER: &str = "NaN";

/// `market_data.company_profile`
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    pub ticker: Option<String>,
    pub company_name: Option<String>,
    pub website: Option<String>,
    pub logo: Option<String>,
    pub industry: Option<String>,
    pub market_cap: Option<f64>,
    pub shares_outstanding: Option<f64>,
}

impl CompanyProfile {
    /// Ticker of a row eligible for the portfolio and fundamentals tables.
    pub fn valid_ticker(&self) -> Option<&str> {
        match (self.ticker.as_deref(), &self.company_name) {
            (Some(ticker), Some(_)) if ticker != INVALID_TICKER => Some(ticker),
            _ => None,
        }
    }
}

/// `market_data.dailyprice`
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPrice {
    pub ticker: Option<String>,
    pub date: NaiveDate,
    pub open: Option<Price>,
    pub high: Option<Price>,
    pub low: Option<Price>,
    pub close: Option<Price>,
    pub adj_close: Option<Price>,
    pub vol: Option<f64>,
    pub split_factor: Option<f64>,
}

/// `market_data.news_ticker_sentiment`
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsTickerSentiment {
    pub ticker: Option<String>,
    pub article_id: Option<String>,
}

/// `market_data.news`
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub article_id: Option<String>,
    /// UTC; offsets in the export are normalized away.
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub published_time: Option<NaiveDateTime>,
    pub source: Option<String>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub article_sentiment_score: Option<f64>,
    pub article_sentiment_label: Option<String>,
}

const TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y%m%dT%H%M%S"];

/// Parses the timestamp forms warehouse exports use: RFC 3339, or a naive UTC time with a `T`
/// or space separator.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();

    if let Ok(t) = DateTime::parse_from_rfc3339(text) {
        return Some(t.naive_utc());
    }
    if let Ok(t) = DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(t.naive_utc());
    }

    TIMESTAMP_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(text, f).ok())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(text) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };

    parse_timestamp(&text)
        .map(Some)
        .ok_or_else(|| de::Error::custom(format!("invalid timestamp `{text}`")))
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioRow {
    pub ticker: String,
    pub company_name: String,
    pub company_description: Option<String>,
    pub company_website: Option<String>,
    pub company_logo: Option<String>,
    pub industry: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalsRow {
    pub ticker: String,
    pub market_capitalization: Option<f64>,
    pub outstanding_shares: Option<f64>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    pub ticker: String,
    pub date: NaiveDate,
    pub open: Option<Price>,
    pub high: Option<Price>,
    pub low: Option<Price>,
    pub close: Option<Price>,
    pub adjusted_close: Option<Price>,
    /// Change of `adjusted_close` against the ticker's previous date, `None` on its first date.
    #[serde(rename = "return")]
    pub r#return: Option<f64>,
    pub volume: Option<f64>,
    pub split_factor: Option<f64>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsTickerRow {
    pub ticker: Option<String>,
    pub article_id: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsRow {
    pub article_id: Option<String>,
    pub published_time: Option<NaiveDateTime>,
    pub source: Option<String>,
    pub source_url: Option<String>,
    pub title: Option<String>,
    pub sentiment: Option<f64>,
    pub market_sentiment: Option<MarketSentiment>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketSentiment {
    Bearish,
    Bullish,
    Neutral,
}

impl MarketSentiment {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "bearish" => Some(Self::Bearish),
            "bullish" => Some(Self::Bullish),
            "neutral" => Some(Self::Neutral),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bearish => "Bearish",
            Self::Bullish => "Bullish",
            Self::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for MarketSentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
