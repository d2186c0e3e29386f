use std::fmt;

/// The five tables of the data room, in creation order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TableKind {
    Portfolio,
    Fundamentals,
    Prices,
    NewsTicker,
    News,
}

impl TableKind {
    pub const ALL: [TableKind; 5] = [
        TableKind::Portfolio,
        TableKind::Fundamentals,
        TableKind::Prices,
        TableKind::NewsTicker,
        TableKind::News,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TableKind::Portfolio => "portfolio",
            TableKind::Fundamentals => "fundamentals",
            TableKind::Prices => "prices",
            TableKind::NewsTicker => "news_ticker",
            TableKind::News => "news",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ColumnType {
    String,
    Double,
    Date,
    Timestamp,
}

impl ColumnType {
    pub fn sql(&self) -> &'static str {
        match self {
            ColumnType::String => "STRING",
            ColumnType::Double => "DOUBLE",
            ColumnType::Date => "DATE",
            ColumnType::Timestamp => "TIMESTAMP",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ColumnSchema {
    pub name: &'static str,
    pub column_type: ColumnType,
    pub comment: &'static str,
}

#[derive(Debug, Clone)]
pub struct TableSchema {
    pub kind: TableKind,
    pub columns: &'static [ColumnSchema],
    pub comment: &'static str,
}

const fn column(name: &'static str, column_type: ColumnType, comment: &'static str) -> ColumnSchema {
    ColumnSchema {
        name,
        column_type,
        comment,
    }
}

static PORTFOLIO: TableSchema = TableSchema {
    kind: TableKind::Portfolio,
    columns: &[
        column(
            "ticker",
            ColumnType::String,
            "Unique identifier for the stock, allowing easy reference and tracking.",
        ),
        column(
            "company_name",
            ColumnType::String,
            "The name of the company, providing a recognizable and human-readable label for identification.",
        ),
        column(
            "company_description",
            ColumnType::String,
            "A brief overview of the company, its products, and services, generated using DBRX model.",
        ),
        column(
            "company_website",
            ColumnType::String,
            "The official website of the company, providing more detailed information and resources.",
        ),
        column(
            "company_logo",
            ColumnType::String,
            "The visual representation of the company, allowing for easy recognition and branding.",
        ),
        column(
            "industry",
            ColumnType::String,
            "The industry or sector in which the company operates, providing context for the company business and potential competitors.",
        ),
    ],
    comment: "The `portfolio` table contains information about the companies in our investment portfolio. It includes details about the company ticker, name, description, website, logo, and industry. This data can be used to analyze the portfolio composition, monitor industry trends, and perform research on individual companies. It can also be used to generate reports and visualizations for stakeholders, such as the portfolio diversity and the performance of companies in specific industries.",
};

static FUNDAMENTALS: TableSchema = TableSchema {
    kind: TableKind::Fundamentals,
    columns: &[
        column(
            "ticker",
            ColumnType::String,
            "Unique identifier for the stock, allowing easy reference and tracking.",
        ),
        column(
            "market_capitalization",
            ColumnType::Double,
            "Represents the current market capitalization of the stock, indicating the stock value in the market.",
        ),
        column(
            "outstanding_shares",
            ColumnType::Double,
            "Represents the number of outstanding shares of the stock, indicating the liquidity and ownership of the stock.",
        ),
    ],
    comment: "The `fundamentals` table contains fundamental information about various stocks, including market capitalization and outstanding shares. This data can be used to analyze the financial health of individual stocks, as well as to compare the performance of different stocks over time. It can also be used to identify trends in market capitalization and outstanding shares, which can inform investment decisions and market analysis.",
};

static PRICES: TableSchema = TableSchema {
    kind: TableKind::Prices,
    columns: &[
        column(
            "ticker",
            ColumnType::String,
            "Unique identifier for the stock or security, allowing easy reference and tracking.",
        ),
        column(
            "date",
            ColumnType::Date,
            "The date for which the price information is provided.",
        ),
        column(
            "open",
            ColumnType::Double,
            "Represents the opening price of the security on the given date.",
        ),
        column(
            "high",
            ColumnType::Double,
            "Represents the highest price of the security on the given date.",
        ),
        column(
            "low",
            ColumnType::Double,
            "Represents the lowest price of the security on the given date.",
        ),
        column(
            "close",
            ColumnType::Double,
            "Represents the closing price of the security on the given date.",
        ),
        column(
            "adjusted_close",
            ColumnType::Double,
            "Represents the adjusted closing price of the security on the given date, accounting for any corporate actions or other adjustments. This represents the cash value of the last transacted price before the market closes",
        ),
        column(
            "return",
            ColumnType::Double,
            "Represents the return of the security on the given date, calculated as the difference between the closing price and last day closing price.",
        ),
        column(
            "volume",
            ColumnType::Double,
            "Represents the trading volume of the security on the given date, indicating the number of shares traded.",
        ),
        column(
            "split_factor",
            ColumnType::Double,
            "Represent the stock split of a given ticker at any point in time",
        ),
    ],
    comment: "The `prices` table contains stock price data for various tickers. It includes information on daily open, high, low, and closing prices, as well as adjusted closing prices, returns, and trading volumes. This data can be used for stock analysis, trend identification, and risk assessment. It can also be used to generate reports and visualizations for stakeholders to monitor market trends and make informed decisions.",
};

static NEWS_TICKER: TableSchema = TableSchema {
    kind: TableKind::NewsTicker,
    columns: &[
        column(
            "ticker",
            ColumnType::String,
            "Unique identifier for the stock ticker, allowing easy reference and tracking of specific stocks.",
        ),
        column(
            "article_id",
            ColumnType::String,
            "Identifier for the news article related to the stock ticker, enabling linking articles to their respective tickers.",
        ),
    ],
    comment: "The `news_ticker` table contains information about ticker symbols and the corresponding news articles. It can be used to track news related to various ticker symbols, enabling users to monitor market trends and news that may impact the performance of their investments. This table can also be used to identify ticker symbols associated with specific news articles, making it easier to analyze the impact of news on financial markets.",
};

static NEWS: TableSchema = TableSchema {
    kind: TableKind::News,
    columns: &[
        column(
            "article_id",
            ColumnType::String,
            "Unique identifier for each news article.",
        ),
        column(
            "published_time",
            ColumnType::Timestamp,
            "The time when the article was published.",
        ),
        column(
            "source",
            ColumnType::String,
            "The news source or publisher that published the article.",
        ),
        column(
            "source_url",
            ColumnType::String,
            "The URL of the article, allowing users to access the original content.",
        ),
        column(
            "title",
            ColumnType::String,
            "The title of the news article, providing a brief overview of the content.",
        ),
        column(
            "sentiment",
            ColumnType::Double,
            "Represents the sentiment or tone of the article, measured as a double value between -1 (negative) and 1 (positive).",
        ),
        column(
            "market_sentiment",
            ColumnType::String,
            "Represents the market sentiment for a given article, can be Bearish, Bullish, or Neutral",
        ),
    ],
    comment: "The `news` table contains articles from various sources related to the financial markets. It includes details such as the article title, the source, and the sentiment of the article. This data can be used to monitor market trends, track sentiment changes, and analyze the impact of different news sources on market behavior. This information can be particularly useful for traders and analysts who need to stay up-to-date with market news and understand how it might affect their investments.",
};

impl TableSchema {
    pub fn of(kind: TableKind) -> &'static TableSchema {
        match kind {
            TableKind::Portfolio => &PORTFOLIO,
            TableKind::Fundamentals => &FUNDAMENTALS,
            TableKind::Prices => &PRICES,
            TableKind::NewsTicker => &NEWS_TICKER,
            TableKind::News => &NEWS,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }
}

pub fn data_model() -> [&'static TableSchema; 5] {
    TableKind::ALL.map(TableSchema::of)
}
