//! SQL text for running the data room directly on the managed warehouse.

use itertools::Itertools;

use crate::{
    config::DataRoomConfig,
    loader::{COMPANY_PROFILE, DAILY_PRICE, NEWS, NEWS_TICKER_SENTIMENT},
    model::INVALID_TICKER,
    schema::{data_model, TableKind, TableSchema},
    warehouse::Namespace,
};

fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\\', "\\\\").replace('\'', "\\'"))
}

pub fn namespace_sql(namespace: &Namespace) -> Vec<String> {
    vec![
        format!("CREATE CATALOG IF NOT EXISTS {}", namespace.catalog),
        format!("CREATE DATABASE IF NOT EXISTS {namespace}"),
    ]
}

pub fn create_table_sql(namespace: &Namespace, schema: &TableSchema) -> String {
    let columns = schema
        .columns
        .iter()
        .map(|c| {
            format!(
                "  `{}` {} COMMENT {}",
                c.name,
                c.column_type.sql(),
                quote(c.comment)
            )
        })
        .join(",\n");

    format!(
        "CREATE OR REPLACE TABLE {} (\n{columns}\n) USING DELTA\nCOMMENT {}",
        namespace.qualify(schema.name()),
        quote(schema.comment)
    )
}

pub fn insert_sql(config: &DataRoomConfig, kind: TableKind) -> String {
    let market = |table: &str| format!("{}.{}.{table}", config.market_catalog, config.source_schema);
    let news = |table: &str| format!("{}.{}.{table}", config.news_catalog, config.source_schema);
    let target = config.target.qualify(kind.name());
    let valid_profile = format!(
        "ticker IS NOT NULL\n  AND ticker != {}\n  AND companyName IS NOT NULL",
        quote(INVALID_TICKER)
    );

    match kind {
        TableKind::Portfolio => format!(
            "INSERT INTO {target}\nSELECT\n  ticker,\n  companyName AS company_name,\n  ai_query(\n    {},\n    concat_ws(' ', 'Describe company', companyName, 'in the', industry, 'industry')\n  ) AS company_description,\n  website AS company_website,\n  logo AS company_logo,\n  industry\nFROM {}\nWHERE {valid_profile}",
            quote(&config.model),
            market(COMPANY_PROFILE)
        ),
        TableKind::Fundamentals => format!(
            "INSERT INTO {target}\nSELECT\n  ticker,\n  marketCap AS market_capitalization,\n  sharesOutstanding AS outstanding_shares\nFROM {}\nWHERE {valid_profile}",
            market(COMPANY_PROFILE)
        ),
        TableKind::Prices => format!(
            "INSERT INTO {target}\nSELECT\n  ticker,\n  `date`,\n  `open`,\n  `high`,\n  `low`,\n  `close`,\n  adjClose AS adjusted_close,\n  adjClose / (lag(adjClose) OVER (PARTITION BY ticker ORDER BY `date`)) - 1 AS `return`,\n  vol AS volume,\n  splitFactor AS split_factor\nFROM {}\nWHERE ticker IS NOT NULL",
            market(DAILY_PRICE)
        ),
        TableKind::NewsTicker => format!(
            "INSERT INTO {target}\nSELECT\n  ticker,\n  articleId AS article_id\nFROM {}",
            news(NEWS_TICKER_SENTIMENT)
        ),
        TableKind::News => format!(
            "INSERT INTO {target}\nSELECT\n  articleId AS article_id,\n  publishedTime AS published_time,\n  source,\n  `url` AS source_url,\n  title,\n  articleSentimentScore AS sentiment,\n  articleSentimentLabel AS market_sentiment\nFROM {}\nWHERE NOT EXISTS (SELECT 1 FROM {target} t WHERE t.article_id <=> articleId)\nQUALIFY row_number() OVER (PARTITION BY articleId ORDER BY publishedTime) = 1",
            news(NEWS)
        ),
    }
}

/// Every statement of a run, in execution order.
pub fn statements(config: &DataRoomConfig) -> Vec<String> {
    let mut statements = namespace_sql(&config.target);

    statements.extend(
        data_model()
            .iter()
            .map(|schema| create_table_sql(&config.target, schema)),
    );
    statements.extend(TableKind::ALL.iter().map(|kind| insert_sql(config, *kind)));

    statements
}

pub fn render_script(config: &DataRoomConfig) -> String {
    statements(config)
        .into_iter()
        .map(|s| format!("{s};\n"))
        .join("\n")
}
