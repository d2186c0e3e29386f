use std::env;

use eyre::bail;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use market_dataroom::{
    analysis::top_by_market_cap,
    config::DataRoomConfig,
    describer::ServingEndpointDescriber,
    ingest::{create_data_model, ingest},
    loader::ShareDirectoryLoader,
    model::{FundamentalsRow, PortfolioRow},
    sql::render_script,
    warehouse::Warehouse,
};

fn main() -> eyre::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    fmt().with_env_filter(filter).init();

    let config = DataRoomConfig::from_env()?;
    let command = env::args().nth(1).unwrap_or_else(|| "load".to_owned());

    match command.as_str() {
        "sql" => print!("{}", render_script(&config)),
        "load" => load(&config)?,
        other => bail!("unknown command `{other}`, expected `load` or `sql`"),
    }

    Ok(())
}

fn load(config: &DataRoomConfig) -> eyre::Result<()> {
    info!(
        namespace = %config.target,
        market = %config.market_catalog,
        news = %config.news_catalog,
        data_root = %config.data_root.display(),
        "building data room"
    );

    let describer = ServingEndpointDescriber::from_config(config)?;
    let source = ShareDirectoryLoader::new(config);
    let mut warehouse = Warehouse::new();

    create_data_model(config, &mut warehouse)?;
    let report = ingest(config, &mut warehouse, &source, &describer)?;

    println!("{report}");

    let portfolio = warehouse.scan::<PortfolioRow>(&config.target)?;
    let fundamentals = warehouse.scan::<FundamentalsRow>(&config.target)?;

    println!("top 5 companies by market capitalization");
    for (company, cap) in top_by_market_cap(portfolio, fundamentals, 5) {
        println!("{:<8} {:<40} {cap:>20.0}", company.ticker, company.company_name);
    }

    Ok(())
}
