use std::{
    env,
    path::{Path, PathBuf},
};

use tracing::info;

use crate::{error::LoadError, warehouse::Namespace};

#[derive(Debug, Clone)]
pub struct DataRoomConfig {
    pub market_catalog: String,
    pub news_catalog: String,
    pub source_schema: String,
    pub target: Namespace,
    pub model: String,
    pub serving_host: Option<String>,
    pub serving_token: Option<String>,
    pub data_root: PathBuf,
}

impl Default for DataRoomConfig {
    fn default() -> Self {
        Self {
            market_catalog: "fsgtm_market_data".to_owned(),
            news_catalog: "fsgtm_market_news".to_owned(),
            source_schema: "market_data".to_owned(),
            target: Namespace::new("fsgtm", "genie_cap_markets"),
            model: "databricks-dbrx-instruct".to_owned(),
            serving_host: None,
            serving_token: None,
            data_root: PathBuf::from("./data"),
        }
    }
}

impl DataRoomConfig {
    /// Defaults overridden by `DATAROOM_*` variables, after loading a `.env` file if present.
    pub fn from_env() -> eyre::Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            info!(path = %path.display(), "loaded environment file");
        }

        let mut config = Self::default();
        let var = |name: &str| env::var(name).ok().filter(|v| !v.trim().is_empty());

        if let Some(v) = var("DATAROOM_MARKET_CATALOG") {
            config.market_catalog = v;
        }
        if let Some(v) = var("DATAROOM_NEWS_CATALOG") {
            config.news_catalog = v;
        }
        if let Some(v) = var("DATAROOM_SOURCE_SCHEMA") {
            config.source_schema = v;
        }
        if let Some(v) = var("DATAROOM_TARGET_CATALOG") {
            config.target.catalog = v;
        }
        if let Some(v) = var("DATAROOM_TARGET_SCHEMA") {
            config.target.schema = v;
        }
        if let Some(v) = var("DATAROOM_MODEL") {
            config.model = v;
        }
        if let Some(v) = var("DATAROOM_DATA_ROOT") {
            config.data_root = PathBuf::from(v);
        }
        config.serving_host = var("DATAROOM_SERVING_HOST");
        config.serving_token = var("DATAROOM_SERVING_TOKEN");

        config.validate()?;
        Ok(config)
    }

    pub fn with_target(mut self, catalog: impl Into<String>, schema: impl Into<String>) -> Self {
        self.target = Namespace::new(catalog, schema);
        self
    }

    pub fn with_data_root(mut self, path: impl AsRef<Path>) -> Self {
        self.data_root = path.as_ref().to_path_buf();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_serving_endpoint(mut self, host: impl Into<String>, token: impl Into<String>) -> Self {
        self.serving_host = Some(host.into());
        self.serving_token = Some(token.into());
        self
    }

    pub fn validate(&self) -> eyre::Result<()> {
        let names = [
            ("market catalog", &self.market_catalog),
            ("news catalog", &self.news_catalog),
            ("source schema", &self.source_schema),
            ("target catalog", &self.target.catalog),
            ("target schema", &self.target.schema),
        ];

        for (what, name) in names {
            if !is_identifier(name) {
                return Err(LoadError::Config(format!("{what} `{name}` is not a valid identifier")).into());
            }
        }

        if self.model.trim().is_empty() {
            return Err(LoadError::Config("model name is empty".to_owned()).into());
        }

        Ok(())
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use crate::error::LoadError;

    use super::DataRoomConfig;

    #[test]
    fn unittest_defaults() -> eyre::Result<()> {
        let config = DataRoomConfig::default();
        config.validate()?;

        assert_eq!(config.target.to_string(), "fsgtm.genie_cap_markets");
        assert_eq!(config.market_catalog, "fsgtm_market_data");
        assert_eq!(config.news_catalog, "fsgtm_market_news");
        Ok(())
    }

    #[test]
    fn unittest_rejects_bad_namespace() {
        for (catalog, schema) in [("", "s"), ("c", "genie-cap"), ("1st", "s"), ("c", "x; DROP")] {
            let err = DataRoomConfig::default()
                .with_target(catalog, schema)
                .validate()
                .unwrap_err();

            assert!(matches!(err.downcast_ref::<LoadError>(), Some(LoadError::Config(_))));
        }
    }
}
