use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{config::DataRoomConfig, error::LoadError};

/// Produces the free-text description stored in `portfolio.company_description`.
pub trait CompanyDescriber {
    fn describe(&self, company_name: &str, industry: Option<&str>) -> eyre::Result<String>;
}

impl<F> CompanyDescriber for F
where
    F: Fn(&str, Option<&str>) -> eyre::Result<String>,
{
    fn describe(&self, company_name: &str, industry: Option<&str>) -> eyre::Result<String> {
        self(company_name, industry)
    }
}

/// `concat_ws(' ', 'Describe company', name, 'in the', industry, 'industry')`, null parts skipped.
pub fn description_prompt(company_name: &str, industry: Option<&str>) -> String {
    [
        Some("Describe company"),
        Some(company_name),
        Some("in the"),
        industry,
        Some("industry"),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ")
}

#[derive(Serialize, Debug)]
struct Request {
    messages: Vec<Message>,
}

#[derive(Serialize, Deserialize, Debug)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize, Debug)]
struct Response {
    choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: Message,
}

/// Calls a hosted chat model once per company. Failures are not retried.
pub struct ServingEndpointDescriber {
    client: Client,
    url: String,
    token: String,
}

impl ServingEndpointDescriber {
    pub fn new(host: &str, model: &str, token: impl Into<String>) -> eyre::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(180))
            .build()
            .map_err(|e| LoadError::External(e.to_string()))?;

        Ok(Self {
            client,
            url: format!("{}/serving-endpoints/{model}/invocations", host.trim_end_matches('/')),
            token: token.into(),
        })
    }

    pub fn from_config(config: &DataRoomConfig) -> eyre::Result<Self> {
        let host = config
            .serving_host
            .as_deref()
            .ok_or_else(|| LoadError::Config("DATAROOM_SERVING_HOST is not set".to_owned()))?;
        let token = config
            .serving_token
            .clone()
            .ok_or_else(|| LoadError::Config("DATAROOM_SERVING_TOKEN is not set".to_owned()))?;

        Self::new(host, &config.model, token)
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl CompanyDescriber for ServingEndpointDescriber {
    fn describe(&self, company_name: &str, industry: Option<&str>) -> eyre::Result<String> {
        let request = Request {
            messages: vec![Message {
                role: "user".to_owned(),
                content: description_prompt(company_name, industry),
            }],
        };

        debug!(company_name, url = %self.url, "requesting company description");

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| LoadError::External(format!("{company_name}: {e}")))?
            .json::<Response>()
            .map_err(|e| LoadError::External(format!("{company_name}: malformed reply: {e}")))?;

        parse_reply(company_name, response)
    }
}

fn parse_reply(company_name: &str, response: Response) -> eyre::Result<String> {
    let content = response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content.trim().to_owned())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| LoadError::External(format!("{company_name}: empty reply")))?;

    Ok(content)
}

#[cfg(test)]
mod tests {
    use crate::{config::DataRoomConfig, error::LoadError};

    use super::{description_prompt, parse_reply, CompanyDescriber, Response, ServingEndpointDescriber};

    #[test]
    fn unittest_description_prompt() {
        assert_eq!(
            description_prompt("Acme Corp", Some("Manufacturing")),
            "Describe company Acme Corp in the Manufacturing industry"
        );
        assert_eq!(
            description_prompt("Acme Corp", None),
            "Describe company Acme Corp in the industry"
        );
    }

    #[test]
    fn unittest_closure_describer() -> eyre::Result<()> {
        let stub = |name: &str, industry: Option<&str>| -> eyre::Result<String> {
            Ok(format!("{name}/{}", industry.unwrap_or("-")))
        };

        assert_eq!(stub.describe("Acme Corp", None)?, "Acme Corp/-");
        Ok(())
    }

    #[test]
    fn unittest_parse_reply() -> eyre::Result<()> {
        let ok: Response = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":" Acme makes anvils. "}}]}"#,
        )?;
        assert_eq!(parse_reply("Acme Corp", ok)?, "Acme makes anvils.");

        let empty: Response = serde_json::from_str(r#"{"choices":[]}"#)?;
        let err = parse_reply("Acme Corp", empty).unwrap_err();
        assert!(matches!(err.downcast_ref::<LoadError>(), Some(LoadError::External(_))));

        Ok(())
    }

    #[test]
    fn unittest_endpoint_from_config() -> eyre::Result<()> {
        let missing = ServingEndpointDescriber::from_config(&DataRoomConfig::default());
        assert!(missing.is_err());

        let config = DataRoomConfig::default().with_serving_endpoint("https://example.cloud/", "token");
        let describer = ServingEndpointDescriber::from_config(&config)?;
        assert_eq!(
            describer.url(),
            "https://example.cloud/serving-endpoints/databricks-dbrx-instruct/invocations"
        );
        Ok(())
    }
}
