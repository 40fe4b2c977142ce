//! Fixture sources backed by the published GitHub payload.
//!
//! The same obfuscated JSON object is served two ways: wrapped in the
//! contents API (base64 in a `content` field) and as the raw file.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::SourceConfig;
use crate::errors::{DirectoryError, DirectoryResult};
use crate::models::Fixture;

use super::obfuscation::{decode_base64_lenient, decode_payload};
use super::traits::FixtureSource;

const GITHUB_JSON: &str = "application/vnd.github.v3+json";

fn build_client(timeout: Duration, user_agent: &str) -> DirectoryResult<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(user_agent.to_string())
        .build()
        .map_err(|e| DirectoryError::transport("http-client", e.to_string()))
}

async fn get_json(
    client: &Client,
    source_name: &str,
    url: &str,
    headers: &[(reqwest::header::HeaderName, &str)],
) -> DirectoryResult<Value> {
    debug!("Fetching fixtures from {} ({})", url, source_name);
    let mut request = client.get(url);
    for (name, value) in headers {
        request = request.header(name.clone(), *value);
    }
    let response = request
        .send()
        .await
        .map_err(|e| DirectoryError::transport(source_name, e.to_string()))?;

    if !response.status().is_success() {
        return Err(DirectoryError::Http {
            source_name: source_name.to_string(),
            status: response.status().as_u16(),
        });
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| DirectoryError::decode(source_name, e.to_string()))
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    #[serde(default)]
    content: String,
}

/// Reads the payload through the repository contents API
pub struct GithubContentsSource {
    client: Client,
    url: String,
    user_agent: String,
    key: String,
}

impl GithubContentsSource {
    pub fn new(config: &SourceConfig) -> DirectoryResult<Self> {
        Ok(Self {
            client: build_client(config.request_timeout, &config.user_agent)?,
            url: config.contents_url(),
            user_agent: config.user_agent.clone(),
            key: config.obfuscation_key.clone(),
        })
    }

    /// Decode a contents API body into fixtures
    pub fn decode_body(&self, body: Value) -> DirectoryResult<Vec<Fixture>> {
        let response: ContentsResponse = serde_json::from_value(body)
            .map_err(|e| DirectoryError::decode(self.name(), e.to_string()))?;
        let raw = decode_base64_lenient(&response.content)
            .map_err(|e| DirectoryError::decode(self.name(), e.to_string()))?;
        let payload: Value = serde_json::from_slice(&raw)
            .map_err(|e| DirectoryError::decode(self.name(), e.to_string()))?;

        let fixtures = decode_payload(&payload, &self.key);
        if fixtures.is_empty() {
            return Err(DirectoryError::EmptyPayload {
                source_name: self.name().to_string(),
            });
        }
        Ok(fixtures)
    }
}

#[async_trait]
impl FixtureSource for GithubContentsSource {
    fn name(&self) -> &str {
        "github-contents"
    }

    async fn fetch_fixtures(&self) -> DirectoryResult<Vec<Fixture>> {
        let body = get_json(
            &self.client,
            self.name(),
            &self.url,
            &[(ACCEPT, GITHUB_JSON), (USER_AGENT, &self.user_agent)],
        )
        .await?;
        let fixtures = self.decode_body(body)?;
        info!("Loaded {} fixtures from {}", fixtures.len(), self.name());
        Ok(fixtures)
    }
}

/// Reads the raw payload file from the default branch
pub struct GithubRawSource {
    client: Client,
    url: String,
    key: String,
}

impl GithubRawSource {
    pub fn new(config: &SourceConfig) -> DirectoryResult<Self> {
        Ok(Self {
            client: build_client(config.request_timeout, &config.user_agent)?,
            url: config.raw_url(),
            key: config.obfuscation_key.clone(),
        })
    }
}

#[async_trait]
impl FixtureSource for GithubRawSource {
    fn name(&self) -> &str {
        "github-raw"
    }

    /// An empty list is a valid answer here; only transport and HTTP
    /// failures move the chain on.
    async fn fetch_fixtures(&self) -> DirectoryResult<Vec<Fixture>> {
        let payload = get_json(&self.client, self.name(), &self.url, &[]).await?;
        let fixtures = decode_payload(&payload, &self.key);
        info!("Loaded {} fixtures from {}", fixtures.len(), self.name());
        Ok(fixtures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::obfuscation::encrypt_string;
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use serde_json::json;

    fn source() -> GithubContentsSource {
        GithubContentsSource::new(&SourceConfig::default()).unwrap()
    }

    fn contents_body(payload: &Value) -> Value {
        let encoded = STANDARD.encode(payload.to_string());
        // The contents API wraps base64 at 60 columns
        let wrapped: Vec<String> = encoded
            .as_bytes()
            .chunks(60)
            .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
            .collect();
        json!({ "content": wrapped.join("\n"), "encoding": "base64" })
    }

    fn obfuscated_payload(fixtures: Value) -> Value {
        let key = "devxseven";
        let mut payload = serde_json::Map::new();
        payload.insert(
            encrypt_string("context", key),
            Value::String(encrypt_string(&fixtures.to_string(), key)),
        );
        Value::Object(payload)
    }

    #[test]
    fn decodes_wrapped_contents_body() {
        let payload = obfuscated_payload(json!([
            {"id": "295987", "home_name": "Liverpool", "away_name": "Arsenal", "match_time": 1_760_000_000}
        ]));
        let fixtures = source().decode_body(contents_body(&payload)).unwrap();
        assert_eq!(fixtures.len(), 1);
        assert_eq!(fixtures[0].title(), "Liverpool vs Arsenal");
    }

    #[test]
    fn empty_contents_is_a_failure() {
        let payload = obfuscated_payload(json!([]));
        assert_eq!(
            source().decode_body(contents_body(&payload)),
            Err(DirectoryError::EmptyPayload {
                source_name: "github-contents".to_string()
            })
        );
    }

    #[test]
    fn garbage_content_is_a_decode_error() {
        let result = source().decode_body(json!({"content": "%%%"}));
        assert!(matches!(result, Err(DirectoryError::Decode { .. })));
    }

    #[test]
    fn urls_follow_config() {
        let config = SourceConfig::default();
        assert_eq!(
            config.contents_url(),
            "https://api.github.com/repos/devxseven/mdata/contents/matches.json"
        );
        assert_eq!(
            config.raw_url(),
            "https://raw.githubusercontent.com/devxseven/mdata/main/matches.json"
        );
    }
}
