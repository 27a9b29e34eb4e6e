//! HTTP adapter for a hosted text model used as a scoring oracle.
//!
//! Speaks the `generateContent` REST shape. One blocking request per call,
//! bounded by the configured timeout, never retried.

use std::env;

use serde::{Deserialize, Serialize};

use crate::error::OracleError;
use crate::traits::ScoringOracle;

pub const API_KEY_VAR: &str = "PLANNER_ORACLE_API_KEY";
pub const BASE_URL_VAR: &str = "PLANNER_ORACLE_URL";
pub const MODEL_VAR: &str = "PLANNER_ORACLE_MODEL";
pub const TIMEOUT_VAR: &str = "PLANNER_ORACLE_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    pub base_url: String,
    pub model: String,
    #[serde(skip_serializing)]
    pub api_key: String,
    pub timeout_secs: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-pro".to_string(),
            api_key: String::new(),
            timeout_secs: 10,
        }
    }
}

impl OracleConfig {
    /// Read the oracle settings from the environment.
    ///
    /// Returns `None` when no API key is set: the planner then runs on the
    /// deterministic scorer alone.
    pub fn from_env() -> Option<Self> {
        let api_key = env::var(API_KEY_VAR).ok().filter(|key| !key.trim().is_empty())?;
        let defaults = Self::default();

        Some(Self {
            base_url: env::var(BASE_URL_VAR).unwrap_or(defaults.base_url),
            model: env::var(MODEL_VAR).unwrap_or(defaults.model),
            api_key,
            timeout_secs: env::var(TIMEOUT_VAR)
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(defaults.timeout_secs),
        })
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[derive(Debug, Clone)]
pub struct GenerativeClient {
    config: OracleConfig,
    client: reqwest::blocking::Client,
}

impl GenerativeClient {
    pub fn new(config: OracleConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }
}

impl ScoringOracle for GenerativeClient {
    fn complete(&self, prompt: &str) -> Result<String, OracleError> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .client
            .post(self.config.endpoint())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<GenerateResponse>())?;

        response.first_text().ok_or(OracleError::EmptyReply)
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .filter_map(|candidate| candidate.content)
            .flat_map(|content| content.parts)
            .map(|part| part.text)
            .find(|text| !text.trim().is_empty())
    }
}
