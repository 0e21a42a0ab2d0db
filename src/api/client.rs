use std::time::Duration;

use serde_json::json;
use thiserror::Error;

use crate::api::types::{AnswerResult, Clef, Difficulty, GraphPoint, Melody, Prompt, StatsSummary};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {0}")]
    Status(reqwest::StatusCode),
}

/// The practice server's REST surface. The fetch worker drives a real
/// `HttpApi`; tests drive scripted fakes.
pub trait PracticeApi {
    fn new_key(&self) -> Result<Prompt, ApiError>;
    fn check_key(&self, answer: &str) -> Result<AnswerResult, ApiError>;
    fn generate_melody(&self, difficulty: Difficulty, clef: Clef) -> Result<Melody, ApiError>;
    fn export_melody(&self, melody: &Melody) -> Result<Vec<u8>, ApiError>;
    fn stats(&self) -> Result<StatsSummary, ApiError>;
    fn graph_data(&self) -> Result<Vec<GraphPoint>, ApiError>;
}

pub struct HttpApi {
    base: String,
    client: reqwest::blocking::Client,
}

impl HttpApi {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            base: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn get(&self, path: &str) -> Result<reqwest::blocking::Response, ApiError> {
        let response = self.client.get(self.url(path)).send()?;
        Self::checked(response)
    }

    fn post_json(
        &self,
        path: &str,
        body: &impl serde::Serialize,
    ) -> Result<reqwest::blocking::Response, ApiError> {
        let response = self.client.post(self.url(path)).json(body).send()?;
        Self::checked(response)
    }

    fn checked(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(ApiError::Status(response.status()))
        }
    }
}

impl PracticeApi for HttpApi {
    fn new_key(&self) -> Result<Prompt, ApiError> {
        Ok(self.get("/api/key/new")?.json()?)
    }

    fn check_key(&self, answer: &str) -> Result<AnswerResult, ApiError> {
        Ok(self
            .post_json("/api/key/check", &json!({ "answer": answer }))?
            .json()?)
    }

    fn generate_melody(&self, difficulty: Difficulty, clef: Clef) -> Result<Melody, ApiError> {
        let body = json!({
            "difficulty": difficulty.as_str(),
            "clef": clef.as_str(),
        });
        Ok(self.post_json("/api/melody/generate", &body)?.json()?)
    }

    fn export_melody(&self, melody: &Melody) -> Result<Vec<u8>, ApiError> {
        let response = self.post_json("/api/melody/export", melody)?;
        Ok(response.bytes()?.to_vec())
    }

    fn stats(&self) -> Result<StatsSummary, ApiError> {
        Ok(self.get("/api/stats")?.json()?)
    }

    fn graph_data(&self) -> Result<Vec<GraphPoint>, ApiError> {
        Ok(self.get("/api/graph-data")?.json()?)
    }
}
