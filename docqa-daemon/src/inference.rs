//! Hugging Face question-answering client.
//!
//! Implements [`InferenceBackend`] over the hosted inference API. Any
//! failure is returned as an [`InferenceError`]; the answering service
//! decides what to do with it.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use docqa_core::inference::{InferenceBackend, InferenceError, InferenceResult, QaAnswer};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Extractive QA model used when none is configured.
pub const DEFAULT_QA_MODEL: &str = "distilbert/distilbert-base-cased-distilled-squad";

/// Base URL of the hosted inference API.
pub const DEFAULT_API_URL: &str = "https://router.huggingface.co/hf-inference/models";

/// Longest error body kept in an [`InferenceError::Status`] message.
const MAX_ERROR_BODY: usize = 200;

#[derive(Clone, Debug)]
pub struct HuggingFaceConfig {
    pub base_url: String,
    pub token: String,
    pub model: String,
    pub timeout: Duration,
}

impl HuggingFaceConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            token: token.into(),
            model: DEFAULT_QA_MODEL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Clone)]
pub struct HuggingFaceClient {
    client: Client,
    config: HuggingFaceConfig,
}

#[derive(Serialize)]
struct QaRequest<'a> {
    inputs: QaInputs<'a>,
}

#[derive(Serialize)]
struct QaInputs<'a> {
    question: &'a str,
    context: &'a str,
}

/// The API returns a single object for one answer and a list when asked
/// for several candidates.
#[derive(Deserialize)]
#[serde(untagged)]
enum QaResponse {
    Single(QaAnswer),
    Ranked(Vec<QaAnswer>),
}

impl HuggingFaceClient {
    pub fn new(config: HuggingFaceConfig) -> InferenceResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| InferenceError::Transport(format!("failed to build client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    async fn ask(&self, question: &str, context: &str) -> InferenceResult<QaAnswer> {
        let request = QaRequest {
            inputs: QaInputs { question, context },
        };

        let url = self.endpoint();
        debug!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.token)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    InferenceError::Timeout(self.config.timeout)
                } else {
                    InferenceError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::Status {
                status: status.as_u16(),
                message: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let parsed: QaResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::Malformed(e.to_string()))?;

        match parsed {
            QaResponse::Single(answer) => Ok(answer),
            QaResponse::Ranked(answers) => answers
                .into_iter()
                .next()
                .ok_or_else(|| InferenceError::Malformed("empty answer list".to_string())),
        }
    }
}

impl InferenceBackend for HuggingFaceClient {
    fn question_answering<'a>(
        &'a self,
        question: &'a str,
        context: &'a str,
    ) -> Pin<Box<dyn Future<Output = InferenceResult<QaAnswer>> + Send + 'a>> {
        Box::pin(self.ask(question, context))
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> HuggingFaceClient {
        let config = HuggingFaceConfig {
            base_url: server.uri(),
            model: "acme/qa-model".to_string(),
            timeout: Duration::from_secs(2),
            ..HuggingFaceConfig::new("hf_test_token")
        };
        HuggingFaceClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_single_answer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/acme/qa-model"))
            .and(header("authorization", "Bearer hf_test_token"))
            .and(body_json(json!({
                "inputs": {"question": "Where?", "context": "In Paris."}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "answer": "Paris", "score": 0.93, "start": 3, "end": 8
            })))
            .mount(&server)
            .await;

        let answer = client_for(&server)
            .question_answering("Where?", "In Paris.")
            .await
            .unwrap();
        assert_eq!(answer.answer, "Paris");
        assert!((answer.score - 0.93).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_ranked_answers_take_first() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"answer": "first", "score": 0.8},
                {"answer": "second", "score": 0.1}
            ])))
            .mount(&server)
            .await;

        let answer = client_for(&server).ask("q", "c").await.unwrap();
        assert_eq!(answer.answer, "first");
    }

    #[tokio::test]
    async fn test_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("model is loading"))
            .mount(&server)
            .await;

        let err = client_for(&server).ask("q", "c").await.unwrap_err();
        match err {
            InferenceError::Status { status, message } => {
                assert_eq!(status, 503);
                assert!(message.contains("loading"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"label": "x"})))
            .mount(&server)
            .await;

        let err = client_for(&server).ask("q", "c").await.unwrap_err();
        assert!(matches!(err, InferenceError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_slow_backend_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"answer": "late"}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let config = HuggingFaceConfig {
            base_url: server.uri(),
            timeout: Duration::from_millis(100),
            ..HuggingFaceConfig::new("t")
        };
        let err = HuggingFaceClient::new(config)
            .unwrap()
            .ask("q", "c")
            .await
            .unwrap_err();
        assert!(matches!(err, InferenceError::Timeout(_)));
    }

    #[test]
    fn test_endpoint_joins_model() {
        let config = HuggingFaceConfig {
            base_url: "http://localhost:9000/models/".to_string(),
            ..HuggingFaceConfig::new("t")
        };
        let client = HuggingFaceClient::new(config).unwrap();
        assert_eq!(
            client.endpoint(),
            format!("http://localhost:9000/models/{}", DEFAULT_QA_MODEL)
        );
    }
}
