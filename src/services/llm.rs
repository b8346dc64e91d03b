//! # LLM 완성(completion) 클라이언트
//!
//! 변경 요약기가 사용하는 외부 LLM 엔드포인트와의 경계입니다.
//! [`CompletionClient`] 트레이트로 추상화되어 있어서, 테스트에서는 가짜 구현을 주입하고
//! 실제 서버에서는 OpenAI 호환 `/chat/completions` API를 호출하는 [`OpenAiClient`]를 씁니다.

use super::summarizer::SummarizerError;
use crate::config::LlmConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 대화 메시지 하나 (system / user)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

/// 응답 형식 지정. `{"type": "json_object"}`이면 모델이 JSON 객체만 반환합니다.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseFormat {
    // `type`은 Rust 예약어이므로 필드 이름을 바꾸고 직렬화 이름만 맞춥니다.
    #[serde(rename = "type")]
    pub kind: String,
}

/// 완성 요청. 모델 식별자는 클라이언트가 채웁니다.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub response_format: ResponseFormat,
}

/// LLM 완성 호출. 응답 본문(메시지 내용)이 없으면 `Ok(None)`입니다.
///
/// `#[async_trait]`: 트레이트의 async 메서드를 `Box<dyn Future>`로 바꿔서
/// `Arc<dyn CompletionClient>`처럼 트레이트 객체로 쓸 수 있게 합니다.
/// `Send + Sync`: 여러 요청(스레드)이 같은 클라이언트를 공유하기 위한 조건입니다.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Option<String>, SummarizerError>;

    /// 이 호출에 허용되는 최대 시간
    fn timeout(&self) -> Duration;
}

/// OpenAI Chat Completions API 클라이언트
///
/// reqwest::Client는 내부에 연결 풀을 갖고 있으므로 한 번 만들어 재사용합니다.
pub struct OpenAiClient {
    http: Client,
    api_key: String,
    model: String,
    endpoint: String,
    timeout: Duration,
}

/// 요청 본문. 빌린 값(&'a)으로 만들어서 메시지를 복사하지 않습니다.
#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    response_format: &'a ResponseFormat,
}

/// 응답 본문 중 필요한 부분만 정의합니다. 나머지 필드는 serde가 무시합니다.
#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiClient {
    /// 설정으로 클라이언트를 만듭니다. 요청 단위 제한 시간도 여기서 걸어 둡니다.
    pub fn new(config: &LlmConfig) -> Result<Self, SummarizerError> {
        // Client::builder().build()는 TLS 초기화 실패 시 에러를 반환합니다.
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            // base_url 끝의 '/' 유무와 관계없이 같은 주소가 되도록 정리합니다.
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            timeout: config.timeout,
        })
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Option<String>, SummarizerError> {
        let body = ChatCompletionBody {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            response_format: &request.response_format,
        };

        // bearer_auth(): "Authorization: Bearer <키>" 헤더
        // .json(): 본문을 JSON으로 직렬화하고 Content-Type을 설정
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // 에러 본문은 진단용으로만 쓰므로 읽기 실패는 빈 문자열로 대체합니다.
            let detail = response.text().await.unwrap_or_default();
            return Err(SummarizerError::Status { status: status.as_u16(), detail });
        }

        // 응답 본문 자체가 JSON이 아니면 "형식이 잘못된 응답"으로 분류합니다.
        let bytes = response.bytes().await?;
        let parsed: ChatCompletionResponse =
            serde_json::from_slice(&bytes).map_err(SummarizerError::MalformedResponse)?;

        // choices[0].message.content. 어느 단계든 없으면 None
        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content))
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    /// 루프백 주소에 가짜 LLM 서버를 띄우고 base URL을 반환합니다.
    async fn spawn_fake_llm(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake llm");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve fake llm");
        });
        format!("http://{addr}/v1")
    }

    fn config(base_url: String, timeout: Duration) -> LlmConfig {
        LlmConfig {
            api_key: "test-key".to_string(),
            model: "gpt-4o".to_string(),
            base_url,
            timeout,
        }
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            messages: vec![ChatMessage::system("s"), ChatMessage::user("u")],
            temperature: 0.2,
            response_format: ResponseFormat { kind: "json_object".to_string() },
        }
    }

    #[tokio::test]
    async fn sends_model_format_and_temperature() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|Json(body): Json<Value>| async move {
                // 요청 본문을 그대로 메시지 내용으로 되돌려줍니다.
                Json(json!({
                    "choices": [{ "message": { "role": "assistant", "content": body.to_string() } }]
                }))
            }),
        );
        let client = OpenAiClient::new(&config(spawn_fake_llm(router).await, Duration::from_secs(5)))
            .unwrap();

        let echoed = client.complete(&request()).await.unwrap().unwrap();
        let body: Value = serde_json::from_str(&echoed).unwrap();
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["response_format"]["type"], "json_object");
        assert!((body["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
    }

    #[tokio::test]
    async fn missing_content_is_none() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(json!({ "choices": [] })) }),
        );
        let client = OpenAiClient::new(&config(spawn_fake_llm(router).await, Duration::from_secs(5)))
            .unwrap();
        assert_eq!(client.complete(&request()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        );
        let client = OpenAiClient::new(&config(spawn_fake_llm(router).await, Duration::from_secs(5)))
            .unwrap();

        let err = client.complete(&request()).await.unwrap_err();
        assert!(matches!(err, SummarizerError::Status { status: 429, .. }));
    }

    #[tokio::test]
    async fn slow_endpoint_hits_the_client_deadline() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({ "choices": [] }))
            }),
        );
        let client =
            OpenAiClient::new(&config(spawn_fake_llm(router).await, Duration::from_millis(100)))
                .unwrap();

        let err = client.complete(&request()).await.unwrap_err();
        assert!(matches!(err, SummarizerError::Transport(_)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_error() {
        // 포트 1은 보통 열려 있지 않으므로 연결이 거부됩니다.
        let client = OpenAiClient::new(&config(
            "http://127.0.0.1:1/v1".to_string(),
            Duration::from_secs(2),
        ))
        .unwrap();
        let err = client.complete(&request()).await.unwrap_err();
        assert!(matches!(err, SummarizerError::Transport(_)));
    }
}
