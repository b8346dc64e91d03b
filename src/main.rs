//! # Dealdesk 웹 서버 진입점
//!
//! 딜(거래) 문서의 버전 관리와 버전 비교(변경 추적 diff + AI 변경 요약)를 제공하는
//! API 서버입니다.
//!
//! 이 파일이 수행하는 작업:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. SQLite 데이터베이스 연결 풀 생성과 마이그레이션
//! 4. 업로드 디렉토리 생성
//! 5. LLM 변경 요약기 구성 (인증키가 없으면 데모 모드)
//! 6. API 라우터 설정
//! 7. HTTP 서버 시작

// ── 모듈 선언 ──
// Rust에서는 `mod 이름;`으로 같은 폴더의 `이름.rs` 또는 `이름/mod.rs`를 모듈로 가져옵니다.
mod config;
mod db;
mod error;
mod models;
mod routes;
mod services;

// anyhow::Result: 어떤 에러 타입이든 `?`로 전파할 수 있는 범용 Result (main 전용)
use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use config::Config;
use routes::{documents::AppState, *};
use services::{llm::OpenAiClient, ChangeSummarizer};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::{path::Path, str::FromStr, sync::Arc};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// #[tokio::main]: async main 함수를 Tokio 런타임 위에서 실행하도록 바꿔주는 매크로
#[tokio::main]
async fn main() -> Result<()> {
    // ── 1단계: 환경변수 로딩 ──
    // .env 파일이 없어도 에러 없이 넘어갑니다.
    dotenvy::dotenv().ok();

    // ── 2단계: 로깅 초기화 ──
    // RUST_LOG가 없으면 dealdesk, tower_http, axum 모듈을 debug 레벨로 설정
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dealdesk=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // ── 3단계: 설정 읽기 ──
    // DATABASE_URL이 없으면 여기서 에러로 종료됩니다.
    let config = Config::from_env()?;
    tracing::info!("Starting Dealdesk server on {}:{}", config.host, config.port);

    // ── 4단계: 데이터베이스 연결 풀 ──
    // create_if_missing: DB 파일이 없으면 새로 만듭니다.
    // foreign_keys: SQLite는 기본적으로 외래키 검사가 꺼져 있으므로 켭니다.
    let connect_options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await?;

    // ── 5단계: 마이그레이션 ──
    // sqlx::migrate!는 컴파일 타임에 ./migrations 폴더의 SQL 파일들을 바이너리에 포함시킵니다.
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    // ── 6단계: 업로드 디렉토리 생성 ──
    let uploads_path = Path::new(&config.uploads_path);
    if !uploads_path.exists() {
        tokio::fs::create_dir_all(uploads_path).await?;
        tracing::info!("Created uploads directory: {}", config.uploads_path);
    }

    // ── 7단계: 변경 요약기 ──
    let summarizer = build_summarizer(&config)?;

    // ── 8단계: 애플리케이션 상태(State) ──
    // 모든 핸들러가 공유합니다. pool.clone()은 같은 풀을 가리키는 핸들을 복제할 뿐입니다.
    let state = AppState {
        pool: pool.clone(),
        uploads_path: config.uploads_path.clone(),
        summarizer,
        diff_timeout: config.diff_timeout,
    };

    // ── 9단계: 라우터 ──
    let app = build_router(state, Path::new(&config.frontend_dist));

    // ── 10단계: 서버 시작 ──
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // with_graceful_shutdown: 종료 신호를 받으면 새 연결을 받지 않고 진행 중인 요청을 마칩니다.
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// 설정에 LLM 인증키가 있으면 실제 클라이언트를, 없으면 데모 모드 요약기를 만듭니다.
fn build_summarizer(config: &Config) -> Result<ChangeSummarizer> {
    match &config.llm {
        // 인증키가 있으면 실제 LLM 엔드포인트를 호출하는 클라이언트를 만듭니다.
        Some(llm) => {
            tracing::info!(
                "Change summaries use model {} at {} (timeout {:?})",
                llm.model,
                llm.base_url,
                llm.timeout
            );
            let client = OpenAiClient::new(llm)?;
            // Arc<dyn CompletionClient>: 여러 요청이 같은 클라이언트를 공유합니다.
            Ok(ChangeSummarizer::new(Some(Arc::new(client))))
        }
        None => {
            tracing::warn!("LLM_API_KEY is not set, change summaries will return demo data");
            Ok(ChangeSummarizer::new(None))
        }
    }
}

/// API 라우터를 만듭니다. 모든 API는 `/api/v1` 아래에 있습니다.
///
/// 프론트엔드 빌드가 있으면 같은 서버에서 서빙하고,
/// SPA이므로 찾을 수 없는 경로는 index.html로 돌려보냅니다.
fn build_router(state: AppState, frontend_dist: &Path) -> Router {
    // .route(): URL 패턴과 핸들러 함수를 연결합니다.
    // Axum 0.8부터 경로 파라미터는 `{id}` 형식입니다.
    // .get().post()처럼 체이닝하면 같은 경로에 여러 HTTP 메서드를 매핑할 수 있습니다.
    let api_routes = Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/documents", get(list_documents).post(create_document))
        .route("/documents/{id}", get(get_document))
        .route(
            "/documents/{id}/versions",
            get(list_document_versions).post(create_document_version),
        )
        .route("/documents/{id}/versions/{version}", get(get_document_version))
        .route("/documents/{id}/compare", get(compare_document_versions))
        .route("/documents/{id}/compare/view", get(comparison_view))
        .route("/compare", post(compare_texts))
        .route("/health", get(health_check))
        // .with_state(): 이 라우터의 모든 핸들러에서 AppState를 사용할 수 있게 합니다.
        .with_state(state);

    // 개발 환경 기준으로 모든 출처를 허용합니다.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // .nest(): API 라우트를 /api/v1 아래에 둡니다. 예: /documents → /api/v1/documents
    let router = Router::new().nest("/api/v1", api_routes);

    let router = if frontend_dist.exists() {
        tracing::info!("Serving frontend static files from {}", frontend_dist.display());
        let serve_dir = ServeDir::new(frontend_dist)
            .not_found_service(ServeFile::new(frontend_dist.join("index.html")));
        router.fallback_service(serve_dir)
    } else {
        tracing::warn!("Frontend dist directory not found, serving API only");
        router
    };

    // .layer(): 미들웨어 추가. TraceLayer는 모든 요청/응답을 tracing으로 기록합니다.
    router.layer(cors).layer(TraceLayer::new_for_http())
}

/// Ctrl+C를 받으면 진행 중인 요청을 마무리하고 종료합니다.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        // 신호를 받을 수 없으면 종료 트리거 없이 계속 실행합니다.
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::memory_pool;
    use reqwest::StatusCode;
    use serde_json::{json, Value};

    /// 루프백 주소에 전체 앱을 띄우고 `/api/v1` 기준 URL을 반환합니다.
    async fn spawn_app() -> (String, tempfile::TempDir) {
        let uploads = tempfile::tempdir().expect("uploads dir");
        let base = spawn_app_with_uploads(uploads.path()).await;
        (base, uploads)
    }

    async fn spawn_app_with_uploads(uploads_path: &Path) -> String {
        let state = AppState {
            pool: memory_pool().await,
            uploads_path: uploads_path.to_string_lossy().into_owned(),
            summarizer: ChangeSummarizer::new(None),
            diff_timeout: services::diff::DEFAULT_DIFF_TIMEOUT,
        };
        let app = build_router(state, Path::new("does-not-exist"));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind app");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve app");
        });
        format!("http://{addr}/api/v1")
    }

    async fn post_json(client: &reqwest::Client, url: String, body: Value) -> (StatusCode, Value) {
        let response = client.post(url).json(&body).send().await.expect("send");
        let status = response.status();
        (status, response.json().await.expect("json body"))
    }

    #[tokio::test]
    async fn upload_and_compare_versions() {
        let (base, uploads) = spawn_app().await;
        let client = reqwest::Client::new();

        let (_, user) = post_json(&client, format!("{base}/users"), json!({ "display_name": "Dana" })).await;
        let (_, doc) = post_json(
            &client,
            format!("{base}/documents"),
            json!({ "title": "Share Purchase Agreement", "deal_id": "deal-7" }),
        )
        .await;
        let doc_id = doc["id"].as_str().unwrap().to_string();
        assert_eq!(doc["slug"], "share-purchase-agreement");

        let (status, v1) = post_json(
            &client,
            format!("{base}/documents/{doc_id}/versions"),
            json!({ "file_name": "spa.txt", "file_content": "Price is 10", "uploaded_by_id": user["id"] }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(v1["version_number"], 1);
        assert_eq!(v1["content_format"], "plain_text");

        let (_, v2) = post_json(
            &client,
            format!("{base}/documents/{doc_id}/versions"),
            json!({ "file_name": "spa.html", "file_content": "<p>Price is 12</p>" }),
        )
        .await;
        assert_eq!(v2["version_number"], 2);
        assert_eq!(v2["content_format"], "html");
        assert!(uploads.path().join(&doc_id).join("v2-spa.html").exists());

        let result: Value = client
            .get(format!("{base}/documents/{doc_id}/compare"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(result["original_version"]["version_number"], 1);
        assert_eq!(result["original_version"]["uploaded_by_name"], "Dana");
        assert_eq!(result["new_version"]["version_number"], 2);
        assert_eq!(result["content_v1"], "Price is 10");
        assert_eq!(result["ai_summary"]["significant_changes"].as_array().unwrap().len(), 3);
        assert_eq!(
            result["ai_summary"]["unchanged_sections"],
            json!(["Introduction", "Closing Conditions"])
        );

        let page = client
            .get(format!("{base}/documents/{doc_id}/compare/view?v1=1&v2=2&tab=original"))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(page.contains("<main class=\"pane original\"><p>Price is 10</p></main>"));
    }

    #[tokio::test]
    async fn comparison_errors_are_reported() {
        let (base, _uploads) = spawn_app().await;
        let client = reqwest::Client::new();

        let missing = client
            .get(format!("{base}/documents/nope/compare"))
            .send()
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let (_, doc) = post_json(&client, format!("{base}/documents"), json!({})).await;
        assert_eq!(doc["title"], "Untitled");
        let doc_id = doc["id"].as_str().unwrap();

        let no_versions = client
            .get(format!("{base}/documents/{doc_id}/compare"))
            .send()
            .await
            .unwrap();
        assert_eq!(no_versions.status(), StatusCode::BAD_REQUEST);
        let body: Value = no_versions.json().await.unwrap();
        assert_eq!(body["error"]["code"], "bad_request");

        let bad_tab = client
            .get(format!("{base}/documents/{doc_id}/compare/view?tab=history"))
            .send()
            .await
            .unwrap();
        assert_eq!(bad_tab.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_uploader_is_rejected() {
        let (base, _uploads) = spawn_app().await;
        let client = reqwest::Client::new();
        let (_, doc) = post_json(&client, format!("{base}/documents"), json!({ "title": "NDA" })).await;
        let doc_id = doc["id"].as_str().unwrap();

        let (status, body) = post_json(
            &client,
            format!("{base}/documents/{doc_id}/versions"),
            json!({ "file_name": "nda.txt", "file_content": "x", "uploaded_by_id": "ghost" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["message"].as_str().unwrap().contains("ghost"));
    }

    #[tokio::test]
    async fn upload_succeeds_when_the_file_copy_cannot_be_written() {
        // 업로드 경로가 디렉토리가 아니라 일반 파일이면 사본 저장이 실패합니다.
        let blocker = tempfile::NamedTempFile::new().expect("blocker file");
        let base = spawn_app_with_uploads(blocker.path()).await;
        let client = reqwest::Client::new();

        let (_, doc) = post_json(&client, format!("{base}/documents"), json!({ "title": "SPA" })).await;
        let doc_id = doc["id"].as_str().unwrap();

        for expected in 1..=2 {
            let (status, version) = post_json(
                &client,
                format!("{base}/documents/{doc_id}/versions"),
                json!({ "file_name": "spa.txt", "file_content": format!("draft {expected}") }),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
            assert_eq!(version["version_number"], expected);
        }

        let listed: Value = client
            .get(format!("{base}/documents/{doc_id}/versions"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(listed["versions"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn html_versions_compare_without_literal_tags() {
        let (base, _uploads) = spawn_app().await;
        let client = reqwest::Client::new();
        let (_, doc) = post_json(&client, format!("{base}/documents"), json!({ "title": "SPA" })).await;
        let doc_id = doc["id"].as_str().unwrap();

        for content in ["<p>Price is 10</p>", "<p>Price is 12</p>"] {
            post_json(
                &client,
                format!("{base}/documents/{doc_id}/versions"),
                json!({ "file_name": "spa.html", "file_content": content }),
            )
            .await;
        }

        let result: Value = client
            .get(format!("{base}/documents/{doc_id}/compare"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let diff_html = result["diff_html"].as_str().unwrap();
        assert!(diff_html.contains("<ins class=\"diff-added\">12</ins>"));
        assert!(!diff_html.contains("&lt;p&gt;"));
    }

    #[tokio::test]
    async fn out_of_range_version_numbers_are_bad_requests() {
        let (base, _uploads) = spawn_app().await;
        let client = reqwest::Client::new();
        let (_, doc) = post_json(&client, format!("{base}/documents"), json!({ "title": "SPA" })).await;
        let doc_id = doc["id"].as_str().unwrap();
        post_json(
            &client,
            format!("{base}/documents/{doc_id}/versions"),
            json!({ "file_name": "spa.txt", "file_content": "v1" }),
        )
        .await;

        let response = client
            .get(format!("{base}/documents/{doc_id}/compare?v2={}", i64::MIN))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn compare_texts_normalizes_both_sides() {
        let (base, _uploads) = spawn_app().await;
        let client = reqwest::Client::new();

        let (status, body) = post_json(
            &client,
            format!("{base}/compare"),
            json!({ "original": "<p>Hello</p>", "updated": "Hello\n\nWorld" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["original_html"], "<p>Hello</p>");
        assert_eq!(body["new_html"], "<p>Hello</p><p>World</p>");
        assert_eq!(body["ai_summary"]["significant_changes"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn health_reports_demo_mode() {
        let (base, _uploads) = spawn_app().await;
        let body: Value = reqwest::get(format!("{base}/health")).await.unwrap().json().await.unwrap();
        assert_eq!(body, json!({ "status": "ok", "llm": "demo" }));
    }
}
