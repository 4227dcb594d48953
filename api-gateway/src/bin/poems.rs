//! Poems Lambda - Generates, renders and delivers Valentine poems.
//!
//! Endpoints:
//! - GET / - Landing page
//! - GET /health - Deployment mode and integration status
//! - POST /api/generate-poem - Generate a poem and deliver it
//! - POST /api/download-poem/{format}/{theme} - Render a poem as PDF or PNG
//! - GET /api/themes - List theme names
//! - GET /api/tweets - List logged social posts

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use shared::http::{attachment_response, from_error, html_response, json_response, error_response};
use shared::models::{DownloadRequest, PoemRequest};
use shared::{parse_body, PoemService};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Application state
struct AppState {
    service: PoemService,
}

impl AppState {
    async fn new() -> Self {
        let config = shared::load_config().await;

        info!(
            delivery_mode = config.delivery_mode.as_str(),
            background_mode = config.background_mode.as_str(),
            "Poem service configured"
        );

        Self {
            service: PoemService::from_config(config),
        }
    }
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let path = event.uri().path().trim_end_matches('/');
    let path = if path.is_empty() { "/" } else { path };
    let method = event.method().as_str();

    info!("Received request: method={}, path={}", method, path);

    match (method, path) {
        ("GET", "/") => html_response(INDEX_HTML),

        ("GET", "/health") => json_response(200, &state.service.health()),

        ("GET", "/api/themes") => json_response(200, &state.service.theme_names()),

        ("GET", "/api/tweets") => match state.service.tweets().await {
            Ok(records) => json_response(200, &records),
            Err(e) => {
                error!(error = %e, "Failed to read tweet log");
                from_error(&e)
            }
        },

        ("POST", "/api/generate-poem") => {
            let request: PoemRequest = parse_body!(event.body());

            match state.service.generate(request).await {
                Ok(response) => json_response(200, &response),
                Err(e) => {
                    error!(error = %e, status = e.status_code(), "Poem request failed");
                    from_error(&e)
                }
            }
        }

        ("POST", p) if p.starts_with("/api/download-poem/") => {
            let params: Vec<&str> = p
                .trim_start_matches("/api/download-poem/")
                .split('/')
                .collect();
            let [format, theme] = params.as_slice() else {
                return error_response(404, "Not found");
            };
            let request: DownloadRequest = parse_body!(event.body());

            match state.service.download(format, theme, &request.poem).await {
                Ok(artifact) => {
                    let filename = artifact.filename();
                    attachment_response(artifact.content_type(), &filename, artifact.bytes)
                }
                Err(e) => {
                    error!(error = %e, format = %format, "Download failed");
                    from_error(&e)
                }
            }
        }

        _ => error_response(404, "Not found"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await);

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(state, event).await }
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Config, DeliveryMode};
    use tempfile::{tempdir, TempDir};

    fn state(mode: DeliveryMode) -> (Arc<AppState>, TempDir) {
        let dir = tempdir().unwrap();
        let config = Config {
            delivery_mode: mode,
            assets_dir: dir.path().join("assets"),
            tweets_log: dir.path().join("tweets_log.json"),
            ..Config::default()
        };
        let state = AppState {
            service: PoemService::from_config(config),
        };
        (Arc::new(state), dir)
    }

    fn request(method: &str, uri: &str, body: &str) -> Request {
        lambda_http::http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn call(state: &Arc<AppState>, method: &str, uri: &str, body: &str) -> Response<Body> {
        handler(Arc::clone(state), request(method, uri, body)).await.unwrap()
    }

    fn json(response: &Response<Body>) -> serde_json::Value {
        serde_json::from_slice(response.body().as_ref()).unwrap()
    }

    #[tokio::test]
    async fn test_download_mode_generates_fallback_poem() {
        let (state, _dir) = state(DeliveryMode::Download);

        let response = call(
            &state,
            "POST",
            "/api/generate-poem",
            r#"{"prompt":"stargazing on the roof","twitter_handle":"@cupid","theme":"starlight","share_on_twitter":true}"#,
        )
        .await;
        assert_eq!(response.status(), 200);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");

        let body = json(&response);
        assert_eq!(body["success"], true);
        assert_eq!(body["theme"], "starlight");
        let poem = body["poem"].as_str().unwrap();
        assert!(poem.contains("stargazing on the roof"));
        assert!(poem.contains("Forever yours"));
        assert!(poem.ends_with("- @cupid"));
        assert!(body.get("tweet_url").is_none());
    }

    #[tokio::test]
    async fn test_validation_errors() {
        let (state, _dir) = state(DeliveryMode::Download);

        let response = call(&state, "POST", "/api/generate-poem", r#"{"prompt":"hi","handle":"bad handle!"}"#).await;
        assert_eq!(response.status(), 400);
        assert_eq!(json(&response)["error"], "Invalid Twitter handle");

        let response = call(&state, "POST", "/api/generate-poem", "").await;
        assert_eq!(response.status(), 400);
        assert_eq!(json(&response)["error"], "Missing request body");
    }

    #[tokio::test]
    async fn test_email_mode_without_smtp_is_unavailable() {
        let (state, _dir) = state(DeliveryMode::Email);

        let response = call(
            &state,
            "POST",
            "/api/generate-poem",
            r#"{"prompt":"hi","email":"love@example.com"}"#,
        )
        .await;
        assert_eq!(response.status(), 503);
        assert_eq!(json(&response)["success"], false);
    }

    #[tokio::test]
    async fn test_download_pdf() {
        let (state, _dir) = state(DeliveryMode::Download);

        let response = call(&state, "POST", "/api/download-poem/pdf/hearts", r#"{"poem":"Roses are red"}"#).await;
        assert_eq!(response.status(), 200);
        assert_eq!(response.headers()["content-type"], "application/pdf");
        assert_eq!(
            response.headers()["content-disposition"],
            "attachment; filename=\"valentine_poem_hearts.pdf\""
        );
        assert!(response.body().as_ref().starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_download_rejects_unknown_format() {
        let (state, _dir) = state(DeliveryMode::Download);

        let response = call(&state, "POST", "/api/download-poem/svg/roses", r#"{"poem":"Roses are red"}"#).await;
        assert_eq!(response.status(), 400);
        assert_eq!(json(&response)["error"], "Invalid format");

        let response = call(&state, "POST", "/api/download-poem/pdf", r#"{"poem":"Roses are red"}"#).await;
        assert_eq!(response.status(), 404);
    }

    #[tokio::test]
    async fn test_read_endpoints() {
        let (state, _dir) = state(DeliveryMode::Download);

        let health = json(&call(&state, "GET", "/health", "").await);
        assert_eq!(health["status"], "healthy");
        assert_eq!(health["delivery_mode"], "download");
        assert_eq!(health["openai_configured"], false);

        let themes = json(&call(&state, "GET", "/api/themes", "").await);
        assert_eq!(
            themes,
            serde_json::json!(["roses", "hearts", "sunset", "starlight", "vintage"])
        );

        let tweets = json(&call(&state, "GET", "/api/tweets", "").await);
        assert_eq!(tweets, serde_json::json!([]));

        let page = call(&state, "GET", "/", "").await;
        assert_eq!(page.status(), 200);
        assert!(String::from_utf8_lossy(page.body().as_ref()).contains("<form"));

        let missing = call(&state, "GET", "/nope", "").await;
        assert_eq!(missing.status(), 404);
        assert_eq!(json(&missing)["error"], "Not found");
    }
}
