use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use diamond_chase_server::config::{ConfigError, ServerConfig};
use diamond_chase_server::recorder::SharedStore;
use diamond_chase_server::result_store::ResultStore;
use diamond_chase_server::server_protocol::parse_result_submission;
use diamond_chase_server::server_utils::parse_leaderboard_limit;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
struct LeaderboardQuery {
    limit: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env().context("invalid server configuration")?;
    let store = ResultStore::open(config.results_path.clone())
        .map_err(ConfigError::from)
        .context("refusing to start without a usable results store")?;
    info!(
        path = %store.path().display(),
        records = store.len(),
        "results store ready"
    );

    let app = build_router(Arc::new(Mutex::new(store)), config.static_dir.clone());

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    info!(port = config.port, "server running at http://localhost:{}", config.port);
    axum::serve(listener, app)
        .await
        .context("server runtime failed")?;
    Ok(())
}

fn build_router(store: SharedStore, static_dir: Option<PathBuf>) -> Router {
    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/api/players", get(list_players).post(save_player))
        .route("/api/leaderboard", get(leaderboard_handler));

    let app = if let Some(static_dir) = static_dir {
        info!(root = %static_dir.display(), "serving static files");
        let index_file = static_dir.join("index.html");
        app.fallback_service(ServeDir::new(static_dir).not_found_service(ServeFile::new(index_file)))
    } else {
        warn!("static file root not found; set STATIC_DIR to serve the game page");
        app
    };

    app.layer(CorsLayer::permissive()).with_state(store)
}

async fn healthz() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

async fn list_players(State(store): State<SharedStore>) -> impl IntoResponse {
    let guard = store.lock().await;
    Json(guard.list().to_vec())
}

async fn save_player(State(store): State<SharedStore>, body: String) -> Response {
    let submission = match parse_result_submission(&body) {
        Ok(submission) => submission,
        Err(error) => {
            warn!(%error, "rejected result submission");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": error.to_string() })),
            )
                .into_response();
        }
    };

    let appended = store.lock().await.append(submission);
    match appended {
        Ok(saved) => {
            info!(
                player = %saved.player_id,
                result = saved.result.as_str(),
                diamonds = saved.diamonds,
                "player data saved"
            );
            Json(json!({ "message": "Player data saved successfully" })).into_response()
        }
        Err(error) => {
            error!(%error, "error saving data");
            (StatusCode::INTERNAL_SERVER_ERROR, "Error saving data").into_response()
        }
    }
}

async fn leaderboard_handler(
    State(store): State<SharedStore>,
    Query(query): Query<LeaderboardQuery>,
) -> impl IntoResponse {
    let guard = store.lock().await;
    Json(guard.leaderboard(parse_leaderboard_limit(query.limit.as_deref())))
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    fn test_store(dir: &tempfile::TempDir) -> SharedStore {
        let store = ResultStore::open(dir.path().join("players.json")).expect("store opens");
        Arc::new(Mutex::new(store))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.oneshot(request).await.expect("router responds");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        (status, bytes.to_vec())
    }

    fn post_player(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/players")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds")
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request builds")
    }

    #[tokio::test]
    async fn post_then_list_returns_records_in_order() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = test_store(&dir);
        let app = build_router(Arc::clone(&store), None);

        let (status, body) = send(
            app.clone(),
            post_player(r#"{"playerId":"Ann","result":"win","diamonds":1}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let value: Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(value["message"], "Player data saved successfully");

        let (status, _) = send(app.clone(), post_player(r#"{"result":"lose"}"#)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(app, get_request("/api/players")).await;
        assert_eq!(status, StatusCode::OK);
        let rows: Value = serde_json::from_slice(&body).expect("json body");
        let rows = rows.as_array().expect("array of records");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["playerId"], "Ann");
        assert_eq!(rows[0]["result"], "win");
        assert_eq!(rows[0]["diamonds"], 1);
        assert!(rows[0]["timestamp"].is_string());
        assert_eq!(rows[1]["playerId"], "Anonymous");
    }

    #[tokio::test]
    async fn invalid_submission_is_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = test_store(&dir);
        let app = build_router(Arc::clone(&store), None);

        let (status, _) = send(app, post_player(r#"{"playerId":"Ann","result":"tie"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(store.lock().await.is_empty());
    }

    #[tokio::test]
    async fn store_failure_returns_server_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = test_store(&dir);
        std::fs::create_dir_all(dir.path().join("players.json")).expect("block file path");
        let app = build_router(store, None);

        let (status, body) = send(app, post_player(r#"{"result":"win"}"#)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, b"Error saving data");
    }

    #[tokio::test]
    async fn leaderboard_and_health_respond() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = test_store(&dir);
        let app = build_router(Arc::clone(&store), None);
        for body in [
            r#"{"playerId":"Ann","result":"win","diamonds":2}"#,
            r#"{"playerId":"Bo","result":"lose"}"#,
        ] {
            let (status, _) = send(app.clone(), post_player(body)).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body) = send(app.clone(), get_request("/api/leaderboard?limit=abc")).await;
        assert_eq!(status, StatusCode::OK);
        let value: Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(value["entries"][0]["name"], "Ann");
        assert_eq!(value["entries"][0]["bestDiamonds"], 2);
        assert_eq!(value["entries"].as_array().map(Vec::len), Some(2));

        let (status, body) = send(app, get_request("/healthz")).await;
        assert_eq!(status, StatusCode::OK);
        let value: Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(value["ok"], true);
    }

    #[tokio::test]
    async fn static_root_serves_index_fallback() {
        let dir = tempfile::tempdir().expect("temp dir");
        let public = dir.path().join("Public");
        std::fs::create_dir_all(&public).expect("public dir");
        std::fs::write(public.join("index.html"), "<h1>chase</h1>").expect("write index");
        let app = build_router(test_store(&dir), Some(public));

        let (status, body) = send(app, get_request("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"<h1>chase</h1>");
    }
}
