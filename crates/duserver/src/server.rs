use axum::middleware;
use axum::routing::get;
use axum::Router;
use duindex::InfoProvider;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};

use crate::config::AuthConfig;

pub mod auth;
pub mod info;

pub struct Server {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl Server {
    /// Binds `bind` (port 0 picks a free port) and serves in a background task.
    pub async fn start(
        bind: &str,
        provider: Arc<dyn InfoProvider>,
        auth: Option<AuthConfig>,
    ) -> Result<Self, String> {
        let state = Arc::new(ServerState { provider });
        let app = router(state, auth);

        let listener = TcpListener::bind(bind)
            .await
            .map_err(|error| format!("failed to bind {bind}: {error}"))?;
        let addr = listener
            .local_addr()
            .map_err(|error| error.to_string())?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            if let Err(error) = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
            {
                tracing::error!("server stopped: {error}");
            }
        });
        tracing::info!("listening on http://{addr}");

        Ok(Server {
            addr,
            shutdown: Some(shutdown_tx),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn shutdown(&mut self) -> Result<(), String> {
        if let Some(sender) = self.shutdown.take() {
            sender
                .send(())
                .map_err(|_| "failed to send server shutdown signal".to_string())
        } else {
            Ok(())
        }
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

fn router(state: Arc<ServerState>, auth: Option<AuthConfig>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut api = Router::new()
        .route("/api/v1/info", get(info::get_info))
        .with_state(state);
    if let Some(auth) = auth {
        api = api.layer(middleware::from_fn_with_state(
            Arc::new(auth),
            auth::require_basic_auth,
        ));
    }

    Router::new()
        .route("/health", get(health))
        .merge(api)
        .layer(cors)
}

async fn health() -> &'static str {
    "ok"
}

pub(crate) struct ServerState {
    pub(crate) provider: Arc<dyn InfoProvider>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use duindex::{BuildOptions, MemProvider, MemProviderBuilder};
    use reqwest::StatusCode;
    use serde_json::Value;
    use std::io::Cursor;

    const REPORT: &str = "100\t2023-04-08 12:03\ta/b/x\n\
                          50\t2023-04-08 12:03\ta/b/y\n\
                          10\t2023-04-08 12:03\ta/c/z\n\
                          1\t2023-04-08 12:03\ta\n";

    fn provider() -> Arc<MemProvider> {
        let provider = MemProviderBuilder::from_reader(Cursor::new(REPORT.as_bytes().to_vec()), BuildOptions::default())
            .build()
            .expect("build");
        Arc::new(provider)
    }

    async fn start(auth: Option<AuthConfig>) -> Server {
        Server::start("127.0.0.1:0", provider(), auth).await.expect("start")
    }

    async fn get(server: &Server, query: &str) -> (StatusCode, Value) {
        let url = format!("http://{}/api/v1/info?{}", server.addr(), query);
        let response = reqwest::get(url).await.expect("request");
        let status = response.status();
        (status, response.json().await.expect("json"))
    }

    #[tokio::test]
    async fn start_binds_random_port() {
        let mut server = start(None).await;
        assert_ne!(server.addr().port(), 0);

        let body = reqwest::get(format!("http://{}/health", server.addr()))
            .await
            .expect("request")
            .text()
            .await
            .expect("body");
        assert_eq!(body, "ok");
        server.shutdown().expect("shutdown");
    }

    #[tokio::test]
    async fn info_returns_filtered_tree() {
        let server = start(None).await;
        let (status, body) = get(&server, "pathName=a&deep=1&maxItems=1&longTailPercent=1").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sizeKb"], 161);
        assert_eq!(body["percentOfParent"], 10000);
        let children = body["children"].as_array().expect("children");
        assert_eq!(children.len(), 2);
        assert_eq!(children[0]["name"], "b");
        assert_eq!(children[0]["sizeKb"], 150);
        assert_eq!(children[1]["name"], "Others");
        assert_eq!(children[1]["sizeKb"], 11);
        assert_eq!(children[1]["percentOfParent"], 683);
    }

    #[tokio::test]
    async fn omitted_parameters_use_default_query() {
        let server = start(None).await;
        let (status, body) = get(&server, "pathName=a/b").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["path"], "a/b");
        assert_eq!(body["sizeKb"], 150);
        assert_eq!(body["children"].as_array().map(Vec::len), Some(0));
    }

    #[tokio::test]
    async fn depth_alone_lists_every_child() {
        let server = start(None).await;
        let (status, body) = get(&server, "pathName=a&deep=2").await;

        assert_eq!(status, StatusCode::OK);
        let children = body["children"].as_array().expect("children");
        let names: Vec<_> = children.iter().map(|c| c["name"].as_str()).collect();
        assert_eq!(names, vec![Some("b"), Some("c")]);
        assert_eq!(children[0]["children"].as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn missing_path_is_404() {
        let server = start(None).await;
        let (status, body) = get(&server, "pathName=a/nope").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"]["code"], "not_found");
    }

    #[tokio::test]
    async fn invalid_percent_is_400() {
        let server = start(None).await;
        for percent in ["0", "1.5"] {
            let (status, body) = get(&server, &format!("pathName=a&deep=1&longTailPercent={percent}")).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"]["code"], "bad_request");
        }

        let (status, _) = get(&server, "pathName=a&deep=minus").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn basic_auth_guards_the_api() {
        let server = start(Some(AuthConfig {
            user: "admin".to_string(),
            password: "secret".to_string(),
        }))
        .await;
        let url = format!("http://{}/api/v1/info?pathName=a", server.addr());
        let client = reqwest::Client::new();

        let response = client.get(&url).send().await.expect("request");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key("www-authenticate"));

        let response = client
            .get(&url)
            .basic_auth("admin", Some("wrong"))
            .send()
            .await
            .expect("request");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = client
            .get(&url)
            .header("authorization", format!("Basic {}", STANDARD.encode("admin:secret")))
            .send()
            .await
            .expect("request");
        assert_eq!(response.status(), StatusCode::OK);

        let health = client
            .get(format!("http://{}/health", server.addr()))
            .send()
            .await
            .expect("request");
        assert_eq!(health.status(), StatusCode::OK);
    }
}
