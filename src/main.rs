mod config;
mod content_loader;
mod expand;
mod highlight;
mod hot_reload;
mod markdown;
mod models;
mod render;
mod repository;
mod routes;
mod state;

use std::{net::SocketAddr, path::Path, sync::Arc};

use axum::{
    routing::{get, get_service},
    Router,
};
use tokio::{
    net::TcpListener,
    sync::{broadcast, RwLock},
};
use tower_http::services::{ServeDir, ServeFile};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::SiteConfig;
use crate::highlight::Highlighter;
use crate::state::{AppState, RouterState};

#[tokio::main]
async fn main() {
    let is_development = std::env::var("RUST_ENV")
        .map(|v| v == "development")
        .unwrap_or(false);

    // logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SiteConfig::load("blog.toml").expect("Failed to load blog.toml");

    // Load initial content
    let content = content_loader::load_content(&config)
        .await
        .expect("Failed to load initial content files");

    let static_dir = Path::new(&config.content.dir).join("static");
    let favicon = static_dir.join("favicon.ico");

    let state = Arc::new(AppState {
        layout_html: RwLock::new(content.layout_html),
        not_found_html: RwLock::new(content.not_found_html),
        articles: RwLock::new(content.articles),
        highlighter: Arc::new(Highlighter::new()),
        config,
        is_development,
    });

    // Hot-reload setup
    let (tx, _rx) = broadcast::channel(1);
    if is_development {
        info!("Hot reload enabled. Check logs for file change events.");
        hot_reload::start_content_watcher(tx.clone(), state.clone());
    }

    let router_state = RouterState {
        app_state: state.clone(),
        broadcaster: tx,
    };

    let app = Router::new()
        .route("/", get(routes::collection))
        .route("/articles/{slug}", get(routes::article_detail))
        .nest_service("/static", get_service(ServeDir::new(static_dir)))
        .route_service("/favicon.ico", get_service(ServeFile::new(favicon)))
        .route("/ws", get(hot_reload::ws_handler))
        .with_state(router_state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(state.config.server.port);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!(%addr, "listening");
    let listener = TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
