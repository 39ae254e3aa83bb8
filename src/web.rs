//! HTTP front-end: one page plus a JSON refresh endpoint.
//!
//! Every update request carries the caller's complete [`ControlState`], so
//! concurrent sessions never share mutable state. The only shared value is
//! the read-only [`DashboardContext`].

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use axum::Router;
use axum::extract::{Json, State};
use axum::response::Html;
use axum::routing::{get, post};
use log::{debug, info};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::task::JoinSet;

use crate::refresh::{ControlOptions, ControlState, Dashboard, DashboardContext, refresh};

const INDEX_HTML: &str = include_str!("../assets/index.html");

type SharedContext = Arc<DashboardContext>;

pub fn router(ctx: SharedContext) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/options", get(options))
        .route("/api/update", post(update))
        .with_state(ctx)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

#[derive(Debug, Serialize)]
pub struct OptionsResponse {
    pub source: String,
    pub options: ControlOptions,
    pub initial: ControlState,
}

async fn options(State(ctx): State<SharedContext>) -> Json<OptionsResponse> {
    Json(OptionsResponse {
        source: ctx.source.clone(),
        options: ctx.options.clone(),
        initial: ControlState::initial(&ctx),
    })
}

async fn update(
    State(ctx): State<SharedContext>,
    Json(state): Json<ControlState>,
) -> Json<Dashboard> {
    Json(refresh(&state, &ctx))
}

/// Bind every address up front so a bad address fails startup.
pub async fn bind_all(addrs: &[SocketAddr]) -> Result<Vec<TcpListener>> {
    if addrs.is_empty() {
        bail!("no bind address configured");
    }
    let mut listeners = Vec::with_capacity(addrs.len());
    for addr in addrs {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("binding {addr}"))?;
        listeners.push(listener);
    }
    Ok(listeners)
}

/// Serve the dashboard on every listener until one of them fails.
pub async fn serve_listeners(ctx: SharedContext, listeners: Vec<TcpListener>) -> Result<()> {
    let app = router(ctx);
    let mut servers = JoinSet::new();
    for listener in listeners {
        info!("Listening on http://{}", listener.local_addr()?);
        let app = app.clone();
        servers.spawn(async move { axum::serve(listener, app).await });
    }
    while let Some(result) = servers.join_next().await {
        result.context("server task panicked")?.context("server error")?;
        debug!("listener stopped");
    }
    Ok(())
}

pub async fn serve(ctx: SharedContext, addrs: &[SocketAddr]) -> Result<()> {
    let listeners = bind_all(addrs).await?;
    serve_listeners(ctx, listeners).await
}
