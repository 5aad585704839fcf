// Copyright 2022 Webb Technologies Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use fusion_relayer_context::RelayerContext;

/// Module for starting the FusionLinker relay pipeline.
pub mod evm;


/// Routes of the relayer's HTTP API, mounted under `/api/v1`.
pub fn build_router(ctx: RelayerContext) -> Router {
    let api = Router::new().route("/metrics", get(handle_metric_info));
    let cors = CorsLayer::new().allow_origin(Any);
    Router::new()
        .nest("/api/v1", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(ctx))
}

/// Sets up the web socket server for the relayer, routing (endpoint queries / requests mapped to
/// handled code) and serves the metrics of the relayer until the task is aborted.
pub async fn build_web_services(
    ctx: RelayerContext,
) -> crate::Result<()> {
    let socket_addr = SocketAddr::new([0, 0, 0, 0].into(), ctx.config.port);
    let app = build_router(ctx);
    tracing::info!("Starting the server on {}", socket_addr);
    axum::Server::bind(&socket_addr)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

/// Starts all background services of the relayer.
///
/// Returns the handle of the relay pipeline: the task completes when the relayer shuts down,
/// or earlier with an error if the event watcher could not keep up with the chain.
pub async fn ignite(
    ctx: &RelayerContext,
) -> crate::Result<JoinHandle<crate::Result<()>>> {
    evm::start_linker_relay(ctx).await
}

/// Handles the `GET /api/v1/metrics` request, in the Prometheus text format.
async fn handle_metric_info(
    State(ctx): State<Arc<RelayerContext>>,
) -> impl IntoResponse {
    match ctx.metrics.gather_metrics() {
        Ok(metrics) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            metrics,
        ),
        Err(e) => {
            tracing::error!(%e, "Failed to gather metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain")],
                e.to_string(),
            )
        }
    }
}
