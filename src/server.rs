use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use log::{error, info};
use serde::Deserialize;

use crate::config::SolverConfig;
use crate::data::{Strategy, TimetableInput, TimetableOutput};
use crate::solver;

#[derive(Debug, Deserialize)]
pub struct SolveRequest {
    pub strategy: Strategy,
    pub input: TimetableInput,
    #[serde(default)]
    pub config: SolverConfig,
}

async fn solve_handler(
    Json(request): Json<SolveRequest>,
) -> Result<Json<TimetableOutput>, (StatusCode, String)> {
    let SolveRequest {
        strategy,
        input,
        config,
    } = request;
    config
        .validate()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    // The search is CPU bound and may run for the whole time budget.
    let result = tokio::task::spawn_blocking(move || solver::solve(&input, strategy, &config))
        .await
        .map_err(|e| {
            error!("solver task failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    match result {
        Ok(output) => Ok(Json(output)),
        Err(e) => Err((StatusCode::BAD_REQUEST, e.to_string())),
    }
}

pub fn router() -> Router {
    Router::new().route("/v1/timetable/solve", post(solve_handler))
}

pub async fn run_server(addr: &str) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, router()).await
}
