//! HTTP adapter for the external route-optimization service.
//!
//! The service is optional and best-effort: any transport, status, or
//! protocol failure is reported as [`ExternalSolverError`] and the caller
//! falls back to the local heuristic.

use serde::{Deserialize, Serialize};

use crate::stop::ClockTime;

/// Pluggable external solver strategy.
pub trait ExternalSolver {
    fn solve(&self, request: &SolveRequest) -> Result<SolveResponse, ExternalSolverError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ExternalSolverError {
    #[error("solver request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("solver rejected the request: {0}")]
    Rejected(String),
    #[error("solver response is unusable: {0}")]
    MalformedResponse(String),
}

/// A location as the solver service sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverLocation {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SolveRequest {
    pub locations: Vec<SolverLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_location: Option<SolverLocation>,
    pub start_time: ClockTime,
    pub average_speed_kmh: f64,
    pub service_time_minutes: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SolveResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub optimized_stops: Option<Vec<SolvedStop>>,
    #[serde(default)]
    pub total_distance_km: Option<f64>,
    #[serde(default)]
    pub total_time_minutes: Option<f64>,
}

/// One entry of the solver's ordered result.
///
/// Only `id` and `sequence_order` drive adoption; the annotations are
/// recomputed locally so both strategies report consistent numbers.
#[derive(Debug, Clone, Deserialize)]
pub struct SolvedStop {
    pub id: String,
    pub sequence_order: usize,
    #[serde(default)]
    pub arrival_time: Option<String>,
    #[serde(default)]
    pub cumulative_distance_km: Option<f64>,
    #[serde(default)]
    pub cumulative_time_minutes: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct SolverApiConfig {
    pub base_url: String,
    pub route: String,
    pub timeout_secs: u64,
}

impl Default for SolverApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            route: "/api/optimize/route".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Blocking HTTP client for the solver service.
#[derive(Debug, Clone)]
pub struct HttpSolverClient {
    config: SolverApiConfig,
    client: reqwest::blocking::Client,
}

impl HttpSolverClient {
    pub fn new(config: SolverApiConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }
}

impl ExternalSolver for HttpSolverClient {
    fn solve(&self, request: &SolveRequest) -> Result<SolveResponse, ExternalSolverError> {
        let url = format!("{}{}", self.config.base_url, self.config.route);

        let response = self
            .client
            .post(url)
            .json(request)
            .send()?
            .error_for_status()?
            .json::<SolveResponse>()?;

        Ok(response)
    }
}
