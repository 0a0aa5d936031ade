//! HTTP client for the optimization service
//!
//! Endpoints:
//! - `GET  /api/all-stops?dbName=`
//! - `GET  /api/optimize-route?timeLimit=&capacity=&serviceTime=&dbName=`
//! - `POST /api/re-optimize`
//! - `POST /api/apply-edits`

use async_trait::async_trait;
use reqwest::{Client, Response};
use tracing::{debug, info};

use super::{ensure_overrides, into_solution, OptimizationService};
use crate::defaults::DEFAULT_OPTIMIZER_TIMEOUT_SECONDS;
use crate::types::{
    EditorError, LockEntry, ModificationRequest, OptimizeParams, Solution, SolutionResponse, Stop,
};

/// Optimizer client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizerConfig {
    /// Base URL of the optimizer (e.g., "http://localhost:8080")
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_seconds: DEFAULT_OPTIMIZER_TIMEOUT_SECONDS,
        }
    }
}

impl OptimizerConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }
}

pub struct HttpOptimizationClient {
    client: Client,
    config: OptimizerConfig,
}

impl HttpOptimizationClient {
    pub fn new(config: OptimizerConfig) -> Result<Self, EditorError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { client, config })
    }

    fn all_stops_url(&self, db_name: &str) -> String {
        format!(
            "{}/api/all-stops?dbName={}",
            self.config.base_url,
            urlencoding::encode(db_name)
        )
    }

    fn optimize_url(&self, params: &OptimizeParams) -> String {
        format!(
            "{}/api/optimize-route?timeLimit={}&capacity={}&serviceTime={}&dbName={}",
            self.config.base_url,
            params.time_limit,
            params.capacity,
            params.service_time,
            urlencoding::encode(&params.db_name)
        )
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    async fn post_modifications(
        &self,
        path: &str,
        overrides: &[LockEntry],
        params: &OptimizeParams,
    ) -> Result<Response, EditorError> {
        ensure_overrides(overrides)?;
        let body = ModificationRequest::new(overrides.to_vec(), params);
        let response = self.client.post(self.endpoint(path)).json(&body).send().await?;
        check_status(response).await
    }

    async fn read_solution(response: Response) -> Result<Solution, EditorError> {
        let body: SolutionResponse = response
            .json()
            .await
            .map_err(|e| EditorError::Transport(format!("Failed to parse optimizer response: {}", e)))?;
        into_solution(body)
    }
}

/// Map a non-2xx status to a transport error carrying the response body
async fn check_status(response: Response) -> Result<Response, EditorError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(EditorError::Transport(format!("Optimizer returned error {}: {}", status, body)))
}

#[async_trait]
impl OptimizationService for HttpOptimizationClient {
    async fn fetch_all_stops(&self, db_name: &str) -> Result<Vec<Stop>, EditorError> {
        let url = self.all_stops_url(db_name);
        debug!("Fetching stops from {}", url);

        let response = check_status(self.client.get(&url).send().await?).await?;
        let stops: Vec<Stop> = response
            .json()
            .await
            .map_err(|e| EditorError::Transport(format!("Failed to parse stop list: {}", e)))?;

        info!("Loaded {} stops from '{}'", stops.len(), db_name);
        Ok(stops)
    }

    async fn request_optimize(&self, params: &OptimizeParams) -> Result<Solution, EditorError> {
        let url = self.optimize_url(params);
        debug!("Requesting optimization: {}", url);

        let response = check_status(self.client.get(&url).send().await?).await?;
        Self::read_solution(response).await
    }

    async fn request_reoptimize(
        &self,
        overrides: &[LockEntry],
        params: &OptimizeParams,
    ) -> Result<Solution, EditorError> {
        debug!("Requesting re-optimization with {} locked routes", overrides.len());
        let response = self.post_modifications("/api/re-optimize", overrides, params).await?;
        Self::read_solution(response).await
    }

    async fn submit_edits(
        &self,
        overrides: &[LockEntry],
        params: &OptimizeParams,
    ) -> Result<String, EditorError> {
        debug!("Submitting {} edited routes for validation", overrides.len());
        let response = self.post_modifications("/api/apply-edits", overrides, params).await?;
        Ok(response.text().await?)
    }

    fn name(&self) -> &str {
        "HttpOptimizer"
    }
}
