//! Cluster checks.
//!
//! [`Monitor`] exposes one method per check. [`CheckEs`] implements it on top
//! of an [`ElasticsearchClient`]: each method issues a single GET, maps a 404
//! to an UNKNOWN verdict and hands the decoded body to the pure evaluation
//! function of its module.

pub mod ilm;
pub mod indice;
pub mod slm;
pub mod transform;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::client::ElasticsearchClient;
use crate::config::ConnectionSettings;
use crate::error::CheckError;
use crate::models::OperationModeResponse;
use crate::monitoring::{Monitoring, Status};

/// Checks that can be run against a cluster.
#[async_trait]
pub trait Monitor: Send + Sync {
    /// Check that no ILM policy failed on `indice` (`_all` for every index),
    /// ignoring the indices in `exclude`.
    async fn check_ilm_error(&self, indice: &str, exclude: &[String])
        -> Result<Monitoring, CheckError>;

    /// Check that the ILM service is running.
    async fn check_ilm_status(&self) -> Result<Monitoring, CheckError>;

    /// Check the state of every snapshot stored in `repository`.
    async fn check_slm_error(&self, repository: &str) -> Result<Monitoring, CheckError>;

    /// Check that the SLM service is running.
    async fn check_slm_status(&self) -> Result<Monitoring, CheckError>;

    /// Check that SLM `policy` (every policy when empty) did not fail on its
    /// last execution.
    async fn check_slm_policy(&self, policy: &str) -> Result<Monitoring, CheckError>;

    /// Check that no index matching `indice` is locked by the disk flood stage.
    async fn check_indice_locked(&self, indice: &str) -> Result<Monitoring, CheckError>;

    /// Check that transform `name` (every transform when empty) is not failed,
    /// ignoring the ids in `exclude`.
    async fn check_transform_error(
        &self,
        name: &str,
        exclude: &[String],
    ) -> Result<Monitoring, CheckError>;
}

/// Outcome of a check endpoint call.
pub(crate) enum Fetched<T> {
    /// 2xx with a decoded body.
    Found(T),
    /// The endpoint answered 404.
    NotFound,
}

/// [`Monitor`] implementation bound to one cluster.
#[derive(Clone)]
pub struct CheckEs {
    client: ElasticsearchClient,
}

impl CheckEs {
    /// Wrap an existing client.
    #[must_use]
    pub fn new(client: ElasticsearchClient) -> Self {
        Self { client }
    }

    /// Connect on the cluster and validate it answers.
    ///
    /// # Errors
    /// Returns error if the settings are invalid or the liveness probe fails.
    pub async fn connect(settings: &ConnectionSettings) -> Result<Self, CheckError> {
        Ok(Self::new(ElasticsearchClient::connect(settings).await?))
    }

    /// GET `path` and decode the body as `T`.
    ///
    /// `operation` and `target` describe the call in errors and logs.
    pub(crate) async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        operation: &'static str,
        target: &str,
    ) -> Result<Fetched<T>, CheckError> {
        let response = self.client.get(path, query).await?;

        if response.status == StatusCode::NOT_FOUND {
            debug!(operation, target = %target, "Resource not found");
            return Ok(Fetched::NotFound);
        }
        if !response.status.is_success() {
            return Err(CheckError::Remote {
                operation,
                target: target.to_string(),
                status: response.status.as_u16(),
                body: response.body,
            });
        }

        debug!(operation, target = %target, body = %response.body, "Got response successfully");
        serde_json::from_str(&response.body)
            .map(Fetched::Found)
            .map_err(|e| {
                warn!(error = %e, body = %response.body, "Failed to parse response");
                CheckError::Serialization(e)
            })
    }

    async fn check_operation_mode(
        &self,
        path: &str,
        service: &'static str,
        label: &str,
    ) -> Result<Monitoring, CheckError> {
        match self
            .fetch::<OperationModeResponse>(path, &[], "get status of", service)
            .await?
        {
            Fetched::NotFound => Ok(Monitoring::unknown(format!("{service} status not found"))),
            Fetched::Found(response) => Ok(evaluate_operation_mode(label, &response.operation_mode)),
        }
    }
}

/// Verdict of a lifecycle service status: OK only when `RUNNING`.
#[must_use]
pub fn evaluate_operation_mode(label: &str, operation_mode: &str) -> Monitoring {
    let mut monitoring = Monitoring::new();
    if operation_mode == "RUNNING" {
        monitoring.add_message(format!("{label} is running"));
    } else {
        monitoring.escalate(Status::Critical);
        monitoring.add_message(format!("{label} is not running: {operation_mode}"));
    }
    monitoring
}

#[async_trait]
impl Monitor for CheckEs {
    async fn check_ilm_error(
        &self,
        indice: &str,
        exclude: &[String],
    ) -> Result<Monitoring, CheckError> {
        ilm::check_error(self, indice, exclude).await
    }

    async fn check_ilm_status(&self) -> Result<Monitoring, CheckError> {
        self.check_operation_mode("/_ilm/status", "ILM", "ILM").await
    }

    async fn check_slm_error(&self, repository: &str) -> Result<Monitoring, CheckError> {
        slm::check_repository(self, repository).await
    }

    async fn check_slm_status(&self) -> Result<Monitoring, CheckError> {
        self.check_operation_mode("/_slm/status", "SLM", "SLM service")
            .await
    }

    async fn check_slm_policy(&self, policy: &str) -> Result<Monitoring, CheckError> {
        slm::check_policy(self, policy).await
    }

    async fn check_indice_locked(&self, indice: &str) -> Result<Monitoring, CheckError> {
        indice::check_locked(self, indice).await
    }

    async fn check_transform_error(
        &self,
        name: &str,
        exclude: &[String],
    ) -> Result<Monitoring, CheckError> {
        transform::check_error(self, name, exclude).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_is_ok() {
        let monitoring = evaluate_operation_mode("ILM", "RUNNING");
        assert_eq!(monitoring.status(), Status::Ok);
        assert_eq!(monitoring.messages(), ["ILM is running"]);
    }

    #[test]
    fn test_stopped_is_critical() {
        let monitoring = evaluate_operation_mode("SLM service", "STOPPED");
        assert_eq!(monitoring.status(), Status::Critical);
        assert!(monitoring.messages()[0].contains("STOPPED"));
    }

    #[test]
    fn test_stopping_is_critical() {
        let monitoring = evaluate_operation_mode("ILM", "STOPPING");
        assert_eq!(monitoring.status(), Status::Critical);
    }
}
