//! Snapshot repository and SLM policy checks.

use std::fmt::Write as _;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;

use super::{CheckEs, Fetched};
use crate::error::CheckError;
use crate::models::{SlmPoliciesResponse, SnapshotsResponse};
use crate::monitoring::{Monitoring, Status};

pub(crate) async fn check_repository(
    es: &CheckEs,
    repository: &str,
) -> Result<Monitoring, CheckError> {
    if repository.is_empty() {
        return Err(CheckError::Validation(
            "SnapshotRepositoryName can't be empty".to_string(),
        ));
    }
    debug!(repository = %repository, "Checking snapshots");

    let path = format!("/_snapshot/{repository}/_all");
    match es
        .fetch::<SnapshotsResponse>(&path, &[], "get snapshots on repository", repository)
        .await?
    {
        Fetched::NotFound => Ok(Monitoring::unknown(format!(
            "Repository {repository} not found"
        ))),
        Fetched::Found(response) => Ok(evaluate_snapshots(repository, &response)),
    }
}

pub(crate) async fn check_policy(es: &CheckEs, policy: &str) -> Result<Monitoring, CheckError> {
    debug!(policy = %policy, "Checking SLM policies");

    let path = if policy.is_empty() {
        "/_slm/policy".to_string()
    } else {
        format!("/_slm/policy/{policy}")
    };
    match es
        .fetch::<SlmPoliciesResponse>(&path, &[], "get SLM policy", policy)
        .await?
    {
        Fetched::NotFound => Ok(Monitoring::unknown(format!("Policy {policy} not found"))),
        Fetched::Found(response) => Ok(evaluate_policies(&response)),
    }
}

fn format_time(time: Option<&DateTime<Utc>>) -> String {
    time.map_or_else(
        || "-".to_string(),
        |t| t.to_rfc3339_opts(SecondsFormat::Secs, true),
    )
}

/// Verdict over the snapshots of a repository.
#[must_use]
pub fn evaluate_snapshots(repository: &str, response: &SnapshotsResponse) -> Monitoring {
    let mut monitoring = Monitoring::new();

    let total = response.snapshots.len();
    if total == 0 {
        monitoring.add_message(format!("No snapshot on repository {repository}"));
        monitoring.add_perfdata("NbSnapshot", 0, "");
        monitoring.add_perfdata("NbSnapshotFailed", 0, "");
        return monitoring;
    }

    let failed: Vec<_> = response.snapshots.iter().filter(|s| s.is_failed()).collect();
    if failed.is_empty() {
        monitoring.add_message(format!("All snapshots are ok ({total}/{total})"));
    } else {
        monitoring.escalate(Status::Critical);
        monitoring.add_message(format!(
            "Some snapshots failed ({}/{total})",
            total - failed.len()
        ));
        for snapshot in &failed {
            let mut message = format!(
                "Snapshot {} failed ({} - {}) with status {}:",
                snapshot.snapshot,
                format_time(snapshot.start_time.as_ref()),
                format_time(snapshot.end_time.as_ref()),
                snapshot.state
            );
            for failure in &snapshot.failures {
                let _ = write!(
                    message,
                    "\n\tIndice {} on node {} failed with status {}: {}",
                    failure.index, failure.node_id, failure.status, failure.reason
                );
            }
            monitoring.add_message(message);
        }
    }

    monitoring.add_perfdata("NbSnapshot", total, "");
    monitoring.add_perfdata("NbSnapshotFailed", failed.len(), "");
    monitoring
}

/// Verdict over SLM policies. Policies are reported in name order.
#[must_use]
pub fn evaluate_policies(response: &SlmPoliciesResponse) -> Monitoring {
    let mut monitoring = Monitoring::new();

    let total = response.len();
    if total == 0 {
        monitoring.add_message("No SLM policy");
        monitoring.add_perfdata("NbSLMPolicy", 0, "");
        monitoring.add_perfdata("NbSLMPolicyFailed", 0, "");
        return monitoring;
    }

    let failed: Vec<_> = response
        .iter()
        .filter_map(|(name, policy)| policy.current_failure().map(|failure| (name, failure)))
        .collect();

    if failed.is_empty() {
        monitoring.add_message(format!("All SLM policies are ok ({total}/{total})"));
    } else {
        monitoring.escalate(Status::Critical);
        monitoring.add_message(format!(
            "Some SLM policies failed ({}/{total})",
            total - failed.len()
        ));
        for (name, failure) in &failed {
            monitoring.add_message(format!(
                "SLM policy {name} failed on snapshot {} at {}: {}",
                failure.snapshot_name,
                format_time(Some(&failure.time)),
                failure.details
            ));
        }
    }

    monitoring.add_perfdata("NbSLMPolicy", total, "");
    monitoring.add_perfdata("NbSLMPolicyFailed", failed.len(), "");
    monitoring
}
