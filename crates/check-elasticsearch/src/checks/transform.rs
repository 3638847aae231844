//! Transform error check.

use tracing::{debug, warn};

use super::{CheckEs, Fetched};
use crate::error::CheckError;
use crate::models::TransformStatsResponse;
use crate::monitoring::{Monitoring, Status};

/// Transform id matching every transform.
pub const ALL_TRANSFORMS: &str = "_all";

/// Number of transform stats requested. No further page is fetched.
pub const PAGE_SIZE: usize = 1000;

fn is_wildcard(name: &str) -> bool {
    name == ALL_TRANSFORMS || name == "*"
}

pub(crate) async fn check_error(
    es: &CheckEs,
    name: &str,
    exclude: &[String],
) -> Result<Monitoring, CheckError> {
    let name = if name.is_empty() { ALL_TRANSFORMS } else { name };
    debug!(transform = %name, exclude = ?exclude, "Checking transforms");

    let path = format!("/_transform/{name}/_stats");
    let size = PAGE_SIZE.to_string();
    let query = [("size", size.as_str())];
    match es
        .fetch::<TransformStatsResponse>(&path, &query, "get transform stats", name)
        .await?
    {
        Fetched::NotFound => Ok(Monitoring::unknown(format!("Transform {name} not found"))),
        Fetched::Found(response) => Ok(evaluate_stats(name, &response, exclude)),
    }
}

/// Verdict over transform stats, once `exclude` is removed.
#[must_use]
pub fn evaluate_stats(
    name: &str,
    response: &TransformStatsResponse,
    exclude: &[String],
) -> Monitoring {
    if response.transforms.is_empty() && !is_wildcard(name) {
        return Monitoring::unknown(format!("Transform {name} not found"));
    }
    if response.count > response.transforms.len() {
        warn!(
            count = response.count,
            returned = response.transforms.len(),
            "Only the first page of transforms is checked"
        );
    }

    let mut monitoring = Monitoring::new();
    let mut started = 0;
    let mut stopped = 0;
    let mut failed = 0;

    for transform in &response.transforms {
        if exclude.contains(&transform.id) {
            debug!(transform = %transform.id, "Transform is excluded");
            continue;
        }
        match transform.state.as_str() {
            "indexing" | "started" => started += 1,
            "stopped" | "stopping" => stopped += 1,
            _ => {
                failed += 1;
                monitoring.escalate(Status::Critical);
                monitoring.add_message(format!(
                    "Transform {} {}: {}",
                    transform.id, transform.state, transform.reason
                ));
            }
        }
    }

    monitoring.add_perfdata("nbTransformFailed", failed, "");
    monitoring.add_perfdata("nbTransformStopped", stopped, "");
    monitoring.add_perfdata("nbTransformStarted", started, "");

    if monitoring.status() == Status::Ok {
        if is_wildcard(name) {
            monitoring.add_message("All transform works fine");
        } else {
            monitoring.add_message(format!("Transform {name} works fine"));
        }
    }

    monitoring
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(json: &str) -> TransformStatsResponse {
        serde_json::from_str(json).unwrap()
    }

    const MIXED: &str = r#"{"count": 4, "transforms": [
        {"id": "T1", "state": "failed", "reason": "task encountered failures"},
        {"id": "T2", "state": "started"},
        {"id": "T3", "state": "indexing"},
        {"id": "T4", "state": "stopping"}
    ]}"#;

    #[test]
    fn test_excluded_failed_transform_is_ok() {
        let response = stats(
            r#"{"count": 2, "transforms": [
                {"id": "T1", "state": "failed", "reason": "boom"},
                {"id": "T2", "state": "started"}
            ]}"#,
        );
        let monitoring = evaluate_stats(ALL_TRANSFORMS, &response, &["T1".to_string()]);

        assert_eq!(monitoring.status(), Status::Ok);
        assert_eq!(monitoring.perfdata_value("nbTransformStarted"), Some(1));
        assert_eq!(monitoring.perfdata_value("nbTransformFailed"), Some(0));
        assert_eq!(monitoring.messages(), ["All transform works fine"]);
    }

    #[test]
    fn test_failed_transform_is_critical() {
        let monitoring = evaluate_stats(ALL_TRANSFORMS, &stats(MIXED), &[]);

        assert_eq!(monitoring.status(), Status::Critical);
        assert_eq!(monitoring.perfdata_value("nbTransformFailed"), Some(1));
        assert_eq!(monitoring.perfdata_value("nbTransformStarted"), Some(2));
        assert_eq!(monitoring.perfdata_value("nbTransformStopped"), Some(1));
        assert_eq!(
            monitoring.messages(),
            ["Transform T1 failed: task encountered failures"]
        );
    }

    #[test]
    fn test_unknown_state_counts_as_failed() {
        let response = stats(r#"{"count": 1, "transforms": [{"id": "T9", "state": "aborting"}]}"#);
        let monitoring = evaluate_stats("T9", &response, &[]);
        assert_eq!(monitoring.status(), Status::Critical);
        assert_eq!(monitoring.perfdata_value("nbTransformFailed"), Some(1));
    }

    #[test]
    fn test_specific_name_without_result_is_unknown() {
        let monitoring = evaluate_stats("ghost", &stats(r#"{"count": 0, "transforms": []}"#), &[]);
        assert_eq!(monitoring.status(), Status::Unknown);
        assert!(monitoring.messages()[0].contains("ghost"));
        assert!(monitoring.messages()[0].contains("not found"));
    }

    #[test]
    fn test_wildcard_without_result_is_ok() {
        for name in [ALL_TRANSFORMS, "*"] {
            let response = stats(r#"{"count": 0, "transforms": []}"#);
            let monitoring = evaluate_stats(name, &response, &[]);
            assert_eq!(monitoring.status(), Status::Ok);
            assert_eq!(monitoring.perfdata_value("nbTransformFailed"), Some(0));
            assert_eq!(monitoring.perfdata_value("nbTransformStarted"), Some(0));
            assert_eq!(monitoring.perfdata_value("nbTransformStopped"), Some(0));
        }
    }

    #[test]
    fn test_specific_name_success_message() {
        let response = stats(r#"{"count": 1, "transforms": [{"id": "sales", "state": "started"}]}"#);
        let monitoring = evaluate_stats("sales", &response, &[]);
        assert_eq!(monitoring.messages(), ["Transform sales works fine"]);
    }

    #[test]
    fn test_truncated_page_is_still_evaluated() {
        let response = stats(r#"{"count": 2500, "transforms": [{"id": "T1", "state": "started"}]}"#);
        let monitoring = evaluate_stats(ALL_TRANSFORMS, &response, &[]);
        assert_eq!(monitoring.status(), Status::Ok);
        assert_eq!(monitoring.perfdata_value("nbTransformStarted"), Some(1));
    }
}
