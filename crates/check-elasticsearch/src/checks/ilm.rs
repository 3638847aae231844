//! ILM error check.

use tracing::debug;

use super::{CheckEs, Fetched};
use crate::error::CheckError;
use crate::models::IlmExplainResponse;
use crate::monitoring::{Monitoring, Status};

pub(crate) async fn check_error(
    es: &CheckEs,
    indice: &str,
    exclude: &[String],
) -> Result<Monitoring, CheckError> {
    if indice.is_empty() {
        return Err(CheckError::Validation("IndiceName can't be empty".to_string()));
    }
    debug!(indice = %indice, exclude = ?exclude, "Checking ILM errors");

    let path = format!("/{indice}/_ilm/explain");
    let query = [("only_errors", "true"), ("only_managed", "true")];
    match es
        .fetch::<IlmExplainResponse>(&path, &query, "get ILM explain on indice", indice)
        .await?
    {
        Fetched::NotFound => Ok(Monitoring::unknown(format!("Indice {indice} not found"))),
        Fetched::Found(response) => Ok(evaluate_explain(indice, response, exclude)),
    }
}

/// Verdict over the failed ILM explain entries, once `exclude` is removed.
#[must_use]
pub fn evaluate_explain(
    indice: &str,
    response: IlmExplainResponse,
    exclude: &[String],
) -> Monitoring {
    let mut monitoring = Monitoring::new();

    let failed: Vec<_> = response
        .indices
        .into_iter()
        .filter(|(name, _)| {
            let excluded = exclude.contains(name);
            if excluded {
                debug!(indice = %name, "Indice is excluded");
            }
            !excluded
        })
        .collect();

    monitoring.add_perfdata("NbIndiceFailed", failed.len(), "");
    if failed.is_empty() {
        monitoring.add_message(format!("No error found on indice {indice}"));
        return monitoring;
    }

    monitoring.escalate(Status::Critical);
    monitoring.add_message(format!("There are {} indices failed", failed.len()));
    for (name, explain) in &failed {
        let reason = explain
            .step_info
            .as_ref()
            .map_or("", |step| step.reason.as_str());
        monitoring.add_message(format!("Indice {name} ({}): {reason}", explain.policy));
    }

    monitoring
}
