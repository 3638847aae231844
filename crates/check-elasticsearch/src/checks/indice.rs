//! Index lock check.
//!
//! Elasticsearch sets `index.blocks.read_only_allow_delete` on every index of
//! a node that crosses the flood-stage disk watermark. Such an index refuses
//! writes until the block is removed.

use tracing::debug;

use super::{CheckEs, Fetched};
use crate::error::CheckError;
use crate::models::IndicesSettingsResponse;
use crate::monitoring::{Monitoring, Status};

pub(crate) async fn check_locked(es: &CheckEs, indice: &str) -> Result<Monitoring, CheckError> {
    if indice.is_empty() {
        return Err(CheckError::Validation("IndiceName can't be empty".to_string()));
    }
    debug!(indice = %indice, "Checking locked indices");

    let path = format!("/{indice}/_settings");
    match es
        .fetch::<IndicesSettingsResponse>(&path, &[], "get settings of indice", indice)
        .await?
    {
        Fetched::NotFound => Ok(Monitoring::unknown(format!("Indice {indice} not found"))),
        Fetched::Found(response) => Ok(evaluate_settings(&response)),
    }
}

/// Verdict over index settings.
#[must_use]
pub fn evaluate_settings(response: &IndicesSettingsResponse) -> Monitoring {
    let mut monitoring = Monitoring::new();

    let total = response.len();
    let locked: Vec<&str> = response
        .iter()
        .filter(|(_, settings)| settings.is_locked())
        .map(|(name, _)| name.as_str())
        .collect();

    if locked.is_empty() {
        monitoring.add_message(format!("No indice locked ({total}/{total})"));
    } else {
        monitoring.escalate(Status::Critical);
        monitoring.add_message(format!(
            "There are some indice locked ({}/{total})",
            total - locked.len()
        ));
        for name in &locked {
            monitoring.add_message(format!("\tIndice {name}"));
        }
    }

    monitoring.add_perfdata("nbIndices", total, "");
    monitoring.add_perfdata("nbIndicesLocked", locked.len(), "");
    monitoring
}
