//! Elasticsearch administrative API response models.
//!
//! Only the fields the checks read are modelled; everything else in the
//! responses is ignored.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

// ============================================================================
// ILM
// ============================================================================

/// Response of `GET /{index}/_ilm/explain`.
#[derive(Debug, Default, Deserialize)]
pub struct IlmExplainResponse {
    /// Explain entries keyed by index name.
    #[serde(default)]
    pub indices: BTreeMap<String, IlmExplain>,
}

/// Lifecycle state of one index.
#[derive(Debug, Clone, Deserialize)]
pub struct IlmExplain {
    /// Index name.
    #[serde(default)]
    pub index: String,
    /// Policy managing the index.
    #[serde(default)]
    pub policy: String,
    /// Details of the current step, present when the step failed.
    pub step_info: Option<StepInfo>,
}

/// Step details of an ILM explain entry.
#[derive(Debug, Clone, Deserialize)]
pub struct StepInfo {
    /// Error type.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Error reason.
    #[serde(default)]
    pub reason: String,
}

/// Response of `GET /_ilm/status` and `GET /_slm/status`.
#[derive(Debug, Deserialize)]
pub struct OperationModeResponse {
    /// `RUNNING`, `STOPPING` or `STOPPED`.
    #[serde(default)]
    pub operation_mode: String,
}

// ============================================================================
// Snapshots
// ============================================================================

/// Response of `GET /_snapshot/{repository}/_all`.
#[derive(Debug, Default, Deserialize)]
pub struct SnapshotsResponse {
    /// Snapshots, in the order returned by the cluster.
    #[serde(default)]
    pub snapshots: Vec<Snapshot>,
}

/// One snapshot of a repository.
#[derive(Debug, Clone, Deserialize)]
pub struct Snapshot {
    /// Snapshot name.
    pub snapshot: String,
    /// Snapshot state (`SUCCESS`, `IN_PROGRESS`, `PARTIAL`, `FAILED`, ...).
    #[serde(default)]
    pub state: String,
    /// Start time.
    pub start_time: Option<DateTime<Utc>>,
    /// End time, absent while running.
    pub end_time: Option<DateTime<Utc>>,
    /// Per shard failures.
    #[serde(default)]
    pub failures: Vec<SnapshotFailure>,
}

impl Snapshot {
    /// Whether the snapshot ended in a state other than success.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.state != "SUCCESS" && self.state != "IN_PROGRESS"
    }
}

/// Shard failure of a snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotFailure {
    /// Node holding the shard.
    #[serde(default)]
    pub node_id: String,
    /// Index name.
    #[serde(default)]
    pub index: String,
    /// Failure reason.
    #[serde(default)]
    pub reason: String,
    /// Failure status code name.
    #[serde(default)]
    pub status: String,
}

// ============================================================================
// SLM policies
// ============================================================================

/// Response of `GET /_slm/policy[/{id}]`, keyed by policy name.
pub type SlmPoliciesResponse = BTreeMap<String, SlmPolicy>;

/// Execution history of one SLM policy.
#[derive(Debug, Clone, Deserialize)]
pub struct SlmPolicy {
    /// Last successful execution.
    pub last_success: Option<SlmExecution>,
    /// Last failed execution.
    pub last_failure: Option<SlmExecution>,
}

impl SlmPolicy {
    /// The last failure, if it happened after the last success.
    #[must_use]
    pub fn current_failure(&self) -> Option<&SlmExecution> {
        let failure = self.last_failure.as_ref()?;
        match &self.last_success {
            Some(success) if failure.time <= success.time => None,
            _ => Some(failure),
        }
    }
}

/// One SLM policy execution.
#[derive(Debug, Clone, Deserialize)]
pub struct SlmExecution {
    /// Snapshot created (or attempted) by the execution.
    #[serde(default)]
    pub snapshot_name: String,
    /// Execution time, epoch milliseconds on the wire.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub time: DateTime<Utc>,
    /// Failure details.
    #[serde(default)]
    pub details: String,
}

// ============================================================================
// Index settings
// ============================================================================

/// Response of `GET /{index}/_settings`, keyed by index name.
pub type IndicesSettingsResponse = BTreeMap<String, IndexSettingsEnvelope>;

/// Settings wrapper of one index.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexSettingsEnvelope {
    /// Settings.
    #[serde(default)]
    pub settings: IndexSettings,
}

/// Index settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexSettings {
    /// `index.*` settings.
    #[serde(default)]
    pub index: IndexSetting,
}

/// `index.*` settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexSetting {
    /// Index blocks, absent when none are set.
    pub blocks: Option<IndexSettingBlock>,
}

/// `index.blocks.*` settings. Values are strings on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexSettingBlock {
    /// `index.blocks.read`.
    pub read: Option<String>,
    /// `index.blocks.read_only`.
    pub read_only: Option<String>,
    /// `index.blocks.read_only_allow_delete`.
    pub read_only_allow_delete: Option<String>,
    /// `index.blocks.write`.
    pub write: Option<String>,
}

impl IndexSettingsEnvelope {
    /// Whether the index carries the flood-stage `read_only_allow_delete` block.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.settings
            .index
            .blocks
            .as_ref()
            .and_then(|b| b.read_only_allow_delete.as_deref())
            == Some("true")
    }
}

// ============================================================================
// Transforms
// ============================================================================

/// Response of `GET /_transform/{id}/_stats`.
#[derive(Debug, Default, Deserialize)]
pub struct TransformStatsResponse {
    /// Total number of matching transforms, may exceed the returned page.
    #[serde(default)]
    pub count: usize,
    /// Transform stats of the returned page.
    #[serde(default)]
    pub transforms: Vec<TransformStat>,
}

/// Stats of one transform.
#[derive(Debug, Clone, Deserialize)]
pub struct TransformStat {
    /// Transform id.
    pub id: String,
    /// Transform state.
    #[serde(default)]
    pub state: String,
    /// Failure reason.
    #[serde(default)]
    pub reason: String,
}
