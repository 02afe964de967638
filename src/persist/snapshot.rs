use crate::core::FormModel;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Bumped whenever the snapshot shape changes. Snapshots carrying any
/// other version (or none) are discarded on restore.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("corrupt snapshot: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("unsupported snapshot version {0:?}")]
    UnsupportedVersion(Option<u32>),
}

/// The single persisted record of a form's in-progress values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSnapshot {
    pub timestamp: u64,
    pub data: IndexMap<String, String>,
    #[serde(deserialize_with = "step_from_number_or_text")]
    pub current_step: usize,
    #[serde(default)]
    pub version: Option<u32>,
}

impl PersistedSnapshot {
    pub fn new(timestamp: u64, current_step: usize, data: IndexMap<String, String>) -> Self {
        Self {
            timestamp,
            data,
            current_step,
            version: Some(SNAPSHOT_VERSION),
        }
    }

    /// Collects persistable values by field name. Password, file and
    /// submit fields are skipped, as are unchecked checkboxes and radios.
    pub fn collect(form: &FormModel, current_step: usize, timestamp: u64) -> Self {
        let mut data = IndexMap::new();
        for field in form.fields() {
            let Some(name) = field.name() else {
                continue;
            };
            if !field.kind.is_persistable() || (field.kind.is_checkable() && !field.checked) {
                continue;
            }
            data.insert(name.to_string(), field.value.clone());
        }
        Self::new(timestamp, current_step, data)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(text)?;
        if snapshot.version != Some(SNAPSHOT_VERSION) {
            return Err(SnapshotError::UnsupportedVersion(snapshot.version));
        }
        Ok(snapshot)
    }

    /// Hard cutoff: anything older than `max_age_ms` is stale.
    pub fn is_stale(&self, now_ms: u64, max_age_ms: u64) -> bool {
        now_ms.saturating_sub(self.timestamp) > max_age_ms
    }
}

fn step_from_number_or_text<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StepRepr {
        Number(usize),
        Text(String),
    }

    match StepRepr::deserialize(deserializer)? {
        StepRepr::Number(step) => Ok(step),
        StepRepr::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}
