use crate::validation::Messages;
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const DEFAULT_STORAGE_KEY_PREFIX: &str = "wf-form-";
pub const DEFAULT_AUTOSAVE_INTERVAL_MS: u64 = 30_000;
pub const DEFAULT_INPUT_DEBOUNCE_MS: u64 = 1_000;
pub const DEFAULT_MAX_SNAPSHOT_AGE_MS: u64 = 24 * 60 * 60 * 1_000;

pub const ATTR_MEMORY: &str = "data-form-memory";
pub const ATTR_KEYBOARD_NAV: &str = "data-keyboard-nav";
pub const ATTR_AUTO_SCROLL: &str = "data-auto-scroll";
pub const ATTR_PREFILL: &str = "data-form-prefill";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FormConfig {
    pub persistence: bool,
    pub keyboard_navigation: bool,
    pub auto_scroll: bool,
    pub prefill: bool,
    /// Treat an uncompilable `pattern` rule as passing.
    pub regex_fail_open: bool,
    pub storage_key_prefix: String,
    pub autosave_interval_ms: u64,
    pub input_debounce_ms: u64,
    pub max_snapshot_age_ms: u64,
    pub messages: Messages,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            persistence: true,
            keyboard_navigation: false,
            auto_scroll: true,
            prefill: false,
            regex_fail_open: true,
            storage_key_prefix: DEFAULT_STORAGE_KEY_PREFIX.to_string(),
            autosave_interval_ms: DEFAULT_AUTOSAVE_INTERVAL_MS,
            input_debounce_ms: DEFAULT_INPUT_DEBOUNCE_MS,
            max_snapshot_age_ms: DEFAULT_MAX_SNAPSHOT_AGE_MS,
            messages: Messages::default(),
        }
    }
}

impl FormConfig {
    /// Reads the boolean flags from container attributes. Memory and
    /// auto-scroll are opt-out, keyboard navigation is opt-in, prefill is
    /// enabled by the attribute's presence.
    pub fn from_attributes(attributes: &IndexMap<String, String>) -> Self {
        let attr = |name: &str| attributes.get(name).map(String::as_str);
        Self {
            persistence: attr(ATTR_MEMORY) != Some("false"),
            keyboard_navigation: attr(ATTR_KEYBOARD_NAV) == Some("true"),
            auto_scroll: attr(ATTR_AUTO_SCROLL) != Some("false"),
            prefill: attr(ATTR_PREFILL).is_some(),
            ..Self::default()
        }
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    pub fn storage_key(&self, form_id: &str) -> String {
        format!("{}{}", self.storage_key_prefix, form_id)
    }
}
