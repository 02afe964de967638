use crate::core::FieldId;
use indexmap::IndexMap;

/// Per-field invalid marks surfaced to the view layer. One entry per
/// field; re-validating overwrites the entry.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidationState {
    entries: IndexMap<FieldId, String>,
}

impl ValidationState {
    pub fn set_error(&mut self, id: impl Into<FieldId>, error: impl Into<String>) {
        self.entries.insert(id.into(), error.into());
    }

    pub fn clear_error(&mut self, id: &str) {
        self.entries.shift_remove(id);
    }

    pub fn clear_all(&mut self) {
        self.entries.clear();
    }

    pub fn error(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    pub fn is_invalid(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(id, error)| (id.as_str(), error.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
