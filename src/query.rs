use crate::core::{FieldKind, FormModel};
use indexmap::IndexMap;

pub const STEP_PARAM: &str = "step";

/// Decoded URL query parameters. The first occurrence of a name wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: IndexMap<String, String>,
}

impl QueryParams {
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut params = IndexMap::new();
        for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
            params
                .entry(name.into_owned())
                .or_insert_with(|| value.into_owned());
        }
        Self { params }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// The zero-based step requested by the 1-indexed `step` parameter.
    pub fn step_index(&self) -> Option<usize> {
        let step: i64 = self.get(STEP_PARAM)?.trim().parse().ok()?;
        usize::try_from(step.checked_sub(1)?).ok()
    }

    /// Writes parameter values into fields that declare a source
    /// parameter. Returns the ids of the fields that changed.
    pub fn prefill(&self, form: &mut FormModel) -> Vec<String> {
        let targets: Vec<(String, FieldKind, String, String)> = form
            .fields()
            .filter_map(|field| {
                let value = self.get(field.param.as_deref()?)?;
                if value.is_empty() {
                    return None;
                }
                Some((
                    field.id.clone(),
                    field.kind,
                    field.value.clone(),
                    value.to_string(),
                ))
            })
            .collect();

        let mut changed = Vec::new();
        for (id, kind, own_value, param_value) in targets {
            let applied = match kind {
                FieldKind::Checkbox => {
                    form.set_checked(&id, param_value.to_lowercase() == "true")
                }
                FieldKind::Radio if own_value == param_value => form.set_checked(&id, true),
                FieldKind::Radio => continue,
                _ => form.set_value(&id, param_value),
            };
            match applied {
                Ok(_) => changed.push(id),
                Err(err) => tracing::debug!(field = %id, error = %err, "prefill skipped"),
            }
        }
        changed
    }
}
