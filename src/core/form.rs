use crate::config::FormConfig;
use crate::core::field::{Field, FieldId, FieldKind, SelectedFile};
use crate::core::value::RawValue;
use crate::error::FormError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepModel {
    pub title: Option<String>,
    pub fields: Vec<Field>,
}

impl StepModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }
}

/// The form container: a fixed, ordered sequence of steps.
#[derive(Debug, Clone, PartialEq)]
pub struct FormModel {
    id: String,
    steps: Vec<StepModel>,
}

impl FormModel {
    pub fn new(id: impl Into<String>, steps: Vec<StepModel>) -> Result<Self, FormError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(FormError::MissingFormId);
        }
        if steps.is_empty() {
            return Err(FormError::NoSteps);
        }

        let mut seen = HashSet::<&str>::new();
        for field in steps.iter().flat_map(|step| step.fields.iter()) {
            if !seen.insert(field.id.as_str()) {
                return Err(FormError::DuplicateField(field.id.clone()));
            }
        }

        let mut form = Self { id, steps };
        form.fields_mut().for_each(Field::capture_defaults);
        Ok(form)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn steps(&self) -> &[StepModel] {
        &self.steps
    }

    pub fn step(&self, index: usize) -> Option<&StepModel> {
        self.steps.get(index)
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.steps.iter().flat_map(|step| step.fields.iter())
    }

    fn fields_mut(&mut self) -> impl Iterator<Item = &mut Field> {
        self.steps.iter_mut().flat_map(|step| step.fields.iter_mut())
    }

    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields().find(|field| field.id == id)
    }

    fn field_mut(&mut self, id: &str) -> Result<&mut Field, FormError> {
        self.fields_mut()
            .find(|field| field.id == id)
            .ok_or_else(|| FormError::UnknownField(id.to_string()))
    }

    pub fn fields_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Field> + 'a {
        self.fields().filter(move |field| field.name() == Some(name))
    }

    pub fn set_value(&mut self, id: &str, value: impl Into<String>) -> Result<&Field, FormError> {
        let field = self.field_mut(id)?;
        field.value = value.into();
        Ok(field)
    }

    /// Checking a radio unchecks the other radios of its group.
    pub fn set_checked(&mut self, id: &str, checked: bool) -> Result<&Field, FormError> {
        let (kind, name) = {
            let field = self.field_mut(id)?;
            field.checked = checked;
            (field.kind, field.name.clone())
        };

        if kind == FieldKind::Radio
            && checked
            && let Some(name) = name
        {
            for other in self.fields_mut() {
                if other.kind == FieldKind::Radio
                    && other.id != id
                    && other.name.as_deref() == Some(name.as_str())
                {
                    other.checked = false;
                }
            }
        }

        self.field(id)
            .ok_or_else(|| FormError::UnknownField(id.to_string()))
    }

    pub fn set_files(&mut self, id: &str, files: Vec<SelectedFile>) -> Result<&Field, FormError> {
        let field = self.field_mut(id)?;
        field.files = files;
        Ok(field)
    }

    /// The value validation rules see for `field`.
    pub fn raw_value<'a>(&'a self, field: &'a Field) -> RawValue<'a> {
        match field.kind {
            FieldKind::File => RawValue::Files(&field.files),
            FieldKind::Checkbox => {
                RawValue::Text(if field.checked { field.value.as_str() } else { "" })
            }
            FieldKind::Radio => {
                let checked = match field.name() {
                    Some(name) => self
                        .fields_named(name)
                        .find(|other| other.kind == FieldKind::Radio && other.checked),
                    None => field.checked.then_some(field),
                };
                RawValue::Text(checked.map(|f| f.value.as_str()).unwrap_or(""))
            }
            _ => RawValue::Text(&field.value),
        }
    }

    /// Restores every field to its initial value and checked state.
    pub fn reset(&mut self) {
        self.fields_mut().for_each(Field::reset);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub id: FieldId,
    /// Defaults to the field id.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: FieldKind,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub checked: bool,
    #[serde(default)]
    pub validate: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub param: Option<String>,
}

impl From<FieldDefinition> for Field {
    fn from(def: FieldDefinition) -> Self {
        let name = def.name.unwrap_or_else(|| def.id.clone());
        Field {
            name: Some(name),
            value: def.value,
            checked: def.checked,
            rules: def.validate,
            error_message: def.error_message,
            param: def.param,
            ..Field::new(def.id, def.kind)
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct StepDefinition {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

/// Serialized form description, loadable from YAML or JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FormDefinition {
    pub id: String,
    #[serde(default)]
    pub config: FormConfig,
    pub steps: Vec<StepDefinition>,
}

impl FormDefinition {
    pub fn from_yaml_str(text: &str) -> Result<Self, FormError> {
        serde_yaml::from_str(text).map_err(|err| FormError::Definition(err.to_string()))
    }

    pub fn from_json_str(text: &str) -> Result<Self, FormError> {
        serde_json::from_str(text).map_err(|err| FormError::Definition(err.to_string()))
    }

    pub fn into_parts(self) -> Result<(FormModel, FormConfig), FormError> {
        let steps = self
            .steps
            .into_iter()
            .map(|step| StepModel {
                title: step.title,
                fields: step.fields.into_iter().map(Field::from).collect(),
            })
            .collect();
        Ok((FormModel::new(self.id, steps)?, self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::{FormDefinition, FormModel, StepModel};
    use crate::core::field::{Field, FieldKind};
    use crate::core::value::RawValue;
    use crate::error::FormError;

    fn contact_form() -> FormModel {
        FormModel::new(
            "contact",
            vec![
                StepModel::new().field(Field::text("name").with_value("Ada")),
                StepModel::new()
                    .field(Field::radio("plan-a", "plan", "basic"))
                    .field(Field::radio("plan-b", "plan", "pro"))
                    .field(Field::checkbox("terms", "yes")),
            ],
        )
        .expect("form")
    }

    #[test]
    fn rejects_empty_forms() {
        let err = FormModel::new("f", Vec::new()).unwrap_err();
        assert!(matches!(err, FormError::NoSteps));
    }

    #[test]
    fn rejects_missing_id() {
        let err = FormModel::new("  ", vec![StepModel::new()]).unwrap_err();
        assert!(matches!(err, FormError::MissingFormId));
    }

    #[test]
    fn rejects_duplicate_field_ids() {
        let err = FormModel::new(
            "f",
            vec![
                StepModel::new().field(Field::text("a")),
                StepModel::new().field(Field::text("a")),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, FormError::DuplicateField(id) if id == "a"));
    }

    #[test]
    fn checking_radio_unchecks_group() {
        let mut form = contact_form();
        form.set_checked("plan-a", true).expect("field");
        form.set_checked("plan-b", true).expect("field");

        assert!(!form.field("plan-a").expect("field").checked);
        assert!(form.field("plan-b").expect("field").checked);
    }

    #[test]
    fn radio_raw_value_reads_checked_group_member() {
        let mut form = contact_form();
        let field = form.field("plan-a").expect("field").clone();
        assert_eq!(form.raw_value(&field), RawValue::Text(""));

        form.set_checked("plan-b", true).expect("field");
        assert_eq!(form.raw_value(&field), RawValue::Text("pro"));
    }

    #[test]
    fn checkbox_raw_value_is_empty_until_checked() {
        let mut form = contact_form();
        let field = form.field("terms").expect("field").clone();
        assert_eq!(form.raw_value(&field), RawValue::Text(""));

        form.set_checked("terms", true).expect("field");
        assert_eq!(form.raw_value(&field), RawValue::Text("yes"));
    }

    #[test]
    fn reset_restores_initial_values() {
        let mut form = contact_form();
        form.set_value("name", "Grace").expect("field");
        form.set_checked("terms", true).expect("field");
        form.reset();

        assert_eq!(form.field("name").expect("field").value, "Ada");
        assert!(!form.field("terms").expect("field").checked);
    }

    #[test]
    fn unknown_field_is_reported() {
        let mut form = contact_form();
        let err = form.set_value("missing", "x").unwrap_err();
        assert!(matches!(err, FormError::UnknownField(id) if id == "missing"));
    }

    #[test]
    fn definition_loads_from_yaml() {
        let yaml = r#"
id: signup
config:
  keyboard_navigation: true
steps:
  - title: Account
    fields:
      - id: email
        type: email
        validate: required email
        errorMessage: We need your email
  - fields:
      - id: agree
        type: checkbox
        value: "yes"
"#;
        let (form, config) = FormDefinition::from_yaml_str(yaml)
            .expect("yaml")
            .into_parts()
            .expect("form");

        assert_eq!(form.id(), "signup");
        assert_eq!(form.step_count(), 2);
        assert!(config.keyboard_navigation);
        let email = form.field("email").expect("email");
        assert_eq!(email.kind, FieldKind::Email);
        assert_eq!(email.name(), Some("email"));
        assert_eq!(email.rules.as_deref(), Some("required email"));
        assert_eq!(email.error_message.as_deref(), Some("We need your email"));
    }

    #[test]
    fn malformed_definition_is_a_configuration_error() {
        let err = FormDefinition::from_json_str("{\"id\": 3}").unwrap_err();
        assert!(matches!(err, FormError::Definition(_)));
    }
}
