use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub type FieldId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    Email,
    Tel,
    Number,
    Date,
    Textarea,
    Select,
    Password,
    File,
    Checkbox,
    Radio,
    Hidden,
    Submit,
}

impl FieldKind {
    pub fn is_checkable(self) -> bool {
        matches!(self, Self::Checkbox | Self::Radio)
    }

    /// Whether values of this kind may be written to durable storage.
    pub fn is_persistable(self) -> bool {
        !matches!(self, Self::Password | Self::File | Self::Submit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SelectedFile {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type", default)]
    pub mime_type: String,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, size: u64, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            mime_type: mime_type.into(),
        }
    }
}

/// One input-like element inside a step.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub id: FieldId,
    pub name: Option<String>,
    pub kind: FieldKind,
    pub value: String,
    pub checked: bool,
    pub files: Vec<SelectedFile>,
    /// Rule spec string, e.g. `required minLength:3`.
    pub rules: Option<String>,
    pub error_message: Option<String>,
    /// Query parameter this field is prefilled from.
    pub param: Option<String>,
    pub(crate) default_value: String,
    pub(crate) default_checked: bool,
}

impl Field {
    pub fn new(id: impl Into<FieldId>, kind: FieldKind) -> Self {
        let id = id.into();
        Self {
            name: Some(id.clone()),
            id,
            kind,
            value: String::new(),
            checked: false,
            files: Vec::new(),
            rules: None,
            error_message: None,
            param: None,
            default_value: String::new(),
            default_checked: false,
        }
    }

    pub fn text(id: impl Into<FieldId>) -> Self {
        Self::new(id, FieldKind::Text)
    }

    pub fn email(id: impl Into<FieldId>) -> Self {
        Self::new(id, FieldKind::Email)
    }

    pub fn password(id: impl Into<FieldId>) -> Self {
        Self::new(id, FieldKind::Password)
    }

    pub fn file(id: impl Into<FieldId>) -> Self {
        Self::new(id, FieldKind::File)
    }

    pub fn checkbox(id: impl Into<FieldId>, value: impl Into<String>) -> Self {
        Self::new(id, FieldKind::Checkbox).with_value(value)
    }

    pub fn radio(id: impl Into<FieldId>, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(id, FieldKind::Radio)
            .with_name(name)
            .with_value(value)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn unnamed(mut self) -> Self {
        self.name = None;
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    pub fn with_rules(mut self, rules: impl Into<String>) -> Self {
        self.rules = Some(rules.into());
        self
    }

    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.param = Some(param.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }

    pub(crate) fn capture_defaults(&mut self) {
        self.default_value = self.value.clone();
        self.default_checked = self.checked;
    }

    pub(crate) fn reset(&mut self) {
        self.value = self.default_value.clone();
        self.checked = self.default_checked;
        self.files.clear();
    }
}
