use crate::core::{FieldId, FormModel};
use indexmap::IndexMap;

/// A rule name plus its optional parameter, e.g. `minLength:3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSpec {
    pub name: String,
    pub param: Option<String>,
}

impl RuleSpec {
    pub fn new(name: impl Into<String>, param: Option<&str>) -> Self {
        Self {
            name: name.into(),
            param: param.map(str::to_string),
        }
    }

    /// Everything after the first `:` is the parameter, so patterns may
    /// contain colons.
    pub fn parse(token: &str) -> Self {
        match token.split_once(':') {
            Some((name, param)) => Self::new(name, Some(param)),
            None => Self::new(token, None),
        }
    }

    pub fn parse_list(spec: &str) -> Vec<Self> {
        spec.split_whitespace().map(Self::parse).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRules {
    pub specs: Vec<RuleSpec>,
    pub error_message: Option<String>,
}

/// Rule chains per field, in declaration order. Built once from the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldRuleSet {
    rules: IndexMap<FieldId, FieldRules>,
}

impl FieldRuleSet {
    pub fn from_form(form: &FormModel) -> Self {
        let rules = form
            .fields()
            .filter_map(|field| {
                let specs = RuleSpec::parse_list(field.rules.as_deref()?);
                if specs.is_empty() {
                    return None;
                }
                Some((
                    field.id.clone(),
                    FieldRules {
                        specs,
                        error_message: field.error_message.clone(),
                    },
                ))
            })
            .collect();
        Self { rules }
    }

    pub fn get(&self, id: &str) -> Option<&FieldRules> {
        self.rules.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.rules.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldRules)> {
        self.rules.iter().map(|(id, rules)| (id.as_str(), rules))
    }
}
