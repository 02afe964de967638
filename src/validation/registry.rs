use crate::core::RawValue;
use crate::validation::messages::Messages;
use crate::validation::{ValidationResult, rules};
use std::collections::HashMap;
use std::sync::Arc;

pub type Rule = Box<dyn Fn(RawValue<'_>, Option<&str>) -> ValidationResult + Send + Sync>;

pub fn into_rule<F>(f: F) -> Rule
where
    F: Fn(RawValue<'_>, Option<&str>) -> ValidationResult + Send + Sync + 'static,
{
    Box::new(f)
}

/// What a `pattern` rule does when its expression does not compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegexPolicy {
    #[default]
    FailOpen,
    FailClosed,
}

impl RegexPolicy {
    pub fn from_fail_open(fail_open: bool) -> Self {
        if fail_open {
            Self::FailOpen
        } else {
            Self::FailClosed
        }
    }
}

/// Rule name to rule function. Owned by one validator, so forms never
/// share registrations.
#[derive(Default)]
pub struct RuleRegistry {
    rules: HashMap<String, Rule>,
}

impl RuleRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_defaults(messages: Messages, policy: RegexPolicy) -> Self {
        let messages = Arc::new(messages);
        let mut registry = Self::empty();
        registry.insert("required", rules::required(messages.clone()));
        registry.insert("email", rules::email(messages.clone()));
        registry.insert("phone", rules::phone(messages.clone()));
        registry.insert("minLength", rules::min_length(messages.clone()));
        registry.insert("maxLength", rules::max_length(messages.clone()));
        registry.insert("number", rules::number(messages.clone()));
        registry.insert("date", rules::date(messages.clone()));
        registry.insert("pattern", rules::pattern(messages.clone(), policy));
        registry.insert("file", rules::file(messages));
        registry
    }

    /// Registers `rule` under `name`, replacing any rule of that name.
    pub fn register<F>(&mut self, name: impl Into<String>, rule: F)
    where
        F: Fn(RawValue<'_>, Option<&str>) -> ValidationResult + Send + Sync + 'static,
    {
        self.insert(name, into_rule(rule));
    }

    pub fn insert(&mut self, name: impl Into<String>, rule: Rule) {
        self.rules.insert(name.into(), rule);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Evaluates `name` against `value`. Returns `None` for an unknown rule.
    pub fn validate(
        &self,
        name: &str,
        value: RawValue<'_>,
        param: Option<&str>,
    ) -> Option<ValidationResult> {
        self.rules.get(name).map(|rule| rule(value, param))
    }
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("RuleRegistry").field("rules", &names).finish()
    }
}
