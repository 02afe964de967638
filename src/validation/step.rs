use crate::config::FormConfig;
use crate::core::FormModel;
use crate::state::validation::ValidationState;
use crate::validation::{FieldRuleSet, RegexPolicy, RuleRegistry};

/// Runs configured rule chains for fields, steps and the whole form, and
/// records invalid marks in its `ValidationState`.
#[derive(Debug)]
pub struct StepValidator {
    registry: RuleRegistry,
    rule_set: FieldRuleSet,
    state: ValidationState,
}

impl StepValidator {
    pub fn new(registry: RuleRegistry, rule_set: FieldRuleSet) -> Self {
        Self {
            registry,
            rule_set,
            state: ValidationState::default(),
        }
    }

    pub fn for_form(form: &FormModel, config: &FormConfig) -> Self {
        let registry = RuleRegistry::with_defaults(
            config.messages.clone(),
            RegexPolicy::from_fail_open(config.regex_fail_open),
        );
        Self::new(registry, FieldRuleSet::from_form(form))
    }

    pub fn registry_mut(&mut self) -> &mut RuleRegistry {
        &mut self.registry
    }

    pub fn rule_set(&self) -> &FieldRuleSet {
        &self.rule_set
    }

    pub fn state(&self) -> &ValidationState {
        &self.state
    }

    /// Runs the field's rules in order, stopping at the first failure.
    /// Fields without rules are valid and left untouched.
    pub fn validate_field(&mut self, form: &FormModel, id: &str) -> bool {
        let (Some(rules), Some(field)) = (self.rule_set.get(id), form.field(id)) else {
            return true;
        };
        let value = form.raw_value(field);

        for spec in &rules.specs {
            let Some(result) = self.registry.validate(&spec.name, value, spec.param.as_deref())
            else {
                tracing::debug!(field = id, rule = %spec.name, "skipping unknown rule");
                continue;
            };
            if !result.valid {
                let message = rules
                    .error_message
                    .clone()
                    .or(result.message)
                    .unwrap_or_default();
                self.state.set_error(id, message);
                return false;
            }
        }

        self.state.clear_error(id);
        true
    }

    /// Validates every ruled field of the step. All fields are checked so
    /// every mark is current.
    pub fn validate_step(&mut self, form: &FormModel, index: usize) -> bool {
        let Some(step) = form.step(index) else {
            return true;
        };
        let mut valid = true;
        for field in &step.fields {
            if self.rule_set.contains(&field.id) && !self.validate_field(form, &field.id) {
                valid = false;
            }
        }
        valid
    }

    pub fn validate_all_steps(&mut self, form: &FormModel) -> bool {
        (0..form.step_count()).fold(true, |valid, index| {
            self.validate_step(form, index) && valid
        })
    }

    pub fn clear_error(&mut self, id: &str) {
        self.state.clear_error(id);
    }

    pub fn clear_all(&mut self) {
        self.state.clear_all();
    }
}

#[cfg(test)]
mod tests {
    use super::StepValidator;
    use crate::config::FormConfig;
    use crate::core::{Field, FormModel, RawValue, StepModel};
    use crate::validation::ValidationResult;

    fn form() -> FormModel {
        FormModel::new(
            "profile",
            vec![
                StepModel::new()
                    .field(Field::text("name").with_rules("required minLength:3"))
                    .field(Field::email("email").with_rules("required email"))
                    .field(Field::text("notes")),
                StepModel::new().field(
                    Field::text("age")
                        .with_rules("number:18,")
                        .with_error_message("Adults only"),
                ),
            ],
        )
        .expect("form")
    }

    fn validator(form: &FormModel) -> StepValidator {
        StepValidator::for_form(form, &FormConfig::default())
    }

    #[test]
    fn first_failing_rule_reports() {
        let mut form = form();
        let mut validator = validator(&form);

        assert!(!validator.validate_field(&form, "name"));
        assert_eq!(validator.state().error("name"), Some("This field is required"));

        form.set_value("name", "ab").expect("field");
        assert!(!validator.validate_field(&form, "name"));
        assert_eq!(validator.state().error("name"), Some("Minimum 3 characters"));
    }

    #[test]
    fn empty_email_fails_required_not_email() {
        let form = form();
        let mut validator = validator(&form);
        validator.validate_field(&form, "email");
        assert_eq!(validator.state().error("email"), Some("This field is required"));
    }

    #[test]
    fn override_message_replaces_rule_message() {
        let mut form = form();
        form.set_value("age", "12").expect("field");
        let mut validator = validator(&form);
        assert!(!validator.validate_step(&form, 1));
        assert_eq!(validator.state().error("age"), Some("Adults only"));
    }

    #[test]
    fn step_checks_every_field_and_clears_marks() {
        let mut form = form();
        let mut validator = validator(&form);

        assert!(!validator.validate_step(&form, 0));
        assert!(validator.state().is_invalid("name"));
        assert!(validator.state().is_invalid("email"));
        assert!(!validator.state().is_invalid("notes"));

        form.set_value("name", "Ada").expect("field");
        form.set_value("email", "ada@example.com").expect("field");
        assert!(validator.validate_step(&form, 0));
        assert!(validator.state().is_empty());
    }

    #[test]
    fn revalidating_is_idempotent() {
        let mut form = form();
        form.set_value("name", "Ada").expect("field");
        let mut validator = validator(&form);

        let first = validator.validate_step(&form, 0);
        let snapshot = validator.state().clone();
        let second = validator.validate_step(&form, 0);

        assert_eq!(first, second);
        assert_eq!(&snapshot, validator.state());
        assert_eq!(validator.state().len(), 1);
    }

    #[test]
    fn all_steps_does_not_short_circuit() {
        let mut form = form();
        form.set_value("age", "3").expect("field");
        let mut validator = validator(&form);

        assert!(!validator.validate_all_steps(&form));
        assert!(validator.state().is_invalid("name"));
        assert!(validator.state().is_invalid("age"));
    }

    #[test]
    fn unknown_rules_are_skipped() {
        let form = FormModel::new(
            "f",
            vec![StepModel::new().field(Field::text("x").with_rules("mystery"))],
        )
        .expect("form");
        let mut validator = validator(&form);
        assert!(validator.validate_step(&form, 0));
    }

    #[test]
    fn custom_rule_is_used() {
        let form = FormModel::new(
            "f",
            vec![StepModel::new().field(Field::text("code").with_rules("even"))],
        )
        .expect("form");
        let mut validator = validator(&form);
        validator
            .registry_mut()
            .register("even", |value: RawValue<'_>, _: Option<&str>| {
                ValidationResult::check(value.text().len() % 2 == 0, "Needs even length")
            });

        assert!(validator.validate_field(&form, "code"));
    }
}
