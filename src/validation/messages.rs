use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// User-facing validation messages. `{n}`, `{min}` and `{max}` are
/// replaced with the rule parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct Messages {
    pub required: String,
    pub email: String,
    pub phone: String,
    pub min_length: String,
    pub max_length: String,
    pub pattern: String,
    pub number: String,
    pub number_min: String,
    pub number_max: String,
    pub date: String,
    pub file_size: String,
    pub file_type: String,
    pub submit_blocked: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            required: "This field is required".into(),
            email: "Please check your email address".into(),
            phone: "Please check your phone number".into(),
            min_length: "Minimum {n} characters".into(),
            max_length: "Maximum {n} characters".into(),
            pattern: "Please check the format".into(),
            number: "Please enter a valid number".into(),
            number_min: "Value must be at least {min}".into(),
            number_max: "Value must be no more than {max}".into(),
            date: "Please enter a valid date".into(),
            file_size: "File is too large".into(),
            file_type: "File type not allowed".into(),
            submit_blocked: "Please complete all required fields correctly before submitting."
                .into(),
        }
    }
}

impl Messages {
    pub fn min_length_message(&self, n: &str) -> String {
        self.min_length.replace("{n}", n)
    }

    pub fn max_length_message(&self, n: &str) -> String {
        self.max_length.replace("{n}", n)
    }

    pub fn number_min_message(&self, min: f64) -> String {
        self.number_min.replace("{min}", &min.to_string())
    }

    pub fn number_max_message(&self, max: f64) -> String {
        self.number_max.replace("{max}", &max.to_string())
    }
}
