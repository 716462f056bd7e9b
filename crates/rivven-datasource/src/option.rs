//! Option rules: which parameters an engine requires or accepts
//!
//! Channels hand these descriptors to the configuration layer unchanged. The
//! crate itself only uses them to check required connection parameters and
//! to render configuration forms.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::form::{FormOption, FormOptionBuilder, SelectOption};
use crate::params::ConnectionParams;

/// A named configuration option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigOption {
    /// Parameter key
    pub key: String,
    /// Human-readable description
    pub description: String,
    /// Default value, if any
    pub default_value: Option<String>,
    /// Whether the value is a secret (rendered masked, never logged)
    pub secret: bool,
    /// Allowed values, when the option is an enumeration
    pub allowed_values: Vec<String>,
}

impl ConfigOption {
    /// Create an option
    pub fn new(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            description: description.into(),
            default_value: None,
            secret: false,
            allowed_values: Vec::new(),
        }
    }

    /// Set the default value
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Mark the option as secret
    pub fn secret(mut self) -> Self {
        self.secret = true;
        self
    }

    /// Restrict the option to a set of values
    pub fn with_allowed_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Render as a form option
    pub fn form_option(&self) -> FormOption {
        let builder = FormOptionBuilder::new()
            .with_i18n_label(&self.key)
            .with_field(&self.key);

        if !self.allowed_values.is_empty() {
            return builder
                .static_select()
                .add_select_options(
                    self.allowed_values
                        .iter()
                        .map(|v| SelectOption::new(v.as_str(), v.as_str())),
                )
                .build();
        }

        if self.secret {
            builder.input().password()
        } else {
            builder.input().text()
        }
    }
}

/// Required and optional options of an engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionRule {
    /// Options that must be present and non-blank
    pub required: Vec<ConfigOption>,
    /// Options that may be present
    pub optional: Vec<ConfigOption>,
}

impl OptionRule {
    /// Start building a rule
    pub fn builder() -> OptionRuleBuilder {
        OptionRuleBuilder::default()
    }

    /// Find an option by key
    pub fn option(&self, key: &str) -> Option<&ConfigOption> {
        self.required
            .iter()
            .chain(self.optional.iter())
            .find(|o| o.key == key)
    }

    /// Whether the key is required
    pub fn is_required(&self, key: &str) -> bool {
        self.required.iter().any(|o| o.key == key)
    }

    /// Check that every required option is present and non-blank
    pub fn validate(&self, params: &ConnectionParams) -> Result<()> {
        let missing: Vec<&str> = self
            .required
            .iter()
            .filter(|o| params.get_non_blank(&o.key).is_none())
            .map(|o| o.key.as_str())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::precondition(format!(
                "missing required parameters: {}",
                missing.join(", ")
            )))
        }
    }

    /// Render every option, required first, as form options
    pub fn form_options(&self) -> Vec<FormOption> {
        self.required
            .iter()
            .chain(self.optional.iter())
            .map(ConfigOption::form_option)
            .collect()
    }
}

/// Builder for [`OptionRule`]
#[derive(Debug, Clone, Default)]
pub struct OptionRuleBuilder {
    rule: OptionRule,
}

impl OptionRuleBuilder {
    /// Add required options
    pub fn required(mut self, options: impl IntoIterator<Item = ConfigOption>) -> Self {
        self.rule.required.extend(options);
        self
    }

    /// Add optional options
    pub fn optional(mut self, options: impl IntoIterator<Item = ConfigOption>) -> Self {
        self.rule.optional.extend(options);
        self
    }

    /// Finish the rule
    pub fn build(self) -> OptionRule {
        self.rule
    }
}
