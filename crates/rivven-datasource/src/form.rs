//! Display metadata for configuration forms
//!
//! A form option pairs a label with the parameter key it edits, plus one
//! kind-specific extra: an input type, a fixed list of choices, or the API
//! endpoint that serves choices dynamically.
//!
//! ```
//! use rivven_datasource::form::{FormOptionBuilder, InputType};
//!
//! let option = FormOptionBuilder::new()
//!     .with_label("Password")
//!     .with_field("password")
//!     .input()
//!     .password();
//!
//! assert_eq!(option.field, "password");
//! assert_eq!(option.input_type(), Some(InputType::Password));
//! ```

use serde::{Deserialize, Serialize};

/// Prefix marking a label as an i18n key
pub const I18N_PREFIX: &str = "i18n.";

/// Input widget type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    /// Single-line text
    Text,
    /// Masked text
    Password,
    /// Multi-line text
    Textarea,
}

/// One choice of a select option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    /// Displayed label
    pub label: String,
    /// Submitted value
    pub value: String,
}

impl SelectOption {
    /// Create a select choice
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Kind-specific part of a form option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormOptionKind {
    /// Free input
    Input {
        /// Widget type
        input_type: InputType,
    },
    /// Select with fixed choices
    StaticSelect {
        /// Choices in display order
        options: Vec<SelectOption>,
    },
    /// Select whose choices are fetched from an API
    DynamicSelect {
        /// Endpoint serving the choices
        select_api: String,
    },
}

/// A configuration form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormOption {
    /// Displayed label (or i18n key)
    pub label: String,
    /// Parameter key edited by this option
    pub field: String,
    /// Kind-specific extra
    #[serde(flatten)]
    pub kind: FormOptionKind,
}

impl FormOption {
    /// Input type, for input options
    pub fn input_type(&self) -> Option<InputType> {
        match self.kind {
            FormOptionKind::Input { input_type } => Some(input_type),
            _ => None,
        }
    }
}

/// Fluent builder for [`FormOption`]
#[derive(Debug, Clone, Default)]
pub struct FormOptionBuilder {
    label: String,
    field: String,
}

impl FormOptionBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a literal label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set an i18n label key
    pub fn with_i18n_label(mut self, label: impl AsRef<str>) -> Self {
        self.label = format!("{}{}", I18N_PREFIX, label.as_ref());
        self
    }

    /// Set the parameter key
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    /// Continue as an input option
    pub fn input(self) -> InputOptionBuilder {
        InputOptionBuilder { base: self }
    }

    /// Continue as a static select option
    pub fn static_select(self) -> StaticSelectOptionBuilder {
        StaticSelectOptionBuilder {
            base: self,
            options: Vec::new(),
        }
    }

    /// Continue as a dynamic select option
    pub fn dynamic_select(self) -> DynamicSelectOptionBuilder {
        DynamicSelectOptionBuilder {
            base: self,
            select_api: String::new(),
        }
    }

    fn finish(self, kind: FormOptionKind) -> FormOption {
        FormOption {
            label: self.label,
            field: self.field,
            kind,
        }
    }
}

/// Builder stage for input options
#[derive(Debug, Clone)]
pub struct InputOptionBuilder {
    base: FormOptionBuilder,
}

impl InputOptionBuilder {
    /// Single-line text input
    pub fn text(self) -> FormOption {
        self.build(InputType::Text)
    }

    /// Password input
    pub fn password(self) -> FormOption {
        self.build(InputType::Password)
    }

    /// Multi-line text input
    pub fn textarea(self) -> FormOption {
        self.build(InputType::Textarea)
    }

    fn build(self, input_type: InputType) -> FormOption {
        self.base.finish(FormOptionKind::Input { input_type })
    }
}

/// Builder stage for static select options
#[derive(Debug, Clone)]
pub struct StaticSelectOptionBuilder {
    base: FormOptionBuilder,
    options: Vec<SelectOption>,
}

impl StaticSelectOptionBuilder {
    /// Append choices
    pub fn add_select_options(mut self, options: impl IntoIterator<Item = SelectOption>) -> Self {
        self.options.extend(options);
        self
    }

    /// Finish the option
    pub fn build(self) -> FormOption {
        self.base.finish(FormOptionKind::StaticSelect {
            options: self.options,
        })
    }
}

/// Builder stage for dynamic select options
#[derive(Debug, Clone)]
pub struct DynamicSelectOptionBuilder {
    base: FormOptionBuilder,
    select_api: String,
}

impl DynamicSelectOptionBuilder {
    /// Set the endpoint serving the choices
    pub fn with_select_api(mut self, api: impl Into<String>) -> Self {
        self.select_api = api.into();
        self
    }

    /// Finish the option
    pub fn build(self) -> FormOption {
        self.base.finish(FormOptionKind::DynamicSelect {
            select_api: self.select_api,
        })
    }
}
