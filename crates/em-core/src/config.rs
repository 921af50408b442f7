//! Configuration
//!
//! Parsed from JSON with camelCase keys. Everything except the HubSpot
//! portal and form ids has a default.

use serde::Deserialize;

use crate::url_filter::UrlFilter;

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: &'static str },
}

// =============================================================================
// Widget
// =============================================================================

/// Identifies the hidden HubSpot form instance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WidgetConfig {
    /// HubSpot portal (account) id
    pub portal_id: String,
    pub form_id: String,
    pub region: String,
    /// Embed script URL
    pub script_src: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            portal_id: String::new(),
            form_id: String::new(),
            region: "na1".to_string(),
            script_src: "//js.hsforms.net/forms/embed/v2.js".to_string(),
        }
    }
}

impl WidgetConfig {
    /// Selector for the rendered widget form.
    pub fn form_selector(&self) -> String {
        format!("form[data-form-id=\"{}\"]", self.form_id)
    }

    /// Selector for the email input inside the rendered widget form.
    pub fn email_input_selector(&self) -> String {
        format!("{} input[type=\"email\"]", self.form_selector())
    }
}

// =============================================================================
// Selectors
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Selectors {
    /// Native email input
    pub email_field: String,
    /// Native submit control
    pub submit_button: String,
    /// Root container of the rendered widget; native candidates inside it are ignored
    pub widget_root: String,
    /// Overrides the hidden form to submit. Defaults to the form rendered for
    /// `widget.formId`.
    pub hidden_form: Option<String>,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            email_field: "#account_email".to_string(),
            submit_button: "form button[type=\"button\"]".to_string(),
            widget_root: ".hs-form".to_string(),
            hidden_form: None,
        }
    }
}

// =============================================================================
// Timing
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Timing {
    pub locator_interval_ms: u32,
    pub locator_max_attempts: u32,
    pub retry_interval_ms: u32,
    pub retry_max_attempts: u32,
    /// Delay before copying a pre-filled native value
    pub settle_delay_ms: u32,
    /// Warn if the widget has not reported ready after this long
    pub widget_ready_timeout_ms: u32,
    /// Hidden submissions closer together than this collapse into one. 0 disables.
    pub submit_debounce_ms: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            locator_interval_ms: 1000,
            locator_max_attempts: 30,
            retry_interval_ms: 500,
            retry_max_attempts: 5,
            settle_delay_ms: 1000,
            widget_ready_timeout_ms: 15_000,
            submit_debounce_ms: 300,
        }
    }
}

// =============================================================================
// Top level
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MirrorConfig {
    /// Verbose tracing, and leave the widget form visible
    pub debug: bool,
    pub allowed_urls: Vec<String>,
    pub blocked_urls: Vec<String>,
    pub widget: WidgetConfig,
    pub selectors: Selectors,
    pub timing: Timing,
}

impl MirrorConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.widget.portal_id.trim().is_empty() {
            return Err(ConfigError::MissingField("widget.portalId"));
        }
        if self.widget.form_id.trim().is_empty() {
            return Err(ConfigError::MissingField("widget.formId"));
        }
        if self.widget.form_id.contains('"') {
            return Err(ConfigError::InvalidValue {
                field: "widget.formId",
                reason: "must not contain quotes",
            });
        }

        let selectors = [
            ("selectors.emailField", &self.selectors.email_field),
            ("selectors.submitButton", &self.selectors.submit_button),
            ("selectors.widgetRoot", &self.selectors.widget_root),
        ];
        for (field, value) in selectors {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingField(field));
            }
        }
        if self.selectors.hidden_form.as_ref().is_some_and(|s| s.trim().is_empty()) {
            return Err(ConfigError::MissingField("selectors.hiddenForm"));
        }

        let t = &self.timing;
        if t.locator_interval_ms == 0 || t.retry_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timing",
                reason: "poll intervals must be non-zero",
            });
        }
        if t.locator_max_attempts == 0 || t.retry_max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timing",
                reason: "attempt ceilings must be non-zero",
            });
        }

        Ok(())
    }

    /// Selector of the widget form that receives forwarded submissions.
    pub fn hidden_form_selector(&self) -> String {
        match &self.selectors.hidden_form {
            Some(selector) => selector.clone(),
            None => self.widget.form_selector(),
        }
    }

    pub fn url_filter(&self) -> UrlFilter {
        UrlFilter::new(&self.allowed_urls, &self.blocked_urls)
    }

    /// Stylesheet that keeps the widget form off-screen and inert.
    pub fn hide_stylesheet(&self) -> String {
        format!(
            "{} {{ visibility: hidden; position: absolute; left: -10000px; top: -10000px; pointer-events: none; }}",
            self.selectors.widget_root
        )
    }
}
