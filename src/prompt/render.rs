//! Prompt Renderer - Render user messages with context variables using Handlebars
//!
//! Each generation intent has a named template registered up front, so a bad
//! override in the config file fails at startup instead of mid-run.

use handlebars::Handlebars;
use serde::Serialize;

use crate::domain::Intent;
use crate::error::{AutocoderError, Result};
use crate::prompt::PromptSet;

/// Variables available to the user-message templates
#[derive(Debug, Clone, Default, Serialize)]
pub struct PromptContext<'a> {
    /// The user's original request (generate only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<&'a str>,
    /// Current code (fix and improve)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'a str>,
    /// Formatted execution feedback (fix only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_output: Option<&'a str>,
}

/// Renders user-message templates using Handlebars templating
pub struct PromptRenderer {
    handlebars: Handlebars<'static>,
}

impl PromptRenderer {
    /// Create a renderer with the templates from `prompts` registered per intent
    pub fn new(prompts: &PromptSet) -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        // Code goes through these templates verbatim; never HTML-escape it
        handlebars.register_escape_fn(handlebars::no_escape);

        let mut renderer = Self { handlebars };
        for intent in Intent::ALL {
            renderer.register_template(intent.as_str(), prompts.user_template(intent))?;
        }
        Ok(renderer)
    }

    /// Register a named template for later use
    pub fn register_template(&mut self, name: &str, template: &str) -> Result<()> {
        self.handlebars
            .register_template_string(name, template)
            .map_err(|e| AutocoderError::Config(format!("Failed to register template '{}': {}", name, e)))
    }

    /// Render the user message for `intent`
    pub fn render_user(&self, intent: Intent, context: &PromptContext<'_>) -> Result<String> {
        self.render_named(intent.as_str(), context)
    }

    /// Render a previously registered template with any serializable context
    pub fn render_named<T: Serialize>(&self, name: &str, context: &T) -> Result<String> {
        self.handlebars
            .render(name, context)
            .map_err(|e| AutocoderError::Config(format!("Failed to render template '{}': {}", name, e)))
    }

    /// Check if a named template is registered
    pub fn has_template(&self, name: &str) -> bool {
        self.handlebars.get_template(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_renderer() -> PromptRenderer {
        PromptRenderer::new(&PromptSet::default()).unwrap()
    }

    #[test]
    fn test_all_intents_registered() {
        let renderer = create_renderer();
        assert!(renderer.has_template("generate"));
        assert!(renderer.has_template("fix"));
        assert!(renderer.has_template("improve"));
        assert!(!renderer.has_template("nonexistent"));
    }

    #[test]
    fn test_render_generate_is_prompt_verbatim() {
        let renderer = create_renderer();
        let context = PromptContext {
            prompt: Some("a pygame tower defense game"),
            ..Default::default()
        };
        let result = renderer.render_user(Intent::Generate, &context).unwrap();
        assert_eq!(result, "a pygame tower defense game");
    }

    #[test]
    fn test_render_fix() {
        let renderer = create_renderer();
        let context = PromptContext {
            code: Some("print(x)"),
            error_output: Some("NameError: name 'x' is not defined"),
            ..Default::default()
        };
        let result = renderer.render_user(Intent::Fix, &context).unwrap();
        assert_eq!(
            result,
            "Here is the code with errors:\nprint(x)\n\nError output:\nNameError: name 'x' is not defined\n\nPlease fix the code."
        );
    }

    #[test]
    fn test_render_improve() {
        let renderer = create_renderer();
        let context = PromptContext {
            code: Some("print('ok')"),
            ..Default::default()
        };
        let result = renderer.render_user(Intent::Improve, &context).unwrap();
        assert!(result.starts_with("Here is the working code to improve:\nprint('ok')"));
        assert!(result.ends_with("Please add more features or improvements."));
    }

    #[test]
    fn test_render_no_escape_html() {
        let renderer = create_renderer();
        let context = PromptContext {
            code: Some("if a < b and c > d: print(\"&\")"),
            ..Default::default()
        };
        let result = renderer.render_user(Intent::Improve, &context).unwrap();
        assert!(result.contains("if a < b and c > d: print(\"&\")"));
    }

    #[test]
    fn test_code_with_braces_is_not_interpreted() {
        let renderer = create_renderer();
        let context = PromptContext {
            code: Some("d = {{'a': 1}}"),
            ..Default::default()
        };
        let result = renderer.render_user(Intent::Improve, &context).unwrap();
        assert!(result.contains("d = {{'a': 1}}"));
    }

    #[test]
    fn test_missing_variable_renders_empty() {
        let renderer = create_renderer();
        let result = renderer.render_user(Intent::Generate, &PromptContext::default()).unwrap();
        assert_eq!(result, "");
    }

    #[test]
    fn test_invalid_override_rejected() {
        let prompts = PromptSet {
            fix_user: "{{#if code}}unterminated".to_string(),
            ..Default::default()
        };
        let result = PromptRenderer::new(&prompts);
        assert!(matches!(result, Err(AutocoderError::Config(_))));
    }
}
