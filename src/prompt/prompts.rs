//! Default prompt text for each generation intent.

use serde::{Deserialize, Serialize};

use crate::domain::Intent;

pub const OPEN_SENTINEL: &str = "<code>";
pub const CLOSE_SENTINEL: &str = "</code>";

const GENERATE_SYSTEM: &str = "You are a Python code generator. Return all code in between <code> and </code> tags.
Make sure the code is well-documented, follows best practices, and is ready to use. You must return the code in between <code> and </code> tags. do not use ```python or ```";

const FIX_SYSTEM: &str = "You are a Python code error fixer. Analyze the error output and fix the code. Return the fixed code between <code> and </code> tags.
Do not refer to previous conversations or context. Focus only on fixing the current error.";

const IMPROVE_SYSTEM: &str = "You are a Python code improver. Analyze the working code and add more features or improvements. Return the improved code between <code> and </code> tags.
Do not refer to previous conversations or context. Focus only on improving the current code with new features.";

const GENERATE_USER: &str = "{{prompt}}";

const FIX_USER: &str = "Here is the code with errors:\n{{code}}\n\nError output:\n{{error_output}}\n\nPlease fix the code.";

const IMPROVE_USER: &str = "Here is the working code to improve:\n{{code}}\n\nPlease add more features or improvements.";

/// System instructions and user-message templates, one pair per intent.
///
/// Every field can be overridden from the config file; omitted fields keep
/// their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptSet {
    pub generate_system: String,
    pub fix_system: String,
    pub improve_system: String,
    pub generate_user: String,
    pub fix_user: String,
    pub improve_user: String,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self {
            generate_system: GENERATE_SYSTEM.to_string(),
            fix_system: FIX_SYSTEM.to_string(),
            improve_system: IMPROVE_SYSTEM.to_string(),
            generate_user: GENERATE_USER.to_string(),
            fix_user: FIX_USER.to_string(),
            improve_user: IMPROVE_USER.to_string(),
        }
    }
}

impl PromptSet {
    /// Role instruction sent as the system message for `intent`
    pub fn system(&self, intent: Intent) -> &str {
        match intent {
            Intent::Generate => &self.generate_system,
            Intent::Fix => &self.fix_system,
            Intent::Improve => &self.improve_system,
        }
    }

    /// Handlebars template for the user message of `intent`
    pub fn user_template(&self, intent: Intent) -> &str {
        match intent {
            Intent::Generate => &self.generate_user,
            Intent::Fix => &self.fix_user,
            Intent::Improve => &self.improve_user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompts_are_distinct() {
        let prompts = PromptSet::default();
        assert_ne!(prompts.system(Intent::Generate), prompts.system(Intent::Fix));
        assert_ne!(prompts.system(Intent::Fix), prompts.system(Intent::Improve));
        assert_ne!(prompts.system(Intent::Generate), prompts.system(Intent::Improve));
    }

    #[test]
    fn test_system_prompts_mention_sentinels() {
        let prompts = PromptSet::default();
        for intent in Intent::ALL {
            let system = prompts.system(intent);
            assert!(system.contains(OPEN_SENTINEL), "{} prompt lacks opening tag", intent);
            assert!(system.contains(CLOSE_SENTINEL), "{} prompt lacks closing tag", intent);
        }
    }

    #[test]
    fn test_partial_override_from_yaml() {
        let yaml = "fix_system: \"Fix it.\"\n";
        let prompts: PromptSet = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(prompts.fix_system, "Fix it.");
        assert_eq!(prompts.generate_system, GENERATE_SYSTEM);
        assert_eq!(prompts.improve_user, IMPROVE_USER);
    }
}
