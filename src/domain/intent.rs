//! The three things a generation call can be asked to do.

use std::fmt;

/// Purpose of a single model call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    /// Produce the first version of the program from the user's request
    Generate,
    /// Repair code whose execution was classified as an error
    Fix,
    /// Extend code that ran cleanly or timed out
    Improve,
}

impl Intent {
    pub const ALL: [Intent; 3] = [Intent::Generate, Intent::Fix, Intent::Improve];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Generate => "generate",
            Intent::Fix => "fix",
            Intent::Improve => "improve",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_intent_names() {
        assert_eq!(Intent::Generate.to_string(), "generate");
        assert_eq!(Intent::Fix.to_string(), "fix");
        assert_eq!(Intent::Improve.to_string(), "improve");
    }

    #[test]
    fn test_all_is_unique() {
        let names: HashSet<&str> = Intent::ALL.iter().map(|i| i.as_str()).collect();
        assert_eq!(names.len(), Intent::ALL.len());
        assert_eq!(Intent::ALL.len(), 3);
    }
}
