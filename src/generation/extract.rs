//! Code extraction from free-text model responses.

use crate::error::{AutocoderError, Result};
use crate::prompt::{CLOSE_SENTINEL, OPEN_SENTINEL};

/// Return the trimmed text between the first opening sentinel and the first
/// closing sentinel after it.
///
/// The result is not checked for validity in any language; that is found out
/// when it runs.
pub fn extract_code(text: &str) -> Result<String> {
    let start = text
        .find(OPEN_SENTINEL)
        .ok_or_else(|| AutocoderError::Extraction(format!("no {} marker in response", OPEN_SENTINEL)))?
        + OPEN_SENTINEL.len();

    let len = text[start..].find(CLOSE_SENTINEL).ok_or_else(|| {
        AutocoderError::Extraction(format!("no {} marker after {}", CLOSE_SENTINEL, OPEN_SENTINEL))
    })?;

    Ok(text[start..start + len].trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_and_trims() {
        let text = "Sure, here it is:\n<code>\n  print('hi')\n</code>\nEnjoy!";
        assert_eq!(extract_code(text).unwrap(), "print('hi')");
    }

    #[test]
    fn test_uses_first_pair_only() {
        let text = "<code>a = 1</code> and also <code>b = 2</code>";
        assert_eq!(extract_code(text).unwrap(), "a = 1");
    }

    #[test]
    fn test_close_must_follow_open() {
        let text = "</code> stray <code>x = 1</code>";
        assert_eq!(extract_code(text).unwrap(), "x = 1");
    }

    #[test]
    fn test_missing_open_marker() {
        let err = extract_code("print('no markers')").unwrap_err();
        assert!(matches!(err, AutocoderError::Extraction(_)));
    }

    #[test]
    fn test_missing_close_marker() {
        let err = extract_code("<code>print('unterminated')").unwrap_err();
        assert!(matches!(err, AutocoderError::Extraction(_)));
    }

    #[test]
    fn test_close_only_before_open_is_missing() {
        assert!(extract_code("</code> then <code> and nothing").is_err());
    }

    #[test]
    fn test_empty_body() {
        assert_eq!(extract_code("<code>   \n</code>").unwrap(), "");
    }

    #[test]
    fn test_markdown_fence_is_kept() {
        // Fences inside the markers are part of the body
        let text = "<code>```python\nx = 1\n```</code>";
        assert_eq!(extract_code(text).unwrap(), "```python\nx = 1\n```");
    }

    #[test]
    fn test_idempotent() {
        let text = "noise <code>\nfor i in range(3):\n    print(i)\n</code> tail";
        let first = extract_code(text).unwrap();
        let second = extract_code(text).unwrap();
        assert_eq!(first, second);
    }
}
