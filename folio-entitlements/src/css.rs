//! Custom CSS screening
//!
//! Creators on plans with custom CSS can style their public page. Submitted
//! CSS is capped by line count and must not contain constructs that load
//! remote content or run script.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

const FORBIDDEN_PATTERN: &str = r"(?i)(@import|url\s*\(|expression\s*\(|javascript:|behavior:|-moz-binding|eval\s*\(|document\.|window\.|\\[0-9a-f]|data:)";

fn forbidden() -> &'static Regex {
    static FORBIDDEN: OnceLock<Regex> = OnceLock::new();
    FORBIDDEN.get_or_init(|| Regex::new(FORBIDDEN_PATTERN).expect("forbidden CSS pattern compiles"))
}

/// Result of screening a custom CSS submission.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum CssVerdict {
    /// CSS may be saved (after [`sanitize_custom_css`])
    Accepted,
    /// The plan does not include custom CSS
    FeatureUnavailable,
    /// More lines than the plan allows
    TooManyLines {
        /// Plan's line cap
        max: u32,
        /// Lines submitted
        actual: usize,
    },
    /// Contains a forbidden construct
    ForbiddenConstruct {
        /// First offending token, as written
        token: String,
    },
}

impl CssVerdict {
    /// Check if the submission was accepted.
    pub fn is_accepted(&self) -> bool {
        matches!(self, CssVerdict::Accepted)
    }
}

/// Count newline-delimited lines. Empty or blank CSS has no lines.
pub fn count_lines(css: &str) -> usize {
    if css.trim().is_empty() {
        0
    } else {
        css.lines().count()
    }
}

/// Screen CSS against a line cap and the forbidden-construct list.
///
/// A cap of zero means the plan has no custom CSS. Blank input is accepted on
/// any plan that has the feature.
pub fn validate_custom_css(css: &str, max_lines: u32) -> CssVerdict {
    if max_lines == 0 {
        return CssVerdict::FeatureUnavailable;
    }
    let actual = count_lines(css);
    if actual == 0 {
        return CssVerdict::Accepted;
    }
    if actual > max_lines as usize {
        return CssVerdict::TooManyLines {
            max: max_lines,
            actual,
        };
    }
    if let Some(found) = forbidden().find(css) {
        return CssVerdict::ForbiddenConstruct {
            token: found.as_str().to_string(),
        };
    }
    CssVerdict::Accepted
}

/// Drop every line that contains a forbidden construct.
///
/// # Examples
///
/// ```
/// use folio_entitlements::sanitize_custom_css;
///
/// let css = "body { color: red; }\n@import 'x.css';\nh1 { margin: 0; }";
/// assert_eq!(sanitize_custom_css(css), "body { color: red; }\nh1 { margin: 0; }");
/// ```
pub fn sanitize_custom_css(css: &str) -> String {
    css.split('\n')
        .filter(|line| !forbidden().is_match(line.trim()))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
