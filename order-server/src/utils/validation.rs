//! Input validation helpers
//!
//! Text length limits and a flattener that turns `validator` results into a
//! list of human-readable violations.

use validator::{ValidationErrors, ValidationErrorsKind};

// ── Text length limits ──────────────────────────────────────────────

/// Order remarks
pub const MAX_REMARKS_LEN: u64 = 500;

/// Per-line instructions
pub const MAX_INSTRUCTIONS_LEN: u64 = 200;

/// Menu item names
pub const MAX_NAME_LEN: usize = 200;

/// Menu item descriptions
pub const MAX_DESCRIPTION_LEN: usize = 1000;

/// Quantity bounds for a single order line
pub const MIN_QUANTITY: i32 = 1;
pub const MAX_QUANTITY: i32 = 10;

// ── Validation helpers ──────────────────────────────────────────────

/// Flatten nested `ValidationErrors` into `"path: message"` strings.
///
/// Output is sorted so responses are stable across runs.
pub fn collect_violations(errors: &ValidationErrors) -> Vec<String> {
    let mut out = Vec::new();
    walk("", errors, &mut out);
    out.sort();
    out
}

fn walk(prefix: &str, errors: &ValidationErrors, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                for err in errs {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string());
                    out.push(format!("{path}: {message}"));
                }
            }
            ValidationErrorsKind::Struct(inner) => walk(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    walk(&format!("{path}[{index}]"), inner, out);
                }
            }
        }
    }
}

/// Required string: non-blank and within the length limit
pub fn check_required_text(value: &str, field: &str, max_len: usize) -> Option<String> {
    if value.trim().is_empty() {
        return Some(format!("{field} must not be empty"));
    }
    check_len(value, field, max_len)
}

/// Optional string: within the length limit when present
pub fn check_optional_text(value: Option<&str>, field: &str, max_len: usize) -> Option<String> {
    value.and_then(|v| check_len(v, field, max_len))
}

fn check_len(value: &str, field: &str, max_len: usize) -> Option<String> {
    let len = value.chars().count();
    (len > max_len).then(|| format!("{field} is too long ({len} chars, max {max_len})"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Line {
        #[validate(range(min = 1, max = 10, message = "quantity must be between 1 and 10"))]
        quantity: i32,
    }

    #[derive(Validate)]
    struct Request {
        #[validate(range(min = 1, message = "tableId must be positive"))]
        table_id: i64,
        #[validate(nested)]
        lines: Vec<Line>,
    }

    #[test]
    fn test_collect_violations_nested() {
        let req = Request {
            table_id: 0,
            lines: vec![Line { quantity: 2 }, Line { quantity: 11 }],
        };
        let errors = req.validate().unwrap_err();
        let violations = collect_violations(&errors);

        assert_eq!(
            violations,
            vec![
                "lines[1].quantity: quantity must be between 1 and 10".to_string(),
                "table_id: tableId must be positive".to_string(),
            ]
        );
    }

    #[test]
    fn test_text_checks() {
        assert!(check_required_text("Pizza", "name", 10).is_none());
        assert_eq!(
            check_required_text("  ", "name", 10).as_deref(),
            Some("name must not be empty")
        );
        assert!(check_required_text("abcdefghijk", "name", 10).is_some());

        assert!(check_optional_text(None, "remarks", 3).is_none());
        assert!(check_optional_text(Some("abcd"), "remarks", 3).is_some());
    }
}
