//! Output formatting utilities.

use matcherfix_core::Difference;
use serde_json::{json, Value};

/// Prints a table header followed by a rule.
pub fn print_table_header(columns: &[(&str, usize)]) {
    let mut line = String::new();
    for (name, width) in columns {
        line.push_str(&format!("{:<width$} ", name, width = width));
    }
    let line = line.trim_end();
    println!("{}", line);
    println!("{}", "-".repeat(line.len().max(20)));
}

/// Formats one difference as JSON.
pub fn difference_json(difference: &Difference) -> Value {
    json!({
        "path": difference.path,
        "left": difference.left,
        "right": difference.right,
    })
}

/// Indented one-difference-per-line listing.
pub fn format_differences(differences: &[Difference]) -> String {
    differences
        .iter()
        .map(|d| format!("  {}", d))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate("tenant", 10), "tenant");
        assert_eq!(truncate("a-very-long-tenant", 10), "a-very-...");
    }

    #[test]
    fn differences_are_indented() {
        let differences = vec![
            Difference {
                path: "route.receiver".into(),
                left: "\"a\"".into(),
                right: "\"b\"".into(),
            },
            Difference {
                path: "templates[0]".into(),
                left: "\"x\"".into(),
                right: "<missing>".into(),
            },
        ];
        assert_eq!(
            format_differences(&differences),
            "  route.receiver: \"a\" != \"b\"\n  templates[0]: \"x\" != <missing>"
        );
        assert_eq!(difference_json(&differences[1])["right"], "<missing>");
    }
}
