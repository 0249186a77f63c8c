//! Invariants-document parsing.
//!
//! Entries are heading-delimited:
//!
//! ```text
//! ## INV-001: Tokens must be validated before use
//! ```
//!
//! Only the identifiers are extracted. Rule statements, rationale and
//! examples are for humans; their content is never validated.

use std::sync::OnceLock;

use regex::Regex;

fn heading_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^#{2,4}\s*\[?([A-Z][A-Z0-9]*-\d+)\]?\b").expect("static regex")
    })
}

/// Extracts invariant identifiers from an invariants document, in order.
pub fn parse_invariants_document(content: &str) -> Vec<String> {
    heading_id_re()
        .captures_iter(content)
        .map(|c| c[1].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "\
# Invariants

## INV-001: Tokens must be validated before use
Rationale: expired tokens caused the 2023 auth incident.

### INV-002: Session store writes are idempotent
Example:
```python
store.put(key, value)
```

## Background
Prose without an identifier.

## [INV-010] Bracketed style
";

    #[test]
    fn extracts_identifiers_in_order() {
        assert_eq!(
            parse_invariants_document(DOC),
            vec!["INV-001", "INV-002", "INV-010"]
        );
    }

    #[test]
    fn prose_headings_are_not_identifiers() {
        assert!(parse_invariants_document("## Overview\n## Notes\n").is_empty());
    }
}
