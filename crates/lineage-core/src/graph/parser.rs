//! Parser for line-oriented graph descriptions.
//!
//! Each line declares one node, optionally with a comma-separated parent
//! list: `NODE` or `NODE: PARENT1, PARENT2`. Names are case-sensitive ASCII
//! alphanumerics.

use rustc_hash::FxHashSet;

use crate::error::{Error, Result};

/// Parsed declaration records: node name paired with its ordered parent list.
///
/// Declaration order is preserved so identical inputs build identical
/// internal structures.
pub type ParsedGraph = Vec<(String, Vec<String>)>;

/// Parse a graph description into node/parent-list records.
///
/// Fails with [`Error::EmptyInput`] on whitespace-only input,
/// [`Error::InvalidNodeName`] on any malformed declared or referenced name,
/// and [`Error::DuplicateNode`] the moment a name is declared a second time.
pub fn parse_graph(input: &str) -> Result<ParsedGraph> {
    if input.trim().is_empty() {
        return Err(Error::EmptyInput);
    }

    let mut records: ParsedGraph = Vec::new();
    let mut seen: FxHashSet<String> = FxHashSet::default();

    for line in input.trim().lines() {
        if line.trim().is_empty() {
            continue;
        }

        let (name_part, parents_part) = match line.split_once(':') {
            Some((lhs, rhs)) => (lhs, Some(rhs)),
            None => (line, None),
        };

        let node = validate_name(name_part)?;
        if !seen.insert(node.clone()) {
            return Err(Error::DuplicateNode(node));
        }

        let parents = match parents_part {
            Some(rhs) => rhs
                .split(',')
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(validate_name)
                .collect::<Result<Vec<String>>>()?,
            None => Vec::new(),
        };

        records.push((node, parents));
    }

    Ok(records)
}

/// Trim a raw token and check it fully matches `[A-Za-z0-9]+`.
fn validate_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(Error::InvalidNodeName(name.to_string()));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_node_without_parents() {
        let records = parse_graph("A:").unwrap();
        assert_eq!(records, vec![("A".to_string(), vec![])]);
    }

    #[test]
    fn bare_node_line_without_colon() {
        let records = parse_graph("A").unwrap();
        assert_eq!(records, vec![("A".to_string(), vec![])]);
    }

    #[test]
    fn parents_are_trimmed_and_ordered() {
        let records = parse_graph("A:\nB: A\nC:  B ,A ").unwrap();
        assert_eq!(records[2].0, "C");
        assert_eq!(records[2].1, vec!["B".to_string(), "A".to_string()]);
    }

    #[test]
    fn empty_parent_tokens_are_dropped() {
        let records = parse_graph("A:\nB: A, ,").unwrap();
        assert_eq!(records[1].1, vec!["A".to_string()]);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let records = parse_graph("A:\n\nB: A\n").unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(parse_graph(""), Err(Error::EmptyInput)));
        assert!(matches!(parse_graph("  \n\t\n"), Err(Error::EmptyInput)));
    }

    #[test]
    fn duplicate_declaration_is_rejected() {
        let err = parse_graph("A:\nB: A\nB: C").unwrap_err();
        assert!(matches!(err, Error::DuplicateNode(name) if name == "B"));
    }

    #[test]
    fn duplicate_rejected_even_with_identical_parent_lists() {
        let err = parse_graph("A:\nB: A\nB: A").unwrap_err();
        assert!(matches!(err, Error::DuplicateNode(_)));
    }

    #[test]
    fn invalid_declared_name_is_rejected() {
        let err = parse_graph("A1:\nB-2: A1").unwrap_err();
        assert!(matches!(err, Error::InvalidNodeName(name) if name == "B-2"));
    }

    #[test]
    fn invalid_parent_name_is_rejected() {
        let err = parse_graph("A:\nB: a_b").unwrap_err();
        assert!(matches!(err, Error::InvalidNodeName(name) if name == "a_b"));
    }

    #[test]
    fn name_with_interior_whitespace_is_rejected() {
        assert!(matches!(
            parse_graph("A B:"),
            Err(Error::InvalidNodeName(_))
        ));
    }

    #[test]
    fn names_are_case_sensitive() {
        let records = parse_graph("a:\nA: a").unwrap();
        assert_eq!(records.len(), 2);
    }
}
