//! Node id grammar and classification.
//!
//! Three spellings, case-insensitive, zero never a valid digit:
//!
//! - `loe<n>`      top-level group (Line of Effort)
//! - `o<n>.<n>`    objective; the leading number names its group
//! - `io<n>.<n>.<n>` sub-objective; the leading number names its group
//!
//! Ids are canonicalized to lowercase everywhere the model compares or
//! stores them; the sheet's original spelling survives only as a label.

use regex::Regex;
use serde::Serialize;

/// Canonical (lowercase) node identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Lowercase the raw spelling. Does not check the grammar; pattern
    /// checks happen in [`IdPatterns::classify`] or against the loaded id
    /// set, depending on where the raw text came from.
    pub fn canonical(raw: &str) -> Self {
        NodeId(raw.trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Structural role encoded by an id's spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IdKind {
    Group,
    Objective,
    SubObjective,
}

/// A classified id: canonical form, role, and (for work items) the group id
/// derived from the leading number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedId {
    pub id: NodeId,
    pub kind: IdKind,
    /// `None` for groups.
    pub group: Option<NodeId>,
}

/// Compiled id patterns. Anchored, applied to the canonical lowercase form.
pub struct IdPatterns {
    group: Regex,
    objective: Regex,
    sub_objective: Regex,
}

impl IdPatterns {
    pub fn new() -> crate::Result<Self> {
        Ok(IdPatterns {
            group: Regex::new(r"^loe([1-9]+)$")?,
            objective: Regex::new(r"^o([1-9]+)\.[1-9]+$")?,
            sub_objective: Regex::new(r"^io([1-9]+)\.[1-9]+\.[1-9]+$")?,
        })
    }

    /// Classify a raw id cell; `None` when it matches no pattern.
    pub fn classify(&self, raw: &str) -> Option<ParsedId> {
        let id = NodeId::canonical(raw);
        if self.group.is_match(id.as_str()) {
            return Some(ParsedId {
                id,
                kind: IdKind::Group,
                group: None,
            });
        }
        for (kind, pattern) in [
            (IdKind::Objective, &self.objective),
            (IdKind::SubObjective, &self.sub_objective),
        ] {
            if let Some(caps) = pattern.captures(id.as_str()) {
                let group = NodeId(format!("loe{}", &caps[1]));
                return Some(ParsedId {
                    id,
                    kind,
                    group: Some(group),
                });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn patterns() -> IdPatterns {
        IdPatterns::new().unwrap()
    }

    #[test]
    fn classifies_all_three_kinds() {
        let p = patterns();

        let g = p.classify("LOE2").unwrap();
        assert_eq!(g.id, NodeId::canonical("loe2"));
        assert_eq!(g.kind, IdKind::Group);
        assert_eq!(g.group, None);

        let o = p.classify("O2.1").unwrap();
        assert_eq!(o.id, NodeId::canonical("o2.1"));
        assert_eq!(o.kind, IdKind::Objective);
        assert_eq!(o.group, Some(NodeId::canonical("loe2")));

        let io = p.classify("io3.1.4").unwrap();
        assert_eq!(io.kind, IdKind::SubObjective);
        assert_eq!(io.group, Some(NodeId::canonical("loe3")));
    }

    #[test]
    fn case_and_surrounding_space_are_ignored() {
        let p = patterns();
        assert_eq!(
            p.classify("  Io1.2.3 ").unwrap().id,
            NodeId::canonical("io1.2.3")
        );
        assert_eq!(p.classify("LoE7").unwrap().kind, IdKind::Group);
    }

    #[test]
    fn zero_digits_and_malformed_ids_are_rejected() {
        let p = patterns();
        for bad in [
            "loe0", "o0.1", "o1.0", "io1.0.1", "loe", "o1", "o1.", "o1.1.1", "io1.1",
            "loe1x", "xo1.1", "", "objective one",
        ] {
            assert_eq!(p.classify(bad), None, "{bad:?} should not classify");
        }
    }

    #[test]
    fn multi_digit_segments_classify() {
        let p = patterns();
        let o = p.classify("o12.34").unwrap();
        assert_eq!(o.group, Some(NodeId::canonical("loe12")));
        assert!(p.classify("io11.22.33").is_some());
    }
}
