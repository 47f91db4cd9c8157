//! The interdependency links file.
//!
//! Interdependencies never come from the sheet; they are authored in a small
//! JSON sidecar and merged into the model at build time:
//!
//! ```json
//! { "interdependencies": [["o1.1", "o1.2"], ["io2.1.1", "io1.1.1"]] }
//! ```
//!
//! A pair is undirected: `[a, b]` and `[b, a]` declare the same edge, and
//! repeating either spelling changes nothing.

use std::collections::BTreeSet;

use serde::Deserialize;

use crate::error::LoadError;
use crate::plan::id::NodeId;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkSpec {
    #[serde(default)]
    pub interdependencies: Vec<[String; 2]>,
}

impl LinkSpec {
    pub fn parse(text: &str) -> Result<Self, LoadError> {
        serde_json::from_str(text).map_err(|e| LoadError::Unreadable(format!("links file: {e}")))
    }

    /// Canonicalize pairs and check them against the loaded id set.
    /// Reversed and repeated declarations collapse to one pair; the first
    /// spelling seen decides the stored orientation.
    pub fn resolve(&self, ids: &BTreeSet<NodeId>) -> Result<Vec<(NodeId, NodeId)>, LoadError> {
        let mut seen: BTreeSet<(NodeId, NodeId)> = BTreeSet::new();
        let mut pairs = Vec::new();
        for [a, b] in &self.interdependencies {
            let a = NodeId::canonical(a);
            let b = NodeId::canonical(b);
            if a == b {
                return Err(LoadError::Link {
                    a,
                    b,
                    detail: "a node cannot be interdependent with itself".to_string(),
                });
            }
            for end in [&a, &b] {
                if !ids.contains(end) {
                    return Err(LoadError::Link {
                        a: a.clone(),
                        b: b.clone(),
                        detail: format!("unknown id {end}"),
                    });
                }
            }
            let key = if a <= b {
                (a.clone(), b.clone())
            } else {
                (b.clone(), a.clone())
            };
            if seen.insert(key) {
                pairs.push((a, b));
            }
        }
        Ok(pairs)
    }
}
