//! Header reconciliation against the canonical schema.
//!
//! Each canonical column is matched to at most one raw header, and each raw
//! header is claimed at most once. Rules are applied in order of strictness:
//! an exact match always beats a case-insensitive one, which beats a match on
//! the normalized key (lower-cased, spaces and underscores removed).

use serde::{Deserialize, Serialize};
use st_common::Column;

/// The rule that bound a raw header to a canonical column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
    Exact,
    CaseInsensitive,
    Normalized,
}

impl MatchRule {
    const ORDER: [MatchRule; 3] = [
        MatchRule::Exact,
        MatchRule::CaseInsensitive,
        MatchRule::Normalized,
    ];

    fn matches(self, header: &str, canonical: &str) -> bool {
        match self {
            MatchRule::Exact => header == canonical,
            MatchRule::CaseInsensitive => header.eq_ignore_ascii_case(canonical),
            MatchRule::Normalized => normalized_key(header) == normalized_key(canonical),
        }
    }
}

/// A raw header that was renamed onto a canonical column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRename {
    pub from: String,
    pub to: Column,
    pub rule: MatchRule,
}

/// Result of reconciling one header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    /// Raw column index bound to each canonical column, in `Column::ALL` order.
    pub sources: [Option<usize>; 9],
    pub renamed: Vec<ColumnRename>,
    /// Raw headers not bound to any canonical column.
    pub dropped: Vec<String>,
}

impl ColumnMapping {
    pub fn source_of(&self, column: Column) -> Option<usize> {
        let slot = Column::ALL.iter().position(|c| *c == column)?;
        self.sources[slot]
    }

    /// Canonical columns with no raw source.
    pub fn unresolved(&self) -> Vec<Column> {
        Column::ALL
            .iter()
            .zip(&self.sources)
            .filter(|(_, src)| src.is_none())
            .map(|(c, _)| *c)
            .collect()
    }
}

/// Trim whitespace and strip quote characters from a header.
pub fn clean_header(raw: &str) -> String {
    raw.trim().replace(['"', '\''], "").trim().to_string()
}

/// Lower-case with spaces and underscores removed.
pub fn normalized_key(name: &str) -> String {
    name.chars()
        .filter(|c| *c != ' ' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Bind cleaned headers to canonical columns.
pub fn reconcile(headers: &[String]) -> ColumnMapping {
    let mut mapping = ColumnMapping::default();
    let mut claimed = vec![false; headers.len()];

    for rule in MatchRule::ORDER {
        for (slot, column) in Column::ALL.iter().enumerate() {
            if mapping.sources[slot].is_some() {
                continue;
            }
            let found = headers
                .iter()
                .enumerate()
                .find(|(idx, h)| !claimed[*idx] && rule.matches(h, column.name()));
            if let Some((idx, header)) = found {
                claimed[idx] = true;
                mapping.sources[slot] = Some(idx);
                if rule != MatchRule::Exact {
                    mapping.renamed.push(ColumnRename {
                        from: header.clone(),
                        to: *column,
                        rule,
                    });
                }
            }
        }
    }

    mapping.dropped = headers
        .iter()
        .zip(&claimed)
        .filter(|(_, c)| !**c)
        .map(|(h, _)| h.clone())
        .collect();
    mapping
}
