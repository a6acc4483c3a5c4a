//! The relation cell of tabular import/export.
//!
//! A cell lists a term's outgoing relations as `type:targetFqn` entries
//! joined by `;`. Entries of the registry's default type drop the
//! prefix and carry only the target FQN:
//!
//! ```text
//! synonym:Finance.Income;Finance.Profit;broader:Finance.Metrics
//! ```
//!
//! FQNs may contain `:` themselves, so a prefix is only split off when
//! it names a registered type and contains no `.`.

use crate::error::ExportError;
use glossa_core::{RelationTypeRegistry, TermId};
use glossa_graph::{EdgeStore, RelationService};

pub const ENTRY_DELIMITER: char = ';';
pub const TYPE_SEPARATOR: char = ':';

/// One relation as it appears in a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellEntry {
    pub relation_type: String,
    pub target_fqn: String,
}

impl CellEntry {
    pub fn new(relation_type: impl Into<String>, target_fqn: impl Into<String>) -> Self {
        Self {
            relation_type: relation_type.into(),
            target_fqn: target_fqn.into(),
        }
    }
}

/// Encodes and decodes relation cells against a registry.
#[derive(Debug, Clone, Copy)]
pub struct TabularCodec<'a> {
    registry: &'a RelationTypeRegistry,
}

impl<'a> TabularCodec<'a> {
    pub fn new(registry: &'a RelationTypeRegistry) -> Self {
        Self { registry }
    }

    pub fn encode_cell(&self, entries: &[CellEntry]) -> String {
        let default = self.registry.default_type().name.as_str();

        entries
            .iter()
            .map(|entry| {
                if entry.relation_type == default {
                    entry.target_fqn.clone()
                } else {
                    format!("{}{}{}", entry.relation_type, TYPE_SEPARATOR, entry.target_fqn)
                }
            })
            .collect::<Vec<_>>()
            .join(ENTRY_DELIMITER.to_string().as_str())
    }

    /// Splits a cell into entries. Blank entries are skipped.
    pub fn decode_cell(&self, cell: &str) -> Vec<CellEntry> {
        let default = &self.registry.default_type().name;

        cell.split(ENTRY_DELIMITER)
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| match self.known_prefix(entry) {
                Some((relation_type, target)) => CellEntry::new(relation_type, target.trim()),
                None => CellEntry::new(default.clone(), entry),
            })
            .collect()
    }

    /// The type prefix of an entry, if it names a registered type.
    fn known_prefix<'e>(&self, entry: &'e str) -> Option<(&'e str, &'e str)> {
        let (prefix, rest) = entry.split_once(TYPE_SEPARATOR)?;
        if prefix.contains('.') || !self.registry.is_valid(prefix) {
            return None;
        }
        Some((prefix, rest))
    }

    /// Returns the prefix of an entry that looks like a type name but is
    /// not registered, e.g. `invalidType` in `invalidType:Finance.Income`.
    pub fn unknown_prefix<'e>(&self, entry: &'e str) -> Option<&'e str> {
        let (prefix, _) = entry.split_once(TYPE_SEPARATOR)?;
        let prefix = prefix.trim();
        if glossa_core::is_valid_type_name(prefix) && !self.registry.is_valid(prefix) {
            Some(prefix)
        } else {
            None
        }
    }
}

/// Builds the relation cell for one term from its stored edges.
pub async fn relations_cell<S: EdgeStore + ?Sized>(
    service: &RelationService<S>,
    term: &TermId,
) -> Result<String, ExportError> {
    let entries: Vec<CellEntry> = service
        .relations_of(term)
        .await?
        .into_iter()
        .map(|related| CellEntry::new(related.relation_type, related.term.fully_qualified_name))
        .collect();

    Ok(TabularCodec::new(service.registry()).encode_cell(&entries))
}
