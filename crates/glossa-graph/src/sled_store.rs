//! Persistent edge store on sled.
//!
//! Layout:
//! - `terms`: term id -> bincode `TermRecord`
//! - `fqns`: fully qualified name -> term id
//! - `glossaries`: glossary id -> bincode `GlossaryRecord`
//! - `edges`: `from \x1f type \x1f to` -> empty
//!
//! Edge keys sort by source then type, so outgoing edges (optionally
//! for one type) are a single prefix scan.

use crate::edge::{EdgeOp, RelationEdge};
use crate::error::StoreError;
use crate::store::{type_matches, EdgeStore, TermDirectory};
use async_trait::async_trait;
use glossa_core::{GlossaryId, GlossaryRecord, TermId, TermRecord};
use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::{Db, Tree};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

const KEY_SEPARATOR: u8 = 0x1f;

pub struct SledEdgeStore {
    db: Db,
    terms: Tree,
    fqns: Tree,
    glossaries: Tree,
    edges: Tree,
}

fn edge_key(edge: &RelationEdge) -> Vec<u8> {
    let mut key = source_prefix(&edge.from, Some(&edge.relation_type));
    key.extend_from_slice(edge.to.as_str().as_bytes());
    key
}

fn source_prefix(from: &TermId, relation_type: Option<&str>) -> Vec<u8> {
    let mut key = Vec::with_capacity(64);
    key.extend_from_slice(from.as_str().as_bytes());
    key.push(KEY_SEPARATOR);
    if let Some(relation_type) = relation_type {
        key.extend_from_slice(relation_type.as_bytes());
        key.push(KEY_SEPARATOR);
    }
    key
}

/// Ids go into edge keys verbatim, so they may not contain the separator.
fn check_id(id: &TermId) -> Result<(), StoreError> {
    if id.as_str().as_bytes().contains(&KEY_SEPARATOR) {
        return Err(StoreError::InvalidId(id.to_string()));
    }
    Ok(())
}

fn parse_edge_key(key: &[u8]) -> Option<RelationEdge> {
    let mut parts = key.splitn(3, |&b| b == KEY_SEPARATOR);
    let from = std::str::from_utf8(parts.next()?).ok()?;
    let relation_type = std::str::from_utf8(parts.next()?).ok()?;
    let to = std::str::from_utf8(parts.next()?).ok()?;
    Some(RelationEdge::new(from, to, relation_type))
}

impl SledEdgeStore {
    /// Opens or creates a store at the specified path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        Ok(Self {
            terms: db.open_tree("terms")?,
            fqns: db.open_tree("fqns")?,
            glossaries: db.open_tree("glossaries")?,
            edges: db.open_tree("edges")?,
            db,
        })
    }

    pub fn put_glossary(&self, glossary: &GlossaryRecord) -> Result<(), StoreError> {
        let bytes = bincode::serialize(glossary)?;
        self.glossaries.insert(glossary.id.as_str(), bytes)?;
        Ok(())
    }

    /// Inserts or replaces a term record and its FQN index entry.
    pub fn put_term(&self, term: &TermRecord) -> Result<(), StoreError> {
        check_id(&term.id)?;
        if let Some(previous) = self.load_term(&term.id)? {
            if previous.fully_qualified_name != term.fully_qualified_name {
                self.fqns.remove(previous.fully_qualified_name.as_str())?;
            }
        }

        let bytes = bincode::serialize(term)?;
        self.terms.insert(term.id.as_str(), bytes)?;
        self.fqns
            .insert(term.fully_qualified_name.as_str(), term.id.as_str())?;
        Ok(())
    }

    /// Soft-deletes a term.
    pub fn delete_term(&self, id: &TermId) -> Result<(), StoreError> {
        let mut term = self
            .load_term(id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        term.deleted = true;
        self.put_term(&term)
    }

    /// Flushes pending writes to disk.
    pub async fn flush(&self) -> Result<(), StoreError> {
        self.db.flush_async().await?;
        Ok(())
    }

    fn load_term(&self, id: &TermId) -> Result<Option<TermRecord>, StoreError> {
        match self.terms.get(id.as_str())? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    fn check_endpoints(&self, edge: &RelationEdge) -> Result<(), StoreError> {
        for id in [&edge.from, &edge.to] {
            check_id(id)?;
            if !self.terms.contains_key(id.as_str())? {
                return Err(StoreError::NotFound(id.to_string()));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl TermDirectory for SledEdgeStore {
    async fn term(&self, id: &TermId) -> Result<Option<TermRecord>, StoreError> {
        self.load_term(id)
    }

    async fn term_by_fqn(&self, fqn: &str) -> Result<Option<TermRecord>, StoreError> {
        match self.fqns.get(fqn)? {
            Some(id) => {
                let id = String::from_utf8_lossy(&id).into_owned();
                self.load_term(&TermId::new(id))
            }
            None => Ok(None),
        }
    }

    async fn glossary(&self, id: &GlossaryId) -> Result<Option<GlossaryRecord>, StoreError> {
        match self.glossaries.get(id.as_str())? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn terms_in_glossary(&self, id: &GlossaryId) -> Result<Vec<TermRecord>, StoreError> {
        let mut terms = Vec::new();
        for entry in self.terms.iter() {
            let (_, bytes) = entry?;
            let term: TermRecord = bincode::deserialize(&bytes)?;
            if &term.glossary == id && !term.deleted {
                terms.push(term);
            }
        }
        terms.sort_by(|a, b| a.fully_qualified_name.cmp(&b.fully_qualified_name));
        Ok(terms)
    }
}

#[async_trait]
impl EdgeStore for SledEdgeStore {
    async fn add_edge(&self, edge: &RelationEdge) -> Result<bool, StoreError> {
        self.check_endpoints(edge)?;
        let previous = self.edges.insert(edge_key(edge), Vec::<u8>::new())?;
        Ok(previous.is_none())
    }

    async fn remove_edge(&self, edge: &RelationEdge) -> Result<bool, StoreError> {
        Ok(self.edges.remove(edge_key(edge))?.is_some())
    }

    async fn edges_from(
        &self,
        term: &TermId,
        types: Option<&[String]>,
    ) -> Result<Vec<RelationEdge>, StoreError> {
        // A single requested type narrows the scan to its own prefix.
        let prefix = match types {
            Some([only]) => source_prefix(term, Some(only.as_str())),
            _ => source_prefix(term, None),
        };

        let mut edges = Vec::new();
        for entry in self.edges.scan_prefix(prefix) {
            let (key, _) = entry?;
            if let Some(edge) = parse_edge_key(&key) {
                if type_matches(types, &edge.relation_type) {
                    edges.push(edge);
                }
            }
        }
        Ok(edges)
    }

    async fn all_edges(&self) -> Result<Vec<RelationEdge>, StoreError> {
        let mut edges = Vec::new();
        for entry in self.edges.iter() {
            let (key, _) = entry?;
            if let Some(edge) = parse_edge_key(&key) {
                edges.push(edge);
            }
        }
        Ok(edges)
    }

    /// Writes the whole batch in one sled transaction.
    async fn apply(&self, ops: &[EdgeOp]) -> Result<Vec<bool>, StoreError> {
        for op in ops {
            if let EdgeOp::Add(edge) = op {
                self.check_endpoints(edge)?;
            }
        }

        let result: Result<Vec<bool>, TransactionError<()>> = self.edges.transaction(|tx| {
            let mut applied = Vec::with_capacity(ops.len());
            for op in ops {
                let changed = match op {
                    EdgeOp::Add(edge) => tx.insert(edge_key(edge), Vec::<u8>::new())?.is_none(),
                    EdgeOp::Remove(edge) => tx.remove(edge_key(edge))?.is_some(),
                };
                applied.push(changed);
            }
            Ok::<_, ConflictableTransactionError<()>>(applied)
        });

        match result {
            Ok(applied) => {
                debug!("Applied {} edge writes atomically", applied.len());
                Ok(applied)
            }
            Err(TransactionError::Storage(err)) => Err(StoreError::Sled(err)),
            Err(TransactionError::Abort(())) => {
                Err(StoreError::Unavailable("edge transaction aborted".into()))
            }
        }
    }

    async fn usage_counts(&self) -> Result<HashMap<String, usize>, StoreError> {
        let mut counts = HashMap::new();
        for entry in self.edges.iter() {
            let (key, _) = entry?;
            if let Some(edge) = parse_edge_key(&key) {
                *counts.entry(edge.relation_type).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }
}
