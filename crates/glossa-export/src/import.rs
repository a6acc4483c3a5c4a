//! Row-by-row relation import from tabular data.
//!
//! Each row names a source term and carries a relation cell. A row is
//! checked in full before anything is written; a bad row is reported
//! and skipped while the remaining rows still commit.

use crate::tabular::{TabularCodec, ENTRY_DELIMITER};
use glossa_core::{TermId, TermRecord};
use glossa_graph::{EdgeStore, RelationService};
use serde::Serialize;
use tracing::{debug, warn};

/// One input row: the source term's FQN and its relation cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRow {
    /// 1-based row number, reported back in failures.
    pub row: usize,
    pub source_fqn: String,
    pub cell: String,
}

impl ImportRow {
    pub fn new(row: usize, source_fqn: impl Into<String>, cell: impl Into<String>) -> Self {
        Self {
            row,
            source_fqn: source_fqn.into(),
            cell: cell.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowFailure {
    pub row: usize,
    pub reason: String,
}

/// Summary of an import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub rows_processed: usize,
    pub rows_passed: usize,
    pub rows_failed: usize,

    /// Relations written (a relation and its inverse count once).
    pub relations_added: usize,

    pub failures: Vec<RowFailure>,
}

impl ImportReport {
    /// `success`, `partialSuccess` or `failure`.
    pub fn status(&self) -> &'static str {
        match (self.rows_passed, self.rows_failed) {
            (_, 0) => "success",
            (0, _) => "failure",
            _ => "partialSuccess",
        }
    }

    fn fail(&mut self, row: usize, reason: impl Into<String>) {
        let reason = reason.into();
        warn!("Import row {} failed: {}", row, reason);
        self.rows_failed += 1;
        self.failures.push(RowFailure { row, reason });
    }
}

/// Applies relation cells through a [`RelationService`].
pub struct RelationImporter<'a, S: ?Sized> {
    service: &'a RelationService<S>,
}

impl<'a, S: EdgeStore + ?Sized> RelationImporter<'a, S> {
    pub fn new(service: &'a RelationService<S>) -> Self {
        Self { service }
    }

    pub async fn import<I>(&self, rows: I) -> ImportReport
    where
        I: IntoIterator<Item = ImportRow>,
    {
        let mut report = ImportReport::default();

        for row in rows {
            report.rows_processed += 1;
            match self.import_row(&row).await {
                Ok(added) => {
                    report.rows_passed += 1;
                    report.relations_added += added;
                }
                Err(reason) => report.fail(row.row, reason),
            }
        }

        debug!(
            "Import finished: {} processed, {} passed, {} failed",
            report.rows_processed, report.rows_passed, report.rows_failed
        );
        report
    }

    async fn import_row(&self, row: &ImportRow) -> Result<usize, String> {
        let source = self
            .lookup(&row.source_fqn)
            .await?
            .ok_or_else(|| format!("Term not found: {}", row.source_fqn))?;

        let codec = TabularCodec::new(self.service.registry());
        let mut resolved: Vec<(TermId, String)> = Vec::new();

        // Every entry must pass validation before any of them is written.
        for (entry, raw) in codec
            .decode_cell(&row.cell)
            .into_iter()
            .zip(row.cell.split(ENTRY_DELIMITER).map(str::trim).filter(|e| !e.is_empty()))
        {
            let target = match self.lookup(&entry.target_fqn).await? {
                Some(target) => target,
                None => {
                    return Err(match codec.unknown_prefix(raw) {
                        Some(prefix) => format!("Invalid relation type: {}", prefix),
                        None => format!("Term not found: {}", entry.target_fqn),
                    })
                }
            };
            let ty = self
                .service
                .validate(&source.id, &target.id, &entry.relation_type)
                .await
                .map_err(|e| e.to_string())?;
            resolved.push((target.id, ty.name));
        }

        let mut added = 0;
        for (target, relation_type) in resolved {
            let outcome = self
                .service
                .add_relation(&source.id, &target, &relation_type)
                .await
                .map_err(|e| e.to_string())?;
            if !outcome.is_noop() {
                added += 1;
            }
        }
        Ok(added)
    }

    async fn lookup(&self, fqn: &str) -> Result<Option<TermRecord>, String> {
        self.service
            .term_by_fqn(fqn)
            .await
            .map_err(|e| e.to_string())
    }
}
