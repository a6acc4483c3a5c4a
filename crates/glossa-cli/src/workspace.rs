//! A project directory: its config, registry and persistent store.

use glossa_core::{GlossaConfig, GlossaryId, GlossaryRecord, RelationTypeRegistry, TermId, TermRecord};
use glossa_export::SemanticExporter;
use glossa_graph::{GraphTraversal, RelationService, SledEdgeStore, TermDirectory};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

pub struct Workspace {
    pub root: PathBuf,
    pub config: GlossaConfig,
    pub registry: Arc<RelationTypeRegistry>,
    pub store: Arc<SledEdgeStore>,
}

impl Workspace {
    /// Opens the project at `root` and installs its registry process-wide.
    pub fn open(root: &Path) -> Result<Self> {
        let config = GlossaConfig::load_or_default(root)?;
        let registry = glossa_core::install(config.registry()?)?;
        Self::open_with(root, config, registry)
    }

    pub fn open_with(root: &Path, config: GlossaConfig, registry: Arc<RelationTypeRegistry>) -> Result<Self> {
        let store_path = config.store_path_in(root);
        debug!("Opening store at {}", store_path.display());
        let store = Arc::new(SledEdgeStore::open(&store_path)?);

        Ok(Self {
            root: root.to_path_buf(),
            config,
            registry,
            store,
        })
    }

    pub fn relations(&self) -> RelationService<SledEdgeStore> {
        RelationService::new(self.store.clone(), self.registry.clone())
            .with_timeout(self.config.operation_timeout())
    }

    pub fn traversal(&self) -> GraphTraversal<SledEdgeStore> {
        GraphTraversal::new(self.store.clone(), self.registry.clone())
            .with_timeout(self.config.operation_timeout())
            .with_max_nodes(self.config.max_graph_nodes)
    }

    pub fn exporter(&self) -> SemanticExporter<SledEdgeStore> {
        SemanticExporter::new(self.store.clone(), self.registry.clone(), self.config.base_uri.clone())
    }

    pub async fn glossary(&self, id: &str) -> Result<GlossaryRecord> {
        self.store
            .glossary(&GlossaryId::new(id))
            .await?
            .ok_or_else(|| format!("Glossary not found: {}", id).into())
    }

    /// Finds a live term by id, then by fully qualified name.
    pub async fn resolve_term(&self, key: &str) -> Result<TermRecord> {
        let found = match self.store.term(&TermId::new(key)).await? {
            Some(term) => Some(term),
            None => self.store.term_by_fqn(key).await?,
        };

        found
            .filter(|t| !t.deleted)
            .ok_or_else(|| format!("Term not found: {}", key).into())
    }

    pub async fn flush(&self) -> Result<()> {
        self.store.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(dir: &Path) -> Workspace {
        Workspace::open_with(dir, GlossaConfig::default(), Arc::new(RelationTypeRegistry::builtin())).unwrap()
    }

    #[tokio::test]
    async fn test_resolve_term_by_id_or_fqn() {
        let dir = tempfile::tempdir().unwrap();
        let ws = open(dir.path());

        let finance = GlossaryRecord::new("finance", "Finance");
        ws.store.put_glossary(&finance).unwrap();
        ws.store.put_term(&TermRecord::new("t1", &finance, "Revenue")).unwrap();

        assert_eq!(ws.resolve_term("t1").await.unwrap().name, "Revenue");
        assert_eq!(ws.resolve_term("Finance.Revenue").await.unwrap().id.as_str(), "t1");

        ws.store.delete_term(&TermId::new("t1")).unwrap();
        let err = ws.resolve_term("t1").await.unwrap_err();
        assert_eq!(err.to_string(), "Term not found: t1");
    }

    #[tokio::test]
    async fn test_store_lives_under_project_root() {
        let dir = tempfile::tempdir().unwrap();
        let ws = open(dir.path());
        ws.flush().await.unwrap();

        assert!(dir.path().join(".glossa").join("store").exists());
        assert!(ws.glossary("missing").await.is_err());
    }
}
