use formfill_common::protocol::CachedTemplate;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::fs;

pub type TemplateMap = HashMap<String, CachedTemplate>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Whole-map persistence seam for the template cache. Every cache operation
/// loads and saves the full map, so each one is atomic with respect to the
/// others under the serial single-session access model.
#[async_trait::async_trait]
pub trait TemplateStore: Send + Sync {
    async fn load(&self) -> Result<TemplateMap, StoreError>;
    async fn save(&self, map: &TemplateMap) -> Result<(), StoreError>;
}

/// In-memory store. Cloning shares the underlying map, which is how tests
/// plant entries and inspect what the cache persisted.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<TemplateMap>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, template: CachedTemplate) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(template.key.clone(), template);
    }

    pub fn snapshot(&self) -> TemplateMap {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl TemplateStore for MemoryStore {
    async fn load(&self) -> Result<TemplateMap, StoreError> {
        Ok(self.entries.lock().unwrap().clone())
    }

    async fn save(&self, map: &TemplateMap) -> Result<(), StoreError> {
        *self.entries.lock().unwrap() = map.clone();
        Ok(())
    }
}

/// JSON-file-backed store, one file for the whole template namespace.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".formfill")
            .join("templates.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl TemplateStore for FileStore {
    async fn load(&self) -> Result<TemplateMap, StoreError> {
        if !self.path.exists() {
            return Ok(TemplateMap::new());
        }
        let content = fs::read_to_string(&self.path).await?;
        let map = serde_json::from_str(&content)?;
        Ok(map)
    }

    async fn save(&self, map: &TemplateMap) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(map)?;
        fs::write(&self.path, json).await?;
        Ok(())
    }
}
