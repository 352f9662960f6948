use std::collections::HashMap;
use std::path::{Path, PathBuf};

use redwatch_core::StoreError;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::DedupStore;

/// JSON-snapshot backend: a single object mapping each identifier to a
/// notified flag, rewritten in full on every update.
pub struct FileStore {
    path: PathBuf,
    notified: Mutex<HashMap<String, bool>>,
}

impl FileStore {
    /// A missing file is an empty store; a present but unreadable or
    /// unparseable file is an error.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let notified: HashMap<String, bool> = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        info!(
            "Loaded {} notified identifiers from {}",
            notified.len(),
            path.display()
        );

        Ok(Self {
            path,
            notified: Mutex::new(notified),
        })
    }
}

impl DedupStore for FileStore {
    async fn contains(&self, identifier: &str) -> Result<bool, StoreError> {
        Ok(self.notified.lock().await.contains_key(identifier))
    }

    async fn record(&self, identifier: &str) -> Result<(), StoreError> {
        let mut notified = self.notified.lock().await;
        if notified.contains_key(identifier) {
            debug!("Identifier {} already recorded", identifier);
            return Ok(());
        }

        // The in-memory map must only ever reflect persisted state, so a
        // failed snapshot rolls the insert back and a retry writes again.
        notified.insert(identifier.to_string(), true);

        let snapshot = match serde_json::to_string_pretty(&*notified) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                notified.remove(identifier);
                return Err(e.into());
            }
        };

        if let Err(e) = tokio::fs::write(&self.path, snapshot).await {
            notified.remove(identifier);
            return Err(e.into());
        }

        Ok(())
    }
}
