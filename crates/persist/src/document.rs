use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use worldedit_author::History;
use worldedit_author::SceneHost;
use worldedit_author::lifecycle::instantiate;
use worldedit_author::snapshot::serialize_object;
use worldedit_common::SerializedEntity;
use worldedit_kernel::{ObjectKey, Scene};

/// Newest document layout this build reads and the one it writes.
pub const DOCUMENT_VERSION: u32 = 1;

/// Errors from reading or writing map documents.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("document version mismatch: file has v{file_version}, newest supported is v{supported}")]
    UnsupportedVersion { file_version: u32, supported: u32 },
}

/// A saved map: every object plus the undo stack as an edit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapDocument {
    pub version: u32,
    #[serde(default)]
    pub objects: Vec<SerializedEntity>,
    #[serde(default)]
    pub history: Vec<Value>,
}

impl Default for MapDocument {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION,
            objects: Vec::new(),
            history: Vec::new(),
        }
    }
}

/// Outcome of loading a document into a host.
#[derive(Debug)]
pub struct LoadReport {
    /// Live objects created from the document, in document order.
    pub objects: Vec<ObjectKey>,
    /// Objects the factory could not build.
    pub skipped_objects: usize,
    /// The restored history, ready to hand to the editor.
    pub history: History,
    /// History entries that could not be decoded.
    pub dropped_history: usize,
    /// One user-facing warning covering dropped history entries.
    pub warning: Option<String>,
}

impl LoadReport {
    /// Whether everything in the document made it in.
    pub fn is_clean(&self) -> bool {
        self.skipped_objects == 0 && self.dropped_history == 0
    }
}

impl MapDocument {
    /// Snapshot a scene and its undo stack. Waypoint handles are not saved;
    /// they are rebuilt from each vehicle's path on load.
    pub fn capture(scene: &Scene, history: &History) -> Self {
        let objects = scene
            .iter()
            .filter_map(|(_, obj)| serialize_object(obj))
            .collect();
        Self {
            version: DOCUMENT_VERSION,
            objects,
            history: history.serialize(),
        }
    }

    /// Build the saved objects into `host` and reconstruct the history
    /// without running any of it.
    pub fn restore(&self, host: &mut dyn SceneHost) -> LoadReport {
        let mut objects = Vec::with_capacity(self.objects.len());
        let mut skipped_objects = 0;
        for entity in &self.objects {
            match instantiate(host, entity) {
                Some(key) => objects.push(key),
                None => skipped_objects += 1,
            }
        }
        if skipped_objects > 0 {
            warn!(skipped = skipped_objects, "some objects could not be built");
        }

        let restored = History::deserialize(&self.history);
        let warning = restored.warning();
        info!(
            objects = objects.len(),
            history = restored.history.undo_count(),
            "map loaded"
        );
        LoadReport {
            objects,
            skipped_objects,
            dropped_history: restored.dropped.len(),
            history: restored.history,
            warning,
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a document, refusing versions newer than this build knows.
    pub fn from_json(text: &str) -> Result<Self, DocumentError> {
        let doc: Self = serde_json::from_str(text)?;
        doc.check_version()?;
        Ok(doc)
    }

    pub fn check_version(&self) -> Result<(), DocumentError> {
        if self.version > DOCUMENT_VERSION {
            return Err(DocumentError::UnsupportedVersion {
                file_version: self.version,
                supported: DOCUMENT_VERSION,
            });
        }
        Ok(())
    }

    /// SHA-256 of the compact JSON form, hex encoded.
    pub fn digest(&self) -> Result<String, DocumentError> {
        let bytes = serde_json::to_vec(self)?;
        Ok(sha256_hex(&bytes))
    }
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
