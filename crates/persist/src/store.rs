//! Map documents on disk, as pretty-printed JSON.

use crate::document::{DocumentError, MapDocument};
use std::path::Path;
use tracing::debug;

/// Write `doc` to `path`, replacing any existing file.
pub fn save_to_path(doc: &MapDocument, path: impl AsRef<Path>) -> Result<(), DocumentError> {
    let path = path.as_ref();
    serde_json::to_writer_pretty(std::fs::File::create(path)?, doc)?;
    debug!(path = %path.display(), objects = doc.objects.len(), "map saved");
    Ok(())
}

/// Read a document from `path`, checking its version.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<MapDocument, DocumentError> {
    let path = path.as_ref();
    let doc: MapDocument = serde_json::from_reader(std::io::BufReader::new(std::fs::File::open(path)?))?;
    doc.check_version()?;
    debug!(path = %path.display(), objects = doc.objects.len(), "map read");
    Ok(doc)
}
