use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ast::Stylesheet;
use crate::error::{Error, Result};

/// The interchange unit between compiler and linker: one per source
/// file, written to disk by `cssmodc` and read exactly once by
/// `cssmodl`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ObjectArtifact {
    /// Rewritten stylesheet, annotated with the originating source path.
    pub css: Stylesheet,
    /// Flat mapping from original class name to generated token.
    pub json: BTreeMap<String, String>,
}

impl ObjectArtifact {
    pub fn read(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        serde_json::from_str(&data).map_err(|e| Error::artifact(path, e))
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string(self).map_err(|e| Error::artifact(path, e))?;
        fs::write(path, data).map_err(|e| Error::io(path, e))
    }
}
