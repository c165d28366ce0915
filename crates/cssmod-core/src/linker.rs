use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::info;

use crate::artifact::ObjectArtifact;
use crate::emitter;
use crate::error::{Error, Result};

/// Paths written by a successful link.
#[derive(Debug)]
pub struct LinkedOutput {
    pub css_path: PathBuf,
    pub map_paths: Vec<PathBuf>,
    pub sentinel_path: PathBuf,
}

/// Link object artifacts into one combined stylesheet plus per-source
/// class-map JSON files mirrored under the build directory.
///
/// Output CSS rule order equals the artifact list order; the linker
/// performs no reordering or deduplication. Every artifact is read and
/// validated before anything is written, so a failed link never leaves
/// a sentinel behind without its outputs.
pub fn link(
    object_paths: &[PathBuf],
    source_root: &Path,
    build_root: &Path,
    sentinel_path: &Path,
) -> Result<LinkedOutput> {
    let stem = sentinel_path.file_stem().ok_or_else(|| {
        Error::io(
            sentinel_path,
            io::Error::new(io::ErrorKind::InvalidInput, "sentinel path has no file name"),
        )
    })?;
    let css_path = build_root.join(Path::new(stem).with_extension("css"));

    let mut combined = String::new();
    let mut class_maps: Vec<(PathBuf, BTreeMap<String, String>)> = Vec::new();
    for object_path in object_paths {
        let artifact = ObjectArtifact::read(object_path)?;
        let relative = artifact
            .css
            .source
            .strip_prefix(source_root)
            .map_err(|_| Error::OutsideSourceRoot {
                path: artifact.css.source.clone(),
                root: source_root.to_path_buf(),
            })?
            .with_extension("json");
        combined.push_str(&emitter::emit_css(&artifact.css));
        class_maps.push((build_root.join(relative), artifact.json));
    }

    let mut map_paths = Vec::with_capacity(class_maps.len());
    for (map_path, class_map) in class_maps {
        if let Some(parent) = map_path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let data = serde_json::to_string(&class_map).map_err(|e| Error::artifact(&map_path, e))?;
        fs::write(&map_path, data).map_err(|e| Error::io(&map_path, e))?;
        info!("wrote class map {}", map_path.display());
        map_paths.push(map_path);
    }

    fs::create_dir_all(build_root).map_err(|e| Error::io(build_root, e))?;
    fs::write(&css_path, &combined).map_err(|e| Error::io(&css_path, e))?;
    info!("wrote combined stylesheet {}", css_path.display());

    // Written last: its presence tells the build driver every output
    // above exists and is consistent.
    fs::write(sentinel_path, "").map_err(|e| Error::io(sentinel_path, e))?;

    Ok(LinkedOutput {
        css_path,
        map_paths,
        sentinel_path: sentinel_path.to_path_buf(),
    })
}
