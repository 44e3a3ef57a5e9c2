//! Locations of generated side artifacts.
//!
//! Everything here is a pure path computation except
//! [`resolve_prev_map`], which reads a previous map from disk when a lookup
//! prefix is configured.

use std::io;
use std::path::{Component, Path, PathBuf};

use crate::config::{Annotation, DiffOption, MapOption};
use crate::engine::AnnotationRef;

/// Contents of `<prefix><basename(source)>.map`, if a prefix is configured
/// and that file exists.
pub async fn resolve_prev_map(source: &Path, prefix: Option<&str>) -> Option<String> {
    let prefix = prefix?;
    let name = source.file_name()?.to_string_lossy();
    let map_path = PathBuf::from(format!("{}{}.map", prefix, name));

    match tokio::fs::read_to_string(&map_path).await {
        Ok(content) => {
            tracing::debug!("Using previous map {}", map_path.display());
            Some(content)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => {
            tracing::warn!("Ignoring unreadable map {}: {}", map_path.display(), e);
            None
        }
    }
}

/// `<dir>/<basename(dest)>.map`.
pub fn map_sidecar_path(dest: &Path, dir: &Path) -> PathBuf {
    dir.join(with_suffix(Path::new(dest.file_name().unwrap_or_default()), ".map"))
}

/// Conventional `<dest>.map`, next to the output.
pub fn default_map_path(dest: &Path) -> PathBuf {
    with_suffix(dest, ".map")
}

/// Annotation the engine embeds in the output for `dest`.
///
/// Flags pass through. A directory becomes the sidecar location expressed
/// relative to `dest`'s directory, always with `/` separators.
pub fn resolve_annotation(dest: &Path, annotation: &Annotation) -> AnnotationRef {
    match annotation {
        Annotation::Flag(flag) => AnnotationRef::Flag(*flag),
        Annotation::Dir(dir) => {
            let sidecar = map_sidecar_path(dest, dir);
            let base = dest.parent().unwrap_or_else(|| Path::new(""));
            let relative = relative_to(&sidecar, base);
            AnnotationRef::Path(relative.to_string_lossy().replace('\\', "/"))
        }
    }
}

/// Where the external map for `dest` is written.
pub fn map_destination(dest: &Path, map: &MapOption) -> PathBuf {
    match map {
        MapOption::Detailed(config) => match &config.annotation {
            Annotation::Dir(dir) => map_sidecar_path(dest, dir),
            Annotation::Flag(_) => default_map_path(dest),
        },
        MapOption::Off | MapOption::On => default_map_path(dest),
    }
}

/// Where the diff for `dest` is written, if diffs are enabled.
pub fn diff_destination(dest: &Path, diff: &DiffOption) -> Option<PathBuf> {
    match diff {
        DiffOption::Off => None,
        DiffOption::Sidecar => Some(with_suffix(dest, ".diff")),
        DiffOption::Path(path) => Some(path.clone()),
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut raw = path.as_os_str().to_os_string();
    raw.push(suffix);
    PathBuf::from(raw)
}

/// `target` relative to `base`, after resolving `.` and `..` lexically.
///
/// Mixed absolute/relative inputs, and a relative base that climbs above
/// the target, are anchored to the current directory first. Only when the
/// current directory is unavailable is the normalized target returned as is.
fn relative_to(target: &Path, base: &Path) -> PathBuf {
    let target_norm = normalize(target);
    let base_norm = normalize(base);

    if target_norm.is_absolute() == base_norm.is_absolute() {
        if let Some(relative) = pathdiff::diff_paths(&target_norm, &base_norm) {
            return relative;
        }
    }

    match std::env::current_dir() {
        Ok(cwd) => {
            pathdiff::diff_paths(normalize(&cwd.join(target)), normalize(&cwd.join(base)))
                .unwrap_or(target_norm)
        }
        Err(_) => target_norm,
    }
}

/// Drop `.` and fold `name/..` pairs without touching the filesystem.
///
/// Leading `..` of a relative path is kept; `..` at the root is dropped.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}
