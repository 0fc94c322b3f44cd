use crate::error::{Error, Result};
use heck::ToUpperCamelCase;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// `pet_status` / `pet-status` / `petStatus` → `PetStatus`.
pub fn to_pascal_case(value: &str) -> String {
    value.to_upper_camel_case()
}

/// Resolve `.` and `..` lexically without touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                ) && normalized.pop();
                if !popped && !normalized.has_root() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Module specifier for importing `target` (a file path without extension)
/// from a file in `from_dir`, e.g. `./Pet` or `../Shared/Id`.
pub fn relative_module_path(from_dir: &Path, target: &Path) -> String {
    let from_dir = normalize_path(from_dir);
    let target = normalize_path(target);
    let from: Vec<_> = from_dir.components().collect();
    let to: Vec<_> = target.components().collect();

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments: Vec<String> = Vec::new();
    segments.extend(std::iter::repeat("..".to_string()).take(from.len() - common));
    segments.extend(
        to[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );

    let joined = segments.join("/");
    if joined.starts_with("..") {
        joined
    } else {
        format!("./{joined}")
    }
}

/// Write `contents` to `path`, creating parent directories as needed.
pub fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| with_path(e, "creating directory", parent))?;
    }
    fs::write(path, contents).map_err(|e| with_path(e, "writing generated file", path))
}

/// Remove `directory` and everything below it. Missing directories are fine.
pub fn remove_directory(directory: &Path) -> Result<()> {
    match fs::remove_dir_all(directory) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(with_path(e, "removing directory", directory)),
    }
}

fn with_path(error: io::Error, action: &str, path: &Path) -> Error {
    Error::Io(io::Error::new(
        error.kind(),
        format!("{action} {}: {error}", path.display()),
    ))
}
