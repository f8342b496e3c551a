//! Project version lookup.
//!
//! The version is read once per run from the project's metadata file:
//! `package.json` (`"version"`) or `Cargo.toml` (`[package] version`).

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("`{0}` has no version field")]
    MissingVersion(String),

    #[error("`{0}` has an empty version")]
    EmptyVersion(String),
}

#[derive(Deserialize)]
struct PackageJson {
    version: Option<String>,
}

#[derive(Deserialize)]
struct CargoManifest {
    package: Option<CargoPackage>,
}

#[derive(Deserialize)]
struct CargoPackage {
    version: Option<toml::Value>,
}

/// Resolve the version: an explicit override wins, otherwise read `metadata`.
pub fn resolve_version(override_version: Option<&str>, metadata: &Path) -> Result<String> {
    match override_version {
        Some(version) => Ok(version.to_owned()),
        None => read_version(metadata),
    }
}

/// Read the version string from a `package.json` or `Cargo.toml`.
pub fn read_version(path: &Path) -> Result<String> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read metadata `{}`", path.display()))?;
    let name = path.display().to_string();

    let version = if path.extension().is_some_and(|ext| ext == "toml") {
        let manifest: CargoManifest =
            toml::from_str(&content).with_context(|| format!("Invalid TOML in `{name}`"))?;
        match manifest.package.and_then(|p| p.version) {
            Some(toml::Value::String(version)) => version,
            // `version.workspace = true` and friends carry no literal version
            Some(_) | None => return Err(MetadataError::MissingVersion(name).into()),
        }
    } else {
        let package: PackageJson =
            serde_json::from_str(&content).with_context(|| format!("Invalid JSON in `{name}`"))?;
        package
            .version
            .ok_or_else(|| MetadataError::MissingVersion(name.clone()))?
    };

    if version.trim().is_empty() {
        return Err(MetadataError::EmptyVersion(name).into());
    }
    Ok(version)
}
