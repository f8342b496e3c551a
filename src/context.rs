//! Resolved inputs of one pipeline run.

use crate::{
    bundler::BundleOptions,
    config::PackConfig,
    metadata::resolve_version,
};
use anyhow::Result;
use std::path::PathBuf;

/// Binds a define identifier to a page key, e.g.
/// `__LOGIN_HTML_CONTENT__` → `login`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageBinding {
    pub ident: String,
    pub key: String,
}

/// Everything both pipeline phases read, resolved once up front.
///
/// Paths are absolute. Nothing in here changes during a run.
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub root: PathBuf,
    pub assets: PathBuf,
    pub icon: PathBuf,
    pub entry: PathBuf,
    pub outputs: Vec<PathBuf>,
    pub version: String,
    pub pages: Vec<PageBinding>,
    pub icon_define: String,
    pub version_define: String,
    pub options: BundleOptions,
}

impl BuildContext {
    /// Build the context from a root-resolved config, reading the version.
    pub fn from_config(config: &PackConfig) -> Result<Self> {
        let version = resolve_version(config.project.version.as_deref(), &config.project.metadata)?;
        let bundle = &config.bundle;

        Ok(Self {
            root: config.get_root().to_path_buf(),
            assets: config.build.assets.clone(),
            icon: config.build.icon.clone(),
            entry: config.build.entry.clone(),
            outputs: config.build.outputs.clone(),
            version,
            pages: bundle
                .pages
                .iter()
                .map(|(ident, key)| PageBinding {
                    ident: ident.clone(),
                    key: key.clone(),
                })
                .collect(),
            icon_define: bundle.icon_define.clone(),
            version_define: bundle.version_define.clone(),
            options: BundleOptions {
                format: bundle.format,
                platform: bundle.platform,
                external: bundle.external.clone(),
                minify: bundle.minify,
            },
        })
    }
}
