//! `[build]` section configuration.
//!
//! Input and output locations of the pipeline.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[build]` section in edgepack.toml - pipeline paths.
///
/// All paths are relative to the project root.
///
/// # Example
/// ```toml
/// [build]
/// assets = "src/assets"            # one subdirectory per page
/// icon = "src/assets/favicon.ico"
/// entry = "src/worker.js"
/// outputs = ["dist/worker.js", "main/unobfuscated/unworker.js"]
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Project root directory (usually set via CLI `--root`).
    #[serde(default = "defaults::build::root")]
    #[educe(Default = defaults::build::root())]
    pub root: Option<PathBuf>,

    /// Template root. Every directory below it holding an `index.html`
    /// is a page.
    #[serde(default = "defaults::build::assets")]
    #[educe(Default = defaults::build::assets())]
    pub assets: PathBuf,

    /// Binary icon embedded as base64.
    #[serde(default = "defaults::build::icon")]
    #[educe(Default = defaults::build::icon())]
    pub icon: PathBuf,

    /// Worker entry module handed to the bundler.
    #[serde(default = "defaults::build::entry")]
    #[educe(Default = defaults::build::entry())]
    pub entry: PathBuf,

    /// Destinations, written in order with identical content.
    #[serde(default = "defaults::build::outputs")]
    #[educe(Default = defaults::build::outputs())]
    pub outputs: Vec<PathBuf>,
}
