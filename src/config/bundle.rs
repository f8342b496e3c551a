//! `[bundle]` section configuration.
//!
//! Controls how the bundler is invoked and which compile-time constants it
//! receives.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Enums
// ============================================================================

/// Module format of the bundled output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// ECMAScript module (default, what workers expect).
    #[default]
    Esm,
    /// CommonJS.
    Cjs,
    /// Immediately-invoked function expression.
    Iife,
}

impl Format {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Esm => "esm",
            Self::Cjs => "cjs",
            Self::Iife => "iife",
        }
    }
}

/// Target platform used for module resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Node,
    Browser,
    Neutral,
}

impl Platform {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Browser => "browser",
            Self::Neutral => "neutral",
        }
    }
}

// ============================================================================
// BundleConfig
// ============================================================================

/// `[bundle]` section in edgepack.toml - bundler invocation.
///
/// # Example
/// ```toml
/// [bundle]
/// command = ["npx", "esbuild"]
/// platform = "neutral"
/// external = ["cloudflare:sockets", "node:buffer"]
///
/// [bundle.pages]
/// __PANEL_HTML_CONTENT__ = "panel"
/// __ADMIN_HTML_CONTENT__ = "admin/home"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct BundleConfig {
    /// Bundler command and leading arguments.
    #[serde(default = "defaults::bundle::command")]
    #[educe(Default = defaults::bundle::command())]
    pub command: Vec<String>,

    #[serde(default = "defaults::bundle::format")]
    #[educe(Default = defaults::bundle::format())]
    pub format: Format,

    #[serde(default = "defaults::bundle::platform")]
    #[educe(Default = defaults::bundle::platform())]
    pub platform: Platform,

    /// Import specifiers left for the runtime to resolve.
    #[serde(default = "defaults::bundle::external")]
    #[educe(Default = defaults::bundle::external())]
    pub external: Vec<String>,

    /// Apply syntax minification (off by default, output stays readable).
    #[serde(default = "defaults::r#false")]
    #[educe(Default = defaults::r#false())]
    pub minify: bool,

    /// Identifier receiving the base64 icon.
    #[serde(default = "defaults::bundle::icon_define")]
    #[educe(Default = defaults::bundle::icon_define())]
    pub icon_define: String,

    /// Identifier receiving the version string.
    #[serde(default = "defaults::bundle::version_define")]
    #[educe(Default = defaults::bundle::version_define())]
    pub version_define: String,

    /// Define identifier → template directory key.
    /// Replaces the default table when present.
    #[serde(default = "defaults::bundle::pages")]
    #[educe(Default = defaults::bundle::pages())]
    pub pages: BTreeMap<String, String>,
}
