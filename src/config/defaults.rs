//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.
//! The defaults reproduce the conventional worker project layout, so a
//! project without `edgepack.toml` builds as-is.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#false() -> bool {
    false
}

// ============================================================================
// [project] Section Defaults
// ============================================================================

pub mod project {
    use std::path::PathBuf;

    pub fn metadata() -> PathBuf {
        "package.json".into()
    }

    pub fn version() -> Option<String> {
        None
    }
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use std::path::PathBuf;

    pub fn root() -> Option<PathBuf> {
        None
    }

    pub fn assets() -> PathBuf {
        "src/assets".into()
    }

    pub fn icon() -> PathBuf {
        "src/assets/favicon.ico".into()
    }

    pub fn entry() -> PathBuf {
        "src/worker.js".into()
    }

    pub fn outputs() -> Vec<PathBuf> {
        vec![
            "dist/worker.js".into(),
            "main/unobfuscated/unworker.js".into(),
        ]
    }
}

// ============================================================================
// [bundle] Section Defaults
// ============================================================================

pub mod bundle {
    use super::super::{Format, Platform};
    use std::collections::BTreeMap;

    pub fn command() -> Vec<String> {
        vec!["esbuild".into()]
    }

    pub fn format() -> Format {
        Format::default()
    }

    pub fn platform() -> Platform {
        Platform::default()
    }

    pub fn external() -> Vec<String> {
        vec!["cloudflare:sockets".into()]
    }

    /// Define identifier → template directory key.
    pub fn pages() -> BTreeMap<String, String> {
        [
            ("__PANEL_HTML_CONTENT__", "panel"),
            ("__LOGIN_HTML_CONTENT__", "login"),
            ("__ERROR_HTML_CONTENT__", "error"),
            ("__SECRETS_HTML_CONTENT__", "secrets"),
        ]
        .into_iter()
        .map(|(ident, key)| (ident.to_owned(), key.to_owned()))
        .collect()
    }

    pub fn icon_define() -> String {
        "__ICON__".into()
    }

    pub fn version_define() -> String {
        "__PANEL_VERSION__".into()
    }
}
