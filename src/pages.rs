//! Template assembly.
//!
//! Every directory under the asset root that holds an `index.html` is a
//! page. Its `style.css` and `script.js` are inlined into the markup and the
//! version is stamped in:
//!
//! ```text
//! src/assets/
//! ├── panel/
//! │   ├── index.html   ── __STYLE__         → <style>{style.css}</style>
//! │   ├── style.css       __SCRIPT__        → {script.js}
//! │   └── script.js       __PANEL_VERSION__ → {version}
//! └── login/ ...
//! ```
//!
//! The result is stored JSON-encoded, ready to be spliced into the bundle as
//! a string literal.

use anyhow::{Context, Result};
use std::{
    collections::BTreeMap,
    ffi::OsStr,
    fs,
    path::{Component, Path},
};
use walkdir::WalkDir;

/// Markup entry file that marks a directory as a page.
pub const INDEX_FILE: &str = "index.html";
/// Stylesheet inlined at [`STYLE_TOKEN`].
pub const STYLE_FILE: &str = "style.css";
/// Script inlined at [`SCRIPT_TOKEN`].
pub const SCRIPT_FILE: &str = "script.js";

pub const STYLE_TOKEN: &str = "__STYLE__";
pub const SCRIPT_TOKEN: &str = "__SCRIPT__";
pub const VERSION_TOKEN: &str = "__PANEL_VERSION__";

/// JSON literal used for pages that were not found.
pub const EMPTY_PAGE: &str = r#""""#;

/// Assembled pages: directory key → JSON string literal of the final HTML.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PageMap {
    pages: BTreeMap<String, String>,
}

impl PageMap {
    /// JSON literal for `key`, or [`EMPTY_PAGE`] when the page is absent.
    pub fn get_or_empty(&self, key: &str) -> &str {
        self.pages.get(key).map_or(EMPTY_PAGE, String::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pages.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.pages.keys().map(String::as_str)
    }

    /// Decoded view of all pages, used by `edgepack pages`.
    pub fn to_json_object(&self) -> Result<serde_json::Value> {
        let mut object = serde_json::Map::with_capacity(self.len());
        for (key, literal) in &self.pages {
            let html: String = serde_json::from_str(literal)
                .with_context(|| format!("Page `{key}` is not a JSON string"))?;
            object.insert(key.clone(), serde_json::Value::String(html));
        }
        Ok(serde_json::Value::Object(object))
    }
}

/// Discover and assemble every page under `assets`.
///
/// All-or-nothing: a page missing its stylesheet or script fails the whole
/// call.
pub fn assemble_pages(assets: &Path, version: &str) -> Result<PageMap> {
    let mut pages = BTreeMap::new();

    for dir in discover_pages(assets)? {
        let key = page_key(assets, &dir)?;
        let html = assemble_page(&dir, version)
            .with_context(|| format!("Failed to assemble page `{key}`"))?;
        pages.insert(key, serde_json::to_string(&html)?);
    }

    Ok(PageMap { pages })
}

/// Directories holding an `index.html`, in sorted order.
///
/// Hidden entries below the root are skipped. A symlinked `index.html`
/// counts when it resolves to a file.
fn discover_pages(assets: &Path) -> Result<Vec<std::path::PathBuf>> {
    let mut dirs = Vec::new();
    let walker = WalkDir::new(assets)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.file_name()));

    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to scan `{}`", assets.display()))?;
        if entry.path().is_file()
            && entry.file_name() == INDEX_FILE
            && let Some(parent) = entry.path().parent()
        {
            dirs.push(parent.to_path_buf());
        }
    }
    Ok(dirs)
}

fn is_hidden(name: &OsStr) -> bool {
    name.as_encoded_bytes().starts_with(b".")
}

/// Page key: `/`-joined path of `dir` relative to `assets`, `.` for the root.
fn page_key(assets: &Path, dir: &Path) -> Result<String> {
    let rel = dir.strip_prefix(assets).with_context(|| {
        format!("`{}` is outside `{}`", dir.display(), assets.display())
    })?;

    let parts: Vec<_> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect();

    if parts.is_empty() {
        Ok(".".into())
    } else {
        Ok(parts.join("/"))
    }
}

/// Read one page directory and return the substituted markup.
fn assemble_page(dir: &Path, version: &str) -> Result<String> {
    let read = |file: &str| {
        let path = dir.join(file);
        fs::read_to_string(&path).with_context(|| format!("Failed to read `{}`", path.display()))
    };

    let index = read(INDEX_FILE)?;
    let style = read(STYLE_FILE)?;
    let script = read(SCRIPT_FILE)?;

    Ok(render_page(&index, &style, &script, version))
}

/// Replace the three placeholders, every occurrence, style before script
/// before version.
pub fn render_page(index: &str, style: &str, script: &str, version: &str) -> String {
    index
        .replace(STYLE_TOKEN, &format!("<style>{style}</style>"))
        .replace(SCRIPT_TOKEN, script)
        .replace(VERSION_TOKEN, version)
}
