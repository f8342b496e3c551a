//! Worker build orchestration.
//!
//! # Architecture
//!
//! ```text
//! build_worker()
//!     │
//!     ├── assemble()        ──► PageMap (JSON literal per template dir)
//!     │
//!     ├── encode_icon()     ──► base64 icon payload
//!     │
//!     ├── collect_defines() ──► page/icon/version constants
//!     │
//!     ├── Bundler::bundle() ──► bundle text (in memory)
//!     │
//!     ├── sanitize()        ──► full-width punctuation → ASCII
//!     │
//!     └── write_outputs()   ──► every destination, in order
//! ```
//!
//! Strictly sequential and fail-fast. A write failure after the first
//! destination leaves the outputs diverged; nothing is rolled back.

use crate::{
    bundler::{BundleRequest, Bundler, Define},
    context::BuildContext,
    milestone::{Milestone, Observer},
    pages::{PageMap, assemble_pages},
    sanitize::sanitize,
};
use anyhow::{Context, Result};
use base64::{Engine, engine::general_purpose::STANDARD};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Result of a successful build.
#[derive(Debug)]
pub struct BuildReport {
    /// Sanitized bundle, identical to every written file.
    pub code: String,
    pub outputs: Vec<PathBuf>,
}

/// Run the whole pipeline: pages, icon, bundle, cleanup, writes.
pub fn build_worker(
    ctx: &BuildContext,
    bundler: &dyn Bundler,
    observer: &mut dyn Observer,
) -> Result<BuildReport> {
    let pages = assemble(ctx, observer)?;
    let icon = encode_icon(&ctx.icon)?;
    let defines = collect_defines(ctx, &pages, &icon)?;

    let request = BundleRequest {
        root: &ctx.root,
        entry: &ctx.entry,
        defines: &defines,
        options: &ctx.options,
    };
    let code = bundler.bundle(&request)?;
    observer.notify(&Milestone::Bundled {
        bundler: bundler.name().to_owned(),
        bytes: code.len(),
    });

    let (cleaned, replaced) = sanitize(&code);
    observer.notify(&Milestone::Sanitized { replaced });
    let code = cleaned.into_owned();

    write_outputs(&ctx.outputs, &code, observer)?;

    Ok(BuildReport {
        code,
        outputs: ctx.outputs.clone(),
    })
}

/// Template assembly phase.
pub fn assemble(ctx: &BuildContext, observer: &mut dyn Observer) -> Result<PageMap> {
    let pages = assemble_pages(&ctx.assets, &ctx.version)
        .with_context(|| format!("Failed to assemble pages in `{}`", ctx.assets.display()))?;
    observer.notify(&Milestone::PagesAssembled {
        keys: pages.keys().map(str::to_owned).collect(),
    });
    Ok(pages)
}

/// Read the icon and encode it as standard, padded base64.
pub fn encode_icon(path: &Path) -> Result<String> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read icon `{}`", path.display()))?;
    Ok(STANDARD.encode(bytes))
}

/// Constants handed to the bundler: one per page binding, then icon and
/// version. Absent pages become an empty string literal.
pub fn collect_defines(ctx: &BuildContext, pages: &PageMap, icon: &str) -> Result<Vec<Define>> {
    let mut defines: Vec<Define> = ctx
        .pages
        .iter()
        .map(|binding| Define::new(&binding.ident, pages.get_or_empty(&binding.key)))
        .collect();

    defines.push(Define::string(&ctx.icon_define, icon)?);
    defines.push(Define::string(&ctx.version_define, &ctx.version)?);
    Ok(defines)
}

/// Write `code` to each destination, creating parent directories.
pub fn write_outputs(outputs: &[PathBuf], code: &str, observer: &mut dyn Observer) -> Result<()> {
    let fingerprint = fingerprint(code);

    for path in outputs {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create `{}`", parent.display()))?;
        }
        fs::write(path, code).with_context(|| format!("Failed to write `{}`", path.display()))?;

        observer.notify(&Milestone::Written {
            path: path.clone(),
            bytes: code.len(),
            fingerprint: fingerprint.clone(),
        });
    }

    Ok(())
}

/// Short content hash shown next to each written file.
fn fingerprint(code: &str) -> String {
    blake3::hash(code.as_bytes()).to_hex()[..8].to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bundler::{BundleOptions, testing::FakeBundler},
        context::PageBinding,
        milestone::Recorder,
        pages::{INDEX_FILE, SCRIPT_FILE, STYLE_FILE},
    };
    use tempfile::{TempDir, tempdir};

    const ICON: &[u8] = &[0x00, 0x00, 0x01, 0x00, 0xff, 0xfe, 0x10, 0x80, 0x7f];

    const ENTRY: &str = "\
// 入口：worker（示例）
const pages = {
  panel: __PANEL_HTML_CONTENT__,
  login: __LOGIN_HTML_CONTENT__,
  error: __ERROR_HTML_CONTENT__,
  secrets: __SECRETS_HTML_CONTENT__,
};
export const icon = __ICON__；
export const version = __PANEL_VERSION__;
export default { fetch() { return pages; } };
";

    fn write_page(assets: &Path, name: &str) {
        let dir = assets.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join(INDEX_FILE),
            "<html>__STYLE__<p>v__PANEL_VERSION__</p><script>__SCRIPT__</script></html>",
        )
        .unwrap();
        fs::write(dir.join(STYLE_FILE), "p{margin:0}").unwrap();
        fs::write(dir.join(SCRIPT_FILE), "alert('你好，世界');").unwrap();
    }

    fn project(pages: &[&str]) -> (TempDir, BuildContext) {
        let dir = tempdir().unwrap();
        let root = dir.path().to_path_buf();
        let assets = root.join("src/assets");
        fs::create_dir_all(&assets).unwrap();
        for page in pages {
            write_page(&assets, page);
        }
        fs::write(assets.join("favicon.ico"), ICON).unwrap();
        fs::write(root.join("src/worker.js"), ENTRY).unwrap();

        let ctx = BuildContext {
            assets,
            icon: root.join("src/assets/favicon.ico"),
            entry: root.join("src/worker.js"),
            outputs: vec![
                root.join("dist/worker.js"),
                root.join("main/unobfuscated/unworker.js"),
            ],
            version: "1.2.3".into(),
            pages: ["panel", "login", "error", "secrets"]
                .iter()
                .map(|key| PageBinding {
                    ident: format!("__{}_HTML_CONTENT__", key.to_ascii_uppercase()),
                    key: (*key).into(),
                })
                .collect(),
            icon_define: "__ICON__".into(),
            version_define: "__PANEL_VERSION__".into(),
            options: BundleOptions {
                external: vec!["cloudflare:sockets".into()],
                ..BundleOptions::default()
            },
            root,
        };
        (dir, ctx)
    }

    #[test]
    fn test_build_worker_full_scenario() {
        let (_dir, ctx) = project(&["panel", "login", "error", "secrets"]);
        let bundler = FakeBundler::default();
        let mut recorder = Recorder::default();

        let report = build_worker(&ctx, &bundler, &mut recorder).unwrap();

        let first = fs::read(&ctx.outputs[0]).unwrap();
        let second = fs::read(&ctx.outputs[1]).unwrap();
        assert!(!first.is_empty());
        assert_eq!(first, second);
        assert_eq!(first, report.code.as_bytes());

        let code = String::from_utf8(first).unwrap();
        assert!(code.contains("1.2.3"));
        for c in ['，', '；', '（', '）', '【', '】', '：'] {
            assert!(!code.contains(c), "found {c}");
        }
        // inlined style and script made it into the bundle
        assert!(code.contains("<style>p{margin:0}</style>"));
        assert!(code.contains("alert('你好,世界');"));
    }

    #[test]
    fn test_build_worker_milestones() {
        let (_dir, ctx) = project(&["panel", "login"]);
        let bundler = FakeBundler::default();
        let mut recorder = Recorder::default();

        build_worker(&ctx, &bundler, &mut recorder).unwrap();

        let kinds: Vec<_> = recorder
            .milestones
            .iter()
            .map(|m| match m {
                Milestone::PagesAssembled { .. } => "pages",
                Milestone::Bundled { .. } => "bundled",
                Milestone::Sanitized { .. } => "sanitized",
                Milestone::Written { .. } => "written",
            })
            .collect();
        assert_eq!(kinds, vec!["pages", "bundled", "sanitized", "written", "written"]);
        assert_eq!(
            recorder.milestones[0],
            Milestone::PagesAssembled {
                keys: vec!["login".into(), "panel".into()],
            }
        );

        match (&recorder.milestones[3], &recorder.milestones[4]) {
            (
                Milestone::Written { path: a, fingerprint: fa, .. },
                Milestone::Written { path: b, fingerprint: fb, .. },
            ) => {
                assert_eq!(a, &ctx.outputs[0]);
                assert_eq!(b, &ctx.outputs[1]);
                assert_eq!(fa, fb);
            }
            _ => panic!("expected two writes"),
        }
    }

    #[test]
    fn test_missing_page_defaults_to_empty_string() {
        let (_dir, ctx) = project(&["panel", "login", "error"]);
        let bundler = FakeBundler::default();
        let mut recorder = Recorder::default();

        let report = build_worker(&ctx, &bundler, &mut recorder).unwrap();
        assert!(report.code.contains("secrets: \"\","));

        let requests = bundler.requests.borrow();
        let (defines, options) = &requests[0];
        let secrets = defines
            .iter()
            .find(|d| d.ident == "__SECRETS_HTML_CONTENT__")
            .unwrap();
        assert_eq!(secrets.value, "\"\"");
        assert_eq!(options.external, vec!["cloudflare:sockets".to_string()]);
    }

    #[test]
    fn test_icon_define_round_trips() {
        let (_dir, ctx) = project(&["panel"]);
        let bundler = FakeBundler::default();
        let mut recorder = Recorder::default();

        build_worker(&ctx, &bundler, &mut recorder).unwrap();

        let requests = bundler.requests.borrow();
        let icon = requests[0]
            .0
            .iter()
            .find(|d| d.ident == "__ICON__")
            .unwrap();
        let encoded: String = serde_json::from_str(&icon.value).unwrap();
        assert_eq!(STANDARD.decode(encoded).unwrap(), ICON);
    }

    #[test]
    fn test_version_define_is_json_literal() {
        let (_dir, ctx) = project(&[]);
        let pages = PageMap::default();
        let defines = collect_defines(&ctx, &pages, "AAAA").unwrap();

        assert_eq!(defines.len(), 6);
        assert_eq!(defines[4], Define::new("__ICON__", "\"AAAA\""));
        assert_eq!(defines[5], Define::new("__PANEL_VERSION__", "\"1.2.3\""));
        assert!(defines[..4].iter().all(|d| d.value == "\"\""));
    }

    #[test]
    fn test_missing_template_file_writes_nothing() {
        let (_dir, ctx) = project(&["panel", "secrets"]);
        fs::remove_file(ctx.assets.join("secrets").join(STYLE_FILE)).unwrap();
        let bundler = FakeBundler::default();
        let mut recorder = Recorder::default();

        let err = build_worker(&ctx, &bundler, &mut recorder).unwrap_err();
        assert!(format!("{err:#}").contains("style.css"));
        assert!(bundler.requests.borrow().is_empty());
        assert!(ctx.outputs.iter().all(|p| !p.exists()));
        assert!(recorder.milestones.is_empty());
    }

    #[test]
    fn test_missing_icon_fails() {
        let (_dir, ctx) = project(&["panel"]);
        fs::remove_file(&ctx.icon).unwrap();
        let bundler = FakeBundler::default();

        let err = build_worker(&ctx, &bundler, &mut Recorder::default()).unwrap_err();
        assert!(err.to_string().contains("Failed to read icon"));
        assert!(ctx.outputs.iter().all(|p| !p.exists()));
    }

    #[test]
    fn test_bundler_failure_writes_nothing() {
        let (_dir, ctx) = project(&["panel"]);
        let bundler = FakeBundler {
            fail: true,
            ..FakeBundler::default()
        };

        assert!(build_worker(&ctx, &bundler, &mut Recorder::default()).is_err());
        assert!(ctx.outputs.iter().all(|p| !p.exists()));
    }

    #[test]
    fn test_write_outputs_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a/b/worker.js");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "stale content that is longer").unwrap();

        write_outputs(&[path.clone()], "fresh", &mut Recorder::default()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "fresh");
    }

    #[test]
    fn test_fingerprint_is_stable() {
        assert_eq!(fingerprint("x"), fingerprint("x"));
        assert_ne!(fingerprint("x"), fingerprint("y"));
        assert_eq!(fingerprint("x").len(), 8);
    }
}
