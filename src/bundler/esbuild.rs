//! esbuild command-line bundler.
//!
//! Runs `esbuild <entry> --bundle ...` without `--outfile`, so the bundle is
//! printed to stdout and never touches disk.
//!
//! # Large defines
//!
//! Every define travels as one `--define:ID=VALUE` argument, and kernels cap
//! a single argument (128 KiB on Linux). An inlined page easily exceeds that,
//! so values above [`INLINE_DEFINE_LIMIT`] are moved into a temporary module
//! handed to `--inject`:
//!
//! ```text
//! // edgepack-defines-XXXX.js
//! export const __PANEL_HTML_CONTENT__ = "<!DOCTYPE html>...";
//! ```
//!
//! esbuild rewrites references to the global `__PANEL_HTML_CONTENT__` into
//! references to that export, which has the same effect as the define.

use super::{BundleError, BundleRequest, Bundler, Define};
use crate::{exec, utils::command};
use anyhow::{Context, Result};
use std::{ffi::OsString, io::Write, path::Path};

/// Largest define value passed on the command line, in bytes.
pub const INLINE_DEFINE_LIMIT: usize = 96 * 1024;

/// Bundler backed by an installed esbuild binary.
#[derive(Debug, Clone)]
pub struct EsbuildCli {
    /// Command and leading arguments, e.g. `["npx", "esbuild"]`.
    command: Vec<String>,
    inline_limit: usize,
}

impl EsbuildCli {
    pub fn new(command: Vec<String>) -> Self {
        Self {
            command,
            inline_limit: INLINE_DEFINE_LIMIT,
        }
    }

    #[cfg(test)]
    fn with_inline_limit(mut self, limit: usize) -> Self {
        self.inline_limit = limit;
        self
    }

    /// `esbuild --version`, trimmed.
    pub fn version(&self, root: &Path) -> Result<String> {
        let output = exec!(root; &self.command; "--version")?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_owned())
    }

    /// Split defines into command-line ones and ones spilled to the inject
    /// module.
    fn partition<'a>(&self, defines: &'a [Define]) -> (Vec<&'a Define>, Vec<&'a Define>) {
        defines
            .iter()
            .partition(|define| define.value.len() <= self.inline_limit)
    }

    /// Arguments after the command itself.
    fn build_args(
        &self,
        request: &BundleRequest<'_>,
        inline: &[&Define],
        inject: Option<&Path>,
    ) -> Vec<OsString> {
        let options = request.options;
        let mut args: Vec<OsString> = vec![
            request.entry.into(),
            "--bundle".into(),
            format!("--format={}", options.format.as_str()).into(),
            format!("--platform={}", options.platform.as_str()).into(),
            "--log-level=warning".into(),
        ];

        if options.minify {
            args.push("--minify-syntax".into());
        }

        for specifier in &options.external {
            args.push(format!("--external:{specifier}").into());
        }

        for define in inline {
            args.push(format!("--define:{}={}", define.ident, define.value).into());
        }

        if let Some(path) = inject {
            let mut arg = OsString::from("--inject:");
            arg.push(path);
            args.push(arg);
        }

        args
    }
}

/// Source of the inject module exporting each spilled define.
fn inject_module(spilled: &[&Define]) -> String {
    spilled
        .iter()
        .map(|define| format!("export const {} = {};\n", define.ident, define.value))
        .collect()
}

impl Bundler for EsbuildCli {
    fn name(&self) -> &str {
        self.command.last().map_or("esbuild", String::as_str)
    }

    fn bundle(&self, request: &BundleRequest<'_>) -> Result<String> {
        let (inline, spilled) = self.partition(request.defines);

        // Kept alive until esbuild exits, removed on drop
        let inject = if spilled.is_empty() {
            None
        } else {
            let mut file = tempfile::Builder::new()
                .prefix("edgepack-defines-")
                .suffix(".js")
                .tempfile()
                .context("Failed to create define module")?;
            file.write_all(inject_module(&spilled).as_bytes())
                .context("Failed to write define module")?;
            file.flush()?;
            Some(file)
        };

        let args = self.build_args(request, &inline, inject.as_ref().map(|f| f.path()));
        let output = command::exec(
            Some(request.root),
            &command::to_cmd_vec(&self.command),
            &args,
        )
        .with_context(|| format!("Failed to bundle `{}`", request.entry.display()))?;

        let code = String::from_utf8(output.stdout).map_err(BundleError::NonUtf8Output)?;
        if code.trim().is_empty() {
            return Err(BundleError::EmptyOutput.into());
        }
        Ok(code)
    }
}
