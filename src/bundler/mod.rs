//! Bundler abstraction.
//!
//! The worker packager only needs "bundle this entry with these constants and
//! give me the text back". [`Bundler`] is that seam; [`esbuild::EsbuildCli`]
//! is the production implementation.
//!
//! # Defines
//!
//! A define replaces every reference to a global identifier with a literal at
//! bundle time. Values are JavaScript source text, so string payloads must be
//! JSON-encoded (`"\"1.2.3\""`, not `"1.2.3"`).

pub mod esbuild;

use crate::config::{Format, Platform};
use anyhow::Result;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("bundler output is not valid UTF-8")]
    NonUtf8Output(#[source] std::string::FromUtf8Error),

    #[error("bundler produced no output")]
    EmptyOutput,
}

/// One compile-time constant: identifier and JavaScript literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Define {
    pub ident: String,
    pub value: String,
}

impl Define {
    pub fn new(ident: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            ident: ident.into(),
            value: value.into(),
        }
    }

    /// Define whose value is `text` encoded as a JSON string literal.
    pub fn string(ident: impl Into<String>, text: &str) -> Result<Self> {
        Ok(Self::new(ident, serde_json::to_string(text)?))
    }
}

/// Settings that do not change between runs of the same project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleOptions {
    pub format: Format,
    pub platform: Platform,
    pub external: Vec<String>,
    pub minify: bool,
}

impl Default for BundleOptions {
    fn default() -> Self {
        Self {
            format: Format::Esm,
            platform: Platform::Node,
            external: Vec::new(),
            minify: false,
        }
    }
}

/// Everything a bundler needs for one run.
#[derive(Debug, Clone, Copy)]
pub struct BundleRequest<'a> {
    /// Project root, bundler working directory.
    pub root: &'a Path,
    pub entry: &'a Path,
    pub defines: &'a [Define],
    pub options: &'a BundleOptions,
}

/// Bundles one entry module into a single in-memory text output.
pub trait Bundler {
    /// Human-readable name for logs.
    fn name(&self) -> &str;

    fn bundle(&self, request: &BundleRequest<'_>) -> Result<String>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-process stand-in for esbuild: reads the entry and substitutes
    //! defines textually.

    use super::*;
    use std::{cell::RefCell, fs};

    #[derive(Default)]
    pub struct FakeBundler {
        pub requests: RefCell<Vec<(Vec<Define>, BundleOptions)>>,
        pub fail: bool,
    }

    impl Bundler for FakeBundler {
        fn name(&self) -> &str {
            "fake"
        }

        fn bundle(&self, request: &BundleRequest<'_>) -> Result<String> {
            if self.fail {
                anyhow::bail!("Could not resolve \"./missing.js\"");
            }
            self.requests
                .borrow_mut()
                .push((request.defines.to_vec(), request.options.clone()));

            let mut code = fs::read_to_string(request.entry)?;
            for define in request.defines {
                code = code.replace(&define.ident, &define.value);
            }
            Ok(code)
        }
    }
}
