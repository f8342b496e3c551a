//! Project configuration management for `edgepack.toml`.
//!
//! The file is optional: without it every field takes its default, which
//! matches the conventional worker layout (`src/assets`, `src/worker.js`,
//! `dist/worker.js`, ...).
//!
//! # Sections
//!
//! | Section     | Purpose                                        |
//! |-------------|------------------------------------------------|
//! | `[project]` | Where the version string comes from            |
//! | `[build]`   | Template root, icon, entry module, outputs     |
//! | `[bundle]`  | Bundler command, format, externals, defines    |
//!
//! # Example
//!
//! ```toml
//! [project]
//! metadata = "package.json"
//!
//! [build]
//! assets = "src/assets"
//! outputs = ["dist/worker.js"]
//!
//! [bundle]
//! command = ["npx", "esbuild"]
//! external = ["cloudflare:sockets"]
//! ```

mod build;
mod bundle;
pub mod defaults;
mod error;
mod project;

// Re-export public types used by other modules
pub use bundle::{Format, Platform};
pub use error::ConfigError;

// Internal imports used in this module
use build::BuildConfig;
use bundle::BundleConfig;
use project::ProjectConfig;

use crate::cli::{Cli, Commands};
use anyhow::{Context, Result, bail};
use educe::Educe;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::OnceLock,
};

// ============================================================================
// Helper Functions
// ============================================================================

/// Check that `name` is a plain JavaScript identifier usable with `--define`.
fn is_js_identifier(name: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("valid identifier regex")
    });
    re.is_match(name)
}

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing edgepack.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct PackConfig {
    /// CLI arguments reference
    #[serde(skip)]
    pub cli: Option<&'static Cli>,

    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Version metadata
    #[serde(default)]
    pub project: ProjectConfig,

    /// Pipeline paths
    #[serde(default)]
    pub build: BuildConfig,

    /// Bundler settings
    #[serde(default)]
    pub bundle: BundleConfig,
}

impl PackConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: PackConfig = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content).with_context(|| format!("Invalid config `{}`", path.display()))
    }

    /// Load the config named on the command line and apply CLI overrides.
    ///
    /// A missing `edgepack.toml` means defaults. A missing file passed with
    /// `-C` is an error.
    pub fn load(cli: &'static Cli) -> Result<Self> {
        let root = cli.root.as_deref().unwrap_or(Path::new("./"));
        let path = root.join(cli.config_file());

        let mut config = match (path.exists(), cli.config.is_some()) {
            (true, _) => Self::from_path(&path)?,
            (false, false) => Self::default(),
            (false, true) => bail!("Config file `{}` not found.", path.display()),
        };
        config.update_with_cli(cli);
        Ok(config)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.build.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.build.root = Some(path.to_path_buf())
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &'static Cli) {
        self.cli = Some(cli);

        let root = cli
            .root
            .as_ref()
            .cloned()
            .unwrap_or_else(|| self.get_root().to_owned());

        self.config_path = Self::normalize_path(&root.join(cli.config_file()));
        self.update_path_with_root(&root);

        match &cli.command {
            Commands::Build {
                minify,
                version_override,
                esbuild,
            } => {
                Self::update_option(&mut self.bundle.minify, minify.as_ref());
                if let Some(version) = version_override {
                    self.project.version = Some(version.clone());
                }
                if let Some(command) = esbuild {
                    self.bundle.command = command.split_whitespace().map(str::to_owned).collect();
                }
            }
            Commands::Pages {
                version_override, ..
            } => {
                if let Some(version) = version_override {
                    self.project.version = Some(version.clone());
                }
            }
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Resolve all paths against `root` and normalize them to absolute paths
    pub fn update_path_with_root(&mut self, root: &Path) {
        let root = Self::normalize_path(root);
        self.set_root(&root);

        self.project.metadata = Self::normalize_path(&root.join(&self.project.metadata));
        self.build.assets = Self::normalize_path(&root.join(&self.build.assets));
        self.build.icon = Self::normalize_path(&root.join(&self.build.icon));
        self.build.entry = Self::normalize_path(&root.join(&self.build.entry));

        // Outputs may point outside the project, e.g. `~/deploy/worker.js`
        self.build.outputs = self
            .build
            .outputs
            .iter()
            .map(|output| {
                let expanded = PathBuf::from(shellexpand::tilde(&output.to_string_lossy()).as_ref());
                if expanded.is_relative() {
                    Self::normalize_path(&root.join(expanded))
                } else {
                    Self::normalize_path(&expanded)
                }
            })
            .collect();
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            // For non-existent paths, manually make them absolute
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration for the current command
    pub fn validate(&self) -> Result<()> {
        self.validate_defines()?;

        if self.cli.is_some_and(|cli| cli.is_pages()) {
            return Ok(());
        }

        if self.build.outputs.is_empty() {
            bail!(ConfigError::Validation(
                "[build.outputs] must have at least one element".into()
            ));
        }

        Self::check_command_installed("[bundle.command]", &self.bundle.command, self.get_root())?;

        match &self.build.entry {
            path if !path.exists() => bail!(ConfigError::Validation(format!(
                "[build.entry] `{}` not found",
                path.display()
            ))),
            path if !path.is_file() => bail!(ConfigError::Validation(format!(
                "[build.entry] `{}` is not a file",
                path.display()
            ))),
            _ => {}
        }

        Ok(())
    }

    /// Check define identifiers are usable and distinct
    fn validate_defines(&self) -> Result<()> {
        let bundle = &self.bundle;
        let fixed = [
            ("[bundle.icon_define]", &bundle.icon_define),
            ("[bundle.version_define]", &bundle.version_define),
        ];

        for (field, ident) in fixed {
            if !is_js_identifier(ident) {
                bail!(ConfigError::Validation(format!(
                    "{field} `{ident}` is not a valid identifier"
                )));
            }
        }
        if bundle.icon_define == bundle.version_define {
            bail!(ConfigError::Validation(
                "[bundle.icon_define] and [bundle.version_define] must differ".into()
            ));
        }

        for ident in bundle.pages.keys() {
            if !is_js_identifier(ident) {
                bail!(ConfigError::Validation(format!(
                    "[bundle.pages] key `{ident}` is not a valid identifier"
                )));
            }
            if ident == &bundle.icon_define || ident == &bundle.version_define {
                bail!(ConfigError::Validation(format!(
                    "[bundle.pages] key `{ident}` collides with a reserved define"
                )));
            }
        }

        Ok(())
    }

    /// Check if a command is installed and available
    fn check_command_installed(field: &str, command: &[String], root: &Path) -> Result<()> {
        if command.is_empty() {
            bail!(ConfigError::Validation(format!(
                "{field} must have at least one element"
            )));
        }

        let cmd = &command[0];
        which::which_in(cmd, std::env::var_os("PATH"), root)
            .with_context(|| format!("`{cmd}` not found. Please install it first."))?;

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
