//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Config file looked up when `-C` is not given.
pub const DEFAULT_CONFIG: &str = "edgepack.toml";

/// edgepack worker asset bundler CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root directory (default: current directory)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Config file, relative to root (default: edgepack.toml, optional)
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Assemble pages, bundle the worker and write every output
    Build {
        /// Minify the bundle syntax
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        minify: Option<bool>,

        /// Use this version instead of the one in the metadata file
        #[arg(long = "version-override", value_name = "VERSION")]
        version_override: Option<String>,

        /// Bundler command, e.g. "npx esbuild"
        #[arg(long, value_name = "COMMAND")]
        esbuild: Option<String>,
    },

    /// Assemble pages only and print them as JSON
    Pages {
        /// Print only the JSON literal of this page
        #[arg(short, long)]
        key: Option<String>,

        /// Use this version instead of the one in the metadata file
        #[arg(long = "version-override", value_name = "VERSION")]
        version_override: Option<String>,
    },
}

impl Cli {
    pub const fn is_build(&self) -> bool {
        matches!(self.command, Commands::Build { .. })
    }
    pub const fn is_pages(&self) -> bool {
        matches!(self.command, Commands::Pages { .. })
    }

    /// Config file given with `-C`, or [`DEFAULT_CONFIG`].
    pub fn config_file(&self) -> &Path {
        self.config.as_deref().unwrap_or(Path::new(DEFAULT_CONFIG))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build() {
        let cli = Cli::try_parse_from(["edgepack", "build", "--minify", "--version-override", "9.9.9"])
            .unwrap();
        assert!(cli.is_build());
        match &cli.command {
            Commands::Build {
                minify,
                version_override,
                esbuild,
            } => {
                assert_eq!(*minify, Some(true));
                assert_eq!(version_override.as_deref(), Some("9.9.9"));
                assert_eq!(*esbuild, None);
            }
            Commands::Pages { .. } => unreachable!(),
        }
        assert_eq!(cli.config, None);
        assert_eq!(cli.config_file(), Path::new(DEFAULT_CONFIG));
    }

    #[test]
    fn test_parse_pages_with_root() {
        let cli = Cli::try_parse_from(["edgepack", "--root", "site", "pages", "-k", "login"]).unwrap();
        assert!(cli.is_pages());
        assert_eq!(cli.root, Some(PathBuf::from("site")));
        match cli.command {
            Commands::Pages { key, .. } => assert_eq!(key.as_deref(), Some("login")),
            Commands::Build { .. } => unreachable!(),
        }
    }

    #[test]
    fn test_parse_explicit_config() {
        let cli = Cli::try_parse_from(["edgepack", "-C", "deploy.toml", "pages"]).unwrap();
        assert_eq!(cli.config_file(), Path::new("deploy.toml"));
    }

    #[test]
    fn test_minify_explicit_false() {
        let cli = Cli::try_parse_from(["edgepack", "build", "--minify", "false"]).unwrap();
        match cli.command {
            Commands::Build { minify, .. } => assert_eq!(minify, Some(false)),
            Commands::Pages { .. } => unreachable!(),
        }
    }
}
