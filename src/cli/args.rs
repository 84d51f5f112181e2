//! Command-line interface definitions.

use clap::{ColorChoice, Parser};
use std::path::PathBuf;

/// Inject subresource integrity attributes into HTML documents
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: sri.toml, searched upward; any other name must exist)
    #[arg(short = 'C', long, default_value = crate::config::DEFAULT_CONFIG_NAME, value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// HTML files or directories to process
    #[arg(value_name = "PATH", required = true, value_hint = clap::ValueHint::AnyPath)]
    pub paths: Vec<PathBuf>,

    /// Digest algorithm (sha256, sha384, sha512)
    #[arg(short, long)]
    pub algorithm: Option<String>,

    /// CSS selector for candidate elements
    #[arg(short, long)]
    pub selector: Option<String>,

    /// Prefix stripped from references (e.g. a CDN origin)
    #[arg(short, long)]
    pub prefix: Option<String>,

    /// Resolve references against each document's own directory
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub relative: Option<bool>,

    /// Reuse parsed markup across passes over the same document
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub cache_parsed: Option<bool>,

    /// Root directory for base-relative resolution
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub base: Option<PathBuf>,

    /// Write results under this directory instead of in place
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Show skipped elements and other details
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let cli = Cli::try_parse_from(["srihash", "dist"]).unwrap();
        assert_eq!(cli.paths, [PathBuf::from("dist")]);
        assert_eq!(cli.config, PathBuf::from("sri.toml"));
        assert_eq!(cli.algorithm, None);
        assert_eq!(cli.relative, None);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_parse_overrides() {
        let cli = Cli::try_parse_from([
            "srihash",
            "-a",
            "sha512",
            "--prefix",
            "https://secure.com",
            "-r",
            "--cache-parsed",
            "false",
            "-o",
            "out",
            "a.html",
            "b.html",
        ])
        .unwrap();
        assert_eq!(cli.algorithm.as_deref(), Some("sha512"));
        assert_eq!(cli.prefix.as_deref(), Some("https://secure.com"));
        assert_eq!(cli.relative, Some(true));
        assert_eq!(cli.cache_parsed, Some(false));
        assert_eq!(cli.output, Some(PathBuf::from("out")));
        assert_eq!(cli.paths.len(), 2);
    }

    #[test]
    fn test_paths_required() {
        assert!(Cli::try_parse_from(["srihash"]).is_err());
    }
}
