//! The `srihash` run: collect documents, push them through the pipeline,
//! write the results.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::Cli;
use super::source::{Source, collect_sources};
use crate::config::SriOptions;
use crate::logger::ProgressLine;
use crate::sri::{Processed, SriPipeline};
use crate::utils::plural::plural_count;
use crate::{debug, log};

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub documents: usize,
    pub written: usize,
    pub updated: usize,
}

/// Entry point for the command line.
pub fn run(cli: &Cli) -> Result<()> {
    let options = SriOptions::load(cli)?;
    let sources = collect_sources(&cli.paths, options.base.as_deref());
    if sources.is_empty() {
        log!("sri"; "no html documents found");
        return Ok(());
    }

    let summary = inject_all(&options, &sources)?;
    log!(
        "sri";
        "{} updated in {}, {} written",
        plural_count(summary.updated, "element"),
        plural_count(summary.documents, "document"),
        plural_count(summary.written, "file"),
    );
    Ok(())
}

/// Run one invocation over `sources`.
pub fn inject_all(options: &SriOptions, sources: &[Source]) -> Result<RunSummary> {
    let mut pipeline = SriPipeline::from_options(options)?;
    let config = pipeline.config();
    debug!("config"; "algorithm {}, selector `{}`, prefix `{}`", config.algorithm, config.selector, config.prefix);

    let progress = ProgressLine::new("documents", sources.len());
    let mut written = 0;
    for source in sources {
        let document = source.load()?;
        let processed = pipeline.process(document)?;
        if write_processed(&processed, source, options.output.as_deref())? {
            written += 1;
        }
        pipeline.release(&processed.document);
        progress.inc();
    }
    progress.finish();

    let stats = pipeline.stats();
    debug!("cache"; "{} hits, {} misses", stats.hits, stats.misses);

    Ok(RunSummary {
        documents: pipeline.documents(),
        written,
        updated: pipeline.totals().updated,
    })
}

/// Write a processed document, returning whether a file was written.
///
/// With an output directory every buffered document is mirrored there;
/// otherwise only changed documents are rewritten in place.
fn write_processed(processed: &Processed, source: &Source, output: Option<&Path>) -> Result<bool> {
    let Some(bytes) = processed.document.bytes() else {
        return Ok(false);
    };

    let dest = match output {
        Some(dir) => dir.join(source.relative_path()),
        None if processed.report.changed() => source.path.clone(),
        None => return Ok(false),
    };

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(&dest, bytes).with_context(|| format!("Failed to write {}", dest.display()))?;
    debug!("write"; "{}", dest.display());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sri::Algorithm;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const JS: &str = "alert(1)";

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("js")).unwrap();
        fs::create_dir_all(root.join("blog")).unwrap();
        fs::write(root.join("js/app.js"), JS).unwrap();
        fs::write(root.join("index.html"), r#"<script src="/js/app.js"></script>"#).unwrap();
        fs::write(root.join("blog/index.html"), "<p>nothing here</p>").unwrap();
        dir
    }

    #[test]
    fn test_in_place_writes_changed_only() {
        let dir = site();
        let sources = collect_sources(&[dir.path().to_path_buf()], None);
        let summary = inject_all(&SriOptions::default(), &sources).unwrap();

        assert_eq!(summary, RunSummary { documents: 2, written: 1, updated: 1 });
        let index = fs::read_to_string(dir.path().join("index.html")).unwrap();
        assert!(index.contains(&Algorithm::Sha384.integrity(JS.as_bytes())));
        let blog = fs::read_to_string(dir.path().join("blog/index.html")).unwrap();
        assert_eq!(blog, "<p>nothing here</p>");
    }

    #[test]
    fn test_output_dir_mirrors_tree() {
        let dir = site();
        let out = TempDir::new().unwrap();
        let sources = collect_sources(&[dir.path().to_path_buf()], None);
        let options = SriOptions {
            output: Some(out.path().to_path_buf()),
            ..SriOptions::default()
        };
        let summary = inject_all(&options, &sources).unwrap();

        assert_eq!(summary.written, 2);
        assert!(out.path().join("blog/index.html").is_file());
        let index = fs::read_to_string(out.path().join("index.html")).unwrap();
        assert!(index.contains("integrity=\"sha384-"));

        // Sources stay untouched
        let original = fs::read_to_string(dir.path().join("index.html")).unwrap();
        assert_eq!(original, r#"<script src="/js/app.js"></script>"#);
    }

    #[test]
    fn test_second_run_is_noop() {
        let dir = site();
        let sources = collect_sources(&[dir.path().to_path_buf()], None);
        inject_all(&SriOptions::default(), &sources).unwrap();
        let first = fs::read_to_string(dir.path().join("index.html")).unwrap();

        let summary = inject_all(&SriOptions::default(), &sources).unwrap();
        assert_eq!(summary.written, 0);
        assert_eq!(fs::read_to_string(dir.path().join("index.html")).unwrap(), first);
    }

    #[test]
    fn test_invalid_algorithm_touches_nothing() {
        let dir = site();
        let sources = collect_sources(&[dir.path().to_path_buf()], None);
        let options = SriOptions {
            algorithm: "sha1".into(),
            ..SriOptions::default()
        };
        assert!(inject_all(&options, &sources).is_err());
        let index = fs::read_to_string(dir.path().join("index.html")).unwrap();
        assert_eq!(index, r#"<script src="/js/app.js"></script>"#);
    }

    #[cfg(unix)]
    #[test]
    fn test_stream_source_aborts_run() {
        let sources = collect_sources(&[PathBuf::from("/dev/null")], None);
        let err = inject_all(&SriOptions::default(), &sources).unwrap_err();
        assert!(err.to_string().contains("Streams are not supported!"));
    }

    #[test]
    fn test_missing_path_passes_through() {
        let dir = site();
        let sources = collect_sources(&[dir.path().join("missing.html")], None);
        let summary = inject_all(&SriOptions::default(), &sources).unwrap();
        assert_eq!(summary, RunSummary { documents: 1, written: 0, updated: 0 });
        assert!(!dir.path().join("missing.html").exists());
    }
}
