//! Training-corpus export.
//!
//! Writes every canonical unit at or above the token threshold to a plain
//! text file, one unit per line. Units are read in fingerprint-ordered
//! batches; the batch order is shuffled with a seeded generator, so two
//! exports from equal stores produce byte-identical files even when the
//! stores were built under different worker interleavings.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::ExportSummary;
use crate::storage::SharedCorpusRepository;

/// Export parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Minimum whitespace-token count a unit needs to be exported.
    pub min_tokens: u32,

    /// Units per batch; the unit of shuffling.
    pub batch_size: u64,

    /// Seed for the batch-order shuffle.
    pub seed: u64,

    /// Lowercase each line at write time.
    pub lowercase: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            min_tokens: 5,
            batch_size: 10_000,
            seed: 1234,
            lowercase: false,
        }
    }
}

/// Export the canonical units to `destination`.
///
/// Any existing file at `destination` is removed first, so a rerun never
/// appends to stale output. Batches are streamed; only one batch is held in
/// memory at a time.
pub fn export(
    repo: &SharedCorpusRepository,
    opts: &ExportOptions,
    destination: impl AsRef<Path>,
) -> Result<ExportSummary> {
    let destination = destination.as_ref();
    let started = Instant::now();

    if destination.exists() {
        std::fs::remove_file(destination)?;
    }
    if let Some(parent) = destination.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let total = repo.canonical_count(opts.min_tokens)?;
    let batches = total.div_ceil(opts.batch_size);

    tracing::info!(
        units = total,
        batches,
        min_tokens = opts.min_tokens,
        seed = opts.seed,
        path = %destination.display(),
        "exporting corpus"
    );

    let mut batch_order: Vec<u64> = (0..batches).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(opts.seed);
    batch_order.shuffle(&mut rng);

    let file = File::create(destination)?;
    let mut writer = BufWriter::new(file);
    let mut lines_written = 0u64;

    for batch in &batch_order {
        let offset = batch * opts.batch_size;
        let page = repo.canonical_page(opts.min_tokens, opts.batch_size, offset)?;
        for text in page {
            if opts.lowercase {
                writeln!(writer, "{}", text.to_lowercase())?;
            } else {
                writeln!(writer, "{text}")?;
            }
            lines_written += 1;
        }
    }
    writer.flush()?;

    let summary = ExportSummary {
        lines_written,
        batches,
        elapsed_ms: started.elapsed().as_millis() as u64,
    };
    tracing::info!(
        lines = summary.lines_written,
        elapsed_ms = summary.elapsed_ms,
        "export completed"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::mock_factory;

    fn seeded_repo(lines: &[&str]) -> SharedCorpusRepository {
        let repo = mock_factory()().unwrap();
        for line in lines {
            repo.observe_canonical(line).unwrap();
        }
        repo
    }

    #[test]
    fn test_threshold_filters_short_units() {
        let repo = seeded_repo(&[
            "zu kurz",
            "fünf wörter sind genau genug",
            "dieser satz hat sogar noch mehr wörter",
        ]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("threshold.txt");
        let summary = export(&repo, &ExportOptions::default(), &path).unwrap();
        assert_eq!(summary.lines_written, 2);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("zu kurz"));
        assert!(content.contains("fünf wörter sind genau genug"));
    }

    #[test]
    fn test_same_seed_is_byte_identical() {
        let lines: Vec<String> = (0..25)
            .map(|i| format!("satz nummer {i} mit fünf wörtern dahinter"))
            .collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let repo = seeded_repo(&refs);

        let opts = ExportOptions {
            batch_size: 4,
            ..Default::default()
        };
        let dir = tempfile::tempdir().unwrap();
        let path_a = dir.path().join("seed-a.txt");
        let path_b = dir.path().join("seed-b.txt");
        export(&repo, &opts, &path_a).unwrap();
        export(&repo, &opts, &path_b).unwrap();

        let a = std::fs::read(&path_a).unwrap();
        let b = std::fs::read(&path_b).unwrap();
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn test_different_seed_reorders_batches() {
        let lines: Vec<String> = (0..40)
            .map(|i| format!("zeile {i} mit ausreichend vielen wörtern hier"))
            .collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let repo = seeded_repo(&refs);

        let dir = tempfile::tempdir().unwrap();
        let path_a = dir.path().join("order-a.txt");
        let path_b = dir.path().join("order-b.txt");
        let opts_a = ExportOptions {
            batch_size: 4,
            seed: 1,
            ..Default::default()
        };
        let opts_b = ExportOptions {
            batch_size: 4,
            seed: 2,
            ..Default::default()
        };
        export(&repo, &opts_a, &path_a).unwrap();
        export(&repo, &opts_b, &path_b).unwrap();

        let a = std::fs::read_to_string(&path_a).unwrap();
        let b = std::fs::read_to_string(&path_b).unwrap();
        assert_ne!(a, b);

        // Same content, different order.
        let mut lines_a: Vec<&str> = a.lines().collect();
        let mut lines_b: Vec<&str> = b.lines().collect();
        lines_a.sort_unstable();
        lines_b.sort_unstable();
        assert_eq!(lines_a, lines_b);
    }

    #[test]
    fn test_existing_destination_replaced() {
        let repo = seeded_repo(&["eine zeile mit fünf wörtern drin"]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("replace.txt");
        std::fs::write(&path, "alte reste\nnoch mehr alte reste\n").unwrap();

        let summary = export(&repo, &ExportOptions::default(), &path).unwrap();
        assert_eq!(summary.lines_written, 1);
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "eine zeile mit fünf wörtern drin\n");
    }

    #[test]
    fn test_empty_store_writes_empty_file() {
        let repo = mock_factory()().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        let summary = export(&repo, &ExportOptions::default(), &path).unwrap();
        assert_eq!(summary.lines_written, 0);
        assert_eq!(summary.batches, 0);
        assert!(std::fs::read_to_string(&path).unwrap().is_empty());
    }

    #[test]
    fn test_lowercase_at_write_time() {
        let repo = seeded_repo(&["Fünf Wörter Sind Genau Genug"]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lower.txt");
        let opts = ExportOptions {
            lowercase: true,
            ..Default::default()
        };
        export(&repo, &opts, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "fünf wörter sind genau genug\n");
    }
}
