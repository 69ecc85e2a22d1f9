//! In-memory depth index built from a whole pileup file.
//!
//! Callers query through [`DepthLookup`]; [`DepthIndex`] answers with a
//! linear scan over the records in file order.

use crate::errors::{AppError, LengthMismatch, Result};
use crate::pileup::{PileupRecord, parse_pileup_line};
use crate::progress::LoadProgress;
use crate::region::GenomicRegion;
use crate::utils::open_text_reader;
use std::io::BufRead;
use std::path::Path;
use tracing::{info, warn};

/// Read-only positional depth queries.
pub trait DepthLookup: Sync {
    /// Depths of every indexed position inside `region`.
    fn region_depths<'a>(
        &'a self,
        region: &'a GenomicRegion,
    ) -> Box<dyn Iterator<Item = u32> + 'a>;

    /// `(chromosome, depth)` for every indexed position.
    fn contig_depths(&self) -> Box<dyn Iterator<Item = (&str, u32)> + '_>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub line_number: usize,
    pub chromosome: String,
    pub position: u64,
    pub mismatch: LengthMismatch,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub records: usize,
    pub records_without_calls: usize,
    /// Records whose calls could not be aligned with their qualities. Their
    /// depth stays indexed; their calls are dropped.
    pub skipped: Vec<SkippedRecord>,
}

#[derive(Debug, Clone, Default)]
pub struct DepthIndex {
    records: Vec<PileupRecord>,
}

impl DepthIndex {
    pub fn from_records(records: Vec<PileupRecord>) -> Self {
        Self { records }
    }

    /// Loads a pileup file, gzip-compressed when the name ends in `.gz`.
    pub fn from_path(path: &Path, progress: &mut LoadProgress) -> Result<(Self, LoadSummary)> {
        let source_name = path.display().to_string();
        info!(input = %source_name, "loading pileup");
        let reader = open_text_reader(path)?;
        Self::from_reader(reader, &source_name, progress)
    }

    /// Parses every line of `reader`. A malformed line aborts the load; a
    /// record whose calls do not align with its qualities is logged, counted
    /// and kept without calls.
    pub fn from_reader<R: BufRead>(
        mut reader: R,
        source_name: &str,
        progress: &mut LoadProgress,
    ) -> Result<(Self, LoadSummary)> {
        let mut records = Vec::new();
        let mut summary = LoadSummary::default();
        let mut buffer = Vec::with_capacity(256);
        let mut line_number = 0usize;

        loop {
            buffer.clear();
            let read = reader
                .read_until(b'\n', &mut buffer)
                .map_err(|source| AppError::InputRead {
                    source_name: source_name.to_string(),
                    line_number: line_number + 1,
                    source,
                })?;
            if read == 0 {
                break;
            }
            line_number += 1;
            let line = std::str::from_utf8(&buffer).map_err(|err| AppError::MalformedLine {
                source_name: source_name.to_string(),
                line_number,
                reason: format!("invalid UTF-8: {err}"),
            })?;
            if line.trim().is_empty() {
                continue;
            }

            let raw = parse_pileup_line(line).map_err(|reason| AppError::MalformedLine {
                source_name: source_name.to_string(),
                line_number,
                reason,
            })?;

            let record = match raw.into_record() {
                Ok(record) => record,
                Err(mismatch) => {
                    let locus = format!("{}:{}", raw.chromosome, raw.position);
                    warn!(
                        input = %source_name,
                        line = line_number,
                        locus = %locus,
                        calls = mismatch.calls,
                        qualities = mismatch.qualities,
                        "skipping calls of record with misaligned qualities"
                    );
                    progress.on_skipped();
                    summary.skipped.push(SkippedRecord {
                        line_number,
                        chromosome: raw.chromosome.to_string(),
                        position: raw.position,
                        mismatch,
                    });
                    PileupRecord {
                        chromosome: raw.chromosome.to_string(),
                        position: raw.position,
                        reference_base: raw.reference_base,
                        depth: raw.depth,
                        calls: None,
                    }
                }
            };

            if record.calls.is_none() && raw.qualities.is_empty() {
                summary.records_without_calls += 1;
            }
            progress.on_loaded(&record.chromosome, record.position);
            records.push(record);
        }

        summary.records = records.len();
        progress.finish();
        info!(
            input = %source_name,
            records = summary.records,
            without_calls = summary.records_without_calls,
            skipped = summary.skipped.len(),
            "pileup loaded"
        );
        Ok((Self { records }, summary))
    }

}

impl DepthLookup for DepthIndex {
    fn region_depths<'a>(
        &'a self,
        region: &'a GenomicRegion,
    ) -> Box<dyn Iterator<Item = u32> + 'a> {
        Box::new(
            self.records
                .iter()
                .filter(move |record| region.contains(&record.chromosome, record.position))
                .map(|record| record.depth),
        )
    }

    fn contig_depths(&self) -> Box<dyn Iterator<Item = (&str, u32)> + '_> {
        Box::new(
            self.records
                .iter()
                .map(|record| (record.chromosome.as_str(), record.depth)),
        )
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}
