use crate::cleaner::{CleanedCalls, clean_calls};
use crate::errors::LengthMismatch;

const PILEUP_FIELDS: usize = 6;

/// One column of `samtools mpileup` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PileupRecord {
    pub chromosome: String,
    pub position: u64,
    pub reference_base: char,
    pub depth: u32,
    /// Cleaned base calls and qualities; `None` when the quality field was empty.
    pub calls: Option<CleanedCalls>,
}

impl PileupRecord {
    pub fn bases(&self) -> &str {
        self.calls.as_ref().map_or("", |calls| calls.bases.as_str())
    }

    pub fn qualities(&self) -> &str {
        self.calls.as_ref().map_or("", |calls| calls.qualities.as_str())
    }
}

/// Raw, not yet cleaned, fields of a pileup line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawPileupLine<'a> {
    pub chromosome: &'a str,
    pub position: u64,
    pub reference_base: char,
    pub depth: u32,
    pub bases: &'a str,
    pub qualities: &'a str,
}

impl RawPileupLine<'_> {
    /// Cleans the call pair into a record. A line with an empty quality
    /// field yields a record without call data.
    pub fn into_record(self) -> Result<PileupRecord, LengthMismatch> {
        let calls = if self.qualities.is_empty() {
            None
        } else {
            Some(clean_calls(self.bases, self.qualities)?)
        };
        Ok(PileupRecord {
            chromosome: self.chromosome.to_string(),
            position: self.position,
            reference_base: self.reference_base,
            depth: self.depth,
            calls,
        })
    }
}

/// Splits one pileup line into its six fields. The error string describes
/// what is wrong; the caller attaches the source and line number.
pub fn parse_pileup_line(line: &str) -> Result<RawPileupLine<'_>, String> {
    let line = line.trim_end_matches(['\n', '\r']);
    let fields = line.split('\t').collect::<Vec<_>>();
    if fields.len() != PILEUP_FIELDS {
        return Err(format!(
            "expected {PILEUP_FIELDS} tab-separated fields, found {}",
            fields.len()
        ));
    }

    let position = fields[1]
        .parse::<u64>()
        .map_err(|_| format!("invalid position: {:?}", fields[1]))?;
    if position == 0 {
        return Err("position must be 1-based".to_string());
    }
    let depth = fields[3]
        .parse::<u32>()
        .map_err(|_| format!("invalid depth: {:?}", fields[3]))?;
    let reference_base = fields[2]
        .chars()
        .next()
        .map_or('N', |base| base.to_ascii_uppercase());

    Ok(RawPileupLine {
        chromosome: fields[0],
        position,
        reference_base,
        depth,
        bases: fields[4],
        qualities: fields[5],
    })
}
