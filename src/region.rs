use std::fmt;

use crate::depth_index::DepthLookup;
use crate::errors::{AppError, Result};
use crate::utils::round_depth;

/// Inclusive, 1-based chromosome interval.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenomicRegion {
    pub chromosome: String,
    pub start: u64,
    pub end: u64,
}

impl GenomicRegion {
    pub fn new(chromosome: impl Into<String>, start: u64, end: u64) -> Result<Self> {
        let chromosome = chromosome.into();
        if start > end {
            return Err(AppError::InvalidRegion {
                region: format!("{chromosome}:{start}-{end}"),
                reason: "start is greater than end".to_string(),
            });
        }
        Ok(Self {
            chromosome,
            start,
            end,
        })
    }

    /// Zero-length stand-in for genes missing from the coordinate table.
    /// No pileup position is 0, so it never matches a record.
    pub fn placeholder() -> Self {
        Self {
            chromosome: "chr1".to_string(),
            start: 0,
            end: 0,
        }
    }

    pub fn contains(&self, chromosome: &str, position: u64) -> bool {
        self.chromosome == chromosome && self.start <= position && position <= self.end
    }
}

impl fmt::Display for GenomicRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.chromosome, self.start, self.end)
    }
}

/// Mean depth over every indexed position inside `region`, rounded to two
/// decimals. A region without indexed positions yields exactly `0.0`.
pub fn calc_region_depth<L: DepthLookup + ?Sized>(index: &L, region: &GenomicRegion) -> f64 {
    let (total, count) = index
        .region_depths(region)
        .fold((0u64, 0u64), |(total, count), depth| {
            (total + u64::from(depth), count + 1)
        });
    if count == 0 {
        return 0.0;
    }
    round_depth(total as f64 / count as f64)
}

#[cfg(test)]
mod tests {
    use super::{GenomicRegion, calc_region_depth};
    use crate::depth_index::DepthIndex;
    use crate::pileup::PileupRecord;

    fn record(chromosome: &str, position: u64, depth: u32) -> PileupRecord {
        PileupRecord {
            chromosome: chromosome.to_string(),
            position,
            reference_base: 'A',
            depth,
            calls: None,
        }
    }

    #[test]
    fn averages_depth_inside_inclusive_bounds() {
        let index = DepthIndex::from_records(vec![
            record("chr1", 9, 1000),
            record("chr1", 10, 10),
            record("chr1", 11, 20),
            record("chr1", 12, 30),
            record("chr1", 13, 1000),
            record("chr2", 11, 1000),
        ]);
        let region = GenomicRegion::new("chr1", 10, 12).expect("valid region");
        assert_eq!(calc_region_depth(&index, &region), 20.0);
    }

    #[test]
    fn region_without_positions_is_zero() {
        let index = DepthIndex::from_records(vec![record("chr1", 10, 10)]);
        let region = GenomicRegion::new("chr3", 10, 12).expect("valid region");
        let depth = calc_region_depth(&index, &region);
        assert_eq!(depth, 0.0);
        assert!(!depth.is_nan());
        assert_eq!(calc_region_depth(&index, &GenomicRegion::placeholder()), 0.0);
    }

    #[test]
    fn rounds_mean_to_two_decimals() {
        let index = DepthIndex::from_records(vec![
            record("chr1", 1, 1),
            record("chr1", 2, 2),
            record("chr1", 3, 2),
        ]);
        let region = GenomicRegion::new("chr1", 1, 3).expect("valid region");
        assert_eq!(calc_region_depth(&index, &region), 1.67);
    }

    #[test]
    fn displays_region_text() {
        let region = GenomicRegion::new("chr17", 7571720, 7590868).expect("valid region");
        assert_eq!(region.to_string(), "chr17:7571720-7590868");
        assert!(GenomicRegion::new("chr1", 20, 10).is_err());
    }
}
