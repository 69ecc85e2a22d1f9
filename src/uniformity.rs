use crate::depth_index::DepthLookup;
use crate::utils::round_depth;

pub const MITOCHONDRIAL_CONTIG: &str = "chrM";

/// Fraction of positions whose depth reaches half the sample mean depth.
///
/// The mean is taken over positions outside `excluded_contig`, while the
/// fraction is taken over every position, excluded contig included.
/// Returns `None` when no position outside `excluded_contig` exists.
pub fn uniformity<L: DepthLookup + ?Sized>(index: &L, excluded_contig: &str) -> Option<f64> {
    let (total, count) = index
        .contig_depths()
        .filter(|(chromosome, _)| *chromosome != excluded_contig)
        .fold((0u64, 0u64), |(total, count), (_, depth)| {
            (total + u64::from(depth), count + 1)
        });
    if count == 0 {
        return None;
    }
    let threshold = total as f64 / count as f64 / 2.0;

    let (passing, positions) = index
        .contig_depths()
        .fold((0u64, 0u64), |(passing, positions), (_, depth)| {
            let score = u64::from(f64::from(depth) >= threshold);
            (passing + score, positions + 1)
        });
    Some(passing as f64 / positions as f64)
}

/// Mean depth over every indexed position, rounded to two decimals.
pub fn average_depth<L: DepthLookup + ?Sized>(index: &L) -> Option<f64> {
    let (total, count) = index
        .contig_depths()
        .fold((0u64, 0u64), |(total, count), (_, depth)| {
            (total + u64::from(depth), count + 1)
        });
    (count > 0).then(|| round_depth(total as f64 / count as f64))
}
