use crate::depth_index::DepthLookup;
use crate::gene_table::{GeneCatalog, ResolvedGene};
use crate::region::calc_region_depth;
use rayon::prelude::*;

pub const REPORT_HEADER: [&str; 3] = ["HUGO_SYMBOL", "DEPTH", "VARIANT_GROUP_ID"];
pub const GENE_GROUP_ID: &str = "GENE";

#[derive(Debug, Clone, PartialEq)]
pub struct DepthReportRow {
    pub gene_symbol: String,
    pub depth: f64,
    pub group_id: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneDepthReport {
    pub rows: Vec<DepthReportRow>,
    /// One note per gene that fell back to the placeholder region.
    pub notes: Vec<String>,
}

impl GeneDepthReport {
    pub fn lookup_misses(&self) -> usize {
        self.notes.len()
    }
}

/// Mean depth of every catalog gene, in catalog order. With `parallel` the
/// region scans fan out over the current rayon pool.
pub fn build_gene_depth_report<L: DepthLookup + ?Sized>(
    index: &L,
    catalog: &GeneCatalog,
    parallel: bool,
) -> GeneDepthReport {
    let genes = catalog.resolve();

    let mut notes = Vec::new();
    for gene in genes.iter().filter(|gene| gene.lookup_miss) {
        notes.push(format!("{} gene not in gene_table.", gene.symbol));
    }

    let depth_row = |gene: &ResolvedGene| DepthReportRow {
        gene_symbol: gene.symbol.clone(),
        depth: calc_region_depth(index, &gene.region),
        group_id: GENE_GROUP_ID,
    };
    let rows = if parallel {
        genes.par_iter().map(depth_row).collect()
    } else {
        genes.iter().map(depth_row).collect()
    };

    GeneDepthReport { rows, notes }
}
