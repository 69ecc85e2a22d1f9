pub mod cleaner;
pub mod cli;
pub mod depth_index;
pub mod errors;
pub mod external_tools;
pub mod gene_table;
pub mod pileup;
pub mod pipeline;
pub mod progress;
pub mod region;
pub mod report;
pub mod uniformity;
pub mod utils;
pub mod writer;

use cli::GeneDepthArgs;
use errors::Result;
use std::sync::Once;
use tracing_subscriber::EnvFilter;

pub use depth_index::{DepthIndex, DepthLookup, LoadSummary};
pub use gene_table::{GeneCatalog, GeneEntry};
pub use region::{GenomicRegion, calc_region_depth};
pub use report::{DepthReportRow, GeneDepthReport, build_gene_depth_report};
pub use uniformity::{average_depth, uniformity};

static TRACING_INIT: Once = Once::new();

pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

pub fn run_from_args(args: GeneDepthArgs) -> Result<()> {
    pipeline::run(&args)
}
