use crate::cli::{GeneDepthArgs, GeneSource, PileupSource};
use crate::depth_index::{DepthIndex, LoadSummary};
use crate::errors::{AppError, Result};
use crate::external_tools::{
    ExternalTools, MPILEUP_DIRECTORY, mpileup_output_path, prepare_output_directory,
};
use crate::gene_table::GeneCatalog;
use crate::progress::LoadProgress;
use crate::report::{GeneDepthReport, build_gene_depth_report};
use crate::uniformity::{average_depth, uniformity};
use crate::writer::{self, QcSummary};
use rayon::ThreadPoolBuilder;
use std::path::PathBuf;
use tracing::{info, warn};

/// Everything one run produces, before it is written out.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: GeneDepthReport,
    pub summary: QcSummary,
}

pub fn run(args: &GeneDepthArgs) -> Result<()> {
    info!(
        output = %args.output,
        threads = args.threads,
        excluded_contig = %args.excluded_contig,
        "starting gene depth run"
    );

    let catalog = load_catalog(&args.genes)?;
    info!(genes = catalog.len(), "gene catalog loaded");

    let pileup_path = resolve_pileup(args)?;
    let mut progress = LoadProgress::new(args.progress, &pileup_path.display().to_string());
    let (index, load_summary) = DepthIndex::from_path(&pileup_path, &mut progress)?;

    let outcome = if args.threads > 1 {
        let pool = ThreadPoolBuilder::new()
            .num_threads(args.threads)
            .build()
            .map_err(|err| AppError::InvalidValue {
                flag: "--threads".to_string(),
                value: args.threads.to_string(),
                reason: err.to_string(),
            })?;
        pool.install(|| evaluate(&index, &load_summary, &catalog, &args.excluded_contig, true))
    } else {
        evaluate(&index, &load_summary, &catalog, &args.excluded_contig, false)
    };

    writer::with_text_output_writer(&args.output, |out| {
        writer::write_report(out, &outcome.report)
    })?;
    for note in &outcome.report.notes {
        warn!("{note}");
    }
    if let Some(summary_path) = &args.summary {
        writer::with_text_output_writer(summary_path, |out| {
            writer::write_summary(out, &outcome.summary)
        })?;
    }

    info!(
        genes = outcome.report.rows.len(),
        lookup_misses = outcome.summary.lookup_misses,
        skipped_records = outcome.summary.skipped_records,
        "completed gene depth run"
    );
    Ok(())
}

/// Aggregates a loaded index into the gene report and QC summary.
pub fn evaluate(
    index: &DepthIndex,
    load_summary: &LoadSummary,
    catalog: &GeneCatalog,
    excluded_contig: &str,
    parallel: bool,
) -> RunOutcome {
    let report = build_gene_depth_report(index, catalog, parallel);
    let summary = QcSummary {
        average_depth: average_depth(index),
        uniformity: uniformity(index, excluded_contig),
        records: load_summary.records,
        records_without_calls: load_summary.records_without_calls,
        skipped_records: load_summary.skipped.len(),
        lookup_misses: report.lookup_misses(),
        notes: report.notes.clone(),
    };

    match summary.uniformity {
        Some(value) => info!(
            uniformity = value,
            average_depth = ?summary.average_depth,
            "coverage uniformity"
        ),
        None => warn!(
            excluded_contig = %excluded_contig,
            "no positions outside the excluded contig; uniformity undefined"
        ),
    }
    if !load_summary.skipped.is_empty() {
        warn!(
            skipped = load_summary.skipped.len(),
            "records with misaligned base qualities were dropped from the call set"
        );
    }

    RunOutcome { report, summary }
}

fn load_catalog(source: &GeneSource) -> Result<GeneCatalog> {
    match source {
        GeneSource::Direct(path) => {
            info!(table = %path.display(), "loading direct gene table");
            GeneCatalog::load_direct(path)
        }
        GeneSource::CrossReference {
            coordinates,
            gene_list,
        } => {
            info!(
                coordinates = %coordinates.display(),
                gene_list = %gene_list.display(),
                "loading cross-referenced gene table"
            );
            GeneCatalog::load_cross_reference(coordinates, gene_list)
        }
    }
}

fn resolve_pileup(args: &GeneDepthArgs) -> Result<PathBuf> {
    match &args.pileup {
        PileupSource::File(path) => Ok(path.clone()),
        PileupSource::Samtools {
            bam,
            fasta,
            bed,
            outdir,
            prefix,
            overwrite,
        } => {
            let tools = ExternalTools::from_args(args);
            let output_directory = prepare_output_directory(outdir, MPILEUP_DIRECTORY, *overwrite)?;
            let output = mpileup_output_path(&output_directory, prefix);
            tools.run_samtools_mpileup(bam, fasta, bed, &output)?;
            Ok(output)
        }
    }
}
