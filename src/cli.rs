use crate::errors::{AppError, Result};
use crate::uniformity::MITOCHONDRIAL_CONTIG;
use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "gene-depth",
    version,
    about = "Per-gene mean depth and coverage uniformity from samtools mpileup output"
)]
struct CliArgs {
    /// Existing pileup file (plain or .gz)
    #[arg(short = 'p', long = "pileup")]
    pileup: Option<PathBuf>,
    /// Recalibrated BAM to pile up with samtools first
    #[arg(short = 'b', long = "bam")]
    bam: Option<PathBuf>,
    #[arg(short = 'F', long = "fasta")]
    fasta: Option<PathBuf>,
    /// Target positions passed to samtools mpileup --positions
    #[arg(long = "bed")]
    bed: Option<PathBuf>,
    #[arg(long = "outdir")]
    outdir: Option<PathBuf>,
    #[arg(long = "prefix")]
    prefix: Option<String>,
    #[arg(long = "overwrite", action = ArgAction::SetTrue)]
    overwrite: bool,
    #[arg(short = 'S', long = "samtools", default_value = "samtools")]
    samtools: String,
    /// Direct gene table with Symbol, Chrom, Start, End columns
    #[arg(short = 'g', long = "genes")]
    genes: Option<PathBuf>,
    /// Ensembl coordinate table (ENSEMBL_ID, SYMBOL, HGNC symbol, CHROM, START, END)
    #[arg(long = "gene-coordinates")]
    gene_coordinates: Option<PathBuf>,
    /// Gene list with Entrez_accession and Ensembl_ID columns
    #[arg(long = "gene-list")]
    gene_list: Option<PathBuf>,
    #[arg(short = 'o', long = "output", default_value = "-")]
    output: String,
    /// Optional QC summary (average depth, uniformity, load counts)
    #[arg(long = "summary")]
    summary: Option<String>,
    #[arg(long = "excluded-contig", default_value = MITOCHONDRIAL_CONTIG)]
    excluded_contig: String,
    #[arg(short = 't', long = "threads", default_value = "1")]
    threads: String,
    #[arg(long = "progress", action = ArgAction::SetTrue)]
    progress: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PileupSource {
    File(PathBuf),
    Samtools {
        bam: PathBuf,
        fasta: PathBuf,
        bed: PathBuf,
        outdir: PathBuf,
        prefix: String,
        overwrite: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneSource {
    Direct(PathBuf),
    CrossReference {
        coordinates: PathBuf,
        gene_list: PathBuf,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneDepthArgs {
    pub pileup: PileupSource,
    pub genes: GeneSource,
    pub samtools: String,
    pub output: String,
    pub summary: Option<String>,
    pub excluded_contig: String,
    pub threads: usize,
    pub progress: bool,
}

impl GeneDepthArgs {
    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(AppError::InvalidValue {
                flag: "--threads".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.excluded_contig.is_empty() {
            return Err(AppError::InvalidValue {
                flag: "--excluded-contig".to_string(),
                value: String::new(),
                reason: "must not be empty".to_string(),
            });
        }
        if let Some(summary) = &self.summary
            && summary == "-"
            && self.output == "-"
        {
            return Err(AppError::InvalidValue {
                flag: "--summary".to_string(),
                value: "-".to_string(),
                reason: "the report already goes to STDOUT".to_string(),
            });
        }
        Ok(())
    }
}

pub fn parse_from_env() -> Result<GeneDepthArgs> {
    parse_args(std::env::args())
}

pub fn parse_args<I, S>(args: I) -> Result<GeneDepthArgs>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut tokens: Vec<String> = args.into_iter().map(Into::into).collect();
    if tokens.is_empty() {
        tokens.push("gene-depth".to_string());
    }

    let cli = CliArgs::try_parse_from(tokens).map_err(|error| match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => error.exit(),
        _ => map_clap_error(error),
    })?;

    let parsed = GeneDepthArgs {
        pileup: pileup_source(&cli)?,
        genes: gene_source(&cli)?,
        samtools: cli.samtools,
        output: cli.output,
        summary: cli.summary,
        excluded_contig: cli.excluded_contig,
        threads: parse_usize("--threads", &cli.threads)?,
        progress: cli.progress,
    };

    parsed.validate()?;
    Ok(parsed)
}

fn pileup_source(cli: &CliArgs) -> Result<PileupSource> {
    match (&cli.pileup, &cli.bam) {
        (Some(_), Some(_)) => Err(AppError::InvalidValue {
            flag: "--bam".to_string(),
            value: cli.bam.as_deref().map(display).unwrap_or_default(),
            reason: "--pileup and --bam are mutually exclusive".to_string(),
        }),
        (None, None) => Err(AppError::MissingRequired {
            field: "--pileup or --bam".to_string(),
        }),
        (Some(path), None) => Ok(PileupSource::File(path.clone())),
        (None, Some(bam)) => {
            let fasta = required(&cli.fasta, "--fasta (required when input is BAM)")?;
            let bed = required(&cli.bed, "--bed (required when input is BAM)")?;
            let outdir = required(&cli.outdir, "--outdir (required when input is BAM)")?;
            let prefix = match &cli.prefix {
                Some(prefix) => prefix.clone(),
                None => sample_prefix(bam),
            };
            Ok(PileupSource::Samtools {
                bam: bam.clone(),
                fasta,
                bed,
                outdir,
                prefix,
                overwrite: cli.overwrite,
            })
        }
    }
}

fn gene_source(cli: &CliArgs) -> Result<GeneSource> {
    match (&cli.genes, &cli.gene_coordinates, &cli.gene_list) {
        (Some(path), None, None) => Ok(GeneSource::Direct(path.clone())),
        (None, Some(coordinates), Some(gene_list)) => Ok(GeneSource::CrossReference {
            coordinates: coordinates.clone(),
            gene_list: gene_list.clone(),
        }),
        (None, None, None) => Err(AppError::MissingRequired {
            field: "--genes or --gene-coordinates with --gene-list".to_string(),
        }),
        (None, Some(_), None) => Err(AppError::MissingRequired {
            field: "--gene-list (required with --gene-coordinates)".to_string(),
        }),
        (None, None, Some(_)) => Err(AppError::MissingRequired {
            field: "--gene-coordinates (required with --gene-list)".to_string(),
        }),
        (Some(path), _, _) => Err(AppError::InvalidValue {
            flag: "--genes".to_string(),
            value: display(path),
            reason: "cannot be combined with --gene-coordinates/--gene-list".to_string(),
        }),
    }
}

/// BAM file name up to its first dot: `S1.recal.sorted.bam` gives `S1`.
fn sample_prefix(bam: &Path) -> String {
    bam.file_name()
        .map(|name| name.to_string_lossy())
        .and_then(|name| name.split('.').next().map(str::to_string))
        .filter(|prefix| !prefix.is_empty())
        .unwrap_or_else(|| "sample".to_string())
}

fn required(value: &Option<PathBuf>, field: &str) -> Result<PathBuf> {
    value.clone().ok_or_else(|| AppError::MissingRequired {
        field: field.to_string(),
    })
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

fn map_clap_error(error: clap::Error) -> AppError {
    let kind = error.kind();
    let rendered = error.to_string();
    match kind {
        ErrorKind::UnknownArgument => AppError::UnsupportedArgument {
            arg: first_quoted_token(&rendered).unwrap_or(rendered),
        },
        ErrorKind::TooFewValues | ErrorKind::WrongNumberOfValues => AppError::MissingValue {
            flag: first_quoted_token(&rendered).unwrap_or_else(|| "argument".to_string()),
        },
        _ => AppError::ParseError {
            message: clap_error_message(&rendered),
        },
    }
}

fn first_quoted_token(message: &str) -> Option<String> {
    let start = message.find('\'')?;
    let end = message[start + 1..].find('\'')?;
    Some(message[start + 1..start + 1 + end].to_string())
}

fn clap_error_message(message: &str) -> String {
    message
        .lines()
        .find_map(|line| line.strip_prefix("error: "))
        .or_else(|| message.lines().next())
        .unwrap_or("failed to parse arguments")
        .to_string()
}

fn parse_usize(flag: &str, value: &str) -> Result<usize> {
    value.parse::<usize>().map_err(|_| AppError::InvalidValue {
        flag: flag.to_string(),
        value: value.to_string(),
        reason: "must be a positive integer".to_string(),
    })
}
