//! Gene coordinate tables.
//!
//! Two layouts are supported and kept apart:
//!
//! - a direct table whose rows carry `Symbol`, `Chrom`, `Start`, `End`;
//! - a cross-reference layout: a gene list of `(Entrez_accession,
//!   Ensembl_ID)` pairs resolved against an Ensembl coordinate table with
//!   the columns `ENSEMBL_ID, SYMBOL, HGNC symbol, CHROM, START, END`.
//!
//! Only the cross-reference layout can miss; a miss resolves to
//! [`GenomicRegion::placeholder`].

use crate::errors::{AppError, Result};
use crate::region::GenomicRegion;
use crate::utils::open_text_reader;
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

const DIRECT_COLUMNS: [&str; 4] = ["Symbol", "Chrom", "Start", "End"];
const GENE_LIST_COLUMNS: [&str; 2] = ["Entrez_accession", "Ensembl_ID"];
const COORDINATE_FIELDS: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneEntry {
    pub symbol: String,
    pub region: GenomicRegion,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossReferenceGene {
    pub symbol: String,
    pub ensembl_id: String,
}

/// A gene with the region its depth is aggregated over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedGene {
    pub symbol: String,
    pub region: GenomicRegion,
    /// Set when the gene fell back to the placeholder region.
    pub lookup_miss: bool,
}

/// Gene panel configuration, loaded once per run and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneCatalog {
    Direct(Vec<GeneEntry>),
    CrossReference {
        genes: Vec<CrossReferenceGene>,
        coordinates: HashMap<(String, String), GenomicRegion>,
    },
}

impl GeneCatalog {
    pub fn load_direct(path: &Path) -> Result<Self> {
        let entries = parse_direct_table(open_text_reader(path)?, &path.display().to_string())?;
        Ok(Self::Direct(entries))
    }

    pub fn load_cross_reference(coordinates_path: &Path, gene_list_path: &Path) -> Result<Self> {
        let coordinates = parse_coordinate_table(
            open_text_reader(coordinates_path)?,
            &coordinates_path.display().to_string(),
        )?;
        let genes = parse_gene_list(
            open_text_reader(gene_list_path)?,
            &gene_list_path.display().to_string(),
        )?;
        Ok(Self::CrossReference { genes, coordinates })
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Direct(entries) => entries.len(),
            Self::CrossReference { genes, .. } => genes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Regions for every gene, in gene-list order.
    pub fn resolve(&self) -> Vec<ResolvedGene> {
        match self {
            Self::Direct(entries) => entries
                .iter()
                .map(|entry| ResolvedGene {
                    symbol: entry.symbol.clone(),
                    region: entry.region.clone(),
                    lookup_miss: false,
                })
                .collect(),
            Self::CrossReference { genes, coordinates } => genes
                .iter()
                .map(|gene| {
                    let key = (gene.symbol.clone(), gene.ensembl_id.clone());
                    match coordinates.get(&key) {
                        Some(region) => ResolvedGene {
                            symbol: gene.symbol.clone(),
                            region: region.clone(),
                            lookup_miss: false,
                        },
                        None => ResolvedGene {
                            symbol: gene.symbol.clone(),
                            region: GenomicRegion::placeholder(),
                            lookup_miss: true,
                        },
                    }
                })
                .collect(),
        }
    }
}

pub fn parse_direct_table<R: BufRead>(reader: R, source_name: &str) -> Result<Vec<GeneEntry>> {
    let mut rows = TableRows::new(reader, source_name);
    let columns = rows.header_columns(&DIRECT_COLUMNS)?;

    let mut entries = Vec::new();
    while let Some((line_number, fields)) = rows.next_row()? {
        let pick = |idx: usize| field_at(&fields, columns[idx], source_name, line_number);
        let symbol = pick(0)?;
        let chromosome = pick(1)?;
        let start = parse_coordinate(pick(2)?, source_name, line_number)?;
        let end = parse_coordinate(pick(3)?, source_name, line_number)?;
        let region = region_for_row(chromosome, start, end, source_name, line_number)?;
        entries.push(GeneEntry {
            symbol: symbol.to_string(),
            region,
        });
    }
    Ok(entries)
}

pub fn parse_gene_list<R: BufRead>(
    reader: R,
    source_name: &str,
) -> Result<Vec<CrossReferenceGene>> {
    let mut rows = TableRows::new(reader, source_name);
    let columns = rows.header_columns(&GENE_LIST_COLUMNS)?;

    let mut genes = Vec::new();
    while let Some((line_number, fields)) = rows.next_row()? {
        genes.push(CrossReferenceGene {
            symbol: field_at(&fields, columns[0], source_name, line_number)?.to_string(),
            ensembl_id: field_at(&fields, columns[1], source_name, line_number)?.to_string(),
        });
    }
    Ok(genes)
}

/// Keys regions by `(SYMBOL, ENSEMBL_ID)`; the first row of a duplicated
/// key wins. The header row is skipped without inspection.
pub fn parse_coordinate_table<R: BufRead>(
    reader: R,
    source_name: &str,
) -> Result<HashMap<(String, String), GenomicRegion>> {
    let mut rows = TableRows::new(reader, source_name);
    rows.skip_header()?;

    let mut coordinates = HashMap::new();
    while let Some((line_number, fields)) = rows.next_row()? {
        if fields.len() < COORDINATE_FIELDS {
            return Err(invalid_table(
                source_name,
                line_number,
                format!(
                    "expected {COORDINATE_FIELDS} columns, found {}",
                    fields.len()
                ),
            ));
        }
        let start = parse_coordinate(&fields[4], source_name, line_number)?;
        let end = parse_coordinate(&fields[5], source_name, line_number)?;
        let region = region_for_row(&fields[3], start, end, source_name, line_number)?;
        coordinates
            .entry((fields[1].clone(), fields[0].clone()))
            .or_insert(region);
    }
    Ok(coordinates)
}

struct TableRows<'a, R> {
    reader: R,
    source_name: &'a str,
    line: String,
    line_number: usize,
}

impl<'a, R: BufRead> TableRows<'a, R> {
    fn new(reader: R, source_name: &'a str) -> Self {
        Self {
            reader,
            source_name,
            line: String::new(),
            line_number: 0,
        }
    }

    fn next_row(&mut self) -> Result<Option<(usize, Vec<String>)>> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            self.line_number += 1;
            let trimmed = self.line.trim_end_matches(['\n', '\r']);
            if trimmed.trim().is_empty() {
                continue;
            }
            let fields = trimmed
                .split('\t')
                .map(|field| field.trim().to_string())
                .collect();
            return Ok(Some((self.line_number, fields)));
        }
    }

    fn skip_header(&mut self) -> Result<()> {
        self.next_row()?
            .map(|_| ())
            .ok_or_else(|| invalid_table(self.source_name, 1, "missing header row".to_string()))
    }

    /// Index of every requested column in the header row.
    fn header_columns(&mut self, names: &[&str]) -> Result<Vec<usize>> {
        let (line_number, header) = self.next_row()?.ok_or_else(|| {
            invalid_table(self.source_name, 1, "missing header row".to_string())
        })?;
        names
            .iter()
            .map(|name| {
                header.iter().position(|column| column == name).ok_or_else(|| {
                    invalid_table(
                        self.source_name,
                        line_number,
                        format!("missing column {name}"),
                    )
                })
            })
            .collect()
    }
}

fn field_at<'f>(
    fields: &'f [String],
    idx: usize,
    source_name: &str,
    line_number: usize,
) -> Result<&'f str> {
    fields
        .get(idx)
        .map(String::as_str)
        .ok_or_else(|| invalid_table(source_name, line_number, format!("missing column {}", idx + 1)))
}

fn parse_coordinate(value: &str, source_name: &str, line_number: usize) -> Result<u64> {
    value
        .parse::<u64>()
        .map_err(|_| invalid_table(source_name, line_number, format!("invalid coordinate: {value:?}")))
}

fn region_for_row(
    chromosome: &str,
    start: u64,
    end: u64,
    source_name: &str,
    line_number: usize,
) -> Result<GenomicRegion> {
    GenomicRegion::new(chromosome, start, end)
        .map_err(|err| invalid_table(source_name, line_number, err.to_string()))
}

fn invalid_table(source_name: &str, line_number: usize, reason: String) -> AppError {
    AppError::InvalidGeneTable {
        source_name: source_name.to_string(),
        line_number,
        reason,
    }
}
