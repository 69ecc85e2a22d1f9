use std::fs::File;
use std::io::{BufWriter, Write, stdout};

use crate::errors::Result;
use crate::report::{GeneDepthReport, REPORT_HEADER};
use crate::utils::format_py_float;
use flate2::Compression;
use flate2::write::GzEncoder;

/// Sample-level QC values written next to the gene report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QcSummary {
    pub average_depth: Option<f64>,
    pub uniformity: Option<f64>,
    pub records: usize,
    pub records_without_calls: usize,
    pub skipped_records: usize,
    pub lookup_misses: usize,
    /// Free-text notes, one per lookup miss.
    pub notes: Vec<String>,
}

pub fn write_report<W: Write + ?Sized>(writer: &mut W, report: &GeneDepthReport) -> Result<()> {
    writer.write_all(REPORT_HEADER.join("\t").as_bytes())?;
    writer.write_all(b"\n")?;
    for row in &report.rows {
        writeln!(
            writer,
            "{}\t{}\t{}",
            row.gene_symbol,
            format_py_float(row.depth),
            row.group_id
        )?;
    }
    Ok(())
}

/// Two-column `metric\tvalue` table; undefined metrics are written as `NA`
/// and each note follows as a `NOTE` row.
pub fn write_summary<W: Write + ?Sized>(writer: &mut W, summary: &QcSummary) -> Result<()> {
    let metric = |value: Option<f64>| value.map_or_else(|| "NA".to_string(), format_py_float);
    writeln!(writer, "metric\tvalue")?;
    writeln!(writer, "AVG_DEPTH\t{}", metric(summary.average_depth))?;
    writeln!(writer, "UNIFORMITY\t{}", metric(summary.uniformity))?;
    writeln!(writer, "RECORDS\t{}", summary.records)?;
    writeln!(writer, "RECORDS_WITHOUT_CALLS\t{}", summary.records_without_calls)?;
    writeln!(writer, "SKIPPED_RECORDS\t{}", summary.skipped_records)?;
    writeln!(writer, "LOOKUP_MISSES\t{}", summary.lookup_misses)?;
    for note in &summary.notes {
        writeln!(writer, "NOTE\t{note}")?;
    }
    Ok(())
}

/// Runs `write_fn` against stdout for `-`, a gzip stream for `*.gz`, or a
/// plain buffered file otherwise.
pub fn with_text_output_writer<F>(path: &str, write_fn: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    if path == "-" {
        let mut out = stdout().lock();
        write_fn(&mut out)?;
        out.flush()?;
        return Ok(());
    }

    if path.ends_with(".gz") {
        let mut encoder = GzEncoder::new(BufWriter::new(File::create(path)?), Compression::default());
        write_fn(&mut encoder)?;
        encoder.finish()?.flush()?;
        return Ok(());
    }

    let mut file = BufWriter::new(File::create(path)?);
    write_fn(&mut file)?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{QcSummary, with_text_output_writer, write_report, write_summary};
    use crate::report::{DepthReportRow, GENE_GROUP_ID, GeneDepthReport};
    use std::io::Read;

    fn report() -> GeneDepthReport {
        GeneDepthReport {
            rows: vec![
                DepthReportRow {
                    gene_symbol: "GENE1".to_string(),
                    depth: 5.0,
                    group_id: GENE_GROUP_ID,
                },
                DepthReportRow {
                    gene_symbol: "GENE2".to_string(),
                    depth: 1234.57,
                    group_id: GENE_GROUP_ID,
                },
            ],
            notes: Vec::new(),
        }
    }

    #[test]
    fn writes_tab_delimited_report() {
        let mut output = Vec::new();
        write_report(&mut output, &report()).expect("expected report write success");
        let text = String::from_utf8(output).expect("expected utf8 output");
        assert_eq!(
            text,
            "HUGO_SYMBOL\tDEPTH\tVARIANT_GROUP_ID\nGENE1\t5.0\tGENE\nGENE2\t1234.57\tGENE\n"
        );
    }

    #[test]
    fn writes_summary_with_missing_metrics() {
        let summary = QcSummary {
            average_depth: Some(28.0),
            uniformity: None,
            records: 5,
            lookup_misses: 1,
            notes: vec!["KRAS gene not in gene_table.".to_string()],
            ..QcSummary::default()
        };
        let mut output = Vec::new();
        write_summary(&mut output, &summary).expect("expected summary write success");
        let text = String::from_utf8(output).expect("expected utf8 output");
        assert!(text.contains("AVG_DEPTH\t28.0\n"));
        assert!(text.contains("UNIFORMITY\tNA\n"));
        assert!(text.contains("RECORDS\t5\n"));
        assert!(text.ends_with("LOOKUP_MISSES\t1\nNOTE\tKRAS gene not in gene_table.\n"));
    }

    #[test]
    fn gz_output_is_compressed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("report.tsv.gz");
        let path_text = path.to_string_lossy().to_string();
        with_text_output_writer(&path_text, |out| write_report(out, &report()))
            .expect("expected gz write success");

        let mut decoder =
            flate2::read::MultiGzDecoder::new(std::fs::File::open(&path).expect("open gz"));
        let mut text = String::new();
        decoder.read_to_string(&mut text).expect("decode gz");
        assert!(text.starts_with("HUGO_SYMBOL\tDEPTH\tVARIANT_GROUP_ID\n"));
    }
}
