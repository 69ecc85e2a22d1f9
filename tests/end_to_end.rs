use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn run_binary(args: &[&str], current_dir: &Path) -> std::process::Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_gene-depth"));
    command
        .args(args)
        .current_dir(current_dir)
        .env("RUST_LOG", "warn");
    command
        .output()
        .expect("expected gene-depth binary to execute")
}

fn write_fixture(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("expected fixture write");
    path
}

fn uniform_pileup(chromosome: &str, positions: std::ops::RangeInclusive<u64>, depth: u32) -> String {
    let mut text = String::new();
    for position in positions {
        let calls = ".".repeat(depth as usize);
        let quals = "F".repeat(depth as usize);
        text.push_str(&format!("{chromosome}\t{position}\tA\t{depth}\t{calls}\t{quals}\n"));
    }
    text
}

#[test]
fn reports_mean_depth_for_covered_gene() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_fixture(dir.path(), "S1.mpileup", &uniform_pileup("chr1", 100..=110, 5));
    write_fixture(
        dir.path(),
        "genes.tsv",
        "Symbol\tChrom\tStart\tEnd\nGENE1\tchr1\t100\t105\n",
    );

    let output = run_binary(
        &["--pileup", "S1.mpileup", "--genes", "genes.tsv"],
        dir.path(),
    );
    assert!(
        output.status.success(),
        "expected success: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "HUGO_SYMBOL\tDEPTH\tVARIANT_GROUP_ID\nGENE1\t5.0\tGENE\n"
    );
}

#[test]
fn uncovered_gene_reports_zero_depth() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_fixture(dir.path(), "S1.mpileup", &uniform_pileup("chr1", 100..=110, 5));
    write_fixture(
        dir.path(),
        "genes.tsv",
        "Symbol\tChrom\tStart\tEnd\nGENE1\tchr1\t100\t105\nFAR\tchr2\t5000\t6000\n",
    );

    let output = run_binary(
        &[
            "--pileup",
            "S1.mpileup",
            "--genes",
            "genes.tsv",
            "-o",
            "report.tsv",
            "--threads",
            "2",
        ],
        dir.path(),
    );
    assert!(output.status.success());
    let report = fs::read_to_string(dir.path().join("report.tsv")).expect("report written");
    let rows = report.lines().collect::<Vec<_>>();
    assert_eq!(rows, vec![
        "HUGO_SYMBOL\tDEPTH\tVARIANT_GROUP_ID",
        "GENE1\t5.0\tGENE",
        "FAR\t0.0\tGENE",
    ]);
}

#[test]
fn cross_reference_miss_keeps_placeholder_row() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_fixture(dir.path(), "S1.mpileup", &uniform_pileup("chr17", 7571720..=7571730, 40));
    write_fixture(
        dir.path(),
        "ensembl.tsv",
        "ENSEMBL_ID\tSYMBOL\tHGNC symbol\tCHROM\tSTART\tEND\n\
         ENSG00000141510\tTP53\tTP53\tchr17\t7571720\t7590868\n",
    );
    write_fixture(
        dir.path(),
        "genes_v1.tsv",
        "Entrez_accession\tEnsembl_ID\tNote\nTP53\tENSG00000141510\tx\nNOPE\tENSG00000000001\ty\n",
    );

    let output = run_binary(
        &[
            "--pileup",
            "S1.mpileup",
            "--gene-coordinates",
            "ensembl.tsv",
            "--gene-list",
            "genes_v1.tsv",
            "--summary",
            "qc.tsv",
        ],
        dir.path(),
    );
    assert!(
        output.status.success(),
        "expected success: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("TP53\t40.0\tGENE\n"));
    assert!(stdout.contains("NOPE\t0.0\tGENE\n"));

    let summary = fs::read_to_string(dir.path().join("qc.tsv")).expect("summary written");
    assert!(summary.contains("AVG_DEPTH\t40.0\n"));
    assert!(summary.contains("UNIFORMITY\t1.0\n"));
    assert!(summary.contains("LOOKUP_MISSES\t1\n"));
    assert!(summary.contains("NOTE\tNOPE gene not in gene_table.\n"));
    assert!(!summary.contains("TP53 gene not in gene_table."));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("NOPE gene not in gene_table."),
        "unexpected stderr: {stderr}"
    );
}

#[test]
fn malformed_pileup_line_aborts_with_location() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut pileup = uniform_pileup("chr1", 1..=2, 3);
    pileup.push_str("chr1\t3\tA\tdeep\t...\tFFF\n");
    write_fixture(dir.path(), "bad.mpileup", &pileup);
    write_fixture(dir.path(), "genes.tsv", "Symbol\tChrom\tStart\tEnd\nG\tchr1\t1\t3\n");

    let output = run_binary(&["--pileup", "bad.mpileup", "--genes", "genes.tsv"], dir.path());
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("bad.mpileup:3"), "unexpected stderr: {stderr}");
}

#[test]
fn misaligned_records_are_counted_not_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut pileup = uniform_pileup("chr1", 1..=3, 4);
    pileup.push_str("chr1\t4\tA\t4\t....\tFF\n");
    write_fixture(dir.path(), "S1.mpileup", &pileup);
    write_fixture(dir.path(), "genes.tsv", "Symbol\tChrom\tStart\tEnd\nG\tchr1\t1\t4\n");

    let output = run_binary(
        &[
            "--pileup",
            "S1.mpileup",
            "--genes",
            "genes.tsv",
            "--summary",
            "qc.tsv",
        ],
        dir.path(),
    );
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("G\t4.0\tGENE\n"));
    let summary = fs::read_to_string(dir.path().join("qc.tsv")).expect("summary written");
    assert!(summary.contains("SKIPPED_RECORDS\t1\n"));
    assert!(summary.contains("RECORDS\t4\n"));
}

#[test]
fn missing_samtools_fails_bam_input() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_fixture(dir.path(), "genes.tsv", "Symbol\tChrom\tStart\tEnd\nG\tchr1\t1\t4\n");

    let output = run_binary(
        &[
            "--bam",
            "S1.recal.bam",
            "-F",
            "hg19.fa",
            "--bed",
            "panel.bed",
            "--outdir",
            "results",
            "--genes",
            "genes.tsv",
            "-S",
            "missing_samtools_for_gene_depth_test",
        ],
        dir.path(),
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("required command not found in PATH"));
    assert!(dir.path().join("results").join("MPILEUP").is_dir());
}
