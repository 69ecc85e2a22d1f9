use crate::cli::GeneDepthArgs;
use crate::errors::{AppError, Result};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;
use tempfile::Builder;
use tracing::info;

pub const MPILEUP_DIRECTORY: &str = "MPILEUP";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalTools {
    pub samtools: String,
}

impl ExternalTools {
    pub fn from_args(args: &GeneDepthArgs) -> Self {
        Self {
            samtools: args.samtools.clone(),
        }
    }

    /// Arguments of the pileup run: every target position is reported,
    /// zero coverage included.
    pub fn mpileup_args(bam: &Path, fasta: &Path, bed: &Path, output: &Path) -> Vec<String> {
        vec![
            "mpileup".to_string(),
            "-a".to_string(),
            "--fasta-ref".to_string(),
            fasta.display().to_string(),
            bam.display().to_string(),
            "--min-MQ".to_string(),
            "1".to_string(),
            "--positions".to_string(),
            bed.display().to_string(),
            "--output".to_string(),
            output.display().to_string(),
        ]
    }

    /// Runs `samtools mpileup` to completion. This can take tens of minutes
    /// on a full panel; a non-zero exit surfaces the tool's stderr.
    pub fn run_samtools_mpileup(
        &self,
        bam: &Path,
        fasta: &Path,
        bed: &Path,
        output: &Path,
    ) -> Result<()> {
        if !self.exists_command(&self.samtools) {
            return Err(AppError::CommandNotFound {
                command: self.samtools.clone(),
            });
        }

        let args = Self::mpileup_args(bam, fasta, bed, output);
        let command_label = format!("{} {}", self.samtools, args.join(" "));
        info!(command = %command_label, "running pileup");

        let stderr_capture = Builder::new()
            .prefix("gene_depth_mpileup_stderr_")
            .suffix(".log")
            .tempfile()?;
        let stderr_file = stderr_capture.reopen()?;

        let started = Instant::now();
        let status = Command::new(&self.samtools)
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::from(stderr_file))
            .status()
            .map_err(|err| {
                if err.kind() == std::io::ErrorKind::NotFound {
                    AppError::CommandNotFound {
                        command: self.samtools.clone(),
                    }
                } else {
                    AppError::Io(err)
                }
            })?;

        if !status.success() {
            let mut bytes = Vec::new();
            if let Ok(mut file) = stderr_capture.reopen() {
                let _ = file.read_to_end(&mut bytes);
            }
            return Err(AppError::CommandFailed {
                command: command_label,
                code: status.code(),
                stderr: String::from_utf8_lossy(&bytes).to_string(),
            });
        }

        info!(
            output = %output.display(),
            elapsed_secs = started.elapsed().as_secs(),
            "pileup done"
        );
        Ok(())
    }

    fn exists_command(&self, cmd: &str) -> bool {
        if Path::new(cmd).exists() {
            return true;
        }
        std::env::var_os("PATH").is_some_and(|paths| {
            std::env::split_paths(&paths)
                .map(|dir| dir.join(cmd))
                .any(|full| full.exists())
        })
    }
}

/// Creates `<outdir>/<directory_name>`. An existing directory is replaced
/// when `overwrite` is set and rejected otherwise.
pub fn prepare_output_directory(
    outdir: &Path,
    directory_name: &str,
    overwrite: bool,
) -> Result<PathBuf> {
    let output_directory = outdir.join(directory_name);
    if output_directory.exists() {
        if !overwrite {
            return Err(AppError::OutputExists {
                path: output_directory.display().to_string(),
            });
        }
        info!(directory = %output_directory.display(), "overwriting output directory");
        fs::remove_dir_all(&output_directory)?;
    }
    fs::create_dir_all(&output_directory)?;
    info!(directory = %output_directory.display(), "created output directory");
    Ok(output_directory)
}

pub fn mpileup_output_path(output_directory: &Path, prefix: &str) -> PathBuf {
    output_directory.join(format!("{prefix}.mpileup"))
}

#[cfg(test)]
mod tests {
    use super::{
        ExternalTools, MPILEUP_DIRECTORY, mpileup_output_path, prepare_output_directory,
    };
    use crate::errors::AppError;
    use std::path::Path;

    #[test]
    fn builds_mpileup_arguments_with_all_positions() {
        let args = ExternalTools::mpileup_args(
            Path::new("s.recal.bam"),
            Path::new("hg19.fa"),
            Path::new("panel.bed"),
            Path::new("out/s.mpileup"),
        );
        assert_eq!(args[0], "mpileup");
        assert_eq!(args[1], "-a");
        let joined = args.join(" ");
        assert!(joined.contains("--fasta-ref hg19.fa s.recal.bam"));
        assert!(joined.contains("--min-MQ 1"));
        assert!(joined.contains("--positions panel.bed"));
        assert!(joined.ends_with("--output out/s.mpileup"));
    }

    #[test]
    fn missing_samtools_is_reported() {
        let tools = ExternalTools {
            samtools: "missing_samtools_for_gene_depth_test".to_string(),
        };
        let err = tools
            .run_samtools_mpileup(
                Path::new("a.bam"),
                Path::new("a.fa"),
                Path::new("a.bed"),
                Path::new("a.mpileup"),
            )
            .expect_err("binary does not exist");
        assert!(matches!(err, AppError::CommandNotFound { .. }));
        assert!(!tools.exists_command(&tools.samtools));

        let present = std::env::current_exe().expect("test binary path");
        assert!(tools.exists_command(&present.to_string_lossy()));
    }

    #[test]
    fn output_directory_requires_overwrite() {
        let root = tempfile::tempdir().expect("tempdir");
        let created =
            prepare_output_directory(root.path(), MPILEUP_DIRECTORY, false).expect("created");
        std::fs::write(created.join("stale.txt"), "x").expect("write stale file");

        let err = prepare_output_directory(root.path(), MPILEUP_DIRECTORY, false)
            .expect_err("directory exists");
        assert!(matches!(err, AppError::OutputExists { .. }));

        let recreated =
            prepare_output_directory(root.path(), MPILEUP_DIRECTORY, true).expect("overwritten");
        assert!(!recreated.join("stale.txt").exists());
        assert_eq!(
            mpileup_output_path(&recreated, "S1"),
            root.path().join("MPILEUP").join("S1.mpileup")
        );
    }
}
