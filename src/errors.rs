use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("missing value for argument: {flag}")]
    MissingValue { flag: String },
    #[error("missing required argument: {field}")]
    MissingRequired { field: String },
    #[error("invalid value for {flag}={value}: {reason}")]
    InvalidValue {
        flag: String,
        value: String,
        reason: String,
    },
    #[error("unsupported argument: {arg}")]
    UnsupportedArgument { arg: String },
    #[error("required command not found in PATH: {command}")]
    CommandNotFound { command: String },
    #[error("command failed: {command} (exit: {code:?}) stderr: {stderr}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
    #[error("malformed pileup line {source_name}:{line_number}: {reason}")]
    MalformedLine {
        source_name: String,
        line_number: usize,
        reason: String,
    },
    #[error("failed to read {source_name} at line {line_number}: {source}")]
    InputRead {
        source_name: String,
        line_number: usize,
        source: std::io::Error,
    },
    #[error("invalid gene table {source_name}:{line_number}: {reason}")]
    InvalidGeneTable {
        source_name: String,
        line_number: usize,
        reason: String,
    },
    #[error("invalid region {region}: {reason}")]
    InvalidRegion { region: String, reason: String },
    #[error("output directory already exists: {path} (remove it or pass --overwrite)")]
    OutputExists { path: String },
    #[error("parse error: {message}")]
    ParseError { message: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Base/quality divergence left after noise removal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("base calls and qualities differ in length after cleaning: {calls} calls, {qualities} qualities")]
pub struct LengthMismatch {
    pub calls: usize,
    pub qualities: usize,
}
