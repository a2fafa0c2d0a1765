use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Process exit codes surfaced by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    /// The converter ran and failed; its own status is passed through.
    Converter(i32),
    /// Invalid settings; same status as configuration errors.
    Usage,
    Io,
    InvalidContent,
    NotFound,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Converter(status) => status,
            Self::Usage => 1,
            Self::Io => 4,
            Self::InvalidContent => 5,
            // Shell convention for a command that cannot be executed.
            Self::NotFound => 127,
        }
    }
}

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("failed to list {path}: {source}")]
    Discover { path: PathBuf, source: io::Error },

    #[error("i/o error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("{path} is not valid UTF-8: {source}")]
    Encoding {
        path: PathBuf,
        source: std::string::FromUtf8Error,
    },

    #[error("output {output} would overwrite its own chapter")]
    OutputIsSource { output: PathBuf },

    #[error("failed to start converter {program}: {source}")]
    Spawn { program: PathBuf, source: io::Error },

    #[error("failed to write to stdin of converter {program}: {source}")]
    Stdin { program: PathBuf, source: io::Error },

    #[error("failed to wait for converter {program}: {source}")]
    Wait { program: PathBuf, source: io::Error },

    #[error("converter {program} failed for {output} ({})", describe_status(.status))]
    ConverterFailed {
        program: PathBuf,
        output: PathBuf,
        status: Option<i32>,
    },
}

impl OperationError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Discover { .. } | Self::Io { .. } => ExitCode::Io,
            Self::Stdin { .. } | Self::Wait { .. } => ExitCode::Io,
            Self::Encoding { .. } => ExitCode::InvalidContent,
            Self::OutputIsSource { .. } => ExitCode::Usage,
            Self::Spawn { source, .. } if source.kind() == io::ErrorKind::NotFound => {
                ExitCode::NotFound
            }
            Self::Spawn { .. } => ExitCode::Converter(126),
            Self::ConverterFailed { status, .. } => ExitCode::Converter(status.unwrap_or(1)),
        }
    }
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit status {code}"),
        None => "terminated by signal".to_string(),
    }
}

pub type OperationResult<T> = Result<T, OperationError>;
