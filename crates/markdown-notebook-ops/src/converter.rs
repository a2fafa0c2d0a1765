//! Invocation of the external notebook converter.
//!
//! The converter receives rewritten markdown on standard input and writes the
//! notebook itself; this module only builds the command line and streams text.
//! Spawning, writing stdin and waiting each fail with their own error.

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{OperationError, OperationResult};

/// Arguments describing one conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub input_format: String,
    pub output_format: String,
    pub kernel: String,
    pub output: PathBuf,
}

impl ConversionRequest {
    /// Same formats and kernel, different destination.
    pub fn for_output(&self, output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
            ..self.clone()
        }
    }
}

pub trait Converter {
    /// Short name used in logs and reports.
    fn name(&self) -> &str;

    fn convert(&self, request: &ConversionRequest, text: &str) -> OperationResult<()>;
}

/// Runs a jupytext-compatible program.
#[derive(Debug, Clone)]
pub struct CommandConverter {
    program: PathBuf,
    display_name: String,
}

impl CommandConverter {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        let program = program.into();
        let display_name = program.display().to_string();
        Self {
            program,
            display_name,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Converter for CommandConverter {
    fn name(&self) -> &str {
        &self.display_name
    }

    fn convert(&self, request: &ConversionRequest, text: &str) -> OperationResult<()> {
        let args = command_args(request);
        log::debug!("running {} {:?}", self.display_name, args);

        let mut cmd = Command::new(&self.program);
        cmd.args(&args);
        cmd.stdin(Stdio::piped());

        let mut child = cmd.spawn().map_err(|source| OperationError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(text.as_bytes()) {
                Ok(()) => {}
                // The exit status below decides whether this was a failure.
                Err(err) if should_ignore_pipe_error(&err) => {
                    log::debug!("{} closed stdin early", self.display_name);
                }
                Err(source) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(OperationError::Stdin {
                        program: self.program.clone(),
                        source,
                    });
                }
            }
        }

        let status = child.wait().map_err(|source| OperationError::Wait {
            program: self.program.clone(),
            source,
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(OperationError::ConverterFailed {
                program: self.program.clone(),
                output: request.output.clone(),
                status: status.code(),
            })
        }
    }
}

/// Command-line arguments for a jupytext-style converter reading stdin.
pub fn command_args(request: &ConversionRequest) -> Vec<OsString> {
    vec![
        "--from".into(),
        request.input_format.clone().into(),
        "--to".into(),
        request.output_format.clone().into(),
        "--set-kernel".into(),
        request.kernel.clone().into(),
        "--output".into(),
        request.output.clone().into_os_string(),
    ]
}

fn should_ignore_pipe_error(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::BrokenPipe | io::ErrorKind::WouldBlock
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ConversionRequest {
        ConversionRequest {
            input_format: "md".into(),
            output_format: "ipynb".into(),
            kernel: "python3".into(),
            output: PathBuf::from("out/01-intro.ipynb"),
        }
    }

    #[test]
    fn builds_jupytext_arguments() {
        let args = command_args(&request());
        assert_eq!(
            args,
            vec![
                "--from",
                "md",
                "--to",
                "ipynb",
                "--set-kernel",
                "python3",
                "--output",
                "out/01-intro.ipynb",
            ]
            .into_iter()
            .map(OsString::from)
            .collect::<Vec<_>>()
        );
    }

    #[test]
    fn retargets_output_only() {
        let retargeted = request().for_output("02-next.ipynb");
        assert_eq!(retargeted.output, PathBuf::from("02-next.ipynb"));
        assert_eq!(retargeted.kernel, "python3");
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let converter = CommandConverter::new("markdown-notebook-no-such-converter");
        let err = converter.convert(&request(), "# hi\n").unwrap_err();
        assert!(matches!(err, OperationError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_reported_with_status() {
        let converter = CommandConverter::new("false");
        let err = converter.convert(&request(), "# hi\n").unwrap_err();
        match err {
            OperationError::ConverterFailed { status, .. } => assert_eq!(status, Some(1)),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
