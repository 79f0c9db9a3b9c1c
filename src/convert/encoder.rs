//! External spatial-photo encoder.
//!
//! The multi-view container itself is produced by a separate tool. The
//! [`SpatialEncoder`] trait is the seam: production code uses
//! [`CommandEncoder`], which runs a configured program, and tests substitute
//! a recording mock.
//!
//! ## Argument templates
//!
//! [`CommandEncoder`] builds its command line from a list of templates. Each
//! template may contain any of these placeholders:
//!
//! | Placeholder | Value |
//! |---|---|
//! | `{left}` | left image file |
//! | `{right}` | right image file |
//! | `{output}` | output spatial photo file |
//! | `{baseline}` | baseline in millimeters |
//! | `{fov}` | horizontal field of view in degrees |
//! | `{disparity}` | disparity adjustment |
//!
//! Placeholders are substituted per argument, so paths with spaces stay one
//! argument. No shell is involved.

use super::ConversionParameters;
use crate::config::EncoderConfig;
use std::future::Future;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncoderError {
    #[error("could not start encoder `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("encoder exited with {status}: {message}")]
    Failed { status: String, message: String },
    #[error("encoder reported success but wrote no file at {0}")]
    MissingOutput(PathBuf),
    #[error("{0}")]
    Rejected(String),
}

/// Everything the encoder needs for one spatial photo.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeJob {
    pub left: PathBuf,
    pub right: PathBuf,
    pub output: PathBuf,
    pub params: ConversionParameters,
}

/// Something that turns two view files into one spatial photo file.
pub trait SpatialEncoder: Send + Sync {
    fn encode(&self, job: &EncodeJob) -> impl Future<Output = Result<(), EncoderError>> + Send;
}

/// Runs an external program, one process per job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEncoder {
    program: String,
    args: Vec<String>,
}

impl CommandEncoder {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(config: &EncoderConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone())
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// The argument list for `job`, with placeholders filled in.
    pub fn command_args(&self, job: &EncodeJob) -> Vec<String> {
        let values = [
            ("{left}", path_arg(&job.left)),
            ("{right}", path_arg(&job.right)),
            ("{output}", path_arg(&job.output)),
            ("{baseline}", job.params.baseline_mm.to_string()),
            ("{fov}", job.params.horizontal_fov_deg.to_string()),
            ("{disparity}", job.params.disparity_adjustment.to_string()),
        ];
        self.args
            .iter()
            .map(|template| fill_template(template, &values))
            .collect()
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Replace placeholders in one left-to-right pass. Substituted text is never
/// scanned again, so a path containing `{output}` stays as written.
fn fill_template(template: &str, values: &[(&str, String)]) -> String {
    let mut filled = String::with_capacity(template.len());
    let mut rest = template;
    'scan: while let Some(start) = rest.find('{') {
        filled.push_str(&rest[..start]);
        let tail = &rest[start..];
        for (key, value) in values {
            if let Some(after) = tail.strip_prefix(key) {
                filled.push_str(value);
                rest = after;
                continue 'scan;
            }
        }
        filled.push('{');
        rest = &tail[1..];
    }
    filled.push_str(rest);
    filled
}

impl SpatialEncoder for CommandEncoder {
    async fn encode(&self, job: &EncodeJob) -> Result<(), EncoderError> {
        let args = self.command_args(job);
        log::debug!("running encoder: {} {}", self.program, args.join(" "));

        let output = tokio::process::Command::new(&self.program)
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| EncoderError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            } else {
                stderr
            };
            return Err(EncoderError::Failed {
                status: output.status.to_string(),
                message,
            });
        }

        if !tokio::fs::try_exists(&job.output).await.unwrap_or(false) {
            return Err(EncoderError::MissingOutput(job.output.clone()));
        }
        Ok(())
    }
}
