//! Sketch flashing through the `arduino-cli` toolchain
//!
//! Compiles a sketch directory and uploads it to a board over its serial
//! port, as two separate tool invocations so a compile failure never touches
//! the board. The flasher reports progress through a caller-supplied sink and
//! folds tool failures into the returned [`FlashOutcome`] instead of erroring
//! across the call boundary; a failed flash is an outcome, not a panel fault.

use crate::device::serial::UNO_FQBN;
use std::path::{Path, PathBuf};
use std::process::Command;

/// What to flash and where
#[derive(Debug, Clone)]
pub struct FlashRequest {
    /// Sketch directory (the directory holding the `.ino` file)
    pub sketch_dir: PathBuf,
    /// Serial port the board is attached to
    pub port: String,
    /// Fully qualified board name passed to the toolchain
    pub fqbn: String,
}

impl FlashRequest {
    /// Request a flash for an Uno on `port`
    pub fn uno(sketch_dir: impl Into<PathBuf>, port: impl Into<String>) -> Self {
        Self {
            sketch_dir: sketch_dir.into(),
            port: port.into(),
            fqbn: UNO_FQBN.to_string(),
        }
    }
}

/// Terminal result of one flash attempt
#[derive(Debug, Clone)]
pub struct FlashOutcome {
    /// Whether both compile and upload succeeded
    pub success: bool,
    /// Human-readable result line
    pub message: String,
}

impl FlashOutcome {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Drives `arduino-cli` for compile-then-upload flashing
pub struct SketchFlasher {
    cli_path: PathBuf,
}

impl SketchFlasher {
    /// Create a flasher using the given `arduino-cli` binary
    pub fn new(cli_path: impl Into<PathBuf>) -> Self {
        Self {
            cli_path: cli_path.into(),
        }
    }

    /// Compile and upload a sketch, reporting progress through `progress`
    ///
    /// The serial port named in the request must be closed before calling;
    /// the upload tool needs exclusive access to it.
    pub fn flash(
        &self,
        request: &FlashRequest,
        mut progress: impl FnMut(String),
    ) -> FlashOutcome {
        if !request.sketch_dir.is_dir() {
            return FlashOutcome::failure(format!(
                "Sketch directory {} does not exist",
                request.sketch_dir.display()
            ));
        }

        progress(format!("Compiling {}...", request.sketch_dir.display()));
        if let Some(outcome) = self.run_stage(
            "compile",
            &["compile", "--fqbn", &request.fqbn],
            &request.sketch_dir,
        ) {
            return outcome;
        }

        progress(format!("Uploading to {}...", request.port));
        if let Some(outcome) = self.run_stage(
            "upload",
            &["upload", "-p", &request.port, "--fqbn", &request.fqbn],
            &request.sketch_dir,
        ) {
            return outcome;
        }

        tracing::info!(
            "Flashed {} to {} ({})",
            request.sketch_dir.display(),
            request.port,
            request.fqbn
        );
        FlashOutcome {
            success: true,
            message: format!("Sketch uploaded to {}", request.port),
        }
    }

    /// Run one toolchain stage; `Some` is the failure outcome, `None` success
    fn run_stage(&self, stage: &str, args: &[&str], sketch_dir: &Path) -> Option<FlashOutcome> {
        let output = Command::new(&self.cli_path)
            .args(args)
            .arg(sketch_dir)
            .output();

        match output {
            Ok(output) if output.status.success() => None,
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let detail = stderr.lines().last().unwrap_or("unknown error");
                tracing::warn!("arduino-cli {} failed: {}", stage, stderr.trim());
                Some(FlashOutcome::failure(format!(
                    "{} failed: {}",
                    stage, detail
                )))
            }
            Err(e) => {
                tracing::warn!(
                    "Could not run {} for {}: {}",
                    self.cli_path.display(),
                    stage,
                    e
                );
                Some(FlashOutcome::failure(format!(
                    "could not run {}: {}",
                    self.cli_path.display(),
                    e
                )))
            }
        }
    }
}
