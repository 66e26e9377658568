//! Exit codes following sysexits.h conventions.
//!
//! These codes provide semantic meaning for different failure modes,
//! enabling scripts and CI systems to handle errors appropriately.

use dctmark_core::WatermarkError;

/// General error (catch-all).
pub const GENERAL_ERROR: i32 = 1;

/// Command line usage error (invalid arguments or configuration).
/// Maps to EX_USAGE from sysexits.h.
pub const USAGE_ERROR: i32 = 64;

/// Data format error (sizes or region inconsistent between inputs).
/// Maps to EX_DATAERR from sysexits.h.
pub const DATA_ERROR: i32 = 65;

/// Cannot open input file.
/// Maps to EX_NOINPUT from sysexits.h.
pub const INPUT_ERROR: i32 = 66;

/// I/O error (cannot write output file).
/// Maps to EX_IOERR from sysexits.h.
pub const IO_ERROR: i32 = 74;

/// Represents an exit code with its error message.
pub struct ExitCode {
    pub code: i32,
    pub message: String,
}

impl ExitCode {
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let message = format!("{err:#}");

        // Classify by the first library error in the chain, then by context
        let code = match err.chain().find_map(|e| e.downcast_ref::<WatermarkError>()) {
            Some(WatermarkError::Decode { .. }) => INPUT_ERROR,
            Some(WatermarkError::Encode { .. }) => IO_ERROR,
            Some(WatermarkError::Shape { .. } | WatermarkError::DimensionMismatch { .. }) => {
                DATA_ERROR
            }
            Some(WatermarkError::InvalidParameter(_)) => USAGE_ERROR,
            Some(WatermarkError::Config(_)) if message.contains("Failed to read config") => {
                INPUT_ERROR
            }
            Some(WatermarkError::Config(_)) => USAGE_ERROR,
            None if message.contains("Failed to write") => IO_ERROR,
            None if message.contains("Failed to read") => INPUT_ERROR,
            None => GENERAL_ERROR,
        };

        Self { code, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use std::path::PathBuf;

    fn code_for(err: WatermarkError) -> i32 {
        let err = Err::<(), _>(err).context("Command step").unwrap_err();
        ExitCode::from_anyhow(&err).code
    }

    #[test]
    fn test_library_errors_are_classified() {
        let path = PathBuf::from("x.png");
        assert_eq!(
            code_for(WatermarkError::Decode {
                path: path.clone(),
                reason: "bad".into()
            }),
            INPUT_ERROR
        );
        assert_eq!(
            code_for(WatermarkError::Encode {
                path,
                reason: "bad".into()
            }),
            IO_ERROR
        );
        assert_eq!(
            code_for(WatermarkError::DimensionMismatch {
                test: (1, 1),
                original: (2, 2)
            }),
            DATA_ERROR
        );
        assert_eq!(
            code_for(WatermarkError::InvalidParameter("strength".into())),
            USAGE_ERROR
        );
        assert_eq!(
            code_for(WatermarkError::Config("Invalid configuration".into())),
            USAGE_ERROR
        );
        assert_eq!(
            code_for(WatermarkError::Config(
                "Failed to read config file a.json: gone".into()
            )),
            INPUT_ERROR
        );
    }

    #[test]
    fn test_context_only_errors() {
        let err = anyhow::anyhow!("disk full").context("Failed to write report");
        assert_eq!(ExitCode::from_anyhow(&err).code, IO_ERROR);

        let err = anyhow::anyhow!("something else");
        let exit = ExitCode::from_anyhow(&err);
        assert_eq!(exit.code, GENERAL_ERROR);
        assert_eq!(exit.message, "something else");
    }
}
