//! CLI output: error mapping and exit codes.

use crate::error::ApiError;
use crate::pipeline::PipelineResult;

/// Command could not be carried out (config, credentials, runtime).
pub const EXIT_ERROR: i32 = 1;
/// The pipeline ran but ended in a failed stage.
pub const EXIT_PIPELINE_FAILED: i32 = 2;

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    format!("Error: {}", e)
}

pub fn exit_code_for(result: &PipelineResult) -> i32 {
    if result.is_failed() {
        EXIT_PIPELINE_FAILED
    } else {
        0
    }
}
