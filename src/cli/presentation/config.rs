//! Config command presentation.

use crate::config::ValidationError;

pub fn format_validation_result(result: &Result<(), Vec<ValidationError>>) -> String {
    match result {
        Ok(()) => "Configuration is valid.".to_string(),
        Err(errors) => {
            let mut output = format!("Configuration has {} error(s):\n", errors.len());
            for error in errors {
                output.push_str(&format!("  - {}\n", error));
            }
            output
        }
    }
}
