//! CLI presentation: text and json formatters per command family.

mod config;
mod content;
mod run;

pub use config::format_validation_result;
pub use content::{format_content_text, format_failure_text, format_section_heading, format_verdict_text};
pub use run::{format_run_result_json, format_run_summary_text, TextObserver};
