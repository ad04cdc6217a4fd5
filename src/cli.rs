//! CLI domain: parse, route, output, and presentation only.
//! No domain orchestration; single route table dispatches to domain services.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::{exit_code_for, map_error, EXIT_ERROR, EXIT_PIPELINE_FAILED};
pub use parse::{Cli, Commands, ConfigCommands, OutputFormat, SchemaKind};
pub use presentation::{
    format_content_text, format_failure_text, format_run_result_json, format_run_summary_text,
    format_section_heading, format_validation_result, format_verdict_text, TextObserver,
};
pub use route::{CommandOutcome, RunContext};
