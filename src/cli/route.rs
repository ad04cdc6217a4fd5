//! CLI route: single route table and run context. Dispatches to the pipeline,
//! config and schema services and to presentation.

use crate::cli::output::exit_code_for;
use crate::cli::parse::{Commands, ConfigCommands, OutputFormat, SchemaKind};
use crate::cli::presentation::{
    format_run_result_json, format_run_summary_text, format_validation_result, TextObserver,
};
use crate::config::{ConfigLoader, EklavyaConfig};
use crate::error::ApiError;
use crate::pipeline::{run_pipeline_blocking, NoopObserver, PipelineRequest};
use crate::schema::{ContentOutput, OutputSchema, ReviewOutput};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::{debug, info};

/// What a command printed and how the process should exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub output: String,
    pub exit_code: i32,
}

impl CommandOutcome {
    fn ok(output: String) -> Self {
        Self {
            output,
            exit_code: 0,
        }
    }
}

/// Runtime context for CLI execution: the loaded configuration and where it came from.
pub struct RunContext {
    config_path: Option<PathBuf>,
    config: EklavyaConfig,
    color: bool,
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = match config_path {
            Some(ref path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        Ok(Self::with_config(config_path, config))
    }

    pub fn with_config(config_path: Option<PathBuf>, config: EklavyaConfig) -> Self {
        let color = std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();
        Self {
            config_path,
            config,
            color,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<CommandOutcome, ApiError> {
        debug!(command = ?command, "Executing command");
        match command {
            Commands::Run {
                grade,
                topic,
                api_key,
                format,
            } => self.handle_run(*grade, topic, api_key.as_deref(), *format),
            Commands::Config { command } => self.handle_config(command),
            Commands::Schema { kind } => Ok(CommandOutcome::ok(schema_instructions(*kind))),
        }
    }

    fn handle_run(
        &self,
        grade: u8,
        topic: &str,
        api_key: Option<&str>,
        format: OutputFormat,
    ) -> Result<CommandOutcome, ApiError> {
        self.ensure_valid()?;
        let credential = self.resolve_credential(api_key)?;
        let request = PipelineRequest::new(grade, topic, credential)?;
        info!(grade, topic = %request.topic, format = ?format, "Running pipeline");

        let (result, output) = match format {
            OutputFormat::Text => {
                let observer = TextObserver::new(std::io::stdout(), self.color);
                let result = run_pipeline_blocking(&request, &self.config, &observer)?;
                let summary = format_run_summary_text(&result, self.color);
                (result, summary)
            }
            OutputFormat::Json => {
                let result = run_pipeline_blocking(&request, &self.config, &NoopObserver)?;
                let json = format_run_result_json(&result, request.grade, &request.topic)?;
                (result, json)
            }
        };

        Ok(CommandOutcome {
            output,
            exit_code: exit_code_for(&result),
        })
    }

    fn handle_config(&self, command: &ConfigCommands) -> Result<CommandOutcome, ApiError> {
        match command {
            ConfigCommands::Show => {
                let mut output = String::new();
                if let Some(path) = &self.config_path {
                    output.push_str(&format!("# loaded from {}\n", path.display()));
                }
                output.push_str(&self.config.to_toml_string()?);
                Ok(CommandOutcome::ok(output))
            }
            ConfigCommands::Validate => {
                let result = self.config.validate();
                let exit_code = if result.is_ok() { 0 } else { 1 };
                Ok(CommandOutcome {
                    output: format_validation_result(&result),
                    exit_code,
                })
            }
        }
    }

    fn ensure_valid(&self) -> Result<(), ApiError> {
        self.config.validate().map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(messages.join("; "))
        })
    }

    /// `--api-key` wins; otherwise the provider's credential variable. Providers that
    /// need a credential fail here rather than at the first model call.
    fn resolve_credential(&self, api_key: Option<&str>) -> Result<Option<String>, ApiError> {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            return Ok(Some(key.to_string()));
        }

        let provider = &self.config.provider;
        let from_env = provider
            .effective_api_key_env()
            .and_then(|var| std::env::var(var).ok())
            .filter(|key| !key.trim().is_empty());

        match from_env {
            Some(key) => Ok(Some(key)),
            None if provider.provider_type.requires_credential() => {
                Err(ApiError::MissingCredential(
                    provider
                        .effective_api_key_env()
                        .unwrap_or_else(|| "an API key variable".to_string()),
                ))
            }
            None => Ok(None),
        }
    }
}

fn schema_instructions(kind: SchemaKind) -> String {
    match kind {
        SchemaKind::Content => ContentOutput::format_instructions(),
        SchemaKind::Review => ReviewOutput::format_instructions(),
    }
}
