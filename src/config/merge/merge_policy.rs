//! Merge rules: defaults every later source overrides.

use crate::agent::DEFAULT_MCQ_COUNT;
use crate::provider::profile::DEFAULT_MODEL;
use crate::provider::DEFAULT_TEMPERATURE;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("provider.provider_type", "groq")?
        .set_default("provider.model", DEFAULT_MODEL)?
        .set_default(
            "provider.default_options.temperature",
            f64::from(DEFAULT_TEMPERATURE),
        )?
        .set_default("generation.mcq_count", DEFAULT_MCQ_COUNT as u64)?
        .set_default("review.strict_verdict", false)
}
