//! Configuration sources, lowest to highest precedence after the defaults.

use config::Environment;

pub mod global_file;
pub mod workspace_file;

/// Environment overrides: `EKLAVYA__GENERATION__MCQ_COUNT=5` sets `generation.mcq_count`.
pub fn environment() -> Environment {
    Environment::with_prefix("EKLAVYA")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}
