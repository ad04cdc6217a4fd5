//! Config layering through the public loader.

use crate::integration::test_utils::with_isolated_env;
use eklavya::config::{ConfigLoader, EklavyaConfig, ProviderType};
use eklavya::pipeline::PipelineSettings;
use std::path::Path;
use tempfile::TempDir;

fn write(path: &Path, contents: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

#[test]
fn test_defaults_when_no_files_exist() {
    let test_dir = TempDir::new().unwrap();
    let workspace = test_dir.path().join("workspace");
    std::fs::create_dir_all(&workspace).unwrap();

    let config = with_isolated_env(&test_dir, || ConfigLoader::load(&workspace).unwrap());
    assert_eq!(config, EklavyaConfig::default());
}

#[test]
fn test_layers_merge_field_by_field() {
    let test_dir = TempDir::new().unwrap();
    let workspace = test_dir.path().join("workspace");

    write(
        &test_dir.path().join("config/eklavya/config.toml"),
        r#"
[provider]
provider_type = "openai"
model = "gpt-4o-mini"

[provider.default_options]
temperature = 0.3

[review]
strict_verdict = true
"#,
    );
    write(
        &workspace.join("config/config.toml"),
        r#"
[provider]
model = "gpt-4o"

[generation]
mcq_count = 5
"#,
    );

    let config = with_isolated_env(&test_dir, || ConfigLoader::load(&workspace).unwrap());
    assert_eq!(config.provider.provider_type, ProviderType::OpenAI);
    assert_eq!(config.provider.model, "gpt-4o");
    assert_eq!(config.provider.default_options.temperature, Some(0.3));
    assert_eq!(config.generation.mcq_count, 5);
    assert!(config.review.strict_verdict);

    let settings = PipelineSettings::from_config(&config);
    assert_eq!(settings.mcq_count, 5);
    assert!(settings.strict_verdict);
}

#[test]
fn test_environment_beats_every_file() {
    let test_dir = TempDir::new().unwrap();
    let workspace = test_dir.path().join("workspace");
    write(
        &workspace.join("config/config.toml"),
        "[provider]\nmodel = \"from-file\"\n",
    );

    let config = with_isolated_env(&test_dir, || {
        std::env::set_var("EKLAVYA__PROVIDER__MODEL", "from-env");
        ConfigLoader::load(&workspace).unwrap()
    });
    assert_eq!(config.provider.model, "from-env");
}

#[test]
fn test_explicit_file_skips_workspace_files() {
    let test_dir = TempDir::new().unwrap();
    let workspace = test_dir.path().join("workspace");
    write(
        &workspace.join("config/config.toml"),
        "[generation]\nmcq_count = 9\n",
    );
    let explicit = test_dir.path().join("explicit.toml");
    write(&explicit, "[provider]\nprovider_type = \"ollama\"\nmodel = \"llama3\"\n");

    let config = with_isolated_env(&test_dir, || ConfigLoader::load_from_file(&explicit).unwrap());
    assert_eq!(config.provider.provider_type, ProviderType::Ollama);
    assert_eq!(config.generation.mcq_count, 3);
}

#[test]
fn test_invalid_values_load_but_fail_validation() {
    let test_dir = TempDir::new().unwrap();
    let workspace = test_dir.path().join("workspace");
    write(
        &workspace.join("config/config.toml"),
        r#"
[provider]
endpoint = "localhost:11434"

[generation]
mcq_count = 0
"#,
    );

    let config = with_isolated_env(&test_dir, || ConfigLoader::load(&workspace).unwrap());
    let errors = config.validate().unwrap_err();
    assert_eq!(errors.len(), 2);
}

#[test]
fn test_malformed_toml_is_a_config_error() {
    let test_dir = TempDir::new().unwrap();
    let workspace = test_dir.path().join("workspace");
    write(&workspace.join("config/config.toml"), "[provider\nmodel = ");

    let result = with_isolated_env(&test_dir, || ConfigLoader::load(&workspace));
    assert!(matches!(
        result,
        Err(eklavya::error::ApiError::ConfigError(_))
    ));
}
