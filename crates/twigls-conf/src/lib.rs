pub mod diagnostics;

use std::path::Path;

use config::Config;
use config::ConfigError as ExternalConfigError;
use config::File;
use config::FileFormat;
use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

pub use crate::diagnostics::DiagnosticsSettings;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration build/deserialize error")]
    Config(#[from] ExternalConfigError),
    #[error("Client settings must be a table, got {0}")]
    ClientNotATable(&'static str),
    #[error("Failed to convert client settings to TOML")]
    ClientSerialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SemanticTokensSettings {
    pub enabled: bool,
}

impl Default for SemanticTokensSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Where `{% include %}` paths are resolved from.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TemplatesSettings {
    /// Directory under each workspace folder holding the templates.
    pub root: String,
    /// Appended to include paths that lack it.
    pub file_extension: String,
}

impl Default for TemplatesSettings {
    fn default() -> Self {
        Self {
            root: "templates".to_string(),
            file_extension: ".twig".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub debug: bool,
    pub diagnostics: DiagnosticsSettings,
    pub semantic_tokens: SemanticTokensSettings,
    pub templates: TemplatesSettings,
}

impl Settings {
    pub fn new(project_root: &Path) -> Result<Self, ConfigError> {
        Self::with_client_settings(project_root, None)
    }

    /// Load settings, layering the editor-supplied `client` table (for example
    /// LSP `initializationOptions`) over every file.
    pub fn with_client_settings(
        project_root: &Path,
        client: Option<&serde_json::Value>,
    ) -> Result<Self, ConfigError> {
        let user_config_file = ProjectDirs::from("com.github", "twigls", "twigls")
            .map(|proj_dirs| proj_dirs.config_dir().join("twigls.toml"));

        Self::load_from_paths(project_root, user_config_file.as_deref(), client)
    }

    fn load_from_paths(
        project_root: &Path,
        user_config_path: Option<&Path>,
        client: Option<&serde_json::Value>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = user_config_path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }

        builder = builder.add_source(
            File::from(project_root.join(".twigls.toml"))
                .format(FileFormat::Toml)
                .required(false),
        );

        builder = builder.add_source(
            File::from(project_root.join("twigls.toml"))
                .format(FileFormat::Toml)
                .required(false),
        );

        if let Some(value) = client.filter(|value| !value.is_null()) {
            let table = client_table(value)?;
            builder = builder.add_source(File::from_str(&table, FileFormat::Toml));
        }

        let config = builder.build()?;
        let settings = config.try_deserialize()?;
        tracing::debug!(?settings, root = %project_root.display(), "loaded settings");
        Ok(settings)
    }
}

fn client_table(value: &serde_json::Value) -> Result<String, ConfigError> {
    let kind = match value {
        serde_json::Value::Object(_) => return Ok(toml::to_string(value)?),
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
    };
    Err(ConfigError::ClientNotATable(kind))
}
