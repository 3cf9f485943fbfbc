use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const DEFAULT_DIAGRAM_NAME: &str = "Page-1";
const DEFAULT_PLANTUML_SERVER: &str = "https://www.plantuml.com/plantuml";
const DEFAULT_MERMAID_SERVER: &str = "https://mermaid.ink";

/// Output format requested from the image services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Svg,
    Png,
}

impl ImageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Svg => "svg",
            ImageFormat::Png => "png",
        }
    }
}

/// Options for a single conversion run.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub compressed: bool,
    pub diagram_name: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            compressed: false,
            diagram_name: DEFAULT_DIAGRAM_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub compressed: bool,
    #[serde(default = "default_diagram_name")]
    pub diagram_name: String,
    #[serde(default = "default_plantuml_server")]
    pub plantuml_server: String,
    #[serde(default = "default_mermaid_server")]
    pub mermaid_server: String,
    #[serde(default)]
    pub image_format: ImageFormat,
    #[serde(default)]
    pub theme: Option<String>,
}

fn default_diagram_name() -> String {
    DEFAULT_DIAGRAM_NAME.to_string()
}
fn default_plantuml_server() -> String {
    DEFAULT_PLANTUML_SERVER.to_string()
}
fn default_mermaid_server() -> String {
    DEFAULT_MERMAID_SERVER.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            compressed: false,
            diagram_name: default_diagram_name(),
            plantuml_server: default_plantuml_server(),
            mermaid_server: default_mermaid_server(),
            image_format: ImageFormat::default(),
            theme: None,
        }
    }
}

impl Config {
    /// Load configuration from a file, trying TOML first and then YAML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str_any(&content)
    }

    pub fn from_str_any(content: &str) -> Result<Self, ConfigError> {
        match toml::from_str(content) {
            Ok(config) => Ok(config),
            Err(toml) => {
                serde_yaml::from_str(content).map_err(|yaml| ConfigError::Parse { toml, yaml })
            }
        }
    }

    pub fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            compressed: self.compressed,
            diagram_name: self.diagram_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, ImageFormat};

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = Config::from_str_any("compressed = true\n").expect("toml config");
        assert!(config.compressed);
        assert_eq!(config.diagram_name, "Page-1");
        assert_eq!(config.plantuml_server, "https://www.plantuml.com/plantuml");
        assert_eq!(config.image_format, ImageFormat::Svg);
        assert!(config.theme.is_none());
    }

    #[test]
    fn yaml_is_accepted_when_toml_fails() {
        let yaml = "diagram_name: Overview\nimage_format: png\ntheme: cerulean\n";
        let config = Config::from_str_any(yaml).expect("yaml config");
        assert_eq!(config.diagram_name, "Overview");
        assert_eq!(config.image_format, ImageFormat::Png);
        assert_eq!(config.theme.as_deref(), Some("cerulean"));
        assert!(!config.convert_options().compressed);
    }

    #[test]
    fn garbage_reports_both_formats() {
        let err = Config::from_str_any("compressed: [").unwrap_err();
        assert!(err.to_string().contains("TOML"));
    }
}
