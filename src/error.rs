//! Error types for the public entry points.
//!
//! Parsing and classification never fail; these cover the outer surfaces:
//! the conversion precondition, URL encoding, reading documents back and
//! loading configuration.

use thiserror::Error;

/// Errors returned by [`crate::convert`].
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("diagram source is empty")]
    EmptySource,
}

/// Errors returned by the image-service URL encoders.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("failed to compress diagram source: {0}")]
    Compress(#[from] std::io::Error),

    #[error("failed to serialize Mermaid state: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors returned when reading a generated document back.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("attribute error: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    #[error("escape error: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),

    #[error("encoding error: {0}")]
    Encoding(#[from] quick_xml::encoding::EncodingError),

    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("inflate error: {0}")]
    Inflate(#[from] std::io::Error),

    #[error("utf8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("document has no <diagram> element")]
    MissingDiagram,
}

/// Errors returned when loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config as TOML ({toml}) or YAML ({yaml})")]
    Parse {
        toml: toml::de::Error,
        yaml: serde_yaml::Error,
    },
}
