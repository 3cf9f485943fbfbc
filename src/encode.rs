//! Image-service URL encoders.
//!
//! Both services take the diagram source inside the URL itself, deflated
//! and base64-encoded. No request is made here.

use base64::Engine;
use base64::alphabet::Alphabet;
use base64::engine::GeneralPurpose;
use base64::engine::general_purpose::{NO_PAD, URL_SAFE};
use log::debug;
use serde::Serialize;

use crate::config::{Config, ImageFormat};
use crate::drawio::deflate_raw;
use crate::error::EncodeError;

const DEFAULT_MERMAID_THEME: &str = "default";

/// PlantUML's URL alphabet: digits, upper, lower, then `-` and `_`.
const PLANTUML_ALPHABET: Alphabet =
    match Alphabet::new("0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz-_") {
        Ok(alphabet) => alphabet,
        Err(_) => panic!("invalid PlantUML alphabet"),
    };

const PLANTUML_ENGINE: GeneralPurpose = GeneralPurpose::new(&PLANTUML_ALPHABET, NO_PAD);

/// Make sure the source is wrapped in `@startuml`/`@enduml` and carries the
/// requested theme.
pub fn prepare_plantuml(source: &str, theme: Option<&str>) -> String {
    let source = source.trim();
    let (start, body, end) = if source.starts_with("@start") {
        let (first, rest) = source.split_once('\n').unwrap_or((source, ""));
        match rest.trim_end().rsplit_once('\n') {
            Some((body, last)) if last.trim().starts_with("@end") => {
                (first.trim(), body, last.trim())
            }
            _ if rest.trim().starts_with("@end") => (first.trim(), "", rest.trim()),
            _ => (first.trim(), rest, "@enduml"),
        }
    } else {
        ("@startuml", source, "@enduml")
    };

    let mut out = String::with_capacity(source.len() + 32);
    out.push_str(start);
    out.push('\n');
    if let Some(theme) = theme.filter(|t| !t.trim().is_empty())
        && !body.contains("!theme")
    {
        out.push_str("!theme ");
        out.push_str(theme.trim());
        out.push('\n');
    }
    let body = body.trim_matches('\n');
    if !body.is_empty() {
        out.push_str(body);
        out.push('\n');
    }
    out.push_str(end);
    out
}

/// Pack every 3 bytes into 4 characters of PlantUML's alphabet. A partial
/// last group is zero-filled, so the output length is always a multiple
/// of 4.
fn encode64(data: &[u8]) -> String {
    let mut out = PLANTUML_ENGINE.encode(data);
    while out.len() % 4 != 0 {
        out.push('0');
    }
    out
}

/// Deflate the text and encode it with PlantUML's alphabet.
pub fn encode_plantuml(text: &str) -> Result<String, EncodeError> {
    Ok(encode64(&deflate_raw(text.as_bytes())?))
}

/// `{server}/{format}/{encoded}` for a PlantUML source.
pub fn plantuml_url(source: &str, config: &Config) -> Result<String, EncodeError> {
    let prepared = prepare_plantuml(source, config.theme.as_deref());
    let encoded = encode_plantuml(&prepared)?;
    debug!(chars = encoded.len(); "Encoded PlantUML source");
    Ok(format!(
        "{}/{}/{}",
        config.plantuml_server.trim_end_matches('/'),
        config.image_format.as_str(),
        encoded
    ))
}

#[derive(Serialize)]
struct MermaidState<'a> {
    code: &'a str,
    mermaid: MermaidConfig<'a>,
}

#[derive(Serialize)]
struct MermaidConfig<'a> {
    theme: &'a str,
}

/// Serialize the editor state, deflate it and encode as URL-safe base64.
pub fn encode_mermaid(code: &str, theme: Option<&str>) -> Result<String, EncodeError> {
    let state = MermaidState {
        code,
        mermaid: MermaidConfig {
            theme: theme.unwrap_or(DEFAULT_MERMAID_THEME),
        },
    };
    let json = serde_json::to_string(&state)?;
    Ok(URL_SAFE.encode(deflate_raw(json.as_bytes())?))
}

/// `{server}/svg/pako:{encoded}` or `{server}/img/pako:{encoded}?type=png`.
pub fn mermaid_url(code: &str, config: &Config) -> Result<String, EncodeError> {
    let encoded = encode_mermaid(code, config.theme.as_deref())?;
    debug!(chars = encoded.len(); "Encoded Mermaid source");
    let server = config.mermaid_server.trim_end_matches('/');
    Ok(match config.image_format {
        ImageFormat::Svg => format!("{}/svg/pako:{}", server, encoded),
        ImageFormat::Png => format!("{}/img/pako:{}?type=png", server, encoded),
    })
}
