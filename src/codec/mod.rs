// URL fragment codec
//
// This module turns the canonical configuration into the shareable URL
// fragment and back. Encoding is canonical: fields equal to their default
// are omitted so links stay short, and free-text fields travel as
// compressed tokens. Decoding produces a partial overlay: a key that is
// absent stays absent, and a key that cannot be decoded falls back per
// field rather than failing the whole fragment.

pub mod token;

use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;
use url::form_urlencoded;

use crate::models::{AstView, ConfigModel, ConfigPatch, FileType, SourceType};

/// Errors from the fallible decoding leaves.
///
/// `decode` itself never fails, since shared links are best-effort, but
/// every leaf that can reject input reports why, and the single fallback
/// site for each field logs it.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid URL-safe base64 in value token: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("corrupt compressed payload: {0}")]
    Compression(#[from] std::io::Error),

    #[error("decompressed token is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("legacy `{param}` parameter is not valid JSON: {source}")]
    LegacyJson {
        param: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Serialize a configuration into its canonical fragment string (without
/// the leading `#`).
///
/// Key order and omission rules are fixed: `ts` and `tse` are always
/// written (trimmed), `sourceType` only when `script`, `showAST` only when
/// a view is active, `fileType` only when it differs from plain `ts`, and
/// the three document fields always, as compressed tokens. The secondary
/// document is deliberately not part of shared links.
pub fn encode(config: &ConfigModel) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    serializer.append_pair("ts", config.ts.trim());
    serializer.append_pair("tse", config.tse.trim());
    if config.source_type == SourceType::Script {
        serializer.append_pair("sourceType", config.source_type.as_token());
    }
    if let Some(view) = config.show_ast.as_token() {
        serializer.append_pair("showAST", view);
    }
    if config.file_type != FileType::Ts {
        serializer.append_pair("fileType", config.file_type.as_token());
    }
    serializer.append_pair("code", &token::pack(&config.code));
    serializer.append_pair("eslintrc", &token::pack(&config.eslintrc));
    serializer.append_pair("tsconfig", &token::pack(&config.tsconfig));
    serializer.finish()
}

/// Parse a fragment string into a partial configuration.
///
/// Recognized keys are `ts`, `tse`, `showAST`, `sourceType`, `fileType`,
/// `code`, `eslintrc`, `tsconfig`, plus the legacy spellings `rules`,
/// `tsConfig`, and `jsx` which upgrade to their modern equivalents. Absent
/// keys produce absent patch fields; undecodable values fall back per
/// field with a logged warning. Unknown keys are ignored.
pub fn decode(fragment: &str) -> ConfigPatch {
    if fragment.is_empty() {
        return ConfigPatch::default();
    }

    // First occurrence wins for duplicate keys
    let mut params: IndexMap<String, String> = IndexMap::new();
    for (key, value) in form_urlencoded::parse(fragment.as_bytes()) {
        params
            .entry(key.into_owned())
            .or_insert_with(|| value.into_owned());
    }

    let eslintrc = if let Some(raw) = params.get("eslintrc") {
        Some(read_token_param(raw, "eslintrc", ""))
    } else if let Some(raw) = params.get("rules") {
        match read_legacy_param(raw, "rules", "rules") {
            Ok(text) => Some(text),
            Err(err) => {
                warn!("ignoring legacy lint config parameter: {}", err);
                None
            }
        }
    } else {
        None
    };

    let tsconfig = if let Some(raw) = params.get("tsconfig") {
        Some(read_token_param(raw, "tsconfig", ""))
    } else if let Some(raw) = params.get("tsConfig") {
        match read_legacy_param(raw, "tsConfig", "compilerOptions") {
            Ok(text) => Some(text),
            Err(err) => {
                warn!("ignoring legacy compiler config parameter: {}", err);
                None
            }
        }
    } else {
        None
    };

    let mut file_type = params.get("fileType").map(|raw| FileType::parse(raw));
    if params.get("jsx").is_some_and(|value| value == "true") {
        file_type = Some(FileType::Tsx);
    }

    ConfigPatch {
        ts: params.get("ts").cloned(),
        tse: params.get("tse").cloned(),
        code: params.get("code").map(|raw| read_token_param(raw, "code", "")),
        code2: None,
        file_type,
        source_type: params.get("sourceType").map(|raw| SourceType::parse(raw)),
        eslintrc,
        tsconfig,
        show_ast: params.get("showAST").map(|raw| AstView::parse(raw)),
    }
}

/// Unpack a token-valued parameter, falling back when the token is empty,
/// unpacks to nothing, or cannot be decoded.
fn read_token_param(raw: &str, key: &'static str, fallback: &str) -> String {
    if raw.is_empty() {
        return fallback.to_string();
    }
    match token::unpack(raw) {
        Ok(text) if !text.is_empty() => text,
        Ok(_) => fallback.to_string(),
        Err(err) => {
            warn!("discarding undecodable `{}` parameter: {}", key, err);
            fallback.to_string()
        }
    }
}

/// Upgrade a legacy bare-JSON parameter (`rules`, `tsConfig`) into the
/// full config-document text its modern equivalent carries, by wrapping
/// the parsed value under `wrapper_key`.
fn read_legacy_param(
    raw: &str,
    param: &'static str,
    wrapper_key: &str,
) -> Result<String, DecodeError> {
    let text = read_token_param(raw, param, "{}");
    let parsed: Value =
        serde_json::from_str(&text).map_err(|source| DecodeError::LegacyJson { param, source })?;
    let mut wrapped = serde_json::Map::new();
    wrapped.insert(wrapper_key.to_string(), parsed);
    Ok(to_pretty_json(&Value::Object(wrapped)))
}

fn to_pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}
