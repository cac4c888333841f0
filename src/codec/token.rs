// Compressed URL-safe value tokens
//
// Free-text fields (source code, config documents) are carried in the URL
// fragment as zstd-compressed, URL-safe base64 tokens so that links stay
// short and never need percent-escaping.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use super::DecodeError;

// Favor short links over encode speed; these are tiny one-shot payloads.
const COMPRESSION_LEVEL: i32 = 19;

/// Compress `text` into a URL-safe token.
///
/// The empty string packs to the empty token. Compression failures are not
/// propagated: a value that cannot be packed is carried as an empty token,
/// which decodes back to "use the fallback".
pub fn pack(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    match zstd::encode_all(text.as_bytes(), COMPRESSION_LEVEL) {
        Ok(compressed) => URL_SAFE_NO_PAD.encode(compressed),
        Err(err) => {
            tracing::error!("failed to compress value token: {}", err);
            String::new()
        }
    }
}

/// Decompress a URL-safe token back into text.
pub fn unpack(token: &str) -> Result<String, DecodeError> {
    if token.is_empty() {
        return Ok(String::new());
    }
    let compressed = URL_SAFE_NO_PAD.decode(token)?;
    let bytes = zstd::decode_all(compressed.as_slice())?;
    Ok(String::from_utf8(bytes)?)
}
