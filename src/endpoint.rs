//! URL construction for collection documents

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::ClientConfig;

/// Characters left unencoded in a single URI path segment (RFC 3986).
/// `/` is encoded too, so a key can never address a nested path.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b'=')
    .remove(b':')
    .remove(b'@');

/// Percent-encode one path segment.
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

/// API root for a config: the override if set, else `https://<project>.<host>/api`.
pub fn api_endpoint(config: &ClientConfig) -> String {
    match &config.api_base {
        Some(base) => base.trim_end_matches('/').to_string(),
        None => format!("https://{}.{}/api", config.project, config.host),
    }
}

/// `<api>/collections/<collection>/`
pub fn collection_url(api_endpoint: &str, collection: &str) -> String {
    format!("{}/collections/{}/", api_endpoint, encode_segment(collection))
}

/// `<api>/collections/<collection>/documents/<key>/`
pub fn document_url(api_endpoint: &str, collection: &str, key: &str) -> String {
    format!(
        "{}documents/{}/",
        collection_url(api_endpoint, collection),
        encode_segment(key)
    )
}
