//! Encoding and decoding of CLI protocol lines.

use percent_encoding::{percent_decode_str, utf8_percent_encode, NON_ALPHANUMERIC};

/// Encodes request fields into one newline-terminated CLI line.
pub fn encode_request(fields: &[&str]) -> String {
    let mut line = fields
        .iter()
        .map(|f| utf8_percent_encode(f, NON_ALPHANUMERIC).to_string())
        .collect::<Vec<_>>()
        .join(" ");
    line.push('\n');
    line
}

/// Decodes a response line into its fields.
pub fn decode_fields(line: &str) -> Vec<String> {
    line.split(' ')
        .filter(|f| !f.is_empty())
        .map(|f| percent_decode_str(f).decode_utf8_lossy().into_owned())
        .collect()
}

/// Drops the echoed request fields from the head of a decoded response.
///
/// The server echoes every request field before appending results; a `?`
/// placeholder is echoed back replaced by its answer, so only exact matches
/// are stripped.
pub fn strip_echo<'a>(response: &'a [String], request: &[&str]) -> &'a [String] {
    let mut n = 0;
    for (resp, req) in response.iter().zip(request) {
        if resp != req {
            break;
        }
        n += 1;
    }
    &response[n..]
}

/// Splits a `tag:value` result field. The value may itself contain colons
/// (player MACs do), so only the first one separates.
pub fn tag_value(field: &str) -> Option<(&str, &str)> {
    field.split_once(':')
}
