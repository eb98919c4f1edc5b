use std::collections::BTreeMap;

use crate::data::Body;

pub const CONTENT_TYPE: &str = "content-type";
pub const CONTENT_LENGTH: &str = "content-length";
pub const CONTENT_ENCODING: &str = "content-encoding";
pub const ACCEPT_ENCODING: &str = "accept-encoding";

/// Fill in `content-type` and `content-length` for a body, leaving any
/// value the caller set alone. Buffer bodies get no content type.
pub fn apply_body_headers(headers: &mut BTreeMap<String, String>, body: &Body) {
    if !headers.contains_key(CONTENT_TYPE)
        && let Some(content_type) = body.encoding().content_type()
    {
        headers.insert(CONTENT_TYPE.to_string(), content_type.to_string());
    }

    headers
        .entry(CONTENT_LENGTH.to_string())
        .or_insert_with(|| body.len().to_string());
}
