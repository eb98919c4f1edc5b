use crate::data::{ContentEncoding, ResponseHead};

use super::headers::CONTENT_ENCODING;

/// Decide whether a response body must be decoded.
///
/// Only applies when compression was negotiated and the response's
/// `content-encoding` is exactly one of the supported codings.
pub fn negotiate(enabled: bool, head: &ResponseHead) -> Option<ContentEncoding> {
    if !enabled {
        return None;
    }
    head.header(CONTENT_ENCODING)
        .and_then(ContentEncoding::from_header)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn head(encoding: Option<&str>) -> ResponseHead {
        let head = ResponseHead::new(200, "OK");
        match encoding {
            Some(value) => head.with_header("Content-Encoding", value),
            None => head,
        }
    }

    #[test]
    fn test_negotiate() {
        assert_eq!(negotiate(true, &head(Some("gzip"))), Some(ContentEncoding::Gzip));
        assert_eq!(negotiate(true, &head(Some("deflate"))), Some(ContentEncoding::Deflate));
        assert_eq!(negotiate(true, &head(Some("br"))), None);
        assert_eq!(negotiate(true, &head(None)), None);
    }

    #[test]
    fn test_disabled_never_decodes() {
        assert_eq!(negotiate(false, &head(Some("gzip"))), None);
    }
}
