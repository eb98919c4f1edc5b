use bytes::Bytes;
use serde_json::Value;
use url::form_urlencoded;

use crate::data::{Body, BodyData, BodyEncoding, EncodeAs};

/// Pick the encoding for a payload: the explicit hint wins, then structured
/// values become JSON, everything else is sent as-is.
pub fn infer_encoding(data: &BodyData, hint: Option<EncodeAs>) -> BodyEncoding {
    match (hint, data) {
        (Some(hint), _) => hint.into(),
        (None, BodyData::Structured(_)) => BodyEncoding::Json,
        (None, _) => BodyEncoding::Buffer,
    }
}

/// Encode a payload into its final wire bytes.
///
/// The encoding is decided here, once, and travels with the bytes.
pub fn encode_body(data: BodyData, hint: Option<EncodeAs>) -> Body {
    let encoding = infer_encoding(&data, hint);
    let bytes = match (encoding, data) {
        (BodyEncoding::Json, BodyData::Structured(value)) => Bytes::from(value.to_string()),
        (BodyEncoding::Json, BodyData::Text(text)) => Bytes::from(Value::String(text).to_string()),
        (BodyEncoding::Form, BodyData::Structured(value)) => Bytes::from(encode_form(&value)),
        (_, BodyData::Structured(value)) => Bytes::from(value.to_string()),
        (_, BodyData::Text(text)) => Bytes::from(text),
        (_, BodyData::Bytes(bytes)) => bytes,
    };
    Body::new(encoding, bytes)
}

/// Serialize a value as `application/x-www-form-urlencoded`.
///
/// Object keys become fields in order; arrays repeat their key once per
/// element. Strings are used verbatim, numbers and booleans are stringified,
/// and `null` or nested containers encode as empty values. Top-level arrays
/// use their indexes as keys; other scalars encode to nothing.
pub fn encode_form(value: &Value) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    match value {
        Value::Object(map) => {
            for (key, value) in map {
                append_field(&mut serializer, key, value);
            }
        }
        Value::Array(items) => {
            for (index, value) in items.iter().enumerate() {
                append_field(&mut serializer, &index.to_string(), value);
            }
        }
        _ => {}
    }
    serializer.finish()
}

fn append_field(serializer: &mut form_urlencoded::Serializer<'_, String>, key: &str, value: &Value) {
    match value {
        Value::Array(items) => {
            for item in items {
                serializer.append_pair(key, &form_scalar(item));
            }
        }
        other => {
            serializer.append_pair(key, &form_scalar(other));
        }
    }
}

fn form_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_infer_encoding() {
        let structured = BodyData::Structured(json!({ "a": 1 }));
        let text = BodyData::Text("hi".into());
        let bytes = BodyData::Bytes(Bytes::from_static(b"hi"));

        assert_eq!(infer_encoding(&structured, None), BodyEncoding::Json);
        assert_eq!(infer_encoding(&text, None), BodyEncoding::Buffer);
        assert_eq!(infer_encoding(&bytes, None), BodyEncoding::Buffer);
        assert_eq!(infer_encoding(&bytes, Some(EncodeAs::Json)), BodyEncoding::Json);
        assert_eq!(infer_encoding(&structured, Some(EncodeAs::Form)), BodyEncoding::Form);
    }

    #[test]
    fn test_json_encoding() {
        let body = encode_body(json!({ "a": 1, "b": [true, null] }).into(), None);
        assert_eq!(body.bytes().as_ref(), br#"{"a":1,"b":[true,null]}"#);

        let body = encode_body(BodyData::Text("say \"hi\"".into()), Some(EncodeAs::Json));
        assert_eq!(body.bytes().as_ref(), br#""say \"hi\"""#);

        let body = encode_body(BodyData::Bytes(Bytes::from_static(b"[1,2]")), Some(EncodeAs::Json));
        assert_eq!(body.encoding(), BodyEncoding::Json);
        assert_eq!(body.bytes().as_ref(), b"[1,2]");
    }

    #[test]
    fn test_buffer_passthrough() {
        let raw = Bytes::from_static(&[0xff, 0x00, 0x10]);
        let body = encode_body(BodyData::Bytes(raw.clone()), None);
        assert_eq!(body.bytes(), &raw);

        let body = encode_body(BodyData::Text("plain".into()), None);
        assert_eq!(body.bytes().as_ref(), b"plain");
    }

    #[test]
    fn test_form_encoding() {
        let value = json!({
            "name": "a&b c",
            "n": 3,
            "ok": false,
            "tags": ["x", "y"],
            "none": null,
            "nested": { "k": "v" }
        });
        assert_eq!(
            encode_form(&value),
            "n=3&name=a%26b+c&nested=&none=&ok=false&tags=x&tags=y"
        );
    }

    #[test]
    fn test_form_top_level_shapes() {
        assert_eq!(encode_form(&json!(["a", "b"])), "0=a&1=b");
        assert_eq!(encode_form(&json!("scalar")), "");
    }

    #[test]
    fn test_form_hint_on_text_is_preencoded() {
        let body = encode_body(BodyData::Text("a=1&b=2".into()), Some(EncodeAs::Form));
        assert_eq!(body.encoding(), BodyEncoding::Form);
        assert_eq!(body.bytes().as_ref(), b"a=1&b=2");
    }
}
