use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use engine_logging::{engine_debug, engine_warn};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedHtml {
    pub html: String,
    pub encoding_label: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("failed to decode bytes with {encoding}: {message}")]
    DecodeFailure { encoding: String, message: String },
}

/// Decode a fetched document to UTF-8.
///
/// Order: byte-order mark, then the `charset` parameter of the Content-Type
/// header, then `chardetng` detection hinted with the top-level domain of
/// `source` when one is known.
pub fn decode_html(
    bytes: &[u8],
    content_type: Option<&str>,
    source: Option<&Url>,
) -> Result<DecodedHtml, DecodeError> {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        engine_debug!("decoding by byte-order mark as {}", encoding.name());
        return decode_with(bytes, encoding);
    }

    if let Some(label) = content_type.and_then(extract_charset) {
        match Encoding::for_label(label.as_bytes()) {
            Some(encoding) => return decode_with(bytes, encoding),
            None => engine_warn!("ignoring unknown charset label {:?}", label),
        }
    }

    let tld = source
        .and_then(|url| url.host_str())
        .and_then(|host| host.rsplit('.').next())
        .filter(|tld| !tld.is_empty() && tld.bytes().all(|b| b.is_ascii_alphabetic()));
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(tld.map(str::as_bytes), true);
    engine_debug!("detected encoding {}", encoding.name());
    decode_with(bytes, encoding)
}

fn extract_charset(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|part| {
        let (key, value) = part.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(['"', '\'']).to_string())
    })
}

fn decode_with(bytes: &[u8], encoding: &'static Encoding) -> Result<DecodedHtml, DecodeError> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(DecodeError::DecodeFailure {
            encoding: encoding.name().to_string(),
            message: "malformed byte sequence".into(),
        });
    }
    Ok(DecodedHtml {
        html: text.into_owned(),
        encoding_label: encoding.name().to_string(),
    })
}
