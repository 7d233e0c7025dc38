//! Marker comments
//!
//! Each decorator is carried through the host formatter as the block comment
//! `/*TAG@decorator(args)TAG*/`. The tag is derived from a digest of the
//! source and checked to be absent from it, so removing every `OPEN` and
//! `CLOSE` afterwards cannot touch text the user wrote.

use sha2::{Digest, Sha256};

use crate::error::{TransformError, TransformResult};
use crate::locator::DecoratorRange;
use asfmt_host::Span;

const TAG_PREFIX: &str = "__ASDECO_";
const TAG_SUFFIX: &str = "__";

/// Sentinel pair shared by the encoder, the comment printer and the decoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    tag: String,
    open: String,
    close: String,
}

impl Marker {
    /// Salts tried before giving up on finding an absent tag
    pub const MAX_ATTEMPTS: u32 = 16;

    /// Marker whose tag does not occur anywhere in `source`
    pub fn for_source(source: &str) -> TransformResult<Self> {
        let candidates = (0..Self::MAX_ATTEMPTS).map(|salt| derive_tag(source, salt));
        first_absent(source, candidates)
            .map(Self::from_tag)
            .ok_or(TransformError::SentinelCollision {
                attempts: Self::MAX_ATTEMPTS,
            })
    }

    fn from_tag(tag: String) -> Self {
        Self {
            open: format!("/*{tag}"),
            close: format!("{tag}*/"),
            tag,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn open(&self) -> &str {
        &self.open
    }

    pub fn close(&self) -> &str {
        &self.close
    }

    /// Wrap decorator text in a marker comment
    pub fn wrap(&self, decorator: &str) -> String {
        format!("{}{}{}", self.open, decorator, self.close)
    }

    /// Decorator text of a marker comment, given the comment without its
    /// `/*` `*/` delimiters
    pub fn unwrap_value<'a>(&self, value: &'a str) -> Option<&'a str> {
        value
            .strip_prefix(self.tag.as_str())?
            .strip_suffix(self.tag.as_str())
    }

    /// Offset of the first sentinel left in `text`
    pub fn find_in(&self, text: &str) -> Option<usize> {
        match (text.find(self.open.as_str()), text.find(self.close.as_str())) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

fn first_absent(source: &str, mut candidates: impl Iterator<Item = String>) -> Option<String> {
    candidates.find(|tag| !source.contains(tag.as_str()))
}

fn derive_tag(source: &str, salt: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.to_le_bytes());
    hasher.update(source.as_bytes());
    let digest = hasher.finalize();
    let hex: String = digest[..8].iter().map(|b| format!("{b:02x}")).collect();
    format!("{TAG_PREFIX}{hex}{TAG_SUFFIX}")
}

/// Text with decorators wrapped in marker comments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedSource {
    text: String,
    /// `(original offset, inserted length)` per sentinel, ascending
    insertions: Vec<(usize, usize)>,
}

impl EncodedSource {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    /// Map an offset in the encoded text back to the original text
    ///
    /// Offsets inside a sentinel map to the position it was inserted at.
    pub fn to_original(&self, offset: usize) -> usize {
        let mut shift = 0;
        for &(at, len) in &self.insertions {
            let encoded_at = at + shift;
            if offset < encoded_at {
                break;
            }
            if offset < encoded_at + len {
                return at;
            }
            shift += len;
        }
        offset - shift
    }

    pub fn span_to_original(&self, span: Span) -> Span {
        Span::new(self.to_original(span.start), self.to_original(span.end))
    }
}

/// Wrap every range of `source` in a marker comment
///
/// `ranges` must be ascending and non-overlapping, as `locate` returns them.
pub fn encode(
    source: &str,
    ranges: &[DecoratorRange],
    marker: &Marker,
) -> TransformResult<EncodedSource> {
    let mut text = String::with_capacity(
        source.len() + ranges.len() * (marker.open.len() + marker.close.len()),
    );
    let mut insertions = Vec::with_capacity(ranges.len() * 2);
    let mut copied = 0;

    for range in ranges {
        let decorator = range.slice(source);
        if decorator.contains("*/") {
            return Err(TransformError::UnencodableDecorator {
                span: Span::new(range.start, range.end),
                text: decorator.to_string(),
            });
        }
        text.push_str(&source[copied..range.start]);
        text.push_str(&marker.open);
        text.push_str(decorator);
        text.push_str(&marker.close);
        insertions.push((range.start, marker.open.len()));
        insertions.push((range.end, marker.close.len()));
        copied = range.end;
    }
    text.push_str(&source[copied..]);

    Ok(EncodedSource { text, insertions })
}

/// Remove every sentinel from `text`, nothing else
pub fn decode(text: &str, marker: &Marker) -> String {
    text.replace(marker.open.as_str(), "")
        .replace(marker.close.as_str(), "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn marker() -> Marker {
        Marker::from_tag("T".to_string())
    }

    #[test]
    fn test_tag_is_stable_and_absent() {
        let source = "@lazy let x = 1;";
        let a = Marker::for_source(source).expect("tag");
        let b = Marker::for_source(source).expect("tag");
        assert_eq!(a, b);
        assert!(a.tag().starts_with("__ASDECO_"));
        assert_eq!(a.tag().len(), "__ASDECO_".len() + 16 + 2);
        assert!(!source.contains(a.tag()));
        assert_eq!(a.open(), format!("/*{}", a.tag()));
        assert_eq!(a.close(), format!("{}*/", a.tag()));
    }

    #[test]
    fn test_tag_skips_candidates_present_in_source() {
        let candidates = || ["__A__", "__B__"].into_iter().map(String::from);
        assert_eq!(first_absent("x __A__ y", candidates()), Some("__B__".to_string()));
        assert_eq!(first_absent("__A__ __B__", candidates()), None);
    }

    #[test]
    fn test_encode_wraps_each_range() {
        let source = "@a @b(1) let x = 1;";
        let ranges = [DecoratorRange::new(0, 2), DecoratorRange::new(3, 8)];
        let encoded = encode(source, &ranges, &marker()).expect("encodes");
        assert_eq!(encoded.text(), "/*T@aT*/ /*T@b(1)T*/ let x = 1;");
    }

    #[test]
    fn test_encode_rejects_comment_terminator() {
        let source = "@a(\"*/\") let x = 1;";
        let err = encode(source, &[DecoratorRange::new(0, 8)], &marker()).unwrap_err();
        assert!(matches!(err, TransformError::UnencodableDecorator { .. }));
    }

    #[test]
    fn test_offsets_map_back() {
        let source = "@a let x;";
        let encoded = encode(source, &[DecoratorRange::new(0, 2)], &marker()).expect("encodes");
        // "/*T@aT*/ let x;"
        assert_eq!(encoded.to_original(0), 0);
        assert_eq!(encoded.to_original(3), 0);
        assert_eq!(encoded.to_original(5), 2);
        assert_eq!(encoded.to_original(9), 3);
        assert_eq!(encoded.to_original(encoded.text().len()), source.len());
        assert_eq!(
            encoded.span_to_original(Span::new(9, 12)),
            Span::new(3, 6)
        );
    }

    #[test]
    fn test_decode_strips_sentinels_only() {
        let m = marker();
        assert_eq!(decode("/*T@aT*/ let x; /* c */", &m), "@a let x; /* c */");
        assert_eq!(decode("no markers", &m), "no markers");
    }

    #[test]
    fn test_decode_inverts_encode() {
        let source = "@inline\nexport function f(): void {}";
        let m = Marker::for_source(source).expect("tag");
        let encoded = encode(source, &[DecoratorRange::new(0, 7)], &m).expect("encodes");
        assert_eq!(decode(encoded.text(), &m), source);
        assert_eq!(m.find_in(encoded.text()), Some(0));
        assert_eq!(m.find_in(source), None);
    }

    #[test]
    fn test_unwrap_value() {
        let m = marker();
        assert_eq!(m.unwrap_value("T@lazyT"), Some("@lazy"));
        assert_eq!(m.unwrap_value(" plain "), None);
        assert_eq!(m.unwrap_value("T@lazy"), None);
    }
}
