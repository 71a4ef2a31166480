//! Tag-name and attribute extraction from raw tag markup.
//!
//! Tokens keep their raw bytes around; this is the small utility that turns `<A HREF=x>` into the
//! name `a` and the mapping `{href: x}` when somebody asks for it.
use std::collections::BTreeMap;

use crate::token::{is_html_whitespace, HtmlString};

/// Attribute name to value. Names are ASCII-lowercased; a repeated name keeps the last value.
pub type Attributes = BTreeMap<HtmlString, HtmlString>;

/// Extract the normalized tag name from raw tag markup.
///
/// The name starts after `<` or `</` and runs until whitespace, `/` or `>`. Markup without a
/// leading `<` (the tokenizer's `-->` comment closer) is scanned from its first byte.
pub(crate) fn tag_name(raw: &[u8]) -> HtmlString {
    let rest = raw
        .strip_prefix(b"</")
        .or_else(|| raw.strip_prefix(b"<"))
        .unwrap_or(raw);
    let end = find_name_end(rest).unwrap_or(rest.len());
    let mut name = HtmlString(rest[..end].to_vec());
    normalize_name(&mut name);
    name
}

/// ASCII-lowercase a tag name and strip an `html:` namespace prefix.
pub(crate) fn normalize_name(name: &mut HtmlString) {
    name.make_ascii_lowercase();
    if name.starts_with(b"html:") {
        name.drain(..5);
    }
}

/// Swap the tag name inside raw start tag markup, keeping the attributes. `<image src=x>`
/// becomes `<img src=x>`.
pub(crate) fn replace_tag_name(raw: &[u8], name: &[u8]) -> HtmlString {
    let rest = raw.strip_prefix(b"<").unwrap_or(raw);
    let end = find_name_end(rest).unwrap_or(rest.len());
    let mut rv = Vec::with_capacity(raw.len());
    rv.push(b'<');
    rv.extend_from_slice(name);
    rv.extend_from_slice(&rest[end..]);
    HtmlString(rv)
}

/// Parse the attributes of a raw start tag.
pub(crate) fn parse_attributes(raw: &[u8]) -> Attributes {
    let mut attributes = Attributes::new();
    let bytes = raw.strip_prefix(b"<").unwrap_or(raw);
    let len = bytes.len();
    let mut pos = find_name_end(bytes).unwrap_or(len);

    macro_rules! skip_whitespace {
        () => {
            while pos < len && is_html_whitespace(bytes[pos]) {
                pos += 1;
            }
        };
    }

    loop {
        while pos < len && (is_html_whitespace(bytes[pos]) || bytes[pos] == b'/') {
            pos += 1;
        }
        if pos >= len || bytes[pos] == b'>' {
            break;
        }

        // an `=` in first position belongs to the name
        let rest = &bytes[pos..];
        let name_len = find_attribute_name_end(&rest[1..]).map_or(rest.len(), |i| i + 1);
        let name = rest[..name_len].to_ascii_lowercase();
        pos += name_len;

        skip_whitespace!();
        let mut value = Vec::new();
        if pos < len && bytes[pos] == b'=' {
            pos += 1;
            skip_whitespace!();
            match bytes.get(pos) {
                Some(&quote @ (b'"' | b'\'')) => {
                    pos += 1;
                    let end = bytes[pos..]
                        .iter()
                        .position(|&b| b == quote)
                        .map_or(len, |i| pos + i);
                    value.extend_from_slice(&bytes[pos..end]);
                    pos = (end + 1).min(len);
                }
                Some(_) => {
                    let end = bytes[pos..]
                        .iter()
                        .position(|&b| is_html_whitespace(b) || b == b'>')
                        .map_or(len, |i| pos + i);
                    value.extend_from_slice(&bytes[pos..end]);
                    pos = end;
                }
                None => {}
            }
        }

        attributes.insert(HtmlString(name), HtmlString(value));
    }

    attributes
}

#[inline]
fn find_name_end(haystack: &[u8]) -> Option<usize> {
    #[cfg(feature = "jetscii")]
    {
        jetscii::bytes!(b'\t', b'\n', b'\x0C', b'\r', b' ', b'/', b'>').find(haystack)
    }

    #[cfg(not(feature = "jetscii"))]
    {
        haystack
            .iter()
            .position(|&b| is_html_whitespace(b) || b == b'/' || b == b'>')
    }
}

#[inline]
fn find_attribute_name_end(haystack: &[u8]) -> Option<usize> {
    #[cfg(feature = "jetscii")]
    {
        jetscii::bytes!(b'\t', b'\n', b'\x0C', b'\r', b' ', b'/', b'>', b'=').find(haystack)
    }

    #[cfg(not(feature = "jetscii"))]
    {
        haystack
            .iter()
            .position(|&b| is_html_whitespace(b) || matches!(b, b'/' | b'>' | b'='))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(raw: &str) -> Vec<(String, String)> {
        parse_attributes(raw.as_bytes())
            .into_iter()
            .map(|(k, v)| {
                (
                    String::from_utf8(k.0).unwrap(),
                    String::from_utf8(v.0).unwrap(),
                )
            })
            .collect()
    }

    #[test]
    fn names() {
        assert_eq!(&*tag_name(b"<DIV class=x>"), b"div");
        assert_eq!(&*tag_name(b"</Table >"), b"table");
        assert_eq!(&*tag_name(b"<br/>"), b"br");
        assert_eq!(&*tag_name(b"<!DOCTYPE html>"), b"!doctype");
        assert_eq!(&*tag_name(b"<!--"), b"!--");
        assert_eq!(&*tag_name(b"-->"), b"--");
        assert_eq!(&*tag_name(b"<html:div>"), b"div");
        assert_eq!(&*tag_name(b"<?xml:namespace prefix=o>"), b"?xml:namespace");
    }

    #[test]
    fn rename_keeps_attributes() {
        assert_eq!(&*replace_tag_name(b"<IMAGE src=x>", b"img"), b"<img src=x>");
        assert_eq!(&*replace_tag_name(b"<image/>", b"img"), b"<img/>");
    }

    #[test]
    fn quoting_styles() {
        assert_eq!(
            attrs(r#"<input TYPE=hidden name='a b' value="c d" checked>"#),
            vec![
                ("checked".to_owned(), "".to_owned()),
                ("name".to_owned(), "a b".to_owned()),
                ("type".to_owned(), "hidden".to_owned()),
                ("value".to_owned(), "c d".to_owned()),
            ]
        );
    }

    #[test]
    fn last_duplicate_wins() {
        assert_eq!(
            attrs(r#"<a href=1 HREF="2">"#),
            vec![("href".to_owned(), "2".to_owned())]
        );
    }

    #[test]
    fn self_closing_and_spacing() {
        assert_eq!(
            attrs("<img src = x.png />"),
            vec![("src".to_owned(), "x.png".to_owned())]
        );
        assert_eq!(attrs("<br/>"), vec![]);
    }

    #[test]
    fn unterminated_quote() {
        assert_eq!(
            attrs(r#"<a title="oops>"#),
            vec![("title".to_owned(), "oops>".to_owned())]
        );
    }
}
