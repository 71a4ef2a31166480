use std::borrow::Borrow;
use std::fmt::{Debug, Formatter};
use std::ops::{Deref, DerefMut};

use crate::attributes::{parse_attributes, tag_name, Attributes};

/// A wrapper around a bytestring.
///
/// Tag names, raw markup and text runs are all kept as bytes. This newtype exists to provide a
/// nicer `Debug` impl and cheap comparisons against byte literals.
#[derive(Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct HtmlString(pub Vec<u8>);

impl HtmlString {
    /// Whether every byte is HTML whitespace (tab, LF, FF, CR, space). Empty strings count.
    pub fn is_whitespace(&self) -> bool {
        self.0.iter().all(|&b| is_html_whitespace(b))
    }

    /// Split off and return the leading run of whitespace, leaving the rest in `self`.
    pub(crate) fn split_leading_whitespace(&mut self) -> HtmlString {
        let n = self
            .0
            .iter()
            .position(|&b| !is_html_whitespace(b))
            .unwrap_or(self.0.len());
        let rest = self.0.split_off(n);
        HtmlString(std::mem::replace(&mut self.0, rest))
    }
}

pub(crate) fn is_html_whitespace(b: u8) -> bool {
    matches!(b, b'\t' | b'\n' | b'\x0C' | b'\r' | b' ')
}

impl Deref for HtmlString {
    type Target = Vec<u8>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for HtmlString {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl Debug for HtmlString {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "b\"")?;
        for &byte in &self.0 {
            for ch in std::ascii::escape_default(byte) {
                write!(f, "{}", ch as char)?;
            }
        }

        write!(f, "\"")
    }
}

impl Borrow<[u8]> for HtmlString {
    fn borrow(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for HtmlString {
    fn from(vec: Vec<u8>) -> HtmlString {
        HtmlString(vec)
    }
}

impl From<&[u8]> for HtmlString {
    fn from(bytes: &[u8]) -> HtmlString {
        HtmlString(bytes.to_vec())
    }
}

impl From<&str> for HtmlString {
    fn from(s: &str) -> HtmlString {
        HtmlString(s.as_bytes().to_vec())
    }
}

impl From<HtmlString> for Vec<u8> {
    fn from(other: HtmlString) -> Vec<u8> {
        other.0
    }
}

/// A start tag, such as `<div class=foo>`.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct StartTag {
    /// The tag name, ASCII-lowercased, without namespace prefix.
    pub name: HtmlString,
    /// The tag exactly as the tokenizer produced it, brackets included. Attributes are parsed out
    /// of this on demand, see [`StartTag::attributes`].
    pub raw: HtmlString,
}

impl StartTag {
    /// Build a start tag from its raw markup, e.g. `<A href=x>`.
    pub fn from_raw(raw: impl Into<HtmlString>) -> StartTag {
        let raw = raw.into();
        StartTag {
            name: tag_name(&raw),
            raw,
        }
    }

    /// Make up a start tag that has no attributes, e.g. an implied `<body>`.
    pub fn synthesize(name: &[u8]) -> StartTag {
        let mut raw = Vec::with_capacity(name.len() + 2);
        raw.push(b'<');
        raw.extend_from_slice(name);
        raw.push(b'>');
        StartTag {
            name: HtmlString(name.to_vec()),
            raw: HtmlString(raw),
        }
    }

    /// Parse the attributes out of the raw markup.
    pub fn attributes(&self) -> Attributes {
        parse_attributes(&self.raw)
    }

    /// Whether the raw markup ends in `/>`.
    pub fn self_closing(&self) -> bool {
        self.raw.ends_with(b"/>")
    }
}

/// An end tag, such as `</div>`.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct EndTag {
    /// The tag name, ASCII-lowercased, without namespace prefix.
    pub name: HtmlString,
    /// The tag exactly as the tokenizer produced it.
    pub raw: HtmlString,
}

impl EndTag {
    /// Build an end tag from its raw markup, e.g. `</DIV>`.
    pub fn from_raw(raw: impl Into<HtmlString>) -> EndTag {
        let raw = raw.into();
        EndTag {
            name: tag_name(&raw),
            raw,
        }
    }

    /// Make up the end tag closing an element of the given name.
    pub fn synthesize(name: &[u8]) -> EndTag {
        let mut raw = Vec::with_capacity(name.len() + 3);
        raw.extend_from_slice(b"</");
        raw.extend_from_slice(name);
        raw.push(b'>');
        EndTag {
            name: HtmlString(name.to_vec()),
            raw: HtmlString(raw),
        }
    }
}

/// The unit exchanged at both ends of the [`crate::TreeBuilder`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Token {
    /// A start tag, including comment openers (`<!--`) and doctypes (`<!doctype html>`).
    StartTag(StartTag),
    /// An end tag, including comment closers (`-->`).
    EndTag(EndTag),
    /// A run of character data.
    String(HtmlString),
    /// End of input. Only ever created by the tree builder itself.
    Eof,
}

impl Token {
    /// Shorthand for `Token::StartTag(StartTag::from_raw(raw))`.
    pub fn start_tag(raw: impl Into<HtmlString>) -> Token {
        Token::StartTag(StartTag::from_raw(raw))
    }

    /// Shorthand for `Token::EndTag(EndTag::from_raw(raw))`.
    pub fn end_tag(raw: impl Into<HtmlString>) -> Token {
        Token::EndTag(EndTag::from_raw(raw))
    }

    /// Shorthand for `Token::String(text.into())`.
    pub fn string(text: impl Into<HtmlString>) -> Token {
        Token::String(text.into())
    }

    /// The normalized tag name, if this is a tag.
    pub fn name(&self) -> Option<&[u8]> {
        match self {
            Token::StartTag(tag) => Some(&tag.name),
            Token::EndTag(tag) => Some(&tag.name),
            Token::String(_) | Token::Eof => None,
        }
    }

    /// The bytes this token stands for in markup: raw tag text, or the text run itself.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Token::StartTag(tag) => &tag.raw,
            Token::EndTag(tag) => &tag.raw,
            Token::String(s) => s,
            Token::Eof => b"",
        }
    }
}

#[test]
fn test_borrowing() {
    // attribute lookup works with plain byte slices
    let tag = StartTag::from_raw("<a href=x>");
    assert!(tag.attributes().get(b"href".as_slice()).is_some());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesized_tags_are_bracketed() {
        assert_eq!(Token::StartTag(StartTag::synthesize(b"body")).as_bytes(), b"<body>");
        assert_eq!(Token::EndTag(EndTag::synthesize(b"body")).as_bytes(), b"</body>");
    }

    #[test]
    fn raw_is_kept_while_name_is_folded() {
        let token = Token::start_tag("<DIV Class=x>");
        assert_eq!(token.name(), Some(&b"div"[..]));
        assert_eq!(token.as_bytes(), b"<DIV Class=x>");
    }

    #[test]
    fn leading_whitespace_split() {
        let mut s = HtmlString::from(" \n x y");
        let ws = s.split_leading_whitespace();
        assert_eq!(&*ws, b" \n ");
        assert_eq!(&*s, b"x y");

        let mut all_ws = HtmlString::from("  ");
        assert_eq!(&*all_ws.split_leading_whitespace(), b"  ");
        assert!(all_ws.is_empty());
    }
}
