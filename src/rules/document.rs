use crate::error::Error;
use crate::sequencer::Location;
use crate::state::{InsertionMode, TextState};
use crate::tags;
use crate::token::{EndTag, StartTag, Token};
use crate::tree_builder::TreeBuilder;
use crate::utils::{trace_log, ControlToken};

impl TreeBuilder {
    pub(super) fn initial(&mut self, token: &mut Token) -> ControlToken {
        match token {
            Token::String(text) => {
                text.split_leading_whitespace();
                if text.is_empty() {
                    return ControlToken::Ignored;
                }
            }
            Token::StartTag(tag) if tags::is_doctype(&tag.name) => {
                self.insert_passthrough(token.clone());
                self.switch_to(InsertionMode::BeforeHtml);
                return ControlToken::Continue;
            }
            _ => {}
        }

        self.reprocess_in(InsertionMode::BeforeHtml)
    }

    pub(super) fn before_html(&mut self, token: &mut Token) -> ControlToken {
        match token {
            Token::StartTag(tag) if tags::is_doctype(&tag.name) => {
                return self.ignore(Error::UnexpectedDoctype)
            }
            Token::String(text) => {
                text.split_leading_whitespace();
                if text.is_empty() {
                    return ControlToken::Ignored;
                }
            }
            Token::StartTag(tag) if *tag.name == b"html" => {
                self.insert_element(tag);
                self.switch_to(InsertionMode::BeforeHead);
                return ControlToken::Continue;
            }
            Token::EndTag(tag) if !matches!(&tag.name[..], b"head" | b"body" | b"html" | b"br") => {
                return self.ignore(Error::UnexpectedEndTag);
            }
            _ => {}
        }

        self.insert_synthesized(b"html");
        self.reprocess_in(InsertionMode::BeforeHead)
    }

    pub(super) fn before_head(&mut self, token: &mut Token) -> ControlToken {
        match token {
            Token::String(text) => {
                text.split_leading_whitespace();
                if text.is_empty() {
                    return ControlToken::Ignored;
                }
            }
            Token::StartTag(tag) if tags::is_doctype(&tag.name) => {
                return self.ignore(Error::UnexpectedDoctype)
            }
            Token::StartTag(tag) if *tag.name == b"html" => return self.in_body(token),
            Token::StartTag(tag) if *tag.name == b"head" => {
                self.insert_element(tag);
                self.head_element = self.stack.current().cloned();
                self.switch_to(InsertionMode::InHead);
                return ControlToken::Continue;
            }
            Token::EndTag(tag) if !matches!(&tag.name[..], b"head" | b"body" | b"html" | b"br") => {
                return self.ignore(Error::UnexpectedEndTag);
            }
            _ => {}
        }

        self.insert_synthesized(b"head");
        self.head_element = self.stack.current().cloned();
        self.reprocess_in(InsertionMode::InHead)
    }

    pub(super) fn in_head(&mut self, token: &mut Token) -> ControlToken {
        match token {
            Token::String(_) => {
                if self.insert_leading_whitespace(token) {
                    return ControlToken::Continue;
                }
            }
            Token::StartTag(tag) => match &tag.name[..] {
                b"!doctype" => return self.ignore(Error::UnexpectedDoctype),
                b"html" => return self.in_body(token),
                name if tags::is_metadata_void(name) => {
                    self.insert_void(tag);
                    return ControlToken::Continue;
                }
                b"title" => {
                    self.insert_text_element(tag, TextState::RcData);
                    return ControlToken::Continue;
                }
                b"noscript" | b"noframes" | b"style" => {
                    self.insert_text_element(tag, TextState::RawText);
                    return ControlToken::Continue;
                }
                b"script" => {
                    self.insert_text_element(tag, TextState::ScriptData);
                    return ControlToken::Continue;
                }
                b"template" => {
                    self.insert_template(tag);
                    return ControlToken::Continue;
                }
                b"head" => return self.ignore(Error::UnexpectedStartTag),
                _ => {}
            },
            Token::EndTag(tag) => match &tag.name[..] {
                b"head" => {
                    self.pop_head(Some(&*tag));
                    self.switch_to(InsertionMode::AfterHead);
                    return ControlToken::Continue;
                }
                b"template" => return self.close_template(tag),
                b"body" | b"html" | b"br" => {}
                _ => return self.ignore(Error::UnexpectedEndTag),
            },
            Token::Eof => {}
        }

        self.pop_head(None);
        self.reprocess_in(InsertionMode::AfterHead)
    }

    pub(super) fn after_head(&mut self, token: &mut Token) -> ControlToken {
        match token {
            Token::String(_) => {
                if self.insert_leading_whitespace(token) {
                    return ControlToken::Continue;
                }
            }
            Token::StartTag(tag) => match &tag.name[..] {
                b"!doctype" => return self.ignore(Error::UnexpectedDoctype),
                b"html" => return self.in_body(token),
                b"body" => {
                    self.insert_element(tag);
                    self.head_anchor = None;
                    self.frameset_ok = false;
                    self.switch_to(InsertionMode::InBody);
                    return ControlToken::Continue;
                }
                b"frameset" => {
                    self.insert_element(tag);
                    self.head_anchor = None;
                    self.switch_to(InsertionMode::InFrameset);
                    return ControlToken::Continue;
                }
                name if tags::is_head_content(name) => {
                    self.parse_error(Error::UnexpectedStartTag);
                    return self.in_head_after_head(token);
                }
                b"head" => return self.ignore(Error::UnexpectedStartTag),
                _ => {}
            },
            Token::EndTag(tag) => match &tag.name[..] {
                b"template" => return self.in_head(token),
                b"body" | b"html" | b"br" => {}
                _ => return self.ignore(Error::UnexpectedEndTag),
            },
            Token::Eof => {}
        }

        self.insert_synthesized(b"body");
        self.head_anchor = None;
        self.reprocess_in(InsertionMode::InBody)
    }

    /// Metadata after `</head>`: push the head element back, process the token as in head and
    /// take head off the stack again. Its content lands in front of the emitted `</head>`.
    fn in_head_after_head(&mut self, token: &mut Token) -> ControlToken {
        let mut head = match self.head_element.clone() {
            Some(head) => head,
            None => return self.in_head(token),
        };

        head.content = self
            .head_anchor
            .map_or(Location::Append, Location::Before);
        let id = head.id;
        trace_log!("after head: re-opening head for {:?}", token);
        self.stack.push(head);

        let rv = self.in_head(token);

        if let Some(index) = self.stack.position(id) {
            self.stack.remove(index);
        }
        rv
    }

    /// `<template>` is passed through with a marker; its content follows the body rules.
    pub(super) fn insert_template(&mut self, tag: &StartTag) {
        self.insert_element(tag);
        self.active_formatting.push_marker();
        self.frameset_ok = false;
        self.switch_to(InsertionMode::InBody);
    }

    pub(super) fn close_template(&mut self, tag: &EndTag) -> ControlToken {
        if !self.stack.contains_name(b"template") {
            return self.ignore(Error::EndTagWithoutMatchingOpenElement);
        }

        self.generate_all_implied_end_tags_thoroughly();
        if !self.stack.current_is(b"template") {
            self.parse_error(Error::MisnestedEndTag);
        }
        self.pop_until_named(b"template", Some(tag));
        self.active_formatting.clear_to_last_marker();
        self.reset_insertion_mode();
        ControlToken::Continue
    }
}
