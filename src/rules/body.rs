use crate::adoption::AdoptionOutcome;
use crate::attributes::replace_tag_name;
use crate::error::Error;
use crate::state::{InsertionMode, TextState};
use crate::tags;
use crate::token::{EndTag, StartTag, Token};
use crate::tree_builder::TreeBuilder;
use crate::utils::{trace_log, ControlToken};

use super::is_hidden_input;

impl TreeBuilder {
    pub(super) fn in_body(&mut self, token: &mut Token) -> ControlToken {
        match token {
            Token::String(text) => {
                let text = std::mem::take(text);
                self.reconstruct_active_formatting();
                if !text.is_whitespace() {
                    self.frameset_ok = false;
                }
                self.insert_text(text);
                ControlToken::Continue
            }
            Token::Eof => ControlToken::Continue,
            Token::StartTag(_) => self.in_body_start_tag(token),
            Token::EndTag(_) => self.in_body_end_tag(token),
        }
    }

    fn in_body_start_tag(&mut self, token: &mut Token) -> ControlToken {
        let tag = match token {
            Token::StartTag(tag) => tag,
            _ => return ControlToken::Ignored,
        };

        match &tag.name[..] {
            b"!doctype" => self.ignore(Error::UnexpectedDoctype),
            b"html" => self.ignore(Error::UnexpectedStartTag),
            name if tags::is_head_content(name) => self.in_head(token),
            b"body" => {
                self.frameset_ok = false;
                self.ignore(Error::UnexpectedStartTag)
            }
            // frameset documents are only recognized right after head
            b"frameset" => self.ignore(Error::UnexpectedStartTag),
            name if tags::is_block_start_tag(name) => {
                self.close_p_in_button_scope();
                self.insert_element(tag);
                ControlToken::Continue
            }
            name if tags::is_heading(name) => {
                self.close_p_in_button_scope();
                if tags::is_heading(self.stack.current_name()) {
                    self.parse_error(Error::UnexpectedStartTag);
                    self.pop_element(None);
                }
                self.insert_element(tag);
                ControlToken::Continue
            }
            b"pre" | b"listing" => {
                self.close_p_in_button_scope();
                self.insert_element(tag);
                self.skip_next_newline = true;
                self.frameset_ok = false;
                ControlToken::Continue
            }
            b"form" => {
                let in_template = self.stack.contains_name(b"template");
                if self.form_element.is_some() && !in_template {
                    return self.ignore(Error::NestedForm);
                }
                self.close_p_in_button_scope();
                let id = self.insert_element(tag);
                if !in_template {
                    self.form_element = Some(id);
                }
                ControlToken::Continue
            }
            b"li" => {
                self.close_list_item(|name| name == b"li");
                self.insert_element(tag);
                ControlToken::Continue
            }
            b"dd" | b"dt" => {
                self.close_list_item(|name| matches!(name, b"dd" | b"dt"));
                self.insert_element(tag);
                ControlToken::Continue
            }
            b"plaintext" => {
                self.close_p_in_button_scope();
                self.insert_text_element(tag, TextState::PlainText);
                ControlToken::Continue
            }
            b"button" => {
                if self.stack.has_in_scope(b"button") {
                    self.parse_error(Error::UnexpectedStartTag);
                    self.generate_implied_end_tags(None);
                    self.pop_until_named(b"button", None);
                }
                self.reconstruct_active_formatting();
                self.insert_element(tag);
                self.frameset_ok = false;
                ControlToken::Continue
            }
            b"a" => {
                if let Some(existing) = self.active_formatting.last_before_marker(b"a") {
                    let existing = existing.id;
                    self.parse_error(Error::UnexpectedStartTag);
                    self.adoption_agency(&EndTag::synthesize(b"a"));
                    self.active_formatting.remove(existing);
                    self.orphan_element(existing);
                }
                self.reconstruct_active_formatting();
                self.insert_formatting_element(tag);
                ControlToken::Continue
            }
            b"nobr" => {
                self.reconstruct_active_formatting();
                if self.stack.has_in_scope(b"nobr") {
                    self.parse_error(Error::UnexpectedStartTag);
                    self.adoption_agency(&EndTag::synthesize(b"nobr"));
                    self.reconstruct_active_formatting();
                }
                self.insert_formatting_element(tag);
                ControlToken::Continue
            }
            name if tags::is_formatting(name) => {
                self.reconstruct_active_formatting();
                self.insert_formatting_element(tag);
                ControlToken::Continue
            }
            b"applet" | b"marquee" | b"object" => {
                self.reconstruct_active_formatting();
                self.insert_element(tag);
                self.active_formatting.push_marker();
                self.frameset_ok = false;
                ControlToken::Continue
            }
            b"table" => {
                self.close_p_in_button_scope();
                self.insert_element(tag);
                self.frameset_ok = false;
                self.switch_to(InsertionMode::InTable);
                ControlToken::Continue
            }
            b"area" | b"br" | b"embed" | b"img" | b"keygen" | b"wbr" => {
                self.reconstruct_active_formatting();
                self.insert_void(tag);
                self.frameset_ok = false;
                ControlToken::Continue
            }
            b"input" => {
                self.reconstruct_active_formatting();
                self.insert_void(tag);
                if !is_hidden_input(tag) {
                    self.frameset_ok = false;
                }
                ControlToken::Continue
            }
            b"param" | b"source" | b"track" => {
                self.insert_void(tag);
                ControlToken::Continue
            }
            b"hr" => {
                self.close_p_in_button_scope();
                self.insert_void(tag);
                self.frameset_ok = false;
                ControlToken::Continue
            }
            b"image" => {
                self.parse_error(Error::UnexpectedStartTag);
                let raw = replace_tag_name(&tag.raw, b"img");
                *token = Token::StartTag(StartTag::from_raw(raw));
                ControlToken::Reprocess
            }
            b"textarea" => {
                self.insert_text_element(tag, TextState::RcData);
                self.skip_next_newline = true;
                self.frameset_ok = false;
                ControlToken::Continue
            }
            b"xmp" => {
                self.close_p_in_button_scope();
                self.reconstruct_active_formatting();
                self.frameset_ok = false;
                self.insert_text_element(tag, TextState::RawText);
                ControlToken::Continue
            }
            b"iframe" => {
                self.frameset_ok = false;
                self.insert_text_element(tag, TextState::RawText);
                ControlToken::Continue
            }
            b"noembed" | b"noscript" => {
                self.insert_text_element(tag, TextState::RawText);
                ControlToken::Continue
            }
            b"select" => {
                self.reconstruct_active_formatting();
                self.insert_element(tag);
                self.frameset_ok = false;
                let mode = match self.mode {
                    InsertionMode::InTable
                    | InsertionMode::InCaption
                    | InsertionMode::InTableBody
                    | InsertionMode::InRow
                    | InsertionMode::InCell => InsertionMode::InSelectInTable,
                    _ => InsertionMode::InSelect,
                };
                self.switch_to(mode);
                ControlToken::Continue
            }
            b"optgroup" | b"option" => {
                if self.stack.current_is(b"option") {
                    self.pop_element(None);
                }
                self.reconstruct_active_formatting();
                self.insert_element(tag);
                ControlToken::Continue
            }
            b"rb" | b"rtc" => {
                if self.stack.has_in_scope(b"ruby") {
                    self.generate_implied_end_tags(None);
                    if !self.stack.current_is(b"ruby") {
                        self.parse_error(Error::UnexpectedStartTag);
                    }
                }
                self.insert_element(tag);
                ControlToken::Continue
            }
            b"rp" | b"rt" => {
                if self.stack.has_in_scope(b"ruby") {
                    self.generate_implied_end_tags(Some(&b"rtc"[..]));
                    if !matches!(self.stack.current_name(), b"ruby" | b"rtc") {
                        self.parse_error(Error::UnexpectedStartTag);
                    }
                }
                self.insert_element(tag);
                ControlToken::Continue
            }
            b"math" | b"svg" => {
                self.reconstruct_active_formatting();
                self.insert_element(tag);
                if tag.self_closing() {
                    self.pop_element(None);
                }
                ControlToken::Continue
            }
            b"caption" | b"col" | b"colgroup" | b"frame" | b"head" | b"tbody" | b"td"
            | b"tfoot" | b"th" | b"thead" | b"tr" => self.ignore(Error::UnexpectedStartTag),
            name if tags::is_void(name) => {
                self.reconstruct_active_formatting();
                self.insert_void(tag);
                ControlToken::Continue
            }
            _ => {
                self.reconstruct_active_formatting();
                self.insert_element(tag);
                ControlToken::Continue
            }
        }
    }

    fn in_body_end_tag(&mut self, token: &mut Token) -> ControlToken {
        let tag = match token {
            Token::EndTag(tag) => &*tag,
            _ => return ControlToken::Ignored,
        };

        match &tag.name[..] {
            b"template" => self.in_head(token),
            b"body" => {
                if !self.stack.has_in_scope(b"body") {
                    return self.ignore(Error::EndTagWithoutMatchingOpenElement);
                }
                self.switch_to(InsertionMode::AfterBody);
                ControlToken::Continue
            }
            b"html" => {
                if !self.stack.has_in_scope(b"body") {
                    return self.ignore(Error::EndTagWithoutMatchingOpenElement);
                }
                self.reprocess_in(InsertionMode::AfterBody)
            }
            name if tags::is_block_end_tag(name) => {
                if !self.stack.has_in_scope(name) {
                    return self.ignore(Error::EndTagWithoutMatchingOpenElement);
                }
                self.generate_implied_end_tags(None);
                if !self.stack.current_is(&tag.name) {
                    self.parse_error(Error::MisnestedEndTag);
                }
                self.pop_until_named(&tag.name, Some(tag));
                ControlToken::Continue
            }
            b"form" => self.close_form(tag),
            b"p" => {
                if !self.stack.has_in_button_scope(b"p") {
                    self.parse_error(Error::EndTagWithoutMatchingOpenElement);
                    self.insert_synthesized(b"p");
                }
                self.close_p(Some(tag));
                ControlToken::Continue
            }
            b"li" => {
                if !self.stack.has_in_list_item_scope(b"li") {
                    return self.ignore(Error::EndTagWithoutMatchingOpenElement);
                }
                self.close_implied(tag);
                ControlToken::Continue
            }
            b"dd" | b"dt" => {
                if !self.stack.has_in_scope(&tag.name) {
                    return self.ignore(Error::EndTagWithoutMatchingOpenElement);
                }
                self.close_implied(tag);
                ControlToken::Continue
            }
            name if tags::is_heading(name) => {
                let in_scope = self
                    .stack
                    .has_in_specific_scope(|e| tags::is_heading(&e.name), crate::stack::default_scope);
                if !in_scope {
                    return self.ignore(Error::EndTagWithoutMatchingOpenElement);
                }
                self.generate_implied_end_tags(None);
                if !self.stack.current_is(&tag.name) {
                    self.parse_error(Error::MisnestedEndTag);
                }
                self.pop_until(Some(tag), |element| tags::is_heading(&element.name));
                ControlToken::Continue
            }
            name if tags::is_formatting(name) => match self.adoption_agency(tag) {
                AdoptionOutcome::Done => ControlToken::Continue,
                AdoptionOutcome::AnyOtherEndTag => self.any_other_end_tag(tag),
            },
            b"applet" | b"marquee" | b"object" => {
                if !self.stack.has_in_scope(&tag.name) {
                    return self.ignore(Error::EndTagWithoutMatchingOpenElement);
                }
                self.generate_implied_end_tags(None);
                if !self.stack.current_is(&tag.name) {
                    self.parse_error(Error::MisnestedEndTag);
                }
                self.pop_until_named(&tag.name, Some(tag));
                self.active_formatting.clear_to_last_marker();
                ControlToken::Continue
            }
            b"br" => {
                self.parse_error(Error::UnexpectedEndTag);
                *token = Token::StartTag(StartTag::synthesize(b"br"));
                ControlToken::Reprocess
            }
            _ => self.any_other_end_tag(tag),
        }
    }

    /// Pop an `li`, `dd` or `dt` ancestor before opening a new one.
    fn close_list_item(&mut self, is_same_kind: impl Fn(&[u8]) -> bool) {
        self.frameset_ok = false;

        let mut target = None;
        for element in self.stack.iter().skip(self.root_floor).rev() {
            if element.orphaned {
                continue;
            }
            if is_same_kind(element.name.as_slice()) {
                target = Some(element.name.clone());
                break;
            }
            if tags::is_special(&element.name)
                && !matches!(&element.name[..], b"address" | b"div" | b"p")
            {
                break;
            }
        }

        if let Some(name) = target {
            self.generate_implied_end_tags(Some(name.as_slice()));
            if !self.stack.current_is(&name) {
                self.parse_error(Error::UnexpectedStartTag);
            }
            self.pop_until_named(&name, None);
        }

        self.close_p_in_button_scope();
    }

    /// Generate implied end tags except for the tag's own name and pop until it is closed.
    fn close_implied(&mut self, tag: &EndTag) {
        self.generate_implied_end_tags(Some(tag.name.as_slice()));
        if !self.stack.current_is(&tag.name) {
            self.parse_error(Error::MisnestedEndTag);
        }
        self.pop_until_named(&tag.name, Some(tag));
    }

    fn close_form(&mut self, tag: &EndTag) -> ControlToken {
        if self.stack.contains_name(b"template") {
            if !self.stack.has_in_scope(b"form") {
                return self.ignore(Error::EndTagWithoutMatchingOpenElement);
            }
            self.generate_implied_end_tags(None);
            if !self.stack.current_is(b"form") {
                self.parse_error(Error::MisnestedEndTag);
            }
            self.pop_until_named(b"form", Some(tag));
            return ControlToken::Continue;
        }

        let form = match self.form_element.take() {
            Some(form) if self.stack.has_node_in_scope(form) => form,
            _ => return self.ignore(Error::EndTagWithoutMatchingOpenElement),
        };

        self.generate_implied_end_tags(None);
        if self.stack.current().map(|element| element.id) != Some(form) {
            self.parse_error(Error::MisnestedEndTag);
        }
        // the form cannot be taken out of the middle of a token stream, so whatever is still open
        // inside of it gets closed as well
        self.pop_until(Some(tag), |element| element.id == form);
        ControlToken::Continue
    }

    /// See <https://html.spec.whatwg.org/multipage/parsing.html#any-other-end-tag>
    pub(crate) fn any_other_end_tag(&mut self, tag: &EndTag) -> ControlToken {
        let mut target = None;
        for element in self.stack.iter_open().rev() {
            if element.name == tag.name {
                target = Some(element.id);
                break;
            }
            if tags::is_special(&element.name) {
                break;
            }
        }

        let target = match target {
            Some(target) => target,
            None => return self.ignore(Error::EndTagWithoutMatchingOpenElement),
        };

        self.generate_implied_end_tags(Some(tag.name.as_slice()));
        if self.stack.current().map(|element| element.id) != Some(target) {
            self.parse_error(Error::MisnestedEndTag);
        }
        trace_log!("any other end tag: closing {:?}", tag.name);
        self.pop_until(Some(tag), |element| element.id == target);
        ControlToken::Continue
    }
}
