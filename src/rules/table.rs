use crate::error::Error;
use crate::state::InsertionMode;
use crate::tags;
use crate::token::{EndTag, Token};
use crate::tree_builder::TreeBuilder;
use crate::utils::{trace_log, ControlToken};

use super::is_hidden_input;

impl TreeBuilder {
    pub(super) fn in_table(&mut self, token: &mut Token) -> ControlToken {
        match token {
            Token::String(_) if tags::is_table_context(self.stack.current_name()) => {
                self.pending_table_text.clear();
                self.original_mode = self.mode;
                return self.reprocess_in(InsertionMode::InTableText);
            }
            Token::String(_) => {}
            Token::StartTag(tag) => match &tag.name[..] {
                b"!doctype" => return self.ignore(Error::UnexpectedDoctype),
                b"caption" => {
                    self.clear_stack_back_to_table_context();
                    self.active_formatting.push_marker();
                    self.insert_element(tag);
                    self.switch_to(InsertionMode::InCaption);
                    return ControlToken::Continue;
                }
                b"colgroup" => {
                    self.clear_stack_back_to_table_context();
                    self.insert_element(tag);
                    self.switch_to(InsertionMode::InColumnGroup);
                    return ControlToken::Continue;
                }
                b"col" => {
                    self.clear_stack_back_to_table_context();
                    self.insert_synthesized(b"colgroup");
                    return self.reprocess_in(InsertionMode::InColumnGroup);
                }
                name if tags::is_table_section(name) => {
                    self.clear_stack_back_to_table_context();
                    self.insert_element(tag);
                    self.switch_to(InsertionMode::InTableBody);
                    return ControlToken::Continue;
                }
                b"td" | b"th" | b"tr" => {
                    self.clear_stack_back_to_table_context();
                    self.insert_synthesized(b"tbody");
                    return self.reprocess_in(InsertionMode::InTableBody);
                }
                b"table" => {
                    self.parse_error(Error::UnexpectedStartTag);
                    if !self.stack.has_in_table_scope(b"table") {
                        return ControlToken::Ignored;
                    }
                    self.pop_until_named(b"table", None);
                    self.reset_insertion_mode();
                    return ControlToken::Reprocess;
                }
                b"style" | b"script" | b"template" => return self.in_head(token),
                b"input" if is_hidden_input(tag) => {
                    self.parse_error(Error::UnexpectedStartTag);
                    self.insert_void(tag);
                    return ControlToken::Continue;
                }
                b"form" => {
                    self.parse_error(Error::UnexpectedStartTag);
                    if self.stack.contains_name(b"template") || self.form_element.is_some() {
                        return ControlToken::Ignored;
                    }
                    let id = self.insert_element(tag);
                    self.form_element = Some(id);
                    self.pop_element(None);
                    return ControlToken::Continue;
                }
                _ => {}
            },
            Token::EndTag(tag) => match &tag.name[..] {
                b"table" => {
                    if !self.stack.has_in_table_scope(b"table") {
                        return self.ignore(Error::EndTagWithoutMatchingOpenElement);
                    }
                    self.pop_until_named(b"table", Some(&*tag));
                    self.reset_insertion_mode();
                    return ControlToken::Continue;
                }
                b"body" | b"caption" | b"col" | b"colgroup" | b"html" | b"tbody" | b"td"
                | b"tfoot" | b"th" | b"thead" | b"tr" => {
                    return self.ignore(Error::UnexpectedEndTag)
                }
                b"template" => return self.in_head(token),
                _ => {}
            },
            Token::Eof => return self.in_body(token),
        }

        self.foster(token)
    }

    /// Process the token using the rules for "in body", with foster parenting enabled.
    fn foster(&mut self, token: &mut Token) -> ControlToken {
        self.parse_error(match token {
            Token::String(_) => Error::NonSpaceCharactersInTable,
            Token::EndTag(_) => Error::UnexpectedEndTag,
            Token::StartTag(_) | Token::Eof => Error::UnexpectedStartTag,
        });
        trace_log!("fostering {:?}", token);
        self.foster_parenting = true;
        let rv = self.in_body(token);
        self.foster_parenting = false;
        rv
    }

    pub(super) fn in_table_text(&mut self, token: &mut Token) -> ControlToken {
        if let Token::String(text) = token {
            self.pending_table_text.push(std::mem::take(text));
            return ControlToken::Continue;
        }

        let pending = std::mem::take(&mut self.pending_table_text);
        if pending.iter().any(|text| !text.is_whitespace()) {
            self.parse_error(Error::NonSpaceCharactersInTable);
            for text in pending {
                let mut text = Token::String(text);
                self.foster_parenting = true;
                self.in_body(&mut text);
                self.foster_parenting = false;
            }
        } else {
            for text in pending {
                self.insert_text(text);
            }
        }

        self.reprocess_in(self.original_mode)
    }

    pub(super) fn in_caption(&mut self, token: &mut Token) -> ControlToken {
        match token {
            Token::EndTag(tag) if *tag.name == b"caption" => {
                if self.close_caption(Some(&*tag)) {
                    ControlToken::Continue
                } else {
                    ControlToken::Ignored
                }
            }
            Token::StartTag(tag) if tags::is_table_structure(&tag.name) => {
                if self.close_caption(None) {
                    ControlToken::Reprocess
                } else {
                    ControlToken::Ignored
                }
            }
            Token::EndTag(tag) if *tag.name == b"table" => {
                if self.close_caption(None) {
                    ControlToken::Reprocess
                } else {
                    ControlToken::Ignored
                }
            }
            Token::EndTag(tag)
                if matches!(
                    &tag.name[..],
                    b"body"
                        | b"col"
                        | b"colgroup"
                        | b"html"
                        | b"tbody"
                        | b"td"
                        | b"tfoot"
                        | b"th"
                        | b"thead"
                        | b"tr"
                ) =>
            {
                self.ignore(Error::UnexpectedEndTag)
            }
            _ => self.in_body(token),
        }
    }

    /// Returns whether a caption was open.
    fn close_caption(&mut self, end_tag: Option<&EndTag>) -> bool {
        if !self.stack.has_in_table_scope(b"caption") {
            self.parse_error(Error::EndTagWithoutMatchingOpenElement);
            return false;
        }

        self.generate_implied_end_tags(None);
        if !self.stack.current_is(b"caption") {
            self.parse_error(Error::MisnestedEndTag);
        }
        self.pop_until_named(b"caption", end_tag);
        self.active_formatting.clear_to_last_marker();
        self.switch_to(InsertionMode::InTable);
        true
    }

    pub(super) fn in_column_group(&mut self, token: &mut Token) -> ControlToken {
        match token {
            Token::String(_) => {
                if self.insert_leading_whitespace(token) {
                    return ControlToken::Continue;
                }
            }
            Token::StartTag(tag) => match &tag.name[..] {
                b"!doctype" => return self.ignore(Error::UnexpectedDoctype),
                b"html" => return self.in_body(token),
                b"col" => {
                    self.insert_void(tag);
                    return ControlToken::Continue;
                }
                b"template" => return self.in_head(token),
                _ => {}
            },
            Token::EndTag(tag) => match &tag.name[..] {
                b"colgroup" => {
                    if !self.stack.current_is(b"colgroup") {
                        return self.ignore(Error::EndTagWithoutMatchingOpenElement);
                    }
                    self.pop_element(Some(&*tag));
                    self.switch_to(InsertionMode::InTable);
                    return ControlToken::Continue;
                }
                b"col" => return self.ignore(Error::UnexpectedEndTag),
                b"template" => return self.in_head(token),
                _ => {}
            },
            Token::Eof => return self.in_body(token),
        }

        if !self.stack.current_is(b"colgroup") {
            return self.ignore(Error::UnexpectedStartTag);
        }
        self.pop_element(None);
        self.reprocess_in(InsertionMode::InTable)
    }

    pub(super) fn in_table_body(&mut self, token: &mut Token) -> ControlToken {
        match token {
            Token::StartTag(tag) => match &tag.name[..] {
                b"tr" => {
                    self.clear_stack_back_to_table_body_context();
                    self.insert_element(tag);
                    self.switch_to(InsertionMode::InRow);
                    ControlToken::Continue
                }
                b"th" | b"td" => {
                    self.parse_error(Error::UnexpectedStartTag);
                    self.clear_stack_back_to_table_body_context();
                    self.insert_synthesized(b"tr");
                    self.reprocess_in(InsertionMode::InRow)
                }
                b"caption" | b"col" | b"colgroup" | b"tbody" | b"tfoot" | b"thead" => {
                    self.leave_table_body()
                }
                _ => self.in_table(token),
            },
            Token::EndTag(tag) => match &tag.name[..] {
                name if tags::is_table_section(name) => {
                    if !self.stack.has_in_table_scope(name) {
                        return self.ignore(Error::EndTagWithoutMatchingOpenElement);
                    }
                    self.clear_stack_back_to_table_body_context();
                    self.pop_element(Some(&*tag));
                    self.switch_to(InsertionMode::InTable);
                    ControlToken::Continue
                }
                b"table" => self.leave_table_body(),
                b"body" | b"caption" | b"col" | b"colgroup" | b"html" | b"td" | b"th"
                | b"tr" => self.ignore(Error::UnexpectedEndTag),
                _ => self.in_table(token),
            },
            _ => self.in_table(token),
        }
    }

    /// Close the open table section and reprocess in "in table".
    fn leave_table_body(&mut self) -> ControlToken {
        let in_scope = ["tbody", "thead", "tfoot"]
            .iter()
            .any(|name| self.stack.has_in_table_scope(name.as_bytes()));
        if !in_scope {
            return self.ignore(Error::UnexpectedStartTag);
        }

        self.clear_stack_back_to_table_body_context();
        self.pop_element(None);
        self.reprocess_in(InsertionMode::InTable)
    }

    pub(super) fn in_row(&mut self, token: &mut Token) -> ControlToken {
        match token {
            Token::StartTag(tag) => match &tag.name[..] {
                b"th" | b"td" => {
                    self.clear_stack_back_to_table_row_context();
                    self.insert_element(tag);
                    self.switch_to(InsertionMode::InCell);
                    self.active_formatting.push_marker();
                    ControlToken::Continue
                }
                b"caption" | b"col" | b"colgroup" | b"tbody" | b"tfoot" | b"thead" | b"tr" => {
                    self.leave_row(None)
                }
                _ => self.in_table(token),
            },
            Token::EndTag(tag) => match &tag.name[..] {
                b"tr" => match self.leave_row(Some(&*tag)) {
                    ControlToken::Reprocess => ControlToken::Continue,
                    rv => rv,
                },
                b"table" => self.leave_row(None),
                name if tags::is_table_section(name) => {
                    if !self.stack.has_in_table_scope(name) {
                        return self.ignore(Error::EndTagWithoutMatchingOpenElement);
                    }
                    self.leave_row(None)
                }
                b"body" | b"caption" | b"col" | b"colgroup" | b"html" | b"td" | b"th" => {
                    self.ignore(Error::UnexpectedEndTag)
                }
                _ => self.in_table(token),
            },
            _ => self.in_table(token),
        }
    }

    /// Close the open row and switch to "in table body". The token is to be reprocessed unless it
    /// was the row's own end tag.
    fn leave_row(&mut self, end_tag: Option<&EndTag>) -> ControlToken {
        if !self.stack.has_in_table_scope(b"tr") {
            return self.ignore(Error::EndTagWithoutMatchingOpenElement);
        }

        self.clear_stack_back_to_table_row_context();
        self.pop_element(end_tag);
        self.reprocess_in(InsertionMode::InTableBody)
    }

    pub(super) fn in_cell(&mut self, token: &mut Token) -> ControlToken {
        match token {
            Token::EndTag(tag) if tags::is_cell(&tag.name) => {
                if !self.stack.has_in_table_scope(&tag.name) {
                    return self.ignore(Error::EndTagWithoutMatchingOpenElement);
                }
                self.generate_implied_end_tags(None);
                if !self.stack.current_is(&tag.name) {
                    self.parse_error(Error::MisnestedEndTag);
                }
                self.pop_until_named(&tag.name, Some(&*tag));
                self.active_formatting.clear_to_last_marker();
                self.switch_to(InsertionMode::InRow);
                ControlToken::Continue
            }
            Token::StartTag(tag) if tags::is_table_structure(&tag.name) => {
                if !self.stack.has_in_table_scope(b"td") && !self.stack.has_in_table_scope(b"th")
                {
                    return self.ignore(Error::UnexpectedStartTag);
                }
                self.close_cell();
                ControlToken::Reprocess
            }
            Token::EndTag(tag)
                if matches!(&tag.name[..], b"body" | b"caption" | b"col" | b"colgroup" | b"html") =>
            {
                self.ignore(Error::UnexpectedEndTag)
            }
            Token::EndTag(tag)
                if matches!(
                    &tag.name[..],
                    b"table" | b"tbody" | b"tfoot" | b"thead" | b"tr"
                ) =>
            {
                if !self.stack.has_in_table_scope(&tag.name) {
                    return self.ignore(Error::EndTagWithoutMatchingOpenElement);
                }
                self.close_cell();
                ControlToken::Reprocess
            }
            _ => self.in_body(token),
        }
    }

    fn close_cell(&mut self) {
        self.generate_implied_end_tags(None);
        if !tags::is_cell(self.stack.current_name()) {
            self.parse_error(Error::MisnestedEndTag);
        }
        self.pop_until(None, |element| tags::is_cell(&element.name));
        self.active_formatting.clear_to_last_marker();
        self.switch_to(InsertionMode::InRow);
    }
}
