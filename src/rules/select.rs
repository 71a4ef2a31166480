use crate::error::Error;
use crate::token::{EndTag, Token};
use crate::tree_builder::TreeBuilder;
use crate::utils::ControlToken;

impl TreeBuilder {
    pub(super) fn in_select(&mut self, token: &mut Token) -> ControlToken {
        match token {
            Token::String(text) => {
                let text = std::mem::take(text);
                self.insert_text(text);
                ControlToken::Continue
            }
            Token::StartTag(tag) => match &tag.name[..] {
                b"!doctype" => self.ignore(Error::UnexpectedDoctype),
                b"html" => self.in_body(token),
                b"option" => {
                    if self.stack.current_is(b"option") {
                        self.pop_element(None);
                    }
                    self.insert_element(tag);
                    ControlToken::Continue
                }
                b"optgroup" => {
                    self.close_option_and_optgroup();
                    self.insert_element(tag);
                    ControlToken::Continue
                }
                b"hr" => {
                    self.close_option_and_optgroup();
                    self.insert_void(tag);
                    ControlToken::Continue
                }
                b"select" => {
                    self.parse_error(Error::UnexpectedStartTag);
                    if self.stack.has_in_select_scope(b"select") {
                        self.close_select(None);
                    }
                    ControlToken::Ignored
                }
                b"input" | b"keygen" | b"textarea" => {
                    self.parse_error(Error::UnexpectedStartTag);
                    if !self.stack.has_in_select_scope(b"select") {
                        return ControlToken::Ignored;
                    }
                    self.close_select(None);
                    ControlToken::Reprocess
                }
                b"script" | b"template" => self.in_head(token),
                _ => self.ignore(Error::UnexpectedStartTag),
            },
            Token::EndTag(tag) => match &tag.name[..] {
                b"optgroup" => {
                    let parent_is_optgroup = self.stack.len() >= 2
                        && self
                            .stack
                            .get(self.stack.len() - 2)
                            .map_or(false, |element| *element.name == b"optgroup");
                    if self.stack.current_is(b"option") && parent_is_optgroup {
                        self.pop_element(None);
                    }
                    if !self.stack.current_is(b"optgroup") {
                        return self.ignore(Error::EndTagWithoutMatchingOpenElement);
                    }
                    self.pop_element(Some(&*tag));
                    ControlToken::Continue
                }
                b"option" => {
                    if !self.stack.current_is(b"option") {
                        return self.ignore(Error::EndTagWithoutMatchingOpenElement);
                    }
                    self.pop_element(Some(&*tag));
                    ControlToken::Continue
                }
                b"select" => {
                    if !self.stack.has_in_select_scope(b"select") {
                        return self.ignore(Error::EndTagWithoutMatchingOpenElement);
                    }
                    self.close_select(Some(&*tag));
                    ControlToken::Continue
                }
                b"template" => self.in_head(token),
                _ => self.ignore(Error::UnexpectedEndTag),
            },
            Token::Eof => self.in_body(token),
        }
    }

    pub(super) fn in_select_in_table(&mut self, token: &mut Token) -> ControlToken {
        let (name, is_end_tag) = match token {
            Token::StartTag(tag) => (&tag.name, false),
            Token::EndTag(tag) => (&tag.name, true),
            _ => return self.in_select(token),
        };

        if !matches!(
            &name[..],
            b"caption" | b"table" | b"tbody" | b"tfoot" | b"thead" | b"tr" | b"td" | b"th"
        ) {
            return self.in_select(token);
        }

        if is_end_tag {
            self.parse_error(Error::UnexpectedEndTag);
            if !self.stack.has_in_table_scope(name) {
                return ControlToken::Ignored;
            }
        } else {
            self.parse_error(Error::UnexpectedStartTag);
        }

        self.close_select(None);
        ControlToken::Reprocess
    }

    fn close_option_and_optgroup(&mut self) {
        if self.stack.current_is(b"option") {
            self.pop_element(None);
        }
        if self.stack.current_is(b"optgroup") {
            self.pop_element(None);
        }
    }

    fn close_select(&mut self, end_tag: Option<&EndTag>) {
        self.pop_until_named(b"select", end_tag);
        self.reset_insertion_mode();
    }
}
