use crate::error::Error;
use crate::state::InsertionMode;
use crate::token::{is_html_whitespace, Token};
use crate::tree_builder::TreeBuilder;
use crate::utils::ControlToken;

impl TreeBuilder {
    pub(super) fn after_body(&mut self, token: &mut Token) -> ControlToken {
        match token {
            Token::String(text) if text.is_whitespace() => self.in_body(token),
            Token::String(_) => {
                self.parse_error(Error::UnexpectedTextAfterBody);
                self.reprocess_in(InsertionMode::InBody)
            }
            Token::StartTag(tag) => match &tag.name[..] {
                b"!doctype" => self.ignore(Error::UnexpectedDoctype),
                b"html" => self.in_body(token),
                _ => {
                    self.parse_error(Error::UnexpectedStartTag);
                    self.reprocess_in(InsertionMode::InBody)
                }
            },
            Token::EndTag(tag) if *tag.name == b"html" => {
                if self.context.is_some() {
                    return self.ignore(Error::UnexpectedEndTag);
                }
                self.switch_to(InsertionMode::AfterAfterBody);
                ControlToken::Continue
            }
            Token::EndTag(_) => {
                self.parse_error(Error::UnexpectedEndTag);
                self.reprocess_in(InsertionMode::InBody)
            }
            Token::Eof => ControlToken::Continue,
        }
    }

    pub(super) fn after_after_body(&mut self, token: &mut Token) -> ControlToken {
        match token {
            Token::String(text) if text.is_whitespace() => self.in_body(token),
            Token::StartTag(tag) if matches!(&tag.name[..], b"!doctype" | b"html") => {
                self.in_body(token)
            }
            Token::Eof => ControlToken::Continue,
            Token::String(_) => {
                self.parse_error(Error::UnexpectedTextAfterBody);
                self.reprocess_in(InsertionMode::InBody)
            }
            Token::StartTag(_) => {
                self.parse_error(Error::UnexpectedStartTag);
                self.reprocess_in(InsertionMode::InBody)
            }
            Token::EndTag(_) => {
                self.parse_error(Error::UnexpectedEndTag);
                self.reprocess_in(InsertionMode::InBody)
            }
        }
    }

    pub(super) fn in_frameset(&mut self, token: &mut Token) -> ControlToken {
        match token {
            Token::String(text) => {
                let mut text = std::mem::take(text);
                if !text.is_whitespace() {
                    self.parse_error(Error::UnexpectedTextAfterBody);
                    text.retain(|&b| is_html_whitespace(b));
                }
                self.insert_text(text);
                ControlToken::Continue
            }
            Token::StartTag(tag) => match &tag.name[..] {
                b"!doctype" => self.ignore(Error::UnexpectedDoctype),
                b"html" => self.in_body(token),
                b"frameset" => {
                    self.insert_element(tag);
                    ControlToken::Continue
                }
                b"frame" => {
                    self.insert_void(tag);
                    ControlToken::Continue
                }
                b"noframes" => self.in_head(token),
                _ => self.ignore(Error::UnexpectedStartTag),
            },
            Token::EndTag(tag) if *tag.name == b"frameset" => {
                if self.stack.len() <= 1 || self.stack.current_is(b"html") {
                    return self.ignore(Error::EndTagWithoutMatchingOpenElement);
                }
                self.pop_element(Some(&*tag));
                if self.context.is_none() && !self.stack.current_is(b"frameset") {
                    self.switch_to(InsertionMode::AfterFrameset);
                }
                ControlToken::Continue
            }
            Token::EndTag(_) => self.ignore(Error::UnexpectedEndTag),
            Token::Eof => ControlToken::Continue,
        }
    }

    pub(super) fn after_frameset(&mut self, token: &mut Token) -> ControlToken {
        match token {
            Token::String(text) => {
                let mut text = std::mem::take(text);
                if !text.is_whitespace() {
                    self.parse_error(Error::UnexpectedTextAfterBody);
                    text.retain(|&b| is_html_whitespace(b));
                }
                self.insert_text(text);
                ControlToken::Continue
            }
            Token::StartTag(tag) => match &tag.name[..] {
                b"!doctype" => self.ignore(Error::UnexpectedDoctype),
                b"html" => self.in_body(token),
                b"noframes" => self.in_head(token),
                _ => self.ignore(Error::UnexpectedStartTag),
            },
            Token::EndTag(tag) if *tag.name == b"html" => {
                self.switch_to(InsertionMode::AfterAfterFrameset);
                ControlToken::Continue
            }
            Token::EndTag(_) => self.ignore(Error::UnexpectedEndTag),
            Token::Eof => ControlToken::Continue,
        }
    }

    pub(super) fn after_after_frameset(&mut self, token: &mut Token) -> ControlToken {
        match token {
            Token::String(text) if text.is_whitespace() => self.in_body(token),
            Token::String(_) => self.ignore(Error::UnexpectedTextAfterBody),
            Token::StartTag(tag) => match &tag.name[..] {
                b"!doctype" | b"html" => self.in_body(token),
                b"noframes" => self.in_head(token),
                _ => self.ignore(Error::UnexpectedStartTag),
            },
            Token::EndTag(_) => self.ignore(Error::UnexpectedEndTag),
            Token::Eof => ControlToken::Continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::testutils::serialize;
    use crate::{Token, TreeBuilder};
    use pretty_assertions::assert_eq;

    fn run(tokens: Vec<Token>) -> String {
        let mut builder = TreeBuilder::new();
        for token in tokens {
            builder.push(token);
        }
        builder.flush();
        let mut out = Vec::new();
        while let Some(token) = builder.pop_token() {
            out.push(token);
        }
        serialize(&out)
    }

    #[test]
    fn text_after_body_goes_back_into_body() {
        assert_eq!(
            run(vec![
                Token::start_tag("<p>"),
                Token::end_tag("</body>"),
                Token::string("x"),
            ]),
            "<html><head></head><body><p>x</p></body></html>"
        );
    }

    #[test]
    fn frameset_keeps_whitespace_only() {
        assert_eq!(
            run(vec![
                Token::start_tag("<frameset>"),
                Token::string("a b"),
                Token::start_tag("<frame>"),
                Token::start_tag("<div>"),
                Token::end_tag("</frameset>"),
            ]),
            "<html><head></head><frameset> <frame></frameset></html>"
        );
    }
}
