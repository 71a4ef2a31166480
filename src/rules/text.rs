use crate::error::Error;
use crate::state::TextState;
use crate::tags;
use crate::token::Token;
use crate::tree_builder::TreeBuilder;
use crate::utils::{trace_log, ControlToken};

impl TreeBuilder {
    /// Content of `script`, `style`, `title`, `textarea` and friends. The tokenizer may still have
    /// produced tags in there; they are passed through untouched until the element's own end tag
    /// shows up.
    pub(super) fn text(&mut self, token: &mut Token) -> ControlToken {
        match token {
            Token::Eof => {
                if self.text_state != TextState::PlainText {
                    self.parse_error(Error::EofInText);
                }
                self.pop_element(None);
                let mode = self.original_mode;
                self.reprocess_in(mode)
            }
            Token::EndTag(tag)
                if self.text_state != TextState::PlainText
                    && self.stack.current_is(&tag.name) =>
            {
                self.pop_element(Some(&*tag));
                let mode = self.original_mode;
                self.switch_to(mode);
                ControlToken::Continue
            }
            _ => {
                self.insert_passthrough(std::mem::replace(token, Token::Eof));
                ControlToken::Continue
            }
        }
    }

    /// Everything between a comment opener and its closer passes through verbatim.
    pub(super) fn comment(&mut self, token: &mut Token) -> ControlToken {
        match token {
            Token::Eof => {
                self.parse_error(Error::EofInComment);
                let mode = self.comment_return_mode;
                self.reprocess_in(mode)
            }
            Token::EndTag(tag) if tags::is_comment_end(&tag.name) => {
                trace_log!("comment closed");
                self.insert_passthrough(std::mem::replace(token, Token::Eof));
                let mode = self.comment_return_mode;
                self.switch_to(mode);
                ControlToken::Continue
            }
            _ => {
                self.insert_passthrough(std::mem::replace(token, Token::Eof));
                ControlToken::Continue
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::state::InsertionMode;
    use crate::testutils::serialize;
    use crate::{Token, TreeBuilder};

    fn fragment(tokens: Vec<Token>) -> (String, InsertionMode) {
        let mut builder = TreeBuilder::new_fragment("div");
        for token in tokens {
            builder.push(token);
        }
        let mode = builder.mode();
        builder.flush();
        let mut out = Vec::new();
        while let Some(token) = builder.pop_token() {
            out.push(token);
        }
        (serialize(&out), mode)
    }

    #[test]
    fn markup_inside_script_is_passed_through() {
        let (html, mode) = fragment(vec![
            Token::start_tag("<script>"),
            Token::start_tag("<b>"),
            Token::end_tag("</div>"),
            Token::end_tag("</SCRIPT>"),
        ]);
        assert_eq!(html, "<script><b></div></SCRIPT>");
        assert_eq!(mode, InsertionMode::InBody);
    }

    #[test]
    fn comment_spans_several_tokens() {
        let (html, mode) = fragment(vec![
            Token::start_tag("<!--"),
            Token::start_tag("<p>"),
            Token::end_tag("-->"),
            Token::string("x"),
        ]);
        assert_eq!(html, "<!--<p>-->x");
        assert_eq!(mode, InsertionMode::InBody);
    }

    #[test]
    fn unterminated_comment() {
        let (html, mode) = fragment(vec![Token::start_tag("<!--"), Token::string("x")]);
        assert_eq!(html, "<!--x");
        assert_eq!(mode, InsertionMode::Comment);
    }
}
