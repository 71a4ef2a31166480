//! One handler per insertion mode.
//!
//! Handlers take the token by mutable reference so they can rewrite it before asking for it to be
//! reprocessed. "Process the token using the rules for X" is a direct call to the handler for X,
//! not a mode switch.
//!
//! See <https://html.spec.whatwg.org/multipage/parsing.html#tree-construction>
mod after;
mod body;
mod document;
mod select;
mod table;
mod text;

use crate::state::InsertionMode;
use crate::token::{StartTag, Token};
use crate::tree_builder::TreeBuilder;
use crate::utils::ControlToken;

impl TreeBuilder {
    pub(crate) fn dispatch(&mut self, mode: InsertionMode, token: &mut Token) -> ControlToken {
        match mode {
            InsertionMode::Initial => self.initial(token),
            InsertionMode::BeforeHtml => self.before_html(token),
            InsertionMode::BeforeHead => self.before_head(token),
            InsertionMode::InHead => self.in_head(token),
            InsertionMode::AfterHead => self.after_head(token),
            InsertionMode::InBody => self.in_body(token),
            InsertionMode::InTable => self.in_table(token),
            InsertionMode::InTableText => self.in_table_text(token),
            InsertionMode::InCaption => self.in_caption(token),
            InsertionMode::InColumnGroup => self.in_column_group(token),
            InsertionMode::InTableBody => self.in_table_body(token),
            InsertionMode::InRow => self.in_row(token),
            InsertionMode::InCell => self.in_cell(token),
            InsertionMode::InSelect => self.in_select(token),
            InsertionMode::InSelectInTable => self.in_select_in_table(token),
            InsertionMode::AfterBody => self.after_body(token),
            InsertionMode::AfterAfterBody => self.after_after_body(token),
            InsertionMode::InFrameset => self.in_frameset(token),
            InsertionMode::AfterFrameset => self.after_frameset(token),
            InsertionMode::AfterAfterFrameset => self.after_after_frameset(token),
            InsertionMode::Text => self.text(token),
            InsertionMode::Comment => self.comment(token),
        }
    }
}

/// `<input type=hidden>` does not affect the frameset-ok flag and is allowed directly in tables.
fn is_hidden_input(tag: &StartTag) -> bool {
    tag.attributes()
        .get(&b"type"[..])
        .map_or(false, |value| value.eq_ignore_ascii_case(b"hidden"))
}
