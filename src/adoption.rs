//! The adoption agency algorithm, run for end tags of formatting elements.
//!
//! See <https://html.spec.whatwg.org/multipage/parsing.html#adoption-agency-algorithm>
//!
//! A DOM implementation moves nodes around. Here the nodes are token ranges in the output
//! sequencer, so "moving the furthest block" amounts to closing the formatting element and
//! everything between it and the furthest block right in front of the furthest block's start tag,
//! re-opening the surviving intermediate elements there, and opening a clone of the formatting
//! element right after the furthest block's start tag.
use crate::error::Error;
use crate::formatting::FormattingElement;
use crate::sequencer::Location;
use crate::stack::{NodeId, OpenElement};
use crate::tags;
use crate::token::{EndTag, Token};
use crate::tree_builder::TreeBuilder;
use crate::utils::trace_log;

pub(crate) enum AdoptionOutcome {
    Done,
    /// Nothing to adopt. The caller should act as for any other end tag.
    AnyOtherEndTag,
}

impl TreeBuilder {
    pub(crate) fn adoption_agency(&mut self, end_tag: &EndTag) -> AdoptionOutcome {
        let subject = &end_tag.name;

        if let Some(current) = self.stack.current() {
            if current.name == *subject && !self.active_formatting.contains(current.id) {
                self.pop_element(Some(end_tag));
                return AdoptionOutcome::Done;
            }
        }

        for iteration in 0..8 {
            trace_log!("adoption agency: {:?}, iteration {}", subject, iteration);

            let formatting_element = match self.active_formatting.last_before_marker(subject) {
                Some(element) => element.clone(),
                None => return AdoptionOutcome::AnyOtherEndTag,
            };

            let formatting_index = match self.stack.position(formatting_element.id) {
                Some(index) => index,
                None => {
                    self.parse_error(Error::MisnestedEndTag);
                    self.active_formatting.remove(formatting_element.id);
                    return AdoptionOutcome::Done;
                }
            };

            if !self.stack.has_node_in_scope(formatting_element.id) {
                self.parse_error(Error::MisnestedEndTag);
                return AdoptionOutcome::Done;
            }

            if formatting_index + 1 != self.stack.len() {
                self.parse_error(Error::MisnestedEndTag);
            }

            let furthest_block_index = self
                .stack
                .iter()
                .enumerate()
                .skip(formatting_index + 1)
                .find(|(_, element)| !element.orphaned && tags::is_special(&element.name))
                .map(|(index, _)| index);

            let furthest_block_index = match furthest_block_index {
                Some(index) => index,
                None => {
                    let id = formatting_element.id;
                    self.pop_until(Some(end_tag), |element| element.id == id);
                    self.active_formatting.remove(id);
                    return AdoptionOutcome::Done;
                }
            };

            self.adopt(formatting_element, formatting_index, furthest_block_index);
        }

        self.parse_error(Error::AdoptionAgencyOuterLoopExhausted);
        AdoptionOutcome::Done
    }

    /// One outer loop iteration from the furthest block on.
    fn adopt(
        &mut self,
        formatting_element: FormattingElement,
        formatting_index: usize,
        furthest_block_index: usize,
    ) {
        let furthest_block = match self.stack.get(furthest_block_index) {
            Some(element) => element.clone(),
            None => return,
        };

        // everything from the formatting element up to the furthest block gets closed in front of
        // the furthest block
        let closes: Vec<Token> = self
            .stack
            .iter()
            .skip(formatting_index)
            .take(furthest_block_index - formatting_index)
            .rev()
            .map(|element| Token::EndTag(EndTag::synthesize(&element.name)))
            .collect();
        self.output.insert_before(furthest_block.anchor, closes);

        // inner loop: walk from the furthest block towards the formatting element
        let mut bookmark: Option<NodeId> = None;
        let mut clones: Vec<NodeId> = Vec::new();
        let mut inner_loop_counter = 0;
        let mut node_index = furthest_block_index;
        loop {
            inner_loop_counter += 1;
            node_index -= 1;
            if node_index <= formatting_index {
                break;
            }

            let node = match self.stack.get(node_index) {
                Some(node) if node.orphaned => {
                    inner_loop_counter -= 1;
                    continue;
                }
                Some(node) => node.clone(),
                None => break,
            };

            if inner_loop_counter > 3 {
                self.active_formatting.remove(node.id);
            }

            let afe_index = match self.active_formatting.position(node.id) {
                Some(index) => index,
                None => {
                    trace_log!("adoption agency: dropping {:?} from the stack", node.name);
                    self.stack.remove(node_index);
                    continue;
                }
            };

            let clone_id = self.next_node_id();
            trace_log!("adoption agency: cloning {:?}", node.name);
            self.active_formatting.replace(
                afe_index,
                FormattingElement {
                    id: clone_id,
                    name: node.name.clone(),
                    tag: node.tag.clone(),
                },
            );
            if let Some(slot) = self.stack.get_mut(node_index) {
                slot.id = clone_id;
                slot.content = furthest_block.content;
            }

            if clones.is_empty() {
                bookmark = Some(clone_id);
            }
            clones.push(clone_id);
        }

        // re-open the surviving clones around the furthest block, outermost first
        for clone_id in clones.into_iter().rev() {
            let index = match self.stack.position(clone_id) {
                Some(index) => index,
                None => continue,
            };
            let tag = self.stack.get(index).map(|element| element.tag.clone());
            if let Some(tag) = tag {
                let anchor = self.output.open_segment(
                    Location::Before(furthest_block.anchor),
                    Token::StartTag(tag),
                );
                if let Some(element) = self.stack.get_mut(index) {
                    element.anchor = anchor;
                }
            }
        }

        // a clone of the formatting element takes over the children of the furthest block
        let new_id = self.next_node_id();
        let tag = formatting_element.tag.clone();
        let anchor = self
            .output
            .split_after_first(furthest_block.anchor, Token::StartTag(tag.clone()));
        let new_element = FormattingElement {
            id: new_id,
            name: formatting_element.name.clone(),
            tag: tag.clone(),
        };

        let removed_at = self.active_formatting.remove(formatting_element.id);
        let insert_at = match bookmark.and_then(|id| self.active_formatting.position(id)) {
            Some(index) => index + 1,
            None => removed_at.unwrap_or_else(|| self.active_formatting.len()),
        };
        self.active_formatting.insert(insert_at, new_element);

        if let Some(index) = self.stack.position(formatting_element.id) {
            self.stack.remove(index);
        }
        let furthest_block_position = self
            .stack
            .position(furthest_block.id)
            .map_or(self.stack.len(), |index| index + 1);
        self.stack.insert(
            furthest_block_position,
            OpenElement {
                id: new_id,
                name: formatting_element.name,
                tag,
                anchor,
                content: furthest_block.content,
                orphaned: false,
            },
        );
    }
}
