//! Buffered output that later decisions can still splice into.
//!
//! Output is kept as a doubly linked list of segments. Every element the tree builder inserts
//! opens a segment that starts with its start tag, so the segment id doubles as a cursor pointing
//! "right before this element" and "right after this element's start tag". Segments are moved to
//! the output queue strictly from the front, and only while the front segment is not pinned by
//! the caller; a pinned segment holds back everything after it.
use std::collections::{HashMap, VecDeque};

use crate::token::Token;
use crate::utils::trace_log;

/// Identity of one output segment. Ids are never reused, so a stale id simply stops resolving
/// once its segment has been flushed.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub(crate) struct SegmentId(pub(crate) u64);

/// Where a token goes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Location {
    /// After everything buffered so far.
    Append,
    /// Right before the start of the given segment. Falls back to [`Location::Append`] when the
    /// segment has already been flushed.
    Before(SegmentId),
}

#[derive(Debug, Default)]
struct Segment {
    tokens: Vec<Token>,
    prev: Option<SegmentId>,
    next: Option<SegmentId>,
}

#[derive(Debug, Default)]
pub(crate) struct OutputSequencer {
    segments: HashMap<SegmentId, Segment>,
    head: Option<SegmentId>,
    tail: Option<SegmentId>,
    next_id: u64,
    output: VecDeque<Token>,
}

impl OutputSequencer {
    fn next_segment_id(&mut self) -> SegmentId {
        let id = SegmentId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Link a new segment right after `prev`, or at the very front if `prev` is `None`.
    fn link_after(&mut self, prev: Option<SegmentId>, tokens: Vec<Token>) -> SegmentId {
        let id = self.next_segment_id();
        let next = match prev {
            Some(prev) => self.segments.get(&prev).and_then(|segment| segment.next),
            None => self.head,
        };

        self.segments.insert(id, Segment { tokens, prev, next });

        match prev.and_then(|prev| self.segments.get_mut(&prev)) {
            Some(segment) => segment.next = Some(id),
            None => self.head = Some(id),
        }

        match next.and_then(|next| self.segments.get_mut(&next)) {
            Some(segment) => segment.prev = Some(id),
            None => self.tail = Some(id),
        }

        id
    }

    /// The segment after which a new segment at `location` would be linked.
    fn predecessor(&self, location: Location) -> Option<SegmentId> {
        match location {
            Location::Before(id) => match self.segments.get(&id) {
                Some(segment) => segment.prev,
                None => self.tail,
            },
            Location::Append => self.tail,
        }
    }

    /// Buffer a token at `location`.
    pub(crate) fn push(&mut self, location: Location, token: Token) {
        self.extend(location, vec![token]);
    }

    /// Buffer several tokens at `location`, keeping their order.
    pub(crate) fn extend(&mut self, location: Location, tokens: Vec<Token>) {
        if tokens.is_empty() {
            return;
        }

        match self
            .predecessor(location)
            .and_then(|id| self.segments.get_mut(&id))
        {
            Some(segment) => segment.tokens.extend(tokens),
            None => {
                // nothing precedes the target; the tokens become the new front segment
                self.link_after(None, tokens);
            }
        }
    }

    /// Insert tokens immediately before the segment `id`.
    pub(crate) fn insert_before(&mut self, id: SegmentId, tokens: Vec<Token>) {
        self.extend(Location::Before(id), tokens);
    }

    /// Start a new segment at `location` whose first token is `token`.
    pub(crate) fn open_segment(&mut self, location: Location, token: Token) -> SegmentId {
        let prev = self.predecessor(location);
        let id = self.link_after(prev, vec![token]);
        trace_log!("sequencer: opened segment {:?} at {:?}", id, location);
        id
    }

    /// Start a segment with nothing in it. Used for elements that are never emitted.
    pub(crate) fn open_empty_segment(&mut self) -> SegmentId {
        let prev = self.tail;
        self.link_after(prev, Vec::new())
    }

    /// Split segment `id` after its first token. The new segment starts with `token` followed by
    /// everything that came after the first token of `id`.
    pub(crate) fn split_after_first(&mut self, id: SegmentId, token: Token) -> SegmentId {
        let rest = match self.segments.get_mut(&id) {
            Some(segment) if !segment.tokens.is_empty() => segment.tokens.split_off(1),
            Some(_) => Vec::new(),
            None => return self.open_segment(Location::Append, token),
        };

        let mut tokens = Vec::with_capacity(rest.len() + 1);
        tokens.push(token);
        tokens.extend(rest);
        let new_id = self.link_after(Some(id), tokens);
        trace_log!("sequencer: split {:?} into {:?}", id, new_id);
        new_id
    }

    /// Move segments from the front to the output queue until a pinned segment is reached.
    pub(crate) fn flush(&mut self, is_pinned: impl Fn(SegmentId) -> bool) {
        while let Some(id) = self.head {
            if is_pinned(id) {
                break;
            }

            let segment = match self.segments.remove(&id) {
                Some(segment) => segment,
                None => {
                    self.head = None;
                    self.tail = None;
                    break;
                }
            };

            self.output.extend(segment.tokens);
            self.head = segment.next;
            match segment.next.and_then(|next| self.segments.get_mut(&next)) {
                Some(next) => next.prev = None,
                None => self.tail = None,
            }
        }
    }

    /// Move every buffered segment to the output queue.
    pub(crate) fn flush_all(&mut self) {
        self.flush(|_| false);
    }

    /// Number of segments still held back.
    pub(crate) fn pending_segments(&self) -> usize {
        self.segments.len()
    }

    pub(crate) fn pop_token(&mut self) -> Option<Token> {
        self.output.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> Token {
        Token::string(s)
    }

    fn drain(sequencer: &mut OutputSequencer) -> String {
        let mut rv = String::new();
        while let Some(token) = sequencer.pop_token() {
            rv.push_str(std::str::from_utf8(token.as_bytes()).unwrap());
        }
        rv
    }

    #[test]
    fn appends_in_order() {
        let mut sequencer = OutputSequencer::default();
        sequencer.push(Location::Append, text("a"));
        sequencer.open_segment(Location::Append, text("b"));
        sequencer.push(Location::Append, text("c"));
        sequencer.flush_all();
        assert_eq!(drain(&mut sequencer), "abc");
        assert_eq!(sequencer.pending_segments(), 0);
    }

    #[test]
    fn insert_before_segment() {
        let mut sequencer = OutputSequencer::default();
        sequencer.push(Location::Append, text("<body>"));
        let table = sequencer.open_segment(Location::Append, text("<table>"));
        sequencer.push(Location::Append, text("<tr>"));
        sequencer.push(Location::Before(table), text("foo"));
        sequencer.flush_all();
        assert_eq!(drain(&mut sequencer), "<body>foo<table><tr>");
    }

    #[test]
    fn insert_before_front_segment() {
        let mut sequencer = OutputSequencer::default();
        let table = sequencer.open_segment(Location::Append, text("<table>"));
        sequencer.insert_before(table, vec![text("x"), text("y")]);
        sequencer.open_segment(Location::Before(table), text("<div>"));
        sequencer.push(Location::Before(table), text("z"));
        sequencer.flush_all();
        assert_eq!(drain(&mut sequencer), "xy<div>z<table>");
    }

    #[test]
    fn split_moves_tail_of_segment() {
        let mut sequencer = OutputSequencer::default();
        let p = sequencer.open_segment(Location::Append, text("<p>"));
        sequencer.push(Location::Append, text("x"));
        sequencer.split_after_first(p, text("<b>"));
        sequencer.push(Location::Append, text("</b>"));
        sequencer.flush_all();
        assert_eq!(drain(&mut sequencer), "<p><b>x</b>");
    }

    #[test]
    fn pinned_segment_holds_back_the_rest() {
        let mut sequencer = OutputSequencer::default();
        sequencer.push(Location::Append, text("a"));
        let pinned = sequencer.open_segment(Location::Append, text("b"));
        sequencer.open_segment(Location::Append, text("c"));

        sequencer.flush(|id| id == pinned);
        assert_eq!(drain(&mut sequencer), "a");
        assert_eq!(sequencer.pending_segments(), 2);

        sequencer.push(Location::Before(pinned), text("!"));
        sequencer.flush(|_| false);
        assert_eq!(drain(&mut sequencer), "!bc");
    }

    #[test]
    fn stale_ids_fall_back_to_append() {
        let mut sequencer = OutputSequencer::default();
        let gone = sequencer.open_segment(Location::Append, text("a"));
        sequencer.flush_all();
        assert_eq!(sequencer.pending_segments(), 0);

        sequencer.push(Location::Before(gone), text("b"));
        sequencer.split_after_first(gone, text("c"));
        sequencer.flush_all();
        assert_eq!(drain(&mut sequencer), "abc");
    }
}
