use crate::attributes::normalize_name;
use crate::error::Error;
use crate::formatting::{ActiveFormattingList, Entry, FormattingElement};
use crate::sequencer::{Location, OutputSequencer, SegmentId};
use crate::stack::{ElementStack, NodeId, OpenElement};
use crate::state::{InsertionMode, TextState};
use crate::tags;
use crate::token::{EndTag, HtmlString, StartTag, Token};
use crate::utils::{trace_log, ControlToken};

/// Options for [`TreeBuilder::new_with_opts`].
#[derive(Debug, Clone)]
pub struct TreeBuilderOpts {
    /// Parse a fragment as if it was the content of an element with this name, e.g. `td`. No
    /// `html`, `head` or `body` is implied and the context element itself is never emitted.
    pub context_element: Option<HtmlString>,
    /// Collect parse errors so they can be inspected with [`TreeBuilder::errors`]. Errors are
    /// always recoverable, so this is off by default.
    pub track_errors: bool,
    /// How many times a single input token may be dispatched before it is dropped.
    pub reprocess_limit: usize,
}

impl Default for TreeBuilderOpts {
    fn default() -> Self {
        TreeBuilderOpts {
            context_element: None,
            track_errors: false,
            reprocess_limit: 64,
        }
    }
}

/// The tree construction stage.
///
/// Feed it tokens with [`TreeBuilder::push`], signal the end of input with
/// [`TreeBuilder::flush`] and take the corrected token stream out with
/// [`TreeBuilder::pop_token`]. Output becomes available as soon as nothing can be retroactively
/// inserted in front of it anymore: an open `<table>` or a formatting element that might still be
/// adopted hold back everything after their start tag.
///
/// ```rust
/// use html5nest::{Token, TreeBuilder};
///
/// let mut builder = TreeBuilder::new();
/// builder.push(Token::start_tag("<p>"));
/// builder.push(Token::string("hello"));
/// builder.flush();
///
/// let mut html = Vec::new();
/// while let Some(token) = builder.pop_token() {
///     html.extend_from_slice(token.as_bytes());
/// }
///
/// assert_eq!(html, b"<html><head></head><body><p>hello</p></body></html>");
/// ```
#[derive(Debug)]
pub struct TreeBuilder {
    pub(crate) mode: InsertionMode,
    /// Mode to return to after [`InsertionMode::Text`] and [`InsertionMode::InTableText`].
    pub(crate) original_mode: InsertionMode,
    /// Mode to return to once a comment closes.
    pub(crate) comment_return_mode: InsertionMode,
    pub(crate) text_state: TextState,
    pub(crate) stack: ElementStack,
    pub(crate) active_formatting: ActiveFormattingList,
    pub(crate) output: OutputSequencer,
    /// The head element pointer. `head` is popped early, so this keeps a copy that can be pushed
    /// back when metadata shows up after `</head>`.
    pub(crate) head_element: Option<OpenElement>,
    /// The segment that starts with `</head>`, as long as metadata may still be inserted before it.
    pub(crate) head_anchor: Option<SegmentId>,
    pub(crate) form_element: Option<NodeId>,
    pub(crate) frameset_ok: bool,
    pub(crate) foster_parenting: bool,
    pub(crate) pending_table_text: Vec<HtmlString>,
    /// Drop a newline directly following `<pre>`, `<listing>` or `<textarea>`.
    pub(crate) skip_next_newline: bool,
    pub(crate) context: Option<HtmlString>,
    /// Number of stack entries at the bottom that are never popped. One in fragment mode.
    pub(crate) root_floor: usize,
    next_node_id: u64,
    finished: bool,
    errors: Vec<Error>,
    opts: TreeBuilderOpts,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        TreeBuilder::new()
    }
}

impl TreeBuilder {
    /// Create a tree builder for a complete document.
    pub fn new() -> Self {
        TreeBuilder::new_with_opts(TreeBuilderOpts::default())
    }

    /// Create a tree builder for the content of a `context` element.
    pub fn new_fragment(context: impl Into<HtmlString>) -> Self {
        TreeBuilder::new_with_opts(TreeBuilderOpts {
            context_element: Some(context.into()),
            ..TreeBuilderOpts::default()
        })
    }

    /// Create a tree builder with custom options.
    pub fn new_with_opts(opts: TreeBuilderOpts) -> Self {
        let mut builder = TreeBuilder {
            mode: InsertionMode::Initial,
            original_mode: InsertionMode::Initial,
            comment_return_mode: InsertionMode::Initial,
            text_state: TextState::RawText,
            stack: ElementStack::default(),
            active_formatting: ActiveFormattingList::default(),
            output: OutputSequencer::default(),
            head_element: None,
            head_anchor: None,
            form_element: None,
            frameset_ok: true,
            foster_parenting: false,
            pending_table_text: Vec::new(),
            skip_next_newline: false,
            context: None,
            root_floor: 0,
            next_node_id: 0,
            finished: false,
            errors: Vec::new(),
            opts,
        };

        if let Some(mut context) = builder.opts.context_element.clone() {
            normalize_name(&mut context);
            trace_log!("fragment mode, context element {:?}", context);
            let id = builder.next_node_id();
            let anchor = builder.output.open_empty_segment();
            builder.stack.push(OpenElement {
                id,
                name: HtmlString::from("html"),
                tag: StartTag::synthesize(b"html"),
                anchor,
                content: Location::Append,
                orphaned: false,
            });
            builder.root_floor = 1;
            builder.context = Some(context);
            builder.reset_insertion_mode();
        }

        builder
    }

    /// The current insertion mode.
    pub fn mode(&self) -> InsertionMode {
        self.mode
    }

    /// Parse errors seen so far. Always empty unless [`TreeBuilderOpts::track_errors`] is set.
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    /// Dispatch `token` once to the handler for the current insertion mode.
    ///
    /// Returns `true` if the same token has to be processed again, typically because the mode
    /// changed or an implied tag was inserted in front of it. The token may have been rewritten in
    /// the meantime (`</br>` becomes `<br>`, for example). [`TreeBuilder::push`] runs this in a
    /// loop and is what most callers want.
    pub fn process(&mut self, token: &mut Token) -> bool {
        match token {
            Token::StartTag(tag) => normalize_name(&mut tag.name),
            Token::EndTag(tag) => normalize_name(&mut tag.name),
            Token::String(_) | Token::Eof => {}
        }

        if token.name().map_or(false, tags::is_ignored) {
            trace_log!("dropping {:?}", token);
            return false;
        }

        if self.skip_next_newline {
            self.skip_next_newline = false;
            if let Token::String(text) = token {
                if text.first() == Some(&b'\n') {
                    text.remove(0);
                    if text.is_empty() {
                        return false;
                    }
                }
            }
        }

        if !matches!(
            self.mode,
            InsertionMode::Text | InsertionMode::Comment | InsertionMode::InTableText
        ) {
            if let Token::StartTag(tag) = token {
                if tags::is_comment_start(&tag.name) {
                    let closed = tag.raw.len() >= 7 && tag.raw.ends_with(b"-->");
                    self.insert_passthrough(token.clone());
                    if !closed {
                        self.comment_return_mode = self.mode;
                        self.switch_to(InsertionMode::Comment);
                    }
                    return false;
                }

                if tags::is_bogus_markup(&tag.name) {
                    self.insert_passthrough(token.clone());
                    return false;
                }
            }
        }

        trace_log!("{:?}: {:?}", self.mode, token);
        self.dispatch(self.mode, token).reprocess()
    }

    /// Process one input token to completion and make whatever output is final available to
    /// [`TreeBuilder::pop_token`]. Pushing [`Token::Eof`] is the same as calling
    /// [`TreeBuilder::flush`].
    pub fn push(&mut self, token: Token) {
        if let Token::Eof = token {
            self.flush();
            return;
        }

        if self.finished {
            trace_log!("input after end of input, dropping {:?}", token);
            return;
        }

        self.process_to_completion(token);
        self.flush_ready();
    }

    /// Signal the end of input: process the end-of-file token, close every element that is still
    /// open and release all buffered output. Calling this more than once has no further effect.
    pub fn flush(&mut self) {
        if self.finished {
            return;
        }

        self.finished = true;
        self.process_to_completion(Token::Eof);

        while self.pop_element(None).is_some() {}

        self.head_anchor = None;
        self.output.flush_all();
    }

    /// Take the next token of the corrected output, if any is ready.
    pub fn pop_token(&mut self) -> Option<Token> {
        self.output.pop_token()
    }

    fn process_to_completion(&mut self, mut token: Token) {
        let mut rounds = 0;
        while self.process(&mut token) {
            rounds += 1;
            if rounds > self.opts.reprocess_limit {
                self.parse_error(Error::ReprocessLimitExceeded);
                break;
            }
        }
    }

    /// Release every segment in front of the first one that may still be spliced into.
    fn flush_ready(&mut self) {
        let lowest_formatting = self
            .stack
            .iter()
            .position(|element| self.active_formatting.contains(element.id));

        let mut pinned: Vec<SegmentId> = self.head_anchor.into_iter().collect();
        for (i, element) in self.stack.iter().enumerate() {
            if *element.name == b"table" || lowest_formatting.map_or(false, |lowest| i >= lowest) {
                pinned.push(element.anchor);
            }
        }

        self.output.flush(|id| pinned.contains(&id));
        trace_log!("{} segments held back", self.output.pending_segments());
    }

    pub(crate) fn parse_error(&mut self, error: Error) {
        trace_log!("parse error: {}", error);
        if self.opts.track_errors {
            self.errors.push(error);
        }
    }

    /// Record a parse error and drop the token.
    pub(crate) fn ignore(&mut self, error: Error) -> ControlToken {
        self.parse_error(error);
        ControlToken::Ignored
    }

    pub(crate) fn switch_to(&mut self, mode: InsertionMode) {
        trace_log!("switch_to: {:?}", mode);
        self.mode = mode;
    }

    pub(crate) fn reprocess_in(&mut self, mode: InsertionMode) -> ControlToken {
        self.switch_to(mode);
        ControlToken::Reprocess
    }

    pub(crate) fn next_node_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        id
    }

    /// The appropriate place for inserting a node.
    pub(crate) fn insertion_location(&self) -> Location {
        if self.foster_parenting && tags::is_foster_target(self.stack.current_name()) {
            if let Some(table) = self.stack.last_named(b"table") {
                trace_log!("foster parenting before {:?}", table.anchor);
                return Location::Before(table.anchor);
            }
        }

        self.stack
            .current()
            .map_or(Location::Append, |element| element.content)
    }

    /// Insert an HTML element for `tag` and push it onto the stack.
    pub(crate) fn insert_element(&mut self, tag: &StartTag) -> NodeId {
        let location = self.insertion_location();
        let anchor = self
            .output
            .open_segment(location, Token::StartTag(tag.clone()));
        let id = self.next_node_id();
        self.stack.push(OpenElement {
            id,
            name: tag.name.clone(),
            tag: tag.clone(),
            anchor,
            content: location,
            orphaned: false,
        });
        id
    }

    pub(crate) fn insert_synthesized(&mut self, name: &[u8]) -> NodeId {
        self.insert_element(&StartTag::synthesize(name))
    }

    /// Emit a start tag for an element that has no content and is never pushed.
    pub(crate) fn insert_void(&mut self, tag: &StartTag) {
        self.insert_passthrough(Token::StartTag(tag.clone()));
    }

    pub(crate) fn insert_text(&mut self, text: HtmlString) {
        if !text.is_empty() {
            self.insert_passthrough(Token::String(text));
        }
    }

    /// Emit a token at the insertion location without touching any of the stacks.
    pub(crate) fn insert_passthrough(&mut self, token: Token) {
        let location = self.insertion_location();
        self.output.push(location, token);
    }

    /// Insert the leading whitespace of a text token. Returns whether nothing is left of it.
    pub(crate) fn insert_leading_whitespace(&mut self, token: &mut Token) -> bool {
        match token {
            Token::String(text) => {
                let whitespace = text.split_leading_whitespace();
                self.insert_text(whitespace);
                text.is_empty()
            }
            _ => false,
        }
    }

    /// Pop the current node and emit its end tag. The given end tag is emitted verbatim if it
    /// names the popped element, otherwise one is made up.
    pub(crate) fn pop_element(&mut self, end_tag: Option<&EndTag>) -> Option<OpenElement> {
        if self.stack.len() <= self.root_floor {
            return None;
        }

        let element = self.stack.pop()?;
        let close = match end_tag {
            Some(tag) if tag.name == element.name => tag.clone(),
            _ => EndTag::synthesize(&element.name),
        };
        self.output.push(element.content, Token::EndTag(close));
        self.close_orphans();
        Some(element)
    }

    /// Take an element off the stack without closing it. Its end tag is emitted once every element
    /// opened after it has been popped.
    pub(crate) fn orphan_element(&mut self, id: NodeId) {
        if self.stack.orphan(id) {
            trace_log!("orphaning {:?}", id);
            self.close_orphans();
        }
    }

    fn close_orphans(&mut self) {
        while self.stack.len() > self.root_floor
            && self.stack.current().map_or(false, |element| element.orphaned)
        {
            if let Some(element) = self.stack.pop() {
                trace_log!("closing orphaned {:?}", element.name);
                self.output
                    .push(element.content, Token::EndTag(EndTag::synthesize(&element.name)));
            }
        }
    }

    /// Pop elements until one matching `done` has been popped.
    pub(crate) fn pop_until(
        &mut self,
        end_tag: Option<&EndTag>,
        done: impl Fn(&OpenElement) -> bool,
    ) {
        while let Some(element) = self.pop_element(end_tag) {
            if done(&element) {
                break;
            }
        }
    }

    pub(crate) fn pop_until_named(&mut self, name: &[u8], end_tag: Option<&EndTag>) {
        self.pop_until(end_tag, |element| *element.name == name);
    }

    /// Pop `head` off the stack. Its end tag opens a segment of its own so that late metadata can
    /// still be put in front of it.
    pub(crate) fn pop_head(&mut self, end_tag: Option<&EndTag>) {
        if !self.stack.current_is(b"head") || self.stack.len() <= self.root_floor {
            return;
        }

        if let Some(head) = self.stack.pop() {
            let close = match end_tag {
                Some(tag) => tag.clone(),
                None => EndTag::synthesize(b"head"),
            };
            let anchor = self.output.open_segment(head.content, Token::EndTag(close));
            self.head_anchor = Some(anchor);
        }
    }

    pub(crate) fn generate_implied_end_tags(&mut self, except: Option<&[u8]>) {
        self.generate_implied_end_tags_matching(tags::has_implied_end_tag, except);
    }

    pub(crate) fn generate_all_implied_end_tags_thoroughly(&mut self) {
        self.generate_implied_end_tags_matching(tags::has_implied_end_tag_thoroughly, None);
    }

    fn generate_implied_end_tags_matching(
        &mut self,
        implied: impl Fn(&[u8]) -> bool,
        except: Option<&[u8]>,
    ) {
        loop {
            let current = self.stack.current_name();
            if !implied(current) || except.map_or(false, |except| except == current) {
                break;
            }
            if self.pop_element(None).is_none() {
                break;
            }
        }
    }

    /// Close a `p` element.
    pub(crate) fn close_p(&mut self, end_tag: Option<&EndTag>) {
        self.generate_implied_end_tags(Some(&b"p"[..]));
        if !self.stack.current_is(b"p") {
            self.parse_error(Error::EndTagWithoutMatchingOpenElement);
        }
        self.pop_until_named(b"p", end_tag);
    }

    pub(crate) fn close_p_in_button_scope(&mut self) {
        if self.stack.has_in_button_scope(b"p") {
            self.close_p(None);
        }
    }

    /// Re-open formatting elements that were closed implicitly.
    ///
    /// See <https://html.spec.whatwg.org/multipage/parsing.html#reconstruct-the-active-formatting-elements>
    pub(crate) fn reconstruct_active_formatting(&mut self) {
        let len = self.active_formatting.len();
        match self.active_formatting.last() {
            None | Some(Entry::Marker) => return,
            Some(Entry::Element(element)) if self.stack.contains(element.id) => return,
            Some(Entry::Element(_)) => {}
        }

        // rewind
        let mut start = len - 1;
        while start > 0 {
            match self.active_formatting.get(start - 1) {
                Some(Entry::Element(element)) if !self.stack.contains(element.id) => start -= 1,
                _ => break,
            }
        }

        // advance and create
        for index in start..len {
            let tag = match self.active_formatting.get(index) {
                Some(Entry::Element(element)) => element.tag.clone(),
                _ => continue,
            };
            trace_log!("reconstructing {:?}", tag.name);
            let id = self.insert_element(&tag);
            self.active_formatting.replace(
                index,
                FormattingElement {
                    id,
                    name: tag.name.clone(),
                    tag,
                },
            );
        }
    }

    /// Insert a formatting element and record it in the list of active formatting elements.
    pub(crate) fn insert_formatting_element(&mut self, tag: &StartTag) {
        let id = self.insert_element(tag);
        self.active_formatting.push(FormattingElement {
            id,
            name: tag.name.clone(),
            tag: tag.clone(),
        });
    }

    /// See <https://html.spec.whatwg.org/multipage/parsing.html#reset-the-insertion-mode-appropriately>
    pub(crate) fn reset_insertion_mode(&mut self) {
        let mode = self.appropriate_insertion_mode();
        self.switch_to(mode);
    }

    fn appropriate_insertion_mode(&self) -> InsertionMode {
        for (i, element) in self.stack.iter().enumerate().rev() {
            let last = i == 0;
            let name: &[u8] = match &self.context {
                Some(context) if last => context.as_slice(),
                _ => element.name.as_slice(),
            };

            return match name {
                b"select" => {
                    if !last {
                        for ancestor in self.stack.iter().take(i).rev() {
                            match &ancestor.name[..] {
                                b"template" => break,
                                b"table" => return InsertionMode::InSelectInTable,
                                _ => {}
                            }
                        }
                    }
                    InsertionMode::InSelect
                }
                b"td" | b"th" if !last => InsertionMode::InCell,
                b"tr" => InsertionMode::InRow,
                b"tbody" | b"thead" | b"tfoot" => InsertionMode::InTableBody,
                b"caption" => InsertionMode::InCaption,
                b"colgroup" => InsertionMode::InColumnGroup,
                b"table" => InsertionMode::InTable,
                b"template" => InsertionMode::InBody,
                b"head" if !last => InsertionMode::InHead,
                b"body" => InsertionMode::InBody,
                b"frameset" => InsertionMode::InFrameset,
                b"html" if self.head_element.is_none() => InsertionMode::BeforeHead,
                b"html" => InsertionMode::AfterHead,
                _ if last => InsertionMode::InBody,
                _ => continue,
            };
        }

        InsertionMode::InBody
    }

    pub(crate) fn clear_stack_back_to(&mut self, boundary: impl Fn(&[u8]) -> bool) {
        while !boundary(self.stack.current_name()) {
            if self.pop_element(None).is_none() {
                break;
            }
        }
    }

    pub(crate) fn clear_stack_back_to_table_context(&mut self) {
        self.clear_stack_back_to(|name| matches!(name, b"table" | b"template" | b"html"));
    }

    pub(crate) fn clear_stack_back_to_table_body_context(&mut self) {
        self.clear_stack_back_to(|name| {
            matches!(name, b"tbody" | b"tfoot" | b"thead" | b"template" | b"html")
        });
    }

    pub(crate) fn clear_stack_back_to_table_row_context(&mut self) {
        self.clear_stack_back_to(|name| matches!(name, b"tr" | b"template" | b"html"));
    }

    /// Enter [`InsertionMode::Text`] for an element whose content is not markup.
    pub(crate) fn insert_text_element(&mut self, tag: &StartTag, state: TextState) {
        self.insert_element(tag);
        self.text_state = state;
        self.original_mode = self.mode;
        self.switch_to(InsertionMode::Text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils::serialize;
    use pretty_assertions::assert_eq;

    fn run(builder: &mut TreeBuilder, tokens: Vec<Token>) -> String {
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
    fn empty_document() {
        assert_eq!(
            run(&mut TreeBuilder::new(), vec![]),
            "<html><head></head><body></body></html>"
        );
    }

    #[test]
    fn output_is_released_early() {
        let mut builder = TreeBuilder::new();
        builder.push(Token::start_tag("<p>"));
        builder.push(Token::string("x"));
        let mut out = Vec::new();
        while let Some(token) = builder.pop_token() {
            out.push(token);
        }
        assert_eq!(serialize(&out), "<html><head></head><body><p>x");
    }

    #[test]
    fn open_table_holds_back_output() {
        let mut builder = TreeBuilder::new();
        builder.push(Token::start_tag("<table>"));
        builder.push(Token::start_tag("<tr>"));
        let mut out = Vec::new();
        while let Some(token) = builder.pop_token() {
            out.push(token);
        }
        assert_eq!(serialize(&out), "<html><head></head><body>");
    }

    #[test]
    fn anchor_outside_of_table_closes_with_it() {
        let out = run(
            &mut TreeBuilder::new(),
            vec![
                Token::start_tag("<a>"),
                Token::string("x"),
                Token::start_tag("<table>"),
                Token::start_tag("<a>"),
                Token::end_tag("</table>"),
                Token::string("y"),
            ],
        );
        assert_eq!(
            out,
            "<html><head></head><body><a>x<a></a><table></table></a><a>y</a></body></html>"
        );
    }

    #[test]
    fn reset_insertion_mode_in_fragment() {
        assert_eq!(TreeBuilder::new_fragment("td").mode(), InsertionMode::InBody);
        assert_eq!(TreeBuilder::new_fragment("TR").mode(), InsertionMode::InRow);
        assert_eq!(
            TreeBuilder::new_fragment("select").mode(),
            InsertionMode::InSelect
        );
        assert_eq!(
            TreeBuilder::new_fragment("html").mode(),
            InsertionMode::BeforeHead
        );
    }

    #[test]
    fn errors_are_tracked_on_request() {
        let mut builder = TreeBuilder::new_with_opts(TreeBuilderOpts {
            track_errors: true,
            ..TreeBuilderOpts::default()
        });
        run(&mut builder, vec![Token::end_tag("</div>")]);
        assert!(!builder.errors().is_empty());

        let mut builder = TreeBuilder::new();
        run(&mut builder, vec![Token::end_tag("</div>")]);
        assert!(builder.errors().is_empty());
    }
}
