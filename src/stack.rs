//! The stack of open elements and its scope predicates.
use crate::sequencer::{Location, SegmentId};
use crate::token::{HtmlString, StartTag};

/// Identity of one element instance. Clones made by the adoption agency or by reconstruction get
/// fresh ids even though they share a name with the original.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub(crate) struct NodeId(pub(crate) u64);

#[derive(Debug, Clone)]
pub(crate) struct OpenElement {
    pub(crate) id: NodeId,
    pub(crate) name: HtmlString,
    /// The start tag that opened the element, kept for cloning.
    pub(crate) tag: StartTag,
    /// The output segment that begins with this element's start tag.
    pub(crate) anchor: SegmentId,
    /// Where this element's children and end tag go.
    pub(crate) content: Location,
    /// No longer part of the stack as far as the parsing rules are concerned. The entry only stays
    /// to emit the end tag once everything opened after it is closed.
    pub(crate) orphaned: bool,
}

pub(crate) trait ElementScope {
    fn matches(&self, name: &[u8]) -> bool;
}

impl<F> ElementScope for F
where
    F: Fn(&[u8]) -> bool,
{
    fn matches(&self, name: &[u8]) -> bool {
        self(name)
    }
}

/// MathML and SVG integration points are left out; foreign content is not tracked.
pub(crate) fn default_scope(name: &[u8]) -> bool {
    matches!(
        name,
        b"applet"
            | b"caption"
            | b"html"
            | b"table"
            | b"td"
            | b"th"
            | b"marquee"
            | b"object"
            | b"template"
    )
}

pub(crate) fn list_item_scope(name: &[u8]) -> bool {
    default_scope(name) || matches!(name, b"ol" | b"ul")
}

pub(crate) fn button_scope(name: &[u8]) -> bool {
    default_scope(name) || name == b"button"
}

pub(crate) fn table_scope(name: &[u8]) -> bool {
    matches!(name, b"html" | b"table" | b"template")
}

pub(crate) fn select_scope(name: &[u8]) -> bool {
    !matches!(name, b"optgroup" | b"option")
}

#[derive(Debug, Default)]
pub(crate) struct ElementStack {
    elements: Vec<OpenElement>,
}

impl ElementStack {
    pub(crate) fn push(&mut self, element: OpenElement) {
        self.elements.push(element);
    }

    pub(crate) fn pop(&mut self) -> Option<OpenElement> {
        self.elements.pop()
    }

    pub(crate) fn insert(&mut self, index: usize, element: OpenElement) {
        self.elements.insert(index, element);
    }

    pub(crate) fn remove(&mut self, index: usize) -> OpenElement {
        self.elements.remove(index)
    }

    pub(crate) fn len(&self) -> usize {
        self.elements.len()
    }

    pub(crate) fn get(&self, index: usize) -> Option<&OpenElement> {
        self.elements.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut OpenElement> {
        self.elements.get_mut(index)
    }

    pub(crate) fn iter(&self) -> std::slice::Iter<'_, OpenElement> {
        self.elements.iter()
    }

    /// The current node, i.e. the bottommost element of the stack.
    pub(crate) fn current(&self) -> Option<&OpenElement> {
        self.elements.last()
    }

    pub(crate) fn current_name(&self) -> &[u8] {
        self.current().map_or(&b""[..], |element| element.name.as_slice())
    }

    pub(crate) fn current_is(&self, name: &[u8]) -> bool {
        self.current_name() == name
    }

    pub(crate) fn position(&self, id: NodeId) -> Option<usize> {
        self.elements.iter().rposition(|element| element.id == id)
    }

    pub(crate) fn contains(&self, id: NodeId) -> bool {
        self.position(id).is_some()
    }

    pub(crate) fn contains_name(&self, name: &[u8]) -> bool {
        self.iter_open().any(|element| *element.name == name)
    }

    /// The most recently opened element with this name.
    pub(crate) fn last_named(&self, name: &[u8]) -> Option<&OpenElement> {
        self.iter_open().rev().find(|element| *element.name == name)
    }

    /// All entries that are not orphaned, from the root to the current node.
    pub(crate) fn iter_open(&self) -> impl DoubleEndedIterator<Item = &OpenElement> {
        self.elements.iter().filter(|element| !element.orphaned)
    }

    /// Mark an element as removed from the stack. Returns false if it is not on the stack.
    pub(crate) fn orphan(&mut self, id: NodeId) -> bool {
        match self.position(id).and_then(|index| self.elements.get_mut(index)) {
            Some(element) => {
                element.orphaned = true;
                true
            }
            None => false,
        }
    }

    /// Walk from the current node towards the root. `target` decides a match, `scope` decides
    /// where to give up. A node that is both a target and a scope boundary counts as a match.
    pub(crate) fn has_in_specific_scope(
        &self,
        target: impl Fn(&OpenElement) -> bool,
        scope: impl ElementScope,
    ) -> bool {
        for element in self.iter_open().rev() {
            if target(element) {
                return true;
            }
            if scope.matches(&element.name) {
                return false;
            }
        }

        false
    }

    pub(crate) fn has_in_scope(&self, name: &[u8]) -> bool {
        self.has_in_specific_scope(|e| *e.name == name, default_scope)
    }

    pub(crate) fn has_node_in_scope(&self, id: NodeId) -> bool {
        self.has_in_specific_scope(|e| e.id == id, default_scope)
    }

    pub(crate) fn has_in_list_item_scope(&self, name: &[u8]) -> bool {
        self.has_in_specific_scope(|e| *e.name == name, list_item_scope)
    }

    pub(crate) fn has_in_button_scope(&self, name: &[u8]) -> bool {
        self.has_in_specific_scope(|e| *e.name == name, button_scope)
    }

    pub(crate) fn has_in_table_scope(&self, name: &[u8]) -> bool {
        self.has_in_specific_scope(|e| *e.name == name, table_scope)
    }

    pub(crate) fn has_in_select_scope(&self, name: &[u8]) -> bool {
        self.has_in_specific_scope(|e| *e.name == name, select_scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_stack(names: &[&str]) -> ElementStack {
        let mut stack = ElementStack::default();
        for (i, name) in names.iter().enumerate() {
            stack.push(OpenElement {
                id: NodeId(i as u64),
                name: HtmlString::from(*name),
                tag: StartTag::synthesize(name.as_bytes()),
                anchor: SegmentId(i as u64),
                content: Location::Append,
                orphaned: false,
            });
        }
        stack
    }

    #[test]
    fn default_scope_stops_at_table() {
        let stack = make_stack(&["html", "body", "p", "table", "tbody", "tr", "td", "span"]);
        assert!(stack.has_in_scope(b"span"));
        assert!(stack.has_in_scope(b"td"));
        assert!(!stack.has_in_scope(b"p"));
        assert!(stack.has_in_table_scope(b"tr"));
        assert!(stack.has_in_table_scope(b"table"));
        assert!(!stack.has_in_table_scope(b"body"));
    }

    #[test]
    fn button_and_list_item_scope() {
        let stack = make_stack(&["html", "body", "p", "button", "span"]);
        assert!(stack.has_in_scope(b"p"));
        assert!(!stack.has_in_button_scope(b"p"));

        let stack = make_stack(&["html", "body", "li", "ul", "span"]);
        assert!(stack.has_in_scope(b"li"));
        assert!(!stack.has_in_list_item_scope(b"li"));
    }

    #[test]
    fn select_scope_only_sees_through_options() {
        let stack = make_stack(&["html", "body", "select", "optgroup", "option"]);
        assert!(stack.has_in_select_scope(b"select"));

        let stack = make_stack(&["html", "body", "select", "div", "option"]);
        assert!(!stack.has_in_select_scope(b"select"));
    }

    #[test]
    fn scope_by_identity() {
        let stack = make_stack(&["html", "body", "b", "b"]);
        assert!(stack.has_node_in_scope(NodeId(2)));
        assert_eq!(stack.position(NodeId(3)), Some(3));
        assert!(!stack.contains(NodeId(9)));
        assert_eq!(stack.last_named(b"b").map(|e| e.id), Some(NodeId(3)));
    }

    #[test]
    fn orphans_are_invisible_to_scope_checks() {
        let mut stack = make_stack(&["html", "body", "a", "div", "span"]);
        assert!(stack.orphan(NodeId(2)));
        assert!(!stack.has_in_scope(b"a"));
        assert!(!stack.contains_name(b"a"));
        assert!(stack.last_named(b"a").is_none());
        assert!(stack.has_in_scope(b"body"));
        assert_eq!(stack.len(), 5);
        assert!(!stack.orphan(NodeId(9)));
    }
}
