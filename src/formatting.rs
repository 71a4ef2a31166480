//! The list of active formatting elements.
//!
//! See <https://html.spec.whatwg.org/multipage/parsing.html#list-of-active-formatting-elements>
use crate::stack::NodeId;
use crate::token::{HtmlString, StartTag};

#[derive(Debug, Clone)]
pub(crate) struct FormattingElement {
    /// The element this entry stands for. It may since have been popped off the stack.
    pub(crate) id: NodeId,
    pub(crate) name: HtmlString,
    pub(crate) tag: StartTag,
}

#[derive(Debug, Clone)]
pub(crate) enum Entry {
    Marker,
    Element(FormattingElement),
}

impl Entry {
    pub(crate) fn element(&self) -> Option<&FormattingElement> {
        match self {
            Entry::Marker => None,
            Entry::Element(element) => Some(element),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct ActiveFormattingList {
    entries: Vec<Entry>,
}

impl ActiveFormattingList {
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    pub(crate) fn last(&self) -> Option<&Entry> {
        self.entries.last()
    }

    pub(crate) fn push_marker(&mut self) {
        self.entries.push(Entry::Marker);
    }

    /// Push an element, first applying the Noah's Ark clause: if three entries after the last
    /// marker already have the same name and attributes, the earliest of them is dropped.
    pub(crate) fn push(&mut self, element: FormattingElement) {
        let attributes = element.tag.attributes();
        let mut identical = Vec::new();
        for (i, entry) in self.entries.iter().enumerate().rev() {
            match entry {
                Entry::Marker => break,
                Entry::Element(other) => {
                    if other.name == element.name && other.tag.attributes() == attributes {
                        identical.push(i);
                    }
                }
            }
        }

        if identical.len() >= 3 {
            if let Some(&earliest) = identical.last() {
                self.entries.remove(earliest);
            }
        }

        self.entries.push(Entry::Element(element));
    }

    pub(crate) fn insert(&mut self, index: usize, element: FormattingElement) {
        let index = index.min(self.entries.len());
        self.entries.insert(index, Entry::Element(element));
    }

    pub(crate) fn replace(&mut self, index: usize, element: FormattingElement) {
        if let Some(entry) = self.entries.get_mut(index) {
            *entry = Entry::Element(element);
        }
    }

    pub(crate) fn position(&self, id: NodeId) -> Option<usize> {
        self.entries
            .iter()
            .rposition(|entry| entry.element().map_or(false, |e| e.id == id))
    }

    pub(crate) fn contains(&self, id: NodeId) -> bool {
        self.position(id).is_some()
    }

    pub(crate) fn remove(&mut self, id: NodeId) -> Option<usize> {
        let index = self.position(id)?;
        self.entries.remove(index);
        Some(index)
    }

    /// The last element with this name between the end of the list and the last marker.
    pub(crate) fn last_before_marker(&self, name: &[u8]) -> Option<&FormattingElement> {
        for entry in self.entries.iter().rev() {
            match entry {
                Entry::Marker => return None,
                Entry::Element(element) if *element.name == name => return Some(element),
                Entry::Element(_) => {}
            }
        }

        None
    }

    pub(crate) fn clear_to_last_marker(&mut self) {
        while let Some(entry) = self.entries.pop() {
            if let Entry::Marker = entry {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(id: u64, raw: &str) -> FormattingElement {
        let tag = StartTag::from_raw(raw);
        FormattingElement {
            id: NodeId(id),
            name: tag.name.clone(),
            tag,
        }
    }

    #[test]
    fn markers_delimit_lookup() {
        let mut list = ActiveFormattingList::default();
        list.push(element(1, "<b>"));
        list.push_marker();
        list.push(element(2, "<i>"));

        assert!(list.last_before_marker(b"b").is_none());
        assert_eq!(list.last_before_marker(b"i").map(|e| e.id), Some(NodeId(2)));

        list.clear_to_last_marker();
        assert_eq!(list.len(), 1);
        assert_eq!(list.last_before_marker(b"b").map(|e| e.id), Some(NodeId(1)));
    }

    #[test]
    fn noahs_ark() {
        let mut list = ActiveFormattingList::default();
        for id in 0..4 {
            list.push(element(id, "<b class=x>"));
        }
        assert_eq!(list.len(), 3);
        assert!(!list.contains(NodeId(0)));

        // different attributes are different elements
        list.push(element(9, "<b class=y>"));
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn remove_and_reinsert() {
        let mut list = ActiveFormattingList::default();
        list.push(element(1, "<a>"));
        list.push(element(2, "<b>"));
        assert_eq!(list.remove(NodeId(1)), Some(0));
        list.insert(1, element(3, "<a>"));
        assert_eq!(list.position(NodeId(2)), Some(0));
        assert_eq!(list.position(NodeId(3)), Some(1));
    }
}
