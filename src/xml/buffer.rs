/// An in-memory copy of a POM's raw text with indexed byte-offset bookmarks.
///
/// A span replacement touches only the bytes strictly between two bookmarks.
/// Bookmarks are invalidated by every edit, so multi-edit callers must rescan
/// the text between edits instead of reusing offsets.
#[derive(Debug)]
pub struct XmlEditBuffer {
    text: String,
    marks: [Option<usize>; 2],
}

impl XmlEditBuffer {
    pub fn new(text: String) -> Self {
        Self {
            text,
            marks: [None, None],
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn mark(&mut self, index: usize, offset: usize) {
        self.marks[index] = Some(offset);
    }

    pub fn is_marked(&self, index: usize) -> bool {
        self.marks[index].is_some()
    }

    /// The text strictly between two bookmarks, if both are set in order.
    pub fn between(&self, from: usize, to: usize) -> Option<&str> {
        let (a, b) = (self.marks[from]?, self.marks[to]?);
        if a > b {
            return None;
        }
        Some(&self.text[a..b])
    }

    /// Replace the span between two bookmarks. All bookmarks are cleared
    /// because their offsets no longer refer to the edited text.
    pub fn replace_between(&mut self, from: usize, to: usize, replacement: &str) -> bool {
        let (Some(a), Some(b)) = (self.marks[from], self.marks[to]) else {
            return false;
        };
        if a > b {
            return false;
        }

        self.text.replace_range(a..b, replacement);
        self.marks = [None, None];
        true
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_only_the_marked_span() {
        let mut buffer = XmlEditBuffer::new("<v>2.5</v>".to_string());
        buffer.mark(0, 3);
        buffer.mark(1, 6);
        assert_eq!(buffer.between(0, 1), Some("2.5"));
        assert!(buffer.replace_between(0, 1, "2.6-SNAPSHOT"));
        assert_eq!(buffer.text(), "<v>2.6-SNAPSHOT</v>");
    }

    #[test]
    fn edits_clear_bookmarks() {
        let mut buffer = XmlEditBuffer::new("abcdef".to_string());
        buffer.mark(0, 1);
        buffer.mark(1, 3);
        assert!(buffer.replace_between(0, 1, "X"));
        assert!(!buffer.is_marked(0));
        assert!(!buffer.replace_between(0, 1, "Y"));
    }

    #[test]
    fn refuses_unset_or_inverted_marks() {
        let mut buffer = XmlEditBuffer::new("abcdef".to_string());
        assert!(!buffer.replace_between(0, 1, "X"));
        buffer.mark(0, 4);
        buffer.mark(1, 2);
        assert_eq!(buffer.between(0, 1), None);
        assert!(!buffer.replace_between(0, 1, "X"));
        assert_eq!(buffer.text(), "abcdef");
    }
}
