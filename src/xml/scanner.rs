/// Event kinds produced by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Start,
    End,
    Empty,
}

/// A single element boundary, with the absolute element path and the byte
/// offsets of the tag itself within the scanned text.
#[derive(Debug, Clone)]
pub struct ScanEvent<'a> {
    pub kind: EventKind,
    pub name: &'a str,
    /// Absolute path including this element, e.g. `/project/modules/module`.
    pub path: String,
    /// Offset of the `<` opening the tag.
    pub tag_start: usize,
    /// Offset just past the `>` closing the tag.
    pub tag_end: usize,
}

/// Forward streaming scanner over raw XML text.
///
/// Tracks a stack of open element names to build absolute paths. Comments,
/// CDATA sections, processing instructions and doctype declarations are
/// skipped; quoted attribute values may contain `>`. This is deliberately a
/// plain tokenizer and not a validating parser: the input is a build
/// descriptor that the surrounding tooling has already accepted.
pub struct XmlScanner<'a> {
    text: &'a str,
    pos: usize,
    stack: Vec<&'a str>,
}

impl<'a> XmlScanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            stack: Vec::new(),
        }
    }

    /// Next element boundary, or `None` at end of input.
    pub fn next_event(&mut self) -> Option<ScanEvent<'a>> {
        loop {
            let lt = self.text[self.pos..].find('<')? + self.pos;
            let rest = &self.text[lt..];

            if let Some(skip) = skip_len(rest) {
                self.pos = lt + skip;
                continue;
            }

            let gt = self.find_tag_end(lt)?;
            self.pos = gt + 1;

            let inner = &self.text[lt + 1..gt];

            if let Some(closing) = inner.strip_prefix('/') {
                let name = closing.trim();
                let path = self.path();
                self.stack.pop();
                return Some(ScanEvent {
                    kind: EventKind::End,
                    name,
                    path,
                    tag_start: lt,
                    tag_end: gt + 1,
                });
            }

            let empty = inner.trim_end().ends_with('/');
            let name = element_name(inner);
            if name.is_empty() {
                continue;
            }

            if empty {
                let path = format!("{}/{}", self.path(), name);
                return Some(ScanEvent {
                    kind: EventKind::Empty,
                    name,
                    path,
                    tag_start: lt,
                    tag_end: gt + 1,
                });
            }

            self.stack.push(name);
            return Some(ScanEvent {
                kind: EventKind::Start,
                name,
                path: self.path(),
                tag_start: lt,
                tag_end: gt + 1,
            });
        }
    }

    /// Offset of the `>` ending the tag opened at `lt`, quote-aware.
    fn find_tag_end(&self, lt: usize) -> Option<usize> {
        let bytes = self.text.as_bytes();
        let mut quote: Option<u8> = None;
        for (i, &b) in bytes.iter().enumerate().skip(lt + 1) {
            match quote {
                Some(q) => {
                    if b == q {
                        quote = None;
                    }
                }
                None => match b {
                    b'"' | b'\'' => quote = Some(b),
                    b'>' => return Some(i),
                    _ => {}
                },
            }
        }
        None
    }

    fn path(&self) -> String {
        let mut path = String::new();
        for name in &self.stack {
            path.push('/');
            path.push_str(name);
        }
        path
    }
}

/// Length of a non-element construct starting at `rest`, if any.
fn skip_len(rest: &str) -> Option<usize> {
    for (open, close) in [
        ("<!--", "-->"),
        ("<![CDATA[", "]]>"),
        ("<?", "?>"),
    ] {
        if rest.starts_with(open) {
            return match rest[open.len()..].find(close) {
                Some(end) => Some(open.len() + end + close.len()),
                // unterminated construct swallows the rest of the input
                None => Some(rest.len()),
            };
        }
    }

    // doctype or other declarations
    if rest.starts_with("<!") {
        return match rest.find('>') {
            Some(end) => Some(end + 1),
            None => Some(rest.len()),
        };
    }

    None
}

/// Element name of a start tag body: everything up to the first whitespace
/// or the self-closing slash.
fn element_name(inner: &str) -> &str {
    let trimmed = inner.trim();
    let end = trimmed
        .find(|c: char| c.is_whitespace() || c == '/')
        .unwrap_or(trimmed.len());
    &trimmed[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_nested_paths() {
        let xml = "<project><modules><module>a</module></modules></project>";
        let mut scanner = XmlScanner::new(xml);

        let ev = scanner.next_event().unwrap();
        assert_eq!((ev.kind, ev.path.as_str()), (EventKind::Start, "/project"));

        let ev = scanner.next_event().unwrap();
        assert_eq!(ev.path, "/project/modules");

        let ev = scanner.next_event().unwrap();
        assert_eq!(ev.path, "/project/modules/module");

        let ev = scanner.next_event().unwrap();
        assert_eq!((ev.kind, ev.path.as_str()), (EventKind::End, "/project/modules/module"));
    }

    #[test]
    fn start_tag_offsets_bracket_the_content() {
        let xml = "<a><b>text</b></a>";
        let mut scanner = XmlScanner::new(xml);
        scanner.next_event().unwrap();
        let start = scanner.next_event().unwrap();
        let end = scanner.next_event().unwrap();
        assert_eq!(&xml[start.tag_end..end.tag_start], "text");
    }

    #[test]
    fn skips_comments_cdata_and_declarations() {
        let xml = r#"<?xml version="1.0"?><!-- <fake> --><root><![CDATA[<not-a-tag>]]><child/></root>"#;
        let mut scanner = XmlScanner::new(xml);

        let ev = scanner.next_event().unwrap();
        assert_eq!(ev.path, "/root");

        let ev = scanner.next_event().unwrap();
        assert_eq!((ev.kind, ev.path.as_str()), (EventKind::Empty, "/root/child"));

        let ev = scanner.next_event().unwrap();
        assert_eq!(ev.kind, EventKind::End);
        assert!(scanner.next_event().is_none());
    }

    #[test]
    fn tolerates_gt_inside_attribute_values() {
        let xml = r#"<root attr="a > b"><leaf/></root>"#;
        let mut scanner = XmlScanner::new(xml);
        let ev = scanner.next_event().unwrap();
        assert_eq!(ev.name, "root");
        let ev = scanner.next_event().unwrap();
        assert_eq!(ev.name, "leaf");
    }

    #[test]
    fn empty_elements_do_not_alter_the_stack() {
        let xml = "<a><b/><c>x</c></a>";
        let mut scanner = XmlScanner::new(xml);
        scanner.next_event().unwrap();
        scanner.next_event().unwrap();
        let ev = scanner.next_event().unwrap();
        assert_eq!(ev.path, "/a/c");
    }
}
