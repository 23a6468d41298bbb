use crate::xml::buffer::XmlEditBuffer;
use crate::xml::scanner::{EventKind, XmlScanner};

/// Insert a `<module>` entry for `artifact_id` into the `<modules>` block,
/// immediately before the first existing module, or at the container point
/// when the block is empty.
///
/// The scan always inserts when a container is present: duplicate prevention
/// is the caller's responsibility, checked against the parsed module list
/// before calling. Returns the (possibly unchanged) text and whether an
/// insertion was made.
pub fn add_module(xml: &str, artifact_id: &str) -> (String, bool) {
    let mut buffer = XmlEditBuffer::new(xml.to_string());
    let mut scanner = XmlScanner::new(xml);

    while let Some(event) = scanner.next_event() {
        match (event.kind, event.path.as_str()) {
            (EventKind::Start, "/project/modules") => {
                buffer.mark(0, event.tag_end);
            }
            (EventKind::Start, "/project/modules/module") if buffer.is_marked(0) => {
                buffer.mark(1, event.tag_start);
                let original = buffer.between(0, 1).unwrap_or_default().to_string();
                buffer.replace_between(
                    0,
                    1,
                    &format!("\n    <module>{artifact_id}</module>{original}"),
                );
                return (buffer.into_text(), true);
            }
            (EventKind::End, "/project/modules") if buffer.is_marked(0) => {
                // container present but holds no module yet
                buffer.mark(1, event.tag_start);
                buffer.replace_between(0, 1, &format!("\n    <module>{artifact_id}</module>\n  "));
                return (buffer.into_text(), true);
            }
            _ => {}
        }
    }

    (buffer.into_text(), false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const AGGREGATOR: &str = r#"<project>
  <artifactId>aggregator</artifactId>
  <modules>
    <module>existing</module>
  </modules>
</project>
"#;

    #[test]
    fn inserts_before_the_first_module() {
        let (patched, changed) = add_module(AGGREGATOR, "widget");
        assert!(changed);

        let widget = patched.find("<module>widget</module>").unwrap();
        let existing = patched.find("<module>existing</module>").unwrap();
        assert!(widget < existing);
    }

    #[test]
    fn inserts_into_an_empty_container() {
        let xml = "<project>\n  <modules>\n  </modules>\n</project>\n";
        let (patched, changed) = add_module(xml, "widget");
        assert!(changed);
        assert!(patched.contains("<module>widget</module>"));
    }

    #[test]
    fn no_container_means_no_change() {
        let xml = "<project>\n  <artifactId>plain</artifactId>\n</project>\n";
        let (patched, changed) = add_module(xml, "widget");
        assert!(!changed);
        assert_eq!(patched, xml);
    }

    #[test]
    fn double_apply_duplicates_without_a_membership_precheck() {
        // the scan itself always inserts; deduplication is the caller's job
        let (once, _) = add_module(AGGREGATOR, "widget");
        let (twice, changed) = add_module(&once, "widget");
        assert!(changed);
        assert_eq!(twice.matches("<module>widget</module>").count(), 2);
    }

    #[test]
    fn surrounding_formatting_is_preserved() {
        let (patched, _) = add_module(AGGREGATOR, "widget");
        assert!(patched.contains("  <artifactId>aggregator</artifactId>"));
        assert!(patched.ends_with("</project>\n"));
    }
}
