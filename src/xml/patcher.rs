use crate::xml::buffer::XmlEditBuffer;
use crate::xml::scanner::{EventKind, XmlScanner};

/// Result of a minimal-diff patch attempt.
///
/// `NotFound` and `Mismatch` are inspectable outcomes, not errors: callers
/// decide whether an unapplied patch is acceptable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The patched text, differing from the input only inside the target span.
    Applied(String),
    /// The target path never matched; the input is unchanged.
    NotFound,
    /// The element was found but its text did not match the expected value.
    Mismatch { found: String },
}

/// Replace the text content of the first element matching `target_path`,
/// leaving every byte outside that span untouched.
///
/// Single-shot: the first match wins and scanning stops there. When
/// `expected` is given, the current (trimmed) text must equal it or the
/// patch reports a mismatch instead of applying.
pub fn replace_element_text(
    xml: &str,
    target_path: &str,
    expected: Option<&str>,
    replacement: &str,
) -> PatchOutcome {
    let mut buffer = XmlEditBuffer::new(xml.to_string());
    let mut scanner = XmlScanner::new(xml);

    while let Some(event) = scanner.next_event() {
        match event.kind {
            EventKind::Start if event.path == target_path => {
                buffer.mark(0, event.tag_end);
            }
            EventKind::End if event.path == target_path && buffer.is_marked(0) => {
                buffer.mark(1, event.tag_start);
                let found = buffer
                    .between(0, 1)
                    .map(|s| s.trim().to_string())
                    .unwrap_or_default();

                if let Some(expected) = expected {
                    if found != expected {
                        return PatchOutcome::Mismatch { found };
                    }
                }

                buffer.replace_between(0, 1, replacement);
                return PatchOutcome::Applied(buffer.into_text());
            }
            _ => {}
        }
    }

    PatchOutcome::NotFound
}

/// Replace the `<version>` of the `<dependency>` whose groupId and artifactId
/// match. The declared version plays no part in locating the dependency.
///
/// Two passes: the first scan finds the matching dependency element's span,
/// a second scan over that span patches its version child.
pub fn replace_dependency_version(
    xml: &str,
    group_id: &str,
    artifact_id: &str,
    expected: Option<&str>,
    replacement: &str,
) -> PatchOutcome {
    let Some((start, end)) = find_dependency_span(xml, group_id, artifact_id) else {
        return PatchOutcome::NotFound;
    };

    match replace_element_text(&xml[start..end], "/dependency/version", expected, replacement) {
        PatchOutcome::Applied(patched) => {
            let mut out = String::with_capacity(xml.len() + replacement.len());
            out.push_str(&xml[..start]);
            out.push_str(&patched);
            out.push_str(&xml[end..]);
            PatchOutcome::Applied(out)
        }
        other => other,
    }
}

/// Byte span of the first `/project/dependencies/dependency` element whose
/// groupId and artifactId children match.
fn find_dependency_span(xml: &str, group_id: &str, artifact_id: &str) -> Option<(usize, usize)> {
    const DEP: &str = "/project/dependencies/dependency";
    const GROUP: &str = "/project/dependencies/dependency/groupId";
    const ARTIFACT: &str = "/project/dependencies/dependency/artifactId";

    let mut scanner = XmlScanner::new(xml);
    let mut dep_start: Option<usize> = None;
    let mut text_start: Option<usize> = None;
    let mut group: Option<&str> = None;
    let mut artifact: Option<&str> = None;

    while let Some(event) = scanner.next_event() {
        match (event.kind, event.path.as_str()) {
            (EventKind::Start, DEP) => {
                dep_start = Some(event.tag_start);
                group = None;
                artifact = None;
            }
            (EventKind::Start, GROUP | ARTIFACT) => {
                text_start = Some(event.tag_end);
            }
            (EventKind::End, GROUP) => {
                if let Some(begin) = text_start.take() {
                    group = Some(xml[begin..event.tag_start].trim());
                }
            }
            (EventKind::End, ARTIFACT) => {
                if let Some(begin) = text_start.take() {
                    artifact = Some(xml[begin..event.tag_start].trim());
                }
            }
            (EventKind::End, DEP) => {
                if group == Some(group_id) && artifact == Some(artifact_id) {
                    return dep_start.map(|start| (start, event.tag_end));
                }
                dep_start = None;
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- hand-maintained: formatting matters -->
<project>
  <groupId>org.example</groupId>
  <artifactId>consumer</artifactId>
  <version>0.9</version>
  <dependencies>
    <dependency>
      <groupId>org.example</groupId>
      <artifactId>widget</artifactId>
      <version>1.2</version>
    </dependency>
    <dependency>
      <groupId>junit</groupId>
      <artifactId>junit</artifactId>
      <version>3.8.2</version>
      <scope>test</scope>
    </dependency>
  </dependencies>
</project>
"#;

    #[test]
    fn patches_the_project_version_only() {
        let PatchOutcome::Applied(patched) =
            replace_element_text(POM, "/project/version", Some("0.9"), "1.0-SNAPSHOT")
        else {
            panic!("expected the patch to apply");
        };

        assert!(patched.contains("<version>1.0-SNAPSHOT</version>"));
        // every byte outside the patched span is untouched
        let expected = POM.replacen("<version>0.9</version>", "<version>1.0-SNAPSHOT</version>", 1);
        assert_eq!(patched, expected);
        assert!(patched.contains("<!-- hand-maintained: formatting matters -->"));
    }

    #[test]
    fn missing_path_is_a_noop_not_an_error() {
        let outcome = replace_element_text(POM, "/project/packaging", None, "pom");
        assert_eq!(outcome, PatchOutcome::NotFound);
    }

    #[test]
    fn reports_a_mismatch_without_editing() {
        let outcome = replace_element_text(POM, "/project/version", Some("7.7"), "8.0");
        assert_eq!(
            outcome,
            PatchOutcome::Mismatch {
                found: "0.9".to_string()
            }
        );
    }

    #[test]
    fn first_match_wins() {
        let xml = "<project><version>1</version><version>2</version></project>";
        let PatchOutcome::Applied(patched) =
            replace_element_text(xml, "/project/version", None, "9")
        else {
            panic!("expected the patch to apply");
        };
        assert_eq!(patched, "<project><version>9</version><version>2</version></project>");
    }

    #[test]
    fn dependency_patch_matches_on_group_and_artifact_only() {
        let PatchOutcome::Applied(patched) =
            replace_dependency_version(POM, "junit", "junit", Some("3.8.2"), "4.0")
        else {
            panic!("expected the patch to apply");
        };

        assert!(patched.contains("<version>4.0</version>"));
        // the other dependency and the project version are untouched
        assert!(patched.contains("<version>1.2</version>"));
        assert!(patched.contains("<version>0.9</version>"));
    }

    #[test]
    fn dependency_patch_misses_undeclared_artifacts() {
        let outcome = replace_dependency_version(POM, "org.example", "gadget", None, "2.0");
        assert_eq!(outcome, PatchOutcome::NotFound);
    }

    #[test]
    fn dependency_mismatch_carries_the_found_version() {
        let outcome = replace_dependency_version(POM, "org.example", "widget", Some("9.9"), "2.0");
        assert_eq!(
            outcome,
            PatchOutcome::Mismatch {
                found: "1.2".to_string()
            }
        );
    }

    #[test]
    fn ignores_matching_paths_inside_comments() {
        let xml = "<project><!-- <version>0</version> --><version>1</version></project>";
        let PatchOutcome::Applied(patched) =
            replace_element_text(xml, "/project/version", Some("1"), "2")
        else {
            panic!("expected the patch to apply");
        };
        assert_eq!(patched, "<project><!-- <version>0</version> --><version>2</version></project>");
    }
}
