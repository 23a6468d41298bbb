use crate::error::{Result, ScmError};
use crate::maven::pom::read_pom;
use crate::maven::version::next_snapshot;
use crate::xml::{PatchOutcome, add_module, replace_dependency_version, replace_element_text};
use std::fs;
use std::path::Path;

/// A single version substitution, applied once to the checked-out module's
/// own version and once to the consumer's dependency declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionChange {
    pub group_id: String,
    pub artifact_id: String,
    pub old_version: String,
    pub new_version: String,
}

/// Compute the snapshot version change from the dependency the invoking
/// project declares for `group_id:artifact_id`. Matching ignores the
/// declared version; a missing declaration is fatal.
pub fn plan_version_change(
    consumer_pom: &Path,
    group_id: &str,
    artifact_id: &str,
) -> Result<VersionChange> {
    let model = read_pom(consumer_pom)?;

    let dependency = model.find_dependency(group_id, artifact_id).ok_or_else(|| {
        ScmError::DependencyNotDeclared(format!(
            "{}:{} is not declared in {}",
            group_id,
            artifact_id,
            consumer_pom.display()
        ))
    })?;

    let old_version = dependency.version.clone().ok_or_else(|| {
        ScmError::DependencyNotDeclared(format!(
            "{}:{} is declared in {} without a literal version to bump",
            group_id,
            artifact_id,
            consumer_pom.display()
        ))
    })?;

    let new_version = next_snapshot(&old_version)?;

    Ok(VersionChange {
        group_id: group_id.to_string(),
        artifact_id: artifact_id.to_string(),
        old_version,
        new_version,
    })
}

/// Rewrite the checked-out module's own `/project/version` element in place.
pub fn patch_module_pom(pom_path: &Path, change: &VersionChange) -> Result<()> {
    let text = read_text(pom_path)?;
    let outcome = replace_element_text(
        &text,
        "/project/version",
        Some(&change.old_version),
        &change.new_version,
    );
    write_patched(pom_path, outcome, &change.old_version)
}

/// Rewrite the invoking project's dependency declaration in place.
pub fn patch_consumer_pom(pom_path: &Path, change: &VersionChange) -> Result<()> {
    let text = read_text(pom_path)?;
    let outcome = replace_dependency_version(
        &text,
        &change.group_id,
        &change.artifact_id,
        Some(&change.old_version),
        &change.new_version,
    );
    write_patched(pom_path, outcome, &change.old_version)
}

/// Register the module in an aggregator POM, once. Membership is pre-checked
/// against the parsed module list; already present is a reported no-op.
pub fn register_module(aggregator_pom: &Path, artifact_id: &str) -> Result<bool> {
    let model = read_pom(aggregator_pom)?;
    if model.module_list().iter().any(|m| m == artifact_id) {
        return Ok(false);
    }

    let text = read_text(aggregator_pom)?;
    let (patched, changed) = add_module(&text, artifact_id);
    if !changed {
        return Err(ScmError::PatchApplication(format!(
            "{} has no <modules> section to register '{}' in",
            aggregator_pom.display(),
            artifact_id
        )));
    }

    write_text(aggregator_pom, &patched)?;
    Ok(true)
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        ScmError::PatchApplication(format!("failed to read {}: {}", path.display(), e))
    })
}

fn write_text(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text).map_err(|e| {
        ScmError::PatchApplication(format!("failed to write {}: {}", path.display(), e))
    })
}

/// The orchestrated flow requires the rewrite to land: an unapplied patch is
/// surfaced as a fatal error carrying what was actually found.
fn write_patched(path: &Path, outcome: PatchOutcome, expected: &str) -> Result<()> {
    match outcome {
        PatchOutcome::Applied(patched) => write_text(path, &patched),
        PatchOutcome::NotFound => Err(ScmError::PatchApplication(format!(
            "no matching version element found in {}",
            path.display()
        ))),
        PatchOutcome::Mismatch { found } => Err(ScmError::PatchApplication(format!(
            "{} declares version '{}' where '{}' was expected",
            path.display(),
            found,
            expected
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const CONSUMER: &str = r#"<project>
  <groupId>org.example</groupId>
  <artifactId>consumer</artifactId>
  <version>0.1</version>
  <dependencies>
    <dependency>
      <groupId>org.example</groupId>
      <artifactId>widget</artifactId>
      <version>1.2</version>
    </dependency>
  </dependencies>
</project>
"#;

    const MODULE: &str = r#"<project>
  <groupId>org.example</groupId>
  <artifactId>widget</artifactId>
  <version>1.2</version>
</project>
"#;

    #[test]
    fn plans_the_next_snapshot_from_the_declared_version() {
        let dir = tempdir().unwrap();
        let pom = dir.path().join("pom.xml");
        fs::write(&pom, CONSUMER).unwrap();

        let change = plan_version_change(&pom, "org.example", "widget").unwrap();
        assert_eq!(change.old_version, "1.2");
        assert_eq!(change.new_version, "1.3-SNAPSHOT");
    }

    #[test]
    fn undeclared_dependency_is_fatal() {
        let dir = tempdir().unwrap();
        let pom = dir.path().join("pom.xml");
        fs::write(&pom, CONSUMER).unwrap();

        let err = plan_version_change(&pom, "org.example", "gadget").unwrap_err();
        assert!(matches!(err, ScmError::DependencyNotDeclared(_)));
    }

    #[test]
    fn patches_both_pom_files_in_place() {
        let dir = tempdir().unwrap();
        let module_pom = dir.path().join("module.xml");
        let consumer_pom = dir.path().join("consumer.xml");
        fs::write(&module_pom, MODULE).unwrap();
        fs::write(&consumer_pom, CONSUMER).unwrap();

        let change = plan_version_change(&consumer_pom, "org.example", "widget").unwrap();
        patch_module_pom(&module_pom, &change).unwrap();
        patch_consumer_pom(&consumer_pom, &change).unwrap();

        let module = fs::read_to_string(&module_pom).unwrap();
        let consumer = fs::read_to_string(&consumer_pom).unwrap();
        assert!(module.contains("<version>1.3-SNAPSHOT</version>"));
        assert!(consumer.contains("<version>1.3-SNAPSHOT</version>"));
        // the consumer's own version is not the patch target
        assert!(consumer.contains("<version>0.1</version>"));
    }

    #[test]
    fn version_mismatch_leaves_the_file_untouched() {
        let dir = tempdir().unwrap();
        let module_pom = dir.path().join("module.xml");
        fs::write(&module_pom, MODULE).unwrap();

        let change = VersionChange {
            group_id: "org.example".to_string(),
            artifact_id: "widget".to_string(),
            old_version: "9.9".to_string(),
            new_version: "10.0-SNAPSHOT".to_string(),
        };

        let err = patch_module_pom(&module_pom, &change).unwrap_err();
        assert!(matches!(err, ScmError::PatchApplication(_)));
        assert_eq!(fs::read_to_string(&module_pom).unwrap(), MODULE);
    }

    #[test]
    fn registers_the_module_once() {
        let dir = tempdir().unwrap();
        let aggregator = dir.path().join("pom.xml");
        fs::write(
            &aggregator,
            "<project>\n  <artifactId>aggregator</artifactId>\n  <modules>\n    <module>existing</module>\n  </modules>\n</project>\n",
        )
        .unwrap();

        assert!(register_module(&aggregator, "widget").unwrap());
        // second call pre-checks membership and reports a no-op
        assert!(!register_module(&aggregator, "widget").unwrap());

        let text = fs::read_to_string(&aggregator).unwrap();
        assert_eq!(text.matches("<module>widget</module>").count(), 1);
    }

    #[test]
    fn registering_without_a_modules_section_is_an_error() {
        let dir = tempdir().unwrap();
        let aggregator = dir.path().join("pom.xml");
        fs::write(&aggregator, "<project>\n  <artifactId>x</artifactId>\n</project>\n").unwrap();

        let err = register_module(&aggregator, "widget").unwrap_err();
        assert!(matches!(err, ScmError::PatchApplication(_)));
    }
}
