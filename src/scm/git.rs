use crate::error::{Result, ScmError};
use crate::scm::{ScmClient, ScmOutcome, ScmRepository, ScmVersion};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

/// Default SCM client backed by the `git` command line.
///
/// Checkout is a clone (branch and tag selectors map onto `--branch`, a
/// revision is checked out after a full clone); export is a clone with the
/// `.git` directory stripped afterwards.
pub struct GitScmClient;

impl GitScmClient {
    pub fn new() -> Self {
        Self
    }

    fn ensure_git_provider(repository: &ScmRepository) -> Result<()> {
        if repository.provider == "git" {
            return Ok(());
        }

        Err(ScmError::Transport(format!(
            "unsupported SCM provider '{}' (only 'git' is available)",
            repository.provider
        )))
    }

    fn validate_destination(destination: &Path) -> Result<()> {
        let dangerous = [';', '|', '&', '$', '`', '\n', '\r'];
        let path_str = destination.to_string_lossy();
        if let Some(ch) = dangerous.iter().find(|c| path_str.contains(**c)) {
            return Err(ScmError::Transport(format!(
                "destination path contains dangerous character: '{}'",
                ch
            )));
        }
        Ok(())
    }

    fn clone_into(
        &self,
        repository: &ScmRepository,
        destination: &Path,
        version: Option<&ScmVersion>,
        shallow: bool,
    ) -> Result<ScmOutcome> {
        let dest = destination.to_string_lossy().into_owned();
        let mut args: Vec<&str> = vec!["clone"];

        // a pinned revision needs history to check out afterwards
        let pinned_revision = matches!(version, Some(ScmVersion::Revision(_)));
        if shallow && !pinned_revision {
            args.extend(["--depth", "1"]);
        }

        match version {
            Some(ScmVersion::Branch(name)) | Some(ScmVersion::Tag(name)) => {
                args.extend(["--branch", name]);
            }
            _ => {}
        }

        args.push(&repository.provider_url);
        args.push(&dest);

        let output = run_git(&args, None)?;
        if !output.status.success() {
            return Ok(ScmOutcome::failure(stderr_of(&output)));
        }

        if let Some(ScmVersion::Revision(rev)) = version {
            let output = run_git(&["checkout", "--quiet", rev], Some(destination))?;
            if !output.status.success() {
                return Ok(ScmOutcome::failure(stderr_of(&output)));
            }
        }

        Ok(ScmOutcome::success(format!(
            "cloned {} into {}",
            repository.provider_url,
            destination.display()
        )))
    }
}

impl Default for GitScmClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ScmClient for GitScmClient {
    fn checkout(
        &self,
        repository: &ScmRepository,
        destination: &Path,
        version: Option<&ScmVersion>,
    ) -> Result<ScmOutcome> {
        Self::ensure_git_provider(repository)?;
        Self::validate_destination(destination)?;
        self.clone_into(repository, destination, version, false)
    }

    fn export(
        &self,
        repository: &ScmRepository,
        destination: &Path,
        version: Option<&ScmVersion>,
    ) -> Result<ScmOutcome> {
        Self::ensure_git_provider(repository)?;
        Self::validate_destination(destination)?;

        let outcome = self.clone_into(repository, destination, version, true)?;
        if !outcome.success {
            return Ok(outcome);
        }

        let git_dir = destination.join(".git");
        if git_dir.is_dir() {
            fs::remove_dir_all(&git_dir).map_err(|e| {
                ScmError::Transport(format!(
                    "failed to strip SCM metadata {}: {}",
                    git_dir.display(),
                    e
                ))
            })?;
        }

        Ok(ScmOutcome::success(format!(
            "exported {} into {}",
            repository.provider_url,
            destination.display()
        )))
    }
}

fn run_git(args: &[&str], cwd: Option<&Path>) -> Result<Output> {
    let mut command = Command::new("git");
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }
    command.args(args).output().map_err(|e| {
        ScmError::Transport(format!(
            "failed to execute git command '{}': {e}",
            args.join(" ")
        ))
    })
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_git_providers() {
        let repo = ScmRepository::parse("scm:svn:https://svn.apache.org/repos/asf").unwrap();
        let err = GitScmClient::new()
            .checkout(&repo, Path::new("/tmp/never-used"), None)
            .unwrap_err();
        assert!(matches!(err, ScmError::Transport(_)));
    }

    #[test]
    fn rejects_dangerous_destination_paths() {
        let repo = ScmRepository::parse("scm:git:https://example.com/widget.git").unwrap();
        let err = GitScmClient::new()
            .checkout(&repo, Path::new("/tmp/evil;rm"), None)
            .unwrap_err();
        assert!(matches!(err, ScmError::Transport(_)));
    }

    #[test]
    fn clone_failure_is_a_reported_outcome_not_a_panic() {
        let dir = tempfile::tempdir().unwrap();
        let repo = ScmRepository {
            provider: "git".to_string(),
            provider_url: dir.path().join("no-such-repo").display().to_string(),
        };
        let outcome = GitScmClient::new()
            .checkout(&repo, &dir.path().join("dest"), None)
            .unwrap();
        assert!(!outcome.success);
        assert!(outcome.provider_message.is_some());
    }
}
