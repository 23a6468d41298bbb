use crate::error::{Result, ScmError};
use std::path::Path;

pub mod git;
pub use git::GitScmClient;

/// An SCM repository location parsed from a Maven connection URL of the form
/// `scm:<provider>:<provider-url>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScmRepository {
    pub provider: String,
    pub provider_url: String,
}

impl ScmRepository {
    pub fn parse(connection: &str) -> Result<Self> {
        let rest = connection.strip_prefix("scm:").ok_or_else(|| {
            ScmError::Transport(format!(
                "connection URL must look like scm:<provider>:<url>, got '{connection}'"
            ))
        })?;

        let (provider, provider_url) = rest.split_once(':').ok_or_else(|| {
            ScmError::Transport(format!(
                "connection URL is missing a provider-specific part: '{connection}'"
            ))
        })?;

        if provider.is_empty() || provider_url.is_empty() {
            return Err(ScmError::Transport(format!(
                "connection URL has an empty provider or URL: '{connection}'"
            )));
        }

        Ok(Self {
            provider: provider.to_string(),
            provider_url: provider_url.to_string(),
        })
    }
}

/// Which branch, tag or revision to materialize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScmVersion {
    Branch(String),
    Tag(String),
    Revision(String),
}

impl ScmVersion {
    pub fn from_type_and_value(version_type: &str, value: &str) -> Result<Self> {
        match version_type {
            "branch" => Ok(ScmVersion::Branch(value.to_string())),
            "tag" => Ok(ScmVersion::Tag(value.to_string())),
            "revision" => Ok(ScmVersion::Revision(value.to_string())),
            other => Err(ScmError::Configuration(format!(
                "unknown scmVersionType '{other}' (expected branch, tag or revision)"
            ))),
        }
    }

    pub fn value(&self) -> &str {
        match self {
            ScmVersion::Branch(v) | ScmVersion::Tag(v) | ScmVersion::Revision(v) => v,
        }
    }
}

/// Provider-reported result of a checkout or export.
#[derive(Debug, Clone)]
pub struct ScmOutcome {
    pub success: bool,
    pub provider_message: Option<String>,
}

impl ScmOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            provider_message: Some(message.into()),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            provider_message: Some(message.into()),
        }
    }
}

/// SCM provider transport. Implementations materialize a working copy
/// (checkout) or a bare tree without SCM metadata (export).
pub trait ScmClient {
    fn checkout(
        &self,
        repository: &ScmRepository,
        destination: &Path,
        version: Option<&ScmVersion>,
    ) -> Result<ScmOutcome>;

    fn export(
        &self,
        repository: &ScmRepository,
        destination: &Path,
        version: Option<&ScmVersion>,
    ) -> Result<ScmOutcome>;
}

/// Any non-success provider status is fatal.
pub fn check_result(outcome: &ScmOutcome) -> Result<()> {
    if outcome.success {
        return Ok(());
    }

    Err(ScmError::Transport(format!(
        "provider reported failure: {}",
        outcome
            .provider_message
            .as_deref()
            .unwrap_or("(no message)")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_provider_and_url() {
        let repo = ScmRepository::parse("scm:git:https://github.com/example/widget.git").unwrap();
        assert_eq!(repo.provider, "git");
        assert_eq!(repo.provider_url, "https://github.com/example/widget.git");
    }

    #[test]
    fn provider_url_may_itself_contain_colons() {
        let repo = ScmRepository::parse("scm:svn:https://svn.apache.org/repos/asf").unwrap();
        assert_eq!(repo.provider, "svn");
        assert_eq!(repo.provider_url, "https://svn.apache.org/repos/asf");
    }

    #[test]
    fn rejects_urls_without_scm_prefix() {
        let err = ScmRepository::parse("https://github.com/example/widget.git").unwrap_err();
        assert!(matches!(err, ScmError::Transport(_)));
    }

    #[test]
    fn rejects_missing_provider_part() {
        assert!(ScmRepository::parse("scm:git").is_err());
        assert!(ScmRepository::parse("scm::url").is_err());
    }

    #[test]
    fn version_selector_round_trip() {
        let v = ScmVersion::from_type_and_value("tag", "widget-1.2").unwrap();
        assert_eq!(v, ScmVersion::Tag("widget-1.2".to_string()));
        assert_eq!(v.value(), "widget-1.2");
        assert!(ScmVersion::from_type_and_value("commit", "abc").is_err());
    }

    #[test]
    fn non_success_outcome_is_fatal() {
        assert!(check_result(&ScmOutcome::success("ok")).is_ok());
        let err = check_result(&ScmOutcome::failure("remote hung up")).unwrap_err();
        assert!(matches!(err, ScmError::Transport(_)));
    }
}
