use crate::error::{Result, ScmError};

/// Sentinel version meaning "the newest released version", used when the
/// coordinate string omits an explicit version.
pub const LATEST_VERSION: &str = "LATEST";

/// A Maven artifact coordinate parsed from a compact locator string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactCoordinate {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub extension: Option<String>,
    pub classifier: Option<String>,
}

impl ArtifactCoordinate {
    /// Parse `groupId:artifactId[:version[:type[:classifier]]]`.
    ///
    /// Token counts outside [2,5] are a format error.
    pub fn parse(text: &str) -> Result<Self> {
        let tokens: Vec<&str> = text.split(':').collect();
        if tokens.len() < 2 || tokens.len() > 5 {
            return Err(ScmError::MalformedCoordinate(format!(
                "expected groupId:artifactId[:version[:type[:classifier]]], got '{}'",
                text
            )));
        }

        Ok(Self {
            group_id: tokens[0].to_string(),
            artifact_id: tokens[1].to_string(),
            version: tokens
                .get(2)
                .map(|v| v.to_string())
                .unwrap_or_else(|| LATEST_VERSION.to_string()),
            extension: tokens.get(3).map(|t| t.to_string()),
            classifier: tokens.get(4).map(|t| t.to_string()),
        })
    }

    /// True when the coordinate carries the "latest release" sentinel rather
    /// than a concrete version.
    pub fn is_latest(&self) -> bool {
        self.version == LATEST_VERSION
    }
}

impl std::fmt::Display for ArtifactCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}
