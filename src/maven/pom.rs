use crate::error::{Result, ScmError};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Raw POM project model, limited to the fields the checkout pipeline needs.
///
/// This is the raw descriptor, not an effective model: no interpolation and
/// no inheritance beyond the group/version fallback to `<parent>`.
#[derive(Debug, Clone, Deserialize)]
pub struct PomModel {
    #[serde(rename = "groupId")]
    pub group_id: Option<String>,
    #[serde(rename = "artifactId")]
    pub artifact_id: String,
    pub version: Option<String>,
    pub parent: Option<PomParent>,
    pub scm: Option<PomScm>,
    pub dependencies: Option<PomDependencies>,
    pub modules: Option<PomModules>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PomParent {
    #[serde(rename = "groupId")]
    pub group_id: String,
    #[serde(rename = "artifactId")]
    pub artifact_id: String,
    pub version: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PomScm {
    pub connection: Option<String>,
    #[serde(rename = "developerConnection")]
    pub developer_connection: Option<String>,
    pub url: Option<String>,
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PomDependencies {
    #[serde(rename = "dependency", default)]
    pub dependencies: Vec<PomDependency>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PomDependency {
    #[serde(rename = "groupId")]
    pub group_id: String,
    #[serde(rename = "artifactId")]
    pub artifact_id: String,
    pub version: Option<String>,
    pub scope: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PomModules {
    #[serde(rename = "module", default)]
    pub modules: Vec<String>,
}

impl PomModel {
    /// The declared group id, falling back to the parent's.
    pub fn effective_group_id(&self) -> Option<&str> {
        self.group_id
            .as_deref()
            .or_else(|| self.parent.as_ref().map(|p| p.group_id.as_str()))
    }

    /// The declared version, falling back to the parent's.
    pub fn effective_version(&self) -> Option<&str> {
        self.version
            .as_deref()
            .or_else(|| self.parent.as_ref().map(|p| p.version.as_str()))
    }

    /// Locate a declared dependency by group and artifact id. The declared
    /// version is deliberately ignored when matching.
    pub fn find_dependency(&self, group_id: &str, artifact_id: &str) -> Option<&PomDependency> {
        self.dependencies.as_ref().and_then(|deps| {
            deps.dependencies
                .iter()
                .find(|d| d.group_id == group_id && d.artifact_id == artifact_id)
        })
    }

    /// Module entries of an aggregator POM, empty when absent.
    pub fn module_list(&self) -> &[String] {
        self.modules
            .as_ref()
            .map(|m| m.modules.as_slice())
            .unwrap_or(&[])
    }
}

/// Read and parse a raw POM descriptor from disk.
pub fn read_pom(path: &Path) -> Result<PomModel> {
    let text = fs::read_to_string(path).map_err(|e| {
        ScmError::Descriptor(format!("failed to read {}: {}", path.display(), e))
    })?;
    parse_pom(&text).map_err(|e| {
        ScmError::Descriptor(format!("failed to parse {}: {}", path.display(), e))
    })
}

/// Parse a raw POM descriptor from text.
pub fn parse_pom(text: &str) -> std::result::Result<PomModel, quick_xml::DeError> {
    quick_xml::de::from_str(text)
}
