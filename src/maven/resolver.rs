use crate::error::{Result, ScmError};
use crate::maven::coordinate::ArtifactCoordinate;
use crate::maven::version::VersionComparator;
use quick_xml::de::from_str;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const DEFAULT_MAVEN_CENTRAL: &str = "https://repo1.maven.org/maven2";
const MAX_RESPONSE_BYTES: usize = 10 * 1024 * 1024;

/// A remote artifact repository in Maven layout.
#[derive(Debug, Clone)]
pub struct RemoteRepository {
    pub name: String,
    pub url: String,
}

/// The local descriptor file a coordinate resolved to, together with the
/// concrete version chosen when the coordinate carried the LATEST sentinel.
#[derive(Debug, Clone)]
pub struct ResolvedArtifact {
    pub pom_path: PathBuf,
    pub version: String,
}

/// Resolves an artifact coordinate to a local POM descriptor file.
pub trait ArtifactResolver {
    fn resolve(&self, coordinate: &ArtifactCoordinate) -> Result<ResolvedArtifact>;
}

/// Artifact resolver backed by remote repositories in Maven layout.
pub struct HttpArtifactResolver {
    client: Client,
    repositories: Vec<RemoteRepository>,
    local_repository: PathBuf,
}

impl HttpArtifactResolver {
    pub fn new(local_repository: PathBuf) -> Result<Self> {
        Self::with_repositories(Vec::new(), local_repository)
    }

    pub fn with_repositories(
        repositories: Vec<RemoteRepository>,
        local_repository: PathBuf,
    ) -> Result<Self> {
        let client = Self::build_client()?;
        let repositories = if repositories.is_empty() {
            Self::default_repositories()
        } else {
            repositories
        };

        let repositories = Self::ensure_valid_repositories(repositories)?;

        Ok(Self {
            client,
            repositories,
            local_repository,
        })
    }

    pub fn repositories(&self) -> &[RemoteRepository] {
        &self.repositories
    }

    fn build_client() -> Result<Client> {
        Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent("mvnscm")
            .danger_accept_invalid_certs(false)
            .build()
            .map_err(|e| ScmError::Resolution(format!("failed to build HTTP client: {e}")))
    }

    fn default_repositories() -> Vec<RemoteRepository> {
        vec![RemoteRepository {
            name: "Maven Central".to_string(),
            url: DEFAULT_MAVEN_CENTRAL.to_string(),
        }]
    }

    fn ensure_valid_repositories(
        repositories: Vec<RemoteRepository>,
    ) -> Result<Vec<RemoteRepository>> {
        for repo in &repositories {
            Self::validate_repository_url(&repo.url)?;
        }
        Ok(repositories)
    }

    fn validate_repository_url(url: &str) -> Result<()> {
        let parsed = Url::parse(url)
            .map_err(|_| ScmError::Configuration(format!("Invalid repository URL: {url}")))?;

        match parsed.scheme() {
            "https" | "http" => {}
            scheme => {
                return Err(ScmError::Configuration(format!(
                    "Unsupported repository scheme: {scheme}"
                )));
            }
        }

        if let Some(host) = parsed.host_str() {
            if Self::is_private_host(host) {
                return Err(ScmError::Configuration(format!(
                    "Repository host '{host}' is not allowed"
                )));
            }
        }

        Ok(())
    }

    fn is_private_host(host: &str) -> bool {
        if host.eq_ignore_ascii_case("localhost") {
            return true;
        }

        if let Ok(ip) = host.parse::<IpAddr>() {
            match ip {
                IpAddr::V4(v4) => v4.is_private() || v4.is_loopback(),
                IpAddr::V6(v6) => v6.is_loopback() || v6.is_unique_local(),
            }
        } else {
            false
        }
    }

    /// Resolve the LATEST sentinel to the newest released version advertised
    /// by the first repository that knows the artifact.
    fn resolve_latest_version(&self, coordinate: &ArtifactCoordinate) -> Result<String> {
        for repo in &self.repositories {
            let Some(metadata) =
                self.fetch_metadata(&repo.url, &coordinate.group_id, &coordinate.artifact_id)?
            else {
                continue;
            };

            if let Some(release) = metadata.versioning.release {
                return Ok(release);
            }

            let versions = metadata.versioning.versions.version;
            if let Some(latest) = VersionComparator::get_latest(&versions, true) {
                return Ok(latest);
            }
        }

        Err(ScmError::Resolution(format!(
            "no repository advertises a released version of {}:{}",
            coordinate.group_id, coordinate.artifact_id
        )))
    }

    fn fetch_metadata(
        &self,
        repo_url: &str,
        group: &str,
        artifact: &str,
    ) -> Result<Option<MavenMetadata>> {
        let group_path = group.replace('.', "/");
        let metadata_url = format!("{}/{}/{}/maven-metadata.xml", repo_url, group_path, artifact);

        let Some(text) = self.fetch_text(&metadata_url)? else {
            return Ok(None);
        };

        let metadata: MavenMetadata = from_str(&text).map_err(|e| {
            ScmError::Resolution(format!("failed to parse Maven metadata: {e}"))
        })?;

        Ok(Some(metadata))
    }

    fn fetch_text(&self, url: &str) -> Result<Option<String>> {
        if std::env::var("MVNSCM_VERBOSE").is_ok() {
            eprintln!("[VERBOSE] Fetching: {}", url);
        }

        let response = match self.client.get(url).send() {
            Ok(resp) => resp,
            Err(e) => {
                if std::env::var("MVNSCM_VERBOSE").is_ok() {
                    eprintln!("[VERBOSE] Request failed: {}", e);
                }
                return Ok(None);
            }
        };

        if !response.status().is_success() {
            if std::env::var("MVNSCM_VERBOSE").is_ok() {
                eprintln!("[VERBOSE] HTTP {}: {}", response.status(), url);
            }
            return Ok(None);
        }

        let text = response
            .text()
            .map_err(|e| ScmError::Resolution(format!("failed to read response body: {e}")))?;

        if text.len() > MAX_RESPONSE_BYTES {
            return Err(ScmError::Resolution(
                "repository response exceeded 10MB limit".to_string(),
            ));
        }

        Ok(Some(text))
    }

    fn cache_path(&self, coordinate: &ArtifactCoordinate, version: &str) -> PathBuf {
        let group_path = coordinate.group_id.replace('.', "/");
        self.local_repository
            .join(group_path)
            .join(&coordinate.artifact_id)
            .join(version)
            .join(format!("{}-{}.pom", coordinate.artifact_id, version))
    }

    fn store_descriptor(&self, path: &Path, text: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ScmError::Resolution(format!(
                    "failed to create local repository directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        fs::write(path, text).map_err(|e| {
            ScmError::Resolution(format!("failed to cache descriptor {}: {}", path.display(), e))
        })
    }
}

impl ArtifactResolver for HttpArtifactResolver {
    fn resolve(&self, coordinate: &ArtifactCoordinate) -> Result<ResolvedArtifact> {
        let version = if coordinate.is_latest() {
            self.resolve_latest_version(coordinate)?
        } else {
            coordinate.version.clone()
        };

        let cached = self.cache_path(coordinate, &version);
        if cached.is_file() {
            return Ok(ResolvedArtifact {
                pom_path: cached,
                version,
            });
        }

        let group_path = coordinate.group_id.replace('.', "/");
        for repo in &self.repositories {
            let pom_url = format!(
                "{}/{}/{}/{}/{}-{}.pom",
                repo.url, group_path, coordinate.artifact_id, version, coordinate.artifact_id,
                version
            );

            if let Some(text) = self.fetch_text(&pom_url)? {
                self.store_descriptor(&cached, &text)?;
                return Ok(ResolvedArtifact {
                    pom_path: cached,
                    version,
                });
            }
        }

        Err(ScmError::Resolution(format!(
            "couldn't download artifact descriptor for {}:{}:{} from any configured repository",
            coordinate.group_id, coordinate.artifact_id, version
        )))
    }
}

#[derive(Debug, Deserialize)]
struct MavenMetadata {
    versioning: Versioning,
}

#[derive(Debug, Deserialize)]
struct Versioning {
    #[allow(dead_code)]
    latest: Option<String>,
    release: Option<String>,
    versions: Versions,
}

#[derive(Debug, Deserialize)]
struct Versions {
    version: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_https_repository() {
        assert!(
            HttpArtifactResolver::validate_repository_url("https://repo.maven.apache.org/maven2")
                .is_ok()
        );
    }

    #[test]
    fn rejects_invalid_scheme() {
        let err = HttpArtifactResolver::validate_repository_url("ftp://example.com").unwrap_err();
        assert!(matches!(err, ScmError::Configuration(_)));
    }

    #[test]
    fn rejects_private_host() {
        let err =
            HttpArtifactResolver::validate_repository_url("https://127.0.0.1/repo").unwrap_err();
        assert!(matches!(err, ScmError::Configuration(_)));
    }

    #[test]
    fn metadata_deserializes() {
        let xml = r#"<metadata>
  <groupId>org.apache.maven.plugins</groupId>
  <artifactId>maven-clean-plugin</artifactId>
  <versioning>
    <latest>3.3.2</latest>
    <release>3.3.2</release>
    <versions>
      <version>2.5</version>
      <version>3.3.2</version>
    </versions>
  </versioning>
</metadata>"#;
        let metadata: MavenMetadata = from_str(xml).unwrap();
        assert_eq!(metadata.versioning.release.as_deref(), Some("3.3.2"));
        assert_eq!(metadata.versioning.versions.version.len(), 2);
    }

    #[test]
    fn cache_path_uses_maven_layout() {
        let resolver = HttpArtifactResolver::new(PathBuf::from("/tmp/repo")).unwrap();
        let coord = ArtifactCoordinate::parse("org.example:widget:1.2").unwrap();
        let path = resolver.cache_path(&coord, "1.2");
        assert_eq!(
            path,
            PathBuf::from("/tmp/repo/org/example/widget/1.2/widget-1.2.pom")
        );
    }
}
