use crate::error::{Result, ScmError};
use crate::maven::coordinate::ArtifactCoordinate;
use crate::maven::pom::{PomModel, read_pom};
use crate::maven::resolver::ArtifactResolver;
use crate::scm::{ScmClient, ScmRepository, ScmVersion, check_result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

pub mod snapshot;
pub use snapshot::VersionChange;

/// Which SCM connection flavor of the descriptor to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionType {
    Connection,
    DeveloperConnection,
}

/// SCM connection info extracted from a resolved project descriptor.
#[derive(Debug, Clone)]
pub struct ScmConnectionDescriptor {
    pub connection_type: ConnectionType,
    pub connection_url: Option<String>,
    pub developer_connection_url: Option<String>,
}

impl ScmConnectionDescriptor {
    /// The URL to use, preferring the configured flavor and falling back to
    /// the other when that flavor is absent.
    pub fn effective_url(&self) -> Option<&str> {
        let (preferred, fallback) = match self.connection_type {
            ConnectionType::Connection => {
                (&self.connection_url, &self.developer_connection_url)
            }
            ConnectionType::DeveloperConnection => {
                (&self.developer_connection_url, &self.connection_url)
            }
        };
        preferred.as_deref().or(fallback.as_deref())
    }
}

/// Explicit checkout configuration; one instance per invocation.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    pub base_dir: PathBuf,
    pub connection_url: Option<String>,
    pub connection_type: ConnectionType,
    pub artifact_coords: Option<String>,
    pub use_export: bool,
    pub checkout_directory: Option<PathBuf>,
    pub skip_checkout_if_exists: bool,
    pub scm_version: Option<ScmVersion>,
    pub as_snapshot: bool,
    pub project_pom: Option<PathBuf>,
    pub register_module: Option<PathBuf>,
    pub includes: Option<String>,
    pub excludes: Option<String>,
}

impl CheckoutConfig {
    pub fn new(base_dir: PathBuf) -> Self {
        Self {
            base_dir,
            connection_url: None,
            connection_type: ConnectionType::Connection,
            artifact_coords: None,
            use_export: false,
            checkout_directory: None,
            skip_checkout_if_exists: false,
            scm_version: None,
            as_snapshot: false,
            project_pom: None,
            register_module: None,
            includes: None,
            excludes: None,
        }
    }
}

/// The orchestrator's sequential states. Every failure is absorbing: an
/// error return from `advance` ends the invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutState {
    Idle,
    CoordinatesResolved,
    ConnectionConfigured,
    DirectoryPrepared,
    CheckedOut,
    PatchedModule,
    PatchedConsumer,
    Done,
}

/// One observable step of the pipeline.
#[derive(Debug)]
pub enum Transition {
    Entered(CheckoutState),
    Finished(CheckoutOutcome),
}

/// Terminal result of a checkout invocation.
#[derive(Debug)]
pub enum CheckoutOutcome {
    /// Destination already existed and the skip flag was set; nothing ran.
    Skipped { destination: PathBuf },
    Completed {
        destination: PathBuf,
        files_checked_out: usize,
        provider_message: Option<String>,
        version_change: Option<VersionChange>,
        module_registered: bool,
    },
}

/// Drives the pipeline: coordinate resolution, SCM connection configuration,
/// directory preparation, checkout/export, and the snapshot patches.
///
/// Failures after the checkout never roll the checked-out tree back; it is
/// left in place for inspection.
pub struct CheckoutOrchestrator {
    config: CheckoutConfig,
    resolver: Box<dyn ArtifactResolver>,
    scm: Box<dyn ScmClient>,
    state: CheckoutState,
    coordinate: Option<ArtifactCoordinate>,
    resolved_model: Option<PomModel>,
    connection: Option<String>,
    destination: Option<PathBuf>,
    provider_message: Option<String>,
    version_change: Option<VersionChange>,
    module_registered: bool,
}

impl CheckoutOrchestrator {
    pub fn new(
        config: CheckoutConfig,
        resolver: Box<dyn ArtifactResolver>,
        scm: Box<dyn ScmClient>,
    ) -> Self {
        Self {
            config,
            resolver,
            scm,
            state: CheckoutState::Idle,
            coordinate: None,
            resolved_model: None,
            connection: None,
            destination: None,
            provider_message: None,
            version_change: None,
            module_registered: false,
        }
    }

    pub fn state(&self) -> CheckoutState {
        self.state
    }

    /// Run one transition. Callers loop until `Finished` or an error.
    pub fn advance(&mut self) -> Result<Transition> {
        match self.state {
            CheckoutState::Idle => self.resolve_source(),
            CheckoutState::CoordinatesResolved => self.configure_connection(),
            CheckoutState::ConnectionConfigured => self.prepare_directory(),
            CheckoutState::DirectoryPrepared => self.materialize(),
            CheckoutState::CheckedOut => self.patch_module(),
            CheckoutState::PatchedModule => self.patch_consumer(),
            CheckoutState::PatchedConsumer => self.register_module(),
            CheckoutState::Done => Err(ScmError::Configuration(
                "checkout already finished".to_string(),
            )),
        }
    }

    /// Run the whole pipeline to its terminal outcome.
    pub fn run(&mut self) -> Result<CheckoutOutcome> {
        loop {
            match self.advance()? {
                Transition::Entered(_) => continue,
                Transition::Finished(outcome) => return Ok(outcome),
            }
        }
    }

    fn resolve_source(&mut self) -> Result<Transition> {
        if let Some(coords) = self.config.artifact_coords.clone() {
            let parsed = ArtifactCoordinate::parse(&coords)?;
            let resolved = self.resolver.resolve(&parsed)?;
            let model = read_pom(&resolved.pom_path)?;

            self.coordinate = Some(ArtifactCoordinate {
                version: resolved.version,
                ..parsed
            });
            self.resolved_model = Some(model);
            return self.enter(CheckoutState::CoordinatesResolved);
        }

        let url = self.config.connection_url.clone().ok_or_else(|| {
            ScmError::Configuration(
                "either artifact coordinates or a connection URL is required".to_string(),
            )
        })?;
        self.connection = Some(url);
        self.enter(CheckoutState::ConnectionConfigured)
    }

    fn configure_connection(&mut self) -> Result<Transition> {
        let model = self
            .resolved_model
            .as_ref()
            .expect("coordinates resolved before connection configuration");

        let scm = model.scm.as_ref().ok_or_else(|| {
            ScmError::MissingScmSection(format!(
                "the descriptor for {} declares no <scm> section",
                self.describe_target()
            ))
        })?;

        let descriptor = ScmConnectionDescriptor {
            connection_type: self.config.connection_type,
            connection_url: scm.connection.clone(),
            developer_connection_url: scm.developer_connection.clone(),
        };

        let url = descriptor.effective_url().ok_or_else(|| {
            ScmError::MissingScmSection(format!(
                "the descriptor for {} declares no usable SCM connection URL",
                self.describe_target()
            ))
        })?;

        self.connection = Some(url.to_string());
        self.enter(CheckoutState::ConnectionConfigured)
    }

    fn prepare_directory(&mut self) -> Result<Transition> {
        let destination = self.resolve_destination();

        if destination.is_dir() && self.config.skip_checkout_if_exists {
            self.state = CheckoutState::Done;
            return Ok(Transition::Finished(CheckoutOutcome::Skipped {
                destination,
            }));
        }

        if destination.exists() {
            fs::remove_dir_all(&destination).map_err(|e| {
                ScmError::DirectoryPrep(format!(
                    "cannot remove {}: {}",
                    destination.display(),
                    e
                ))
            })?;
        }

        fs::create_dir_all(&destination).map_err(|e| {
            ScmError::DirectoryPrep(format!("cannot create {}: {}", destination.display(), e))
        })?;

        self.destination = Some(destination);
        self.enter(CheckoutState::DirectoryPrepared)
    }

    fn materialize(&mut self) -> Result<Transition> {
        let connection = self
            .connection
            .as_deref()
            .expect("connection configured before checkout");
        let destination = self
            .destination
            .clone()
            .expect("directory prepared before checkout");

        let repository = ScmRepository::parse(connection)?;
        let version = self.config.scm_version.as_ref();

        let outcome = if self.config.use_export {
            self.scm.export(&repository, &destination, version)?
        } else {
            self.scm.checkout(&repository, &destination, version)?
        };
        check_result(&outcome)?;

        apply_path_filters(
            &destination,
            self.config.includes.as_deref(),
            self.config.excludes.as_deref(),
        )?;

        self.provider_message = outcome.provider_message;
        self.enter(CheckoutState::CheckedOut)
    }

    fn patch_module(&mut self) -> Result<Transition> {
        if !self.config.as_snapshot {
            return self.finish();
        }

        let coordinate = self
            .coordinate
            .clone()
            .expect("snapshot workflow requires artifact coordinates");
        let consumer_pom = self.config.project_pom.clone().ok_or_else(|| {
            ScmError::Configuration(
                "the snapshot workflow requires an enclosing project POM".to_string(),
            )
        })?;

        let change = snapshot::plan_version_change(
            &consumer_pom,
            &coordinate.group_id,
            &coordinate.artifact_id,
        )?;

        let module_pom = self
            .destination
            .as_ref()
            .expect("checkout completed before patching")
            .join("pom.xml");
        snapshot::patch_module_pom(&module_pom, &change)?;

        self.version_change = Some(change);
        self.enter(CheckoutState::PatchedModule)
    }

    fn patch_consumer(&mut self) -> Result<Transition> {
        let change = self
            .version_change
            .as_ref()
            .expect("version change planned before consumer patch");
        let consumer_pom = self
            .config
            .project_pom
            .as_ref()
            .expect("consumer POM checked before module patch");

        snapshot::patch_consumer_pom(consumer_pom, change)?;
        self.enter(CheckoutState::PatchedConsumer)
    }

    fn register_module(&mut self) -> Result<Transition> {
        if let Some(aggregator) = self.config.register_module.clone() {
            let artifact_id = self
                .version_change
                .as_ref()
                .map(|c| c.artifact_id.clone())
                .expect("version change planned before registration");
            self.module_registered = snapshot::register_module(&aggregator, &artifact_id)?;
        }

        self.finish()
    }

    fn finish(&mut self) -> Result<Transition> {
        let destination = self
            .destination
            .clone()
            .expect("checkout completed before finishing");
        let files_checked_out = count_files(&destination);

        self.state = CheckoutState::Done;
        Ok(Transition::Finished(CheckoutOutcome::Completed {
            destination,
            files_checked_out,
            provider_message: self.provider_message.take(),
            version_change: self.version_change.clone(),
            module_registered: self.module_registered,
        }))
    }

    fn enter(&mut self, state: CheckoutState) -> Result<Transition> {
        self.state = state;
        Ok(Transition::Entered(state))
    }

    /// Destination priority chain: explicit value, artifact-id-derived
    /// default in coordinate mode, build-output-relative default otherwise.
    fn resolve_destination(&self) -> PathBuf {
        if let Some(dir) = &self.config.checkout_directory {
            // the basedir placeholder is unresolvable without a project
            if dir.to_string_lossy().contains("${project.basedir}") {
                return self.config.base_dir.join("target").join("checkout");
            }
            if dir.is_absolute() {
                return dir.clone();
            }
            return self.config.base_dir.join(dir);
        }

        if let Some(coordinate) = &self.coordinate {
            return self
                .config
                .base_dir
                .join("target")
                .join(format!("checkout-{}", coordinate.artifact_id));
        }

        self.config.base_dir.join("target").join("checkout")
    }

    fn describe_target(&self) -> String {
        self.coordinate
            .as_ref()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "the checkout source".to_string())
    }
}

/// Delete checked-out files that fall outside the include patterns or match
/// an exclude pattern. SCM metadata directories are left alone.
fn apply_path_filters(
    root: &Path,
    includes: Option<&str>,
    excludes: Option<&str>,
) -> Result<()> {
    if includes.is_none() && excludes.is_none() {
        return Ok(());
    }

    let includes = compile_patterns(includes)?;
    let excludes = compile_patterns(excludes)?;

    filter_directory(root, root, &includes, &excludes)?;
    prune_empty_directories(root)?;
    Ok(())
}

fn filter_directory(
    root: &Path,
    dir: &Path,
    includes: &[Regex],
    excludes: &[Regex],
) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name();

        if name == ".git" || name == ".svn" {
            continue;
        }

        if path.is_dir() {
            filter_directory(root, &path, includes, excludes)?;
            continue;
        }

        let relative = path
            .strip_prefix(root)
            .unwrap_or(&path)
            .to_string_lossy()
            .replace('\\', "/");

        let kept = (includes.is_empty() || includes.iter().any(|re| re.is_match(&relative)))
            && !excludes.iter().any(|re| re.is_match(&relative));

        if !kept {
            fs::remove_file(&path)?;
        }
    }

    Ok(())
}

fn prune_empty_directories(dir: &Path) -> Result<bool> {
    let mut empty = true;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_name() == ".git" || entry.file_name() == ".svn" {
            empty = false;
            continue;
        }
        if path.is_dir() {
            if prune_empty_directories(&path)? {
                fs::remove_dir(&path)?;
            } else {
                empty = false;
            }
        } else {
            empty = false;
        }
    }
    Ok(empty)
}

fn compile_patterns(patterns: Option<&str>) -> Result<Vec<Regex>> {
    let Some(patterns) = patterns else {
        return Ok(Vec::new());
    };

    patterns
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(glob_to_regex)
        .collect()
}

/// Translate an Ant-style glob into an anchored regex: `**` crosses
/// directory boundaries, `*` and `?` stay within one path segment.
fn glob_to_regex(glob: &str) -> Result<Regex> {
    let mut pattern = String::from("^");
    let mut chars = glob.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    // swallow a following separator so `**/x` also matches `x`
                    if chars.peek() == Some(&'/') {
                        chars.next();
                        pattern.push_str("(?:.*/)?");
                    } else {
                        pattern.push_str(".*");
                    }
                } else {
                    pattern.push_str("[^/]*");
                }
            }
            '?' => pattern.push_str("[^/]"),
            other => pattern.push_str(&regex::escape(&other.to_string())),
        }
    }

    pattern.push('$');
    Regex::new(&pattern)
        .map_err(|e| ScmError::Configuration(format!("invalid filter pattern '{glob}': {e}")))
}

fn count_files(root: &Path) -> usize {
    let mut count = 0;
    let Ok(entries) = fs::read_dir(root) else {
        return 0;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if entry.file_name() == ".git" || entry.file_name() == ".svn" {
            continue;
        }
        if path.is_dir() {
            count += count_files(&path);
        } else {
            count += 1;
        }
    }
    count
}
