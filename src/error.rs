use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScmError {
    #[error("Invalid artifact coordinates: {0}")]
    MalformedCoordinate(String),

    #[error("Artifact resolution failed: {0}")]
    Resolution(String),

    #[error("Cannot read project descriptor: {0}")]
    Descriptor(String),

    #[error("Missing SCM section: {0}")]
    MissingScmSection(String),

    #[error("Cannot prepare checkout directory: {0}")]
    DirectoryPrep(String),

    #[error("SCM provider failure: {0}")]
    Transport(String),

    #[error("Unparsable version: {0}")]
    UnparsableVersion(String),

    #[error("Dependency not declared: {0}")]
    DependencyNotDeclared(String),

    #[error("Cannot apply POM patch: {0}")]
    PatchApplication(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ScmError>;
