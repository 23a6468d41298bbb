pub mod coordinate;
pub mod pom;
pub mod resolver;
pub mod version;

pub use coordinate::ArtifactCoordinate;
pub use pom::{PomModel, read_pom};
pub use resolver::{ArtifactResolver, HttpArtifactResolver, RemoteRepository, ResolvedArtifact};
