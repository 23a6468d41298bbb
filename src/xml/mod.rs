pub mod buffer;
pub mod patcher;
pub mod registrar;
pub mod scanner;

pub use patcher::{PatchOutcome, replace_dependency_version, replace_element_text};
pub use registrar::add_module;
