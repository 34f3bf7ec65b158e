//! Language metadata and translation quality checks.
//!
//! - `registry`: known languages, their prompt names and script families
//! - `validator`: structural checks applied to every candidate translation

mod registry;
mod validator;

pub use registry::{LanguageConfig, LanguageRegistry, Script};
pub use validator::{TranslationValidator, ValidationResult};
