//! Type registry for the Ignite engine.
//!
//! Declared `type` names are resolved through a per-category class name format
//! (`IX{}Control`, `IX{}DataProvider`, `IX{}Action`, `IX{}Shortcode`) into an explicit
//! (category, class name) → factory table that is populated at startup.

pub mod config;
pub mod format;
pub mod registry;

pub use config::{RegistrationPolicy, RegistryConfig};
pub use format::ClassNameFormat;
pub use registry::{RegisteredType, RegistrationOutcome, RegistryError, RegistryKey, TypeRegistry};
