//! Shared vocabulary for the Ignite engine.
//!
//! The registry, the engine and the CLI all speak in terms of the reserved keys in
//! [`symbols`], the [`Category`] of a declared type, the [`Event`] model and the
//! collaborator payloads in [`requests`].

pub mod category;
pub mod document;
pub mod event;
pub mod requests;
pub mod symbols;

pub use category::{Category, ParseCategoryError};
pub use document::{Attributes, Document, DocumentError, DocumentFormat, parse_document_file};
pub use event::{Event, EventName, InvalidTransition, LifecycleEvent, LifecycleState};
pub use requests::{AlertRequest, DataProviderRequest, FunctionCall, value_to_text};
pub use symbols::{SymbolKind, SymbolTable, symbol_table};
