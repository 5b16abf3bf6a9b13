//! # Ignite Engine
//!
//! Builds a tree of controls, data providers and actions from a declarative document, resolving
//! every declared `type` through the [`ComponentRegistry`], and routes the events those entities
//! raise to the actions bound to them.
//!
//! ## Usage
//!
//! ```rust
//! use ignite_engine::Session;
//! use ignite_types::Document;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let document = Document::from_json_str(r#"{
//!     "view": {
//!         "type": "view",
//!         "controls": [
//!             { "id": "greeting", "type": "text", "attributes": { "text": "hello" } },
//!             {
//!                 "id": "button",
//!                 "type": "button",
//!                 "actions": [
//!                     { "on": "touch", "type": "modify", "target": "greeting", "attributes": { "text": "bye" } }
//!                 ]
//!             }
//!         ]
//!     }
//! }"#)?;
//!
//! let session = Session::open(document).await?;
//! session.raise("button", "touch", None)?;
//! session.settle().await;
//!
//! let greeting = session.entity("greeting").expect("declared");
//! assert_eq!(greeting.attributes["text"], "bye");
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **`catalog`**: the component registry keyed by category and class name
//! - **`builder`**: turns a document into a [`SessionTree`], collecting per-node errors
//! - **`dispatcher`**: per-entity event lanes, gates, delays, repeats and loads
//! - **`session`**: the public handle tying the tree, the control thread and the dispatcher together
//! - **`predicate`**, **`interpolate`**, **`scope`**: `if` conditions and `[[shortcode]]` values
//! - **`components`**: the component traits and built-in controls, providers, actions and shortcodes

pub mod builder;
pub mod catalog;
pub mod collaborators;
pub mod components;
pub mod config;
pub mod control_thread;
pub mod dispatcher;
pub mod error;
pub mod interpolate;
pub mod predicate;
pub mod scope;
pub mod session;
pub mod snapshot;
pub mod ticker;
pub mod tree;

pub use builder::{BuildReport, TreeBuilder};
pub use catalog::{ComponentFactory, ComponentRegistry};
pub use collaborators::{Collaborators, Observation, Presenter, RecordingCollaborator, Renderer, Transport, TransportError};
pub use components::{Action, ActionEffect, ActionError, ActionInvocation, Blueprint, ComponentError, Control, DataProvider, Shortcode};
pub use config::{BuildMode, ConfigError, DispatchConfig, EngineConfig};
pub use control_thread::{ControlThread, ControlThreadError};
pub use dispatcher::{DeliveryOutcome, DeliveryRecord, Dispatcher, SkipReason};
pub use error::{BuildError, DispatchError, EngineError};
pub use predicate::{ConditionEvaluator, PredicateError, PredicateEvaluator};
pub use scope::Scope;
pub use session::{Session, SessionBuilder};
pub use snapshot::{BindingSnapshot, EntitySnapshot};
pub use tree::{Entity, EntityIndex, EntityRole, SessionTree};
