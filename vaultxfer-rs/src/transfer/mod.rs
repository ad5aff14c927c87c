//! The transfer engine.
//!
//! Leaf-first: [`path`] resolves destinations, [`conflict`] decides what to do
//! when one is taken, [`orchestrator`] runs a whole note transfer and
//! [`selector`] picks the destination vault.

pub mod conflict;
pub mod orchestrator;
pub mod path;
pub mod selector;

pub use conflict::{resolve_conflict, resolve_conflict_with};
pub use orchestrator::Orchestrator;
pub use path::{resolve_destination, resolve_destination_path};
pub use selector::{DestinationSelector, Selection};
