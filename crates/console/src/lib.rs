//! `console` crate — the console-side collaborators of the eligibility
//! decision: the snapshot store, the node context menu, and the variable
//! create-form.
//!
//! Seams the console talks through (popups, event emitters, the variable
//! type source) are traits in [`traits`]; [`mock`] has recording doubles.

pub mod error;
pub mod traits;
pub mod store;
pub mod menu;
pub mod variable;
pub mod mock;

pub use error::{FormError, SourceError};
pub use traits::{EventSink, Popup, VariableTypeSource};
pub use store::{ConsoleStore, SnapshotProvider, WorkflowState};
pub use menu::NodeMenu;
pub use variable::{FormConfig, Variable, VariableEvent, VariableEventKind, VariableForm};
