//! Seams between the console logic and whatever hosts it.

use async_trait::async_trait;

use crate::SourceError;

/// A popup the console can dismiss.
pub trait Popup {
    fn close(&mut self);
}

/// Receiver of events a component emits to its parent.
pub trait EventSink<E> {
    fn emit(&mut self, event: E);
}

/// Where the variable form gets the list of variable types from.
///
/// The cache is read first; the API is only called when the cache is empty.
/// Implementations are expected to fill their cache from a successful API
/// call.
#[async_trait]
pub trait VariableTypeSource: Send + Sync {
    /// Types already known locally; empty when nothing is cached.
    fn types_from_cache(&self) -> Vec<String>;

    /// Fetch the types from the platform API.
    async fn types_from_api(&self) -> Result<Vec<String>, SourceError>;
}
