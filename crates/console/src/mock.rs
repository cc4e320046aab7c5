//! Test doubles for the console seams.
//!
//! Popups and sinks share a [`CallLog`] so tests can assert the order in
//! which a component touched them.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::{EventSink, Popup, SourceError, VariableTypeSource};

/// Ordered record of calls made on the doubles sharing it.
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Popup that logs `close`.
pub struct RecordingPopup {
    pub log: CallLog,
}

impl RecordingPopup {
    pub fn new(log: CallLog) -> Self {
        Self { log }
    }
}

impl Popup for RecordingPopup {
    fn close(&mut self) {
        self.log.lock().unwrap().push("close".into());
    }
}

/// Sink that logs and keeps every event it receives.
pub struct RecordingSink<E> {
    pub log: CallLog,
    pub events: Vec<E>,
}

impl<E> RecordingSink<E> {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            events: Vec::new(),
        }
    }
}

impl<E: std::fmt::Debug> EventSink<E> for RecordingSink<E> {
    fn emit(&mut self, event: E) {
        self.log.lock().unwrap().push(format!("emit:{event:?}"));
        self.events.push(event);
    }
}

/// Behaviour of the API side of [`MockTypeSource`].
pub enum ApiBehaviour {
    Return(Vec<String>),
    Fail(String),
    /// Never answers.
    Hang,
}

/// Type source with a fixed cache and a scripted API.
pub struct MockTypeSource {
    pub cached: Vec<String>,
    pub api: ApiBehaviour,
    pub api_calls: Arc<Mutex<usize>>,
}

impl MockTypeSource {
    /// Empty cache, API answering with `types`.
    pub fn from_api(types: &[&str]) -> Self {
        Self {
            cached: Vec::new(),
            api: ApiBehaviour::Return(types.iter().map(|t| t.to_string()).collect()),
            api_calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Cache holding `types`; the API must not be needed.
    pub fn cached(types: &[&str]) -> Self {
        Self {
            cached: types.iter().map(|t| t.to_string()).collect(),
            api: ApiBehaviour::Fail("api should not be called".into()),
            api_calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_api(mut self, api: ApiBehaviour) -> Self {
        self.api = api;
        self
    }

    pub fn api_call_count(&self) -> usize {
        *self.api_calls.lock().unwrap()
    }
}

#[async_trait]
impl VariableTypeSource for MockTypeSource {
    fn types_from_cache(&self) -> Vec<String> {
        self.cached.clone()
    }

    async fn types_from_api(&self) -> Result<Vec<String>, SourceError> {
        *self.api_calls.lock().unwrap() += 1;
        match &self.api {
            ApiBehaviour::Return(types) => Ok(types.clone()),
            ApiBehaviour::Fail(msg) => Err(SourceError::Unavailable(msg.clone())),
            ApiBehaviour::Hang => {
                std::future::pending::<()>().await;
                unreachable!("pending future never resolves")
            }
        }
    }
}
