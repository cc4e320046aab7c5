//! Variables and the form that creates them.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::{FormError, SourceError, VariableTypeSource};

/// A typed key/value entry attached to a project, application or environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    #[serde(rename = "type")]
    pub var_type: String,
    pub value: String,
}

impl Variable {
    pub fn new(
        name: impl Into<String>,
        var_type: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            var_type: var_type.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableEventKind {
    Add,
    Update,
    Delete,
}

/// What a variable component emits to its parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableEvent {
    #[serde(rename = "type")]
    pub kind: VariableEventKind,
    pub variable: Variable,
}

impl VariableEvent {
    pub fn add(variable: Variable) -> Self {
        Self {
            kind: VariableEventKind::Add,
            variable,
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FormConfig {
    /// Upper bound on the API call made when the type cache is empty.
    pub fetch_timeout: Duration,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(5),
        }
    }
}

// ---------------------------------------------------------------------------
// VariableForm
// ---------------------------------------------------------------------------

/// Create-form for a new variable.
#[derive(Debug, Clone)]
pub struct VariableForm {
    types: Vec<String>,
    pending: Variable,
}

impl VariableForm {
    /// Build the form, taking variable types from the cache or, when the
    /// cache is empty, from the API.
    ///
    /// # Errors
    /// Returns [`SourceError`] when the API call fails or exceeds
    /// `config.fetch_timeout`.
    #[instrument(skip_all)]
    pub async fn load<S>(source: &S, config: &FormConfig) -> Result<Self, SourceError>
    where
        S: VariableTypeSource + ?Sized,
    {
        let mut types = source.types_from_cache();
        if types.is_empty() {
            types = tokio::time::timeout(config.fetch_timeout, source.types_from_api())
                .await
                .map_err(|_| {
                    warn!(timeout = ?config.fetch_timeout, "variable types request timed out");
                    SourceError::Timeout(config.fetch_timeout)
                })??;
            info!(count = types.len(), "variable types fetched from API");
        }

        Ok(Self::with_types(types))
    }

    /// Form with a known type list.
    pub fn with_types(types: Vec<String>) -> Self {
        Self {
            types,
            pending: Variable::default(),
        }
    }

    pub fn types(&self) -> &[String] {
        &self.types
    }

    pub fn pending(&self) -> &Variable {
        &self.pending
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.pending.name = name.into();
    }

    pub fn set_type(&mut self, var_type: impl Into<String>) {
        self.pending.var_type = var_type.into();
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.pending.value = value.into();
    }

    /// Check the pending variable, reporting the first problem found.
    pub fn validate(&self) -> Result<(), FormError> {
        let Variable {
            name,
            var_type,
            value,
        } = &self.pending;

        if name.is_empty() {
            return Err(FormError::EmptyName);
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        {
            return Err(FormError::InvalidName(name.clone()));
        }
        if var_type.is_empty() {
            return Err(FormError::MissingType);
        }
        if !self.types.iter().any(|t| t == var_type) {
            return Err(FormError::UnknownType(var_type.clone()));
        }
        if value.is_empty() {
            return Err(FormError::EmptyValue);
        }
        Ok(())
    }

    /// Whether the confirm button is enabled.
    pub fn can_submit(&self) -> bool {
        self.validate().is_ok()
    }

    /// Emit the creation event and clear the form for the next entry.
    pub fn submit(&mut self) -> Result<VariableEvent, FormError> {
        self.validate()?;
        Ok(VariableEvent::add(std::mem::take(&mut self.pending)))
    }
}
