//! Error types for the arena AI core.
//!
//! Errors only surface at configuration and construction boundaries.
//! A running tick never fails: degenerate situations degrade to an idle
//! or wandering tick instead.

use thiserror::Error;

use crate::actions::ActionSlot;
use crate::components::AgentId;

/// Result type alias using [`ArenaError`].
pub type Result<T> = std::result::Result<T, ArenaError>;

/// Top-level error type for the arena AI core.
#[derive(Debug, Error)]
pub enum ArenaError {
    /// Agent identifier not present in the arena.
    #[error("Agent not found: {0}")]
    AgentNotFound(AgentId),

    /// Loadout references an action the catalog does not define.
    #[error("Unknown action '{name}' for slot {slot:?}")]
    UnknownAction {
        /// Slot the loadout tried to fill.
        slot: ActionSlot,
        /// Catalog name that failed to resolve.
        name: String,
    },

    /// Profile preset identifier not recognised.
    #[error("Unknown AI profile: {0}")]
    UnknownProfile(String),

    /// A configuration value violates its precondition.
    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfig {
        /// Dotted path of the offending field.
        field: String,
        /// Human-readable explanation.
        reason: String,
    },

    /// Data file parsing error.
    #[error("Failed to parse {what}: {message}")]
    DataParseError {
        /// What was being parsed (profile, catalog, ...).
        what: String,
        /// Error message.
        message: String,
    },

    /// Invalid simulation state (e.g. snapshot (de)serialization failed).
    #[error("Invalid arena state: {0}")]
    InvalidState(String),
}

impl ArenaError {
    /// Shorthand for [`ArenaError::InvalidConfig`].
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
