//! Error types for the simulation core and its configuration.

use crate::agent::AgentId;
use crate::food::FoodId;
use thiserror::Error;

/// Result alias for simulation operations
pub type Result<T> = std::result::Result<T, SimError>;

/// Simulation faults.
///
/// Apart from a rejected configuration, none of these can happen when the
/// core behaves as designed; hitting one means the run is corrupt and must
/// stop.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    /// A generation-0 agent whose trait points do not add up to the budget
    #[error("trait budget mismatch for agent {agent}: points sum to {sum}, expected {expected}")]
    TraitBudgetMismatch {
        agent: AgentId,
        sum: f64,
        expected: f64,
    },

    /// A food item was consumed twice
    #[error("food item {food} was already consumed")]
    FoodAlreadyConsumed { food: FoodId },

    /// Consumption of a food item that never existed in this pool
    #[error("food item {food} is not part of this pool")]
    UnknownFood { food: FoodId },

    /// A world was built from a configuration that failed validation
    #[error("{0}")]
    Config(String),
}

impl From<ConfigError> for SimError {
    fn from(err: ConfigError) -> Self {
        SimError::Config(err.to_string())
    }
}

/// Errors raised while loading, saving or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
