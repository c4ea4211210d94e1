//! Error types for business onboarding.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Migration failed: {0}")]
    Migration(String),
}

/// Structural errors in how a wizard is built or wired.
///
/// These are composition bugs, not runtime data conditions, and are never
/// swallowed: they propagate to the host.
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("A wizard needs at least one step")]
    NoSteps,

    #[error("Duplicate step id: {0}")]
    DuplicateStep(String),

    #[error("Step content for '{component}' must be mounted inside an active wizard")]
    OutsideWizard { component: String },

    #[error("Form data must be a JSON object, got {0}")]
    NotAnObject(String),

    #[error("Form data does not match the expected shape: {0}")]
    Shape(String),
}

/// Failure raised by a step's submit handler.
///
/// Caught at the step gate boundary; the step stays active and the user may
/// retry.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("Store error: {0}")]
    Store(#[from] DatabaseError),

    #[error("Form data error: {0}")]
    FormData(#[from] WizardError),

    #[error("Submission failed: {0}")]
    Failed(String),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
