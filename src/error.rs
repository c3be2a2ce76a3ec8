/// Error type for binding environment variables onto a configuration value.
#[derive(Debug, thiserror::Error)]
pub enum EnvBindError {
    /// The root target cannot be bound (it must be a struct or keyed collection).
    #[error("Invalid specification: expected a struct or map, got `{0}`")]
    InvalidSpecification(String),
    /// Text could not be parsed as the declared kind.
    #[error("Failed to parse `{text}` as {kind}: {reason}")]
    Parse {
        kind: String,
        text: String,
        reason: String,
    },
    /// The shape has no single-string decoding.
    #[error("Unsupported type: `{0}`")]
    UnsupportedType(String),
    /// A setter received arguments that do not fit the shape it was built for.
    #[error("Shape mismatch: expected {expected}, found {found}")]
    ShapeMismatch { expected: String, found: String },
    /// A derived variable pattern could not be used.
    #[error("Invalid pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },
    /// A setter failed while handling the named environment variable.
    #[error("Environment variable `{name}`: {source}")]
    Variable {
        name: String,
        #[source]
        source: Box<EnvBindError>,
    },
}

impl EnvBindError {
    pub(crate) fn parse(
        kind: impl ToString,
        text: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        EnvBindError::Parse {
            kind: kind.to_string(),
            text: text.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn in_variable(self, name: &str) -> Self {
        EnvBindError::Variable {
            name: name.to_string(),
            source: Box::new(self),
        }
    }

    /// Returns the underlying error, looking through [`EnvBindError::Variable`] context.
    pub fn root(&self) -> &EnvBindError {
        match self {
            EnvBindError::Variable { source, .. } => source.root(),
            other => other,
        }
    }

    /// Name of the environment variable that triggered the error, if known.
    pub fn variable(&self) -> Option<&str> {
        match self {
            EnvBindError::Variable { name, .. } => Some(name),
            _ => None,
        }
    }
}
