//! Error type shared by registration, compilation and export.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can stop a compilation, plus start-up registration failures.
#[derive(Debug, Error)]
pub enum Error {
    /// Broken builtin setup: duplicate name, mutation after seal, bad builtin script.
    #[error("builtin registration failed: {0}")]
    Registration(String),

    #[error("parse error at {line}:{column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("semantic error at {line}:{column}: {message}")]
    Semantic {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("missing required keyword argument \"{0}\"")]
    MissingArgument(String),

    #[error("unused keyword argument \"{0}\"")]
    UnusedArgument(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("type error: {0}")]
    Type(String),

    #[error("undefined identifier \"{0}\"")]
    UndefinedIdentifier(String),

    /// An argument error attributed to the call that raised it. `position`
    /// is the call site when the call came from script text.
    #[error("error calling function \"{function}\": {source}")]
    Call {
        function: String,
        position: Option<(usize, usize)>,
        #[source]
        source: Box<Error>,
    },

    #[error("invalid spec: {0}")]
    InvalidSpec(String),

    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl Error {
    pub(crate) fn registration(msg: impl Into<String>) -> Self {
        Error::Registration(msg.into())
    }

    pub(crate) fn parse(line: usize, column: usize, msg: impl Into<String>) -> Self {
        Error::Parse {
            line,
            column,
            message: msg.into(),
        }
    }

    pub(crate) fn semantic(line: usize, column: usize, msg: impl Into<String>) -> Self {
        Error::Semantic {
            line,
            column,
            message: msg.into(),
        }
    }

    pub(crate) fn type_error(msg: impl Into<String>) -> Self {
        Error::Type(msg.into())
    }

    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Attach a call site to a call error that has none yet.
    pub(crate) fn at(self, line: usize, column: usize) -> Self {
        match self {
            Error::Call {
                function,
                position: None,
                source,
            } => Error::Call {
                function,
                position: Some((line, column)),
                source,
            },
            other => other,
        }
    }

    /// Source position: where parsing or checking failed, or the call site of
    /// a failed call.
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            Error::Parse { line, column, .. } | Error::Semantic { line, column, .. } => {
                Some((*line, *column))
            }
            Error::Call { position, .. } => *position,
            _ => None,
        }
    }

    /// The innermost error, unwrapping call attribution.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Call { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_bucket() -> Error {
        Error::Call {
            function: "from".into(),
            position: None,
            source: Box::new(Error::MissingArgument("bucket".into())),
        }
    }

    #[test]
    fn call_site_is_set_once() {
        let err = missing_bucket().at(2, 5).at(7, 1);
        assert_eq!(err.position(), Some((2, 5)));
        assert!(matches!(err.root_cause(), Error::MissingArgument(_)));
    }

    #[test]
    fn only_call_errors_take_a_call_site() {
        assert_eq!(missing_bucket().position(), None);
        assert_eq!(Error::type_error("x").at(1, 1).position(), None);
    }
}
