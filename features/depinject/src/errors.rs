use thiserror::Error;

use crate::{
    dependency_graph::GraphError,
    types::{DynError, TypeInfo},
};

/// Errors while registering or looking up producers of a type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The type already has a producer and list inference is disabled
    #[error("'{type_info}' is already provided by '{existing}'")]
    DuplicateProvider {
        type_info: TypeInfo,
        existing: String,
    },
    /// Nothing produces the requested type
    #[error("No providers registered for '{0}'")]
    NoProviders(TypeInfo),
}

/// Errors when reading a produced value out of a provider
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    #[error("'{provider}' has no value for '{requested}'")]
    NotFound {
        requested: TypeInfo,
        provider: String,
    },
    #[error("'{provider}' has multiple implementations of '{requested}': {candidates:?}")]
    AmbiguousImplementation {
        requested: TypeInfo,
        provider: String,
        candidates: Vec<&'static str>,
    },
}

/// Errors when converting assembled arguments into constructor parameters
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InjectError {
    /// No value was assembled for a required parameter
    #[error("No argument was assembled for '{0}'")]
    MissingArgument(&'static str),

    #[error("Failed to downcast, required: '{required_type}' actual: '{actual_type}'")]
    DowncastFailed {
        required_type: &'static str,
        actual_type: &'static str,
    },

    #[error("'{type_name}' expects {expected} values but {actual} were provided")]
    ArraySizeMismatch {
        type_name: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Errors while executing a constructor
#[derive(Error, Debug)]
pub enum ConstructError {
    /// The arguments could not be converted
    #[error(transparent)]
    Inject(#[from] InjectError),
    /// The constructor returned its own failure
    #[error("{0}")]
    Failed(#[source] DynError),
}

/// Phase of the container lifecycle in which an error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Provide,
    Supply,
    Build,
    Resolve,
    Invoke,
}
impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Phase::Provide => "provide",
            Phase::Supply => "supply",
            Phase::Build => "build",
            Phase::Resolve => "resolve",
            Phase::Invoke => "invoke",
        })
    }
}

/// What went wrong, without the phase context
#[derive(Error, Debug)]
pub enum ErrorKind {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Value(#[from] ValueError),

    #[error(transparent)]
    Inject(#[from] InjectError),

    #[error("'{required_by}' needs '{dependency}' but it is missing")]
    MissingDependency {
        dependency: TypeInfo,
        required_by: String,
    },

    #[error("Nothing provides the requested output '{0}'")]
    MissingOutput(TypeInfo),

    #[error("'{required_by}' needs exactly one '{dependency}' but found {candidates:?}")]
    AmbiguousDependency {
        dependency: TypeInfo,
        required_by: String,
        candidates: Vec<String>,
    },

    #[error("Variadic dependency '{dependency}' must be the last parameter")]
    VariadicNotLast { dependency: TypeInfo },

    #[error("The container has not been resolved yet")]
    NotResolved,

    /// The failure returned by a constructor, kept as the error source
    #[error("'{provider}' failed: {error}")]
    ProviderFailed {
        provider: String,
        #[source]
        error: DynError,
    },
}

/// Error returned by every public [crate::Container] operation
#[derive(Error, Debug)]
#[error("error in {phase}: failed to resolve '{subject}': {kind}")]
pub struct ContainerError {
    pub phase: Phase,
    /// The provider or type being processed
    pub subject: String,
    #[source]
    pub kind: ErrorKind,
}
impl ContainerError {
    pub fn new(phase: Phase, subject: impl Into<String>, kind: impl Into<ErrorKind>) -> Self {
        ContainerError {
            phase,
            subject: subject.into(),
            kind: kind.into(),
        }
    }

    /// The error returned by a failing constructor, if that is the cause
    pub fn provider_failure(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match &self.kind {
            ErrorKind::ProviderFailed { error, .. } => Some(error.as_ref()),
            _ => None,
        }
    }

    /// Whether the failure is a dependency cycle
    pub fn is_cycle(&self) -> bool {
        matches!(&self.kind, ErrorKind::Graph(error) if error.is_cycle())
    }
}
