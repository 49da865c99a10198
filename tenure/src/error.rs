//! Describes dependency resolution errors

use std::{
    borrow::Cow,
    fmt::{Display, Formatter}
};

/// Errors that may happen while classifying or resolving a service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No lifetime was declared neither by the type nor by its contracts
    UnresolvedLifetime(&'static str),

    /// A contract has zero or several implementers
    UnresolvedImplementation {
        /// Contract type name
        contract: &'static str,
        /// How many implementers were found
        found: usize,
    },

    /// A scoped service was requested while no scope is current
    NoActiveScope(&'static str),

    /// A keyed service does not provide its discriminator
    MissingServiceKey(&'static str),

    /// A constructor body returned an error
    ConstructionFailed {
        /// Type that failed to construct
        type_name: &'static str,
        /// Failure description
        reason: Cow<'static, str>,
    },

    /// The requested type is unknown to the registry
    NotRegistered(&'static str),

    /// A resolved instance is not of the requested type
    ResolveFailed(&'static str),

    /// An instance was returned to a pool for a type that is not pooled
    NotPooled(&'static str),

    /// An instance returned to a pool was not checked out from it, or was already returned
    NotCheckedOut(&'static str),

    /// The resolver that owns a pool has been dropped
    ResolverDropped,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnresolvedLifetime(type_name) => write!(f, "Resolution Error: no lifetime found for {type_name}"),
            Error::UnresolvedImplementation { contract, found: 0 } => write!(f, "Resolution Error: no implementation found for {contract}"),
            Error::UnresolvedImplementation { contract, found } => write!(f, "Resolution Error: {found} implementations found for {contract}, expected exactly one"),
            Error::NoActiveScope(type_name) => write!(f, "Resolution Error: no active scope to resolve {type_name}"),
            Error::MissingServiceKey(type_name) => write!(f, "Resolution Error: service key not found for {type_name}"),
            Error::ConstructionFailed { type_name, reason } => write!(f, "Resolution Error: unable to construct {type_name}: {reason}"),
            Error::NotRegistered(type_name) => write!(f, "Resolution Error: type not registered: {type_name}"),
            Error::ResolveFailed(type_name) => write!(f, "Resolution Error: unable to resolve the service: {type_name}"),
            Error::NotPooled(type_name) => write!(f, "Resolution Error: {type_name} is not a pooled service"),
            Error::NotCheckedOut(type_name) => write!(f, "Resolution Error: {type_name} instance was not checked out from its pool"),
            Error::ResolverDropped => write!(f, "Resolution Error: resolver has been dropped"),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Creates a [`Error::ConstructionFailed`] for `T`
    #[inline]
    pub fn construction<T: ?Sized>(reason: impl Into<Cow<'static, str>>) -> Self {
        Self::ConstructionFailed {
            type_name: std::any::type_name::<T>(),
            reason: reason.into(),
        }
    }

    /// Wraps any error that is not a construction failure yet
    #[inline]
    pub(crate) fn into_construction(self, type_name: &'static str) -> Self {
        match self {
            err @ Error::ConstructionFailed { .. } => err,
            other => Error::ConstructionFailed {
                type_name,
                reason: other.to_string().into(),
            },
        }
    }
}
