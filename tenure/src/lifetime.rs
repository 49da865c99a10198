//! Service lifetimes and their declarations

use std::{any::TypeId, fmt};

pub(crate) mod classifier;

/// Lifetime of a resolved service, i.e. how many instances exist
/// and over what span they are shared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// A new instance on every resolution
    Transient,

    /// One instance per resolver
    Singleton,

    /// One instance per current scope
    Scoped,

    /// One instance per OS thread
    ThreadScoped,

    /// Instances are taken from and returned to a bounded pool
    Pooled,

    /// One instance per service key
    Keyed,
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Lifetime::Transient => "transient",
            Lifetime::Singleton => "singleton",
            Lifetime::Scoped => "scoped",
            Lifetime::ThreadScoped => "thread-scoped",
            Lifetime::Pooled => "pooled",
            Lifetime::Keyed => "keyed",
        };
        f.write_str(name)
    }
}

/// A declarative lifetime tag.
///
/// Unlike [`Lifetime`] there is no keyed tag, a keyed service
/// can be declared only as a capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// See [`Lifetime::Transient`]
    Transient,
    /// See [`Lifetime::Singleton`]
    Singleton,
    /// See [`Lifetime::Scoped`]
    Scoped,
    /// See [`Lifetime::ThreadScoped`]
    ThreadScoped,
    /// See [`Lifetime::Pooled`]
    Pooled,
}

impl From<Tag> for Lifetime {
    #[inline]
    fn from(tag: Tag) -> Self {
        match tag {
            Tag::Transient => Lifetime::Transient,
            Tag::Singleton => Lifetime::Singleton,
            Tag::Scoped => Lifetime::Scoped,
            Tag::ThreadScoped => Lifetime::ThreadScoped,
            Tag::Pooled => Lifetime::Pooled,
        }
    }
}

/// Lifetime metadata declared by a single type
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Declaration {
    /// Lifetime capability the type implements
    pub capability: Option<Lifetime>,

    /// Lifetime tag the type carries
    pub tag: Option<Tag>,
}

impl Declaration {
    #[inline]
    pub(crate) const fn new(capability: Option<Lifetime>, tag: Option<Tag>) -> Self {
        Self { capability, tag }
    }
}

/// The precedence rule that produced a lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifetimeSource {
    /// The concrete type declares a capability
    ImplementationCapability,
    /// The concrete type carries a tag
    ImplementationTag,
    /// The contract declares a capability
    ContractCapability,
    /// The contract carries a tag
    ContractTag,
}

/// Result of classifying a requested type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionDescriptor {
    /// The requested type, either a contract or a concrete type
    pub requested: TypeId,

    /// The concrete type that will be constructed
    pub concrete: TypeId,

    /// Name of the concrete type
    pub type_name: &'static str,

    /// Resolved lifetime
    pub lifetime: Lifetime,

    /// Which rule the lifetime came from
    pub source: LifetimeSource,
}
