//! Discriminators of keyed services

use std::{borrow::Cow, fmt};

/// A runtime value that distinguishes instances of a keyed service
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ServiceKey {
    /// Integer key
    Int(i64),
    /// String key
    Str(Cow<'static, str>),
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceKey::Int(key) => write!(f, "{key}"),
            ServiceKey::Str(key) => f.write_str(key),
        }
    }
}

impl From<i64> for ServiceKey {
    #[inline]
    fn from(key: i64) -> Self {
        Self::Int(key)
    }
}

impl From<i32> for ServiceKey {
    #[inline]
    fn from(key: i32) -> Self {
        Self::Int(key.into())
    }
}

impl From<&'static str> for ServiceKey {
    #[inline]
    fn from(key: &'static str) -> Self {
        Self::Str(Cow::Borrowed(key))
    }
}

impl From<String> for ServiceKey {
    #[inline]
    fn from(key: String) -> Self {
        Self::Str(Cow::Owned(key))
    }
}
