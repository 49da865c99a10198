//! Constructors and recursive instance construction

use crate::{error::Error, registry::TypeEntry, resolver::Resolver};
use std::{
    any::{Any, TypeId, type_name},
    fmt,
    sync::Arc
};

pub use self::{factory_fn::GenericFactory, params::Param};

mod factory_fn;
mod params;

pub(crate) type ArcService = Arc<
    dyn Any
    + Send
    + Sync
>;

/// A boxed `Arc<T>` of a requested, possibly unsized, `T`
pub(crate) type BoxedShared = Box<
    dyn Any
    + Send
    + Sync
>;

type InvokeFn<T> = Box<
    dyn Fn(&mut ResolvedArgs) -> Result<T, Error>
    + Send
    + Sync
>;

/// Describes a single constructor parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependency {
    type_id: TypeId,
    type_name: &'static str,
}

impl Dependency {
    /// Creates a dependency on `T`
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
        }
    }

    /// [`TypeId`] of the dependency
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Name of the dependency type
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

/// Constructor arguments resolved in parameter order
pub struct ResolvedArgs {
    values: std::vec::IntoIter<BoxedShared>,
}

impl ResolvedArgs {
    #[inline]
    pub(crate) fn new(values: Vec<BoxedShared>) -> Self {
        Self { values: values.into_iter() }
    }

    /// Takes the next argument as `Arc<T>`
    pub fn next<T: ?Sized + Send + Sync + 'static>(&mut self) -> Result<Arc<T>, Error> {
        self.values
            .next()
            .ok_or(Error::ResolveFailed(type_name::<T>()))?
            .downcast::<Arc<T>>()
            .map(|shared| *shared)
            .map_err(|_| Error::ResolveFailed(type_name::<T>()))
    }
}

/// A public constructor of `T` along with its parameter types
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use tenure::Constructor;
///
/// struct Config;
/// struct Client { config: Arc<Config> }
///
/// let ctor = Constructor::new(|config: Arc<Config>| Ok(Client { config }));
///
/// assert_eq!(ctor.arity(), 1);
/// ```
pub struct Constructor<T> {
    params: Vec<Dependency>,
    invoke: InvokeFn<T>,
}

impl<T> fmt::Debug for Constructor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl<T: Send + Sync + 'static> Constructor<T> {
    /// Creates a constructor from a fallible function whose arguments are `Arc`s of dependencies
    pub fn new<F, Args>(ctor: F) -> Self
    where
        F: GenericFactory<Args, Output = T>
    {
        Self {
            params: F::dependencies(),
            invoke: Box::new(move |args: &mut ResolvedArgs| ctor.invoke(args)),
        }
    }

    /// Number of parameters
    #[inline]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Parameter types in declaration order
    #[inline]
    pub fn params(&self) -> &[Dependency] {
        &self.params
    }

    pub(crate) fn erase(self) -> ErasedConstructor {
        let invoke = self.invoke;
        ErasedConstructor {
            params: self.params,
            invoke: Box::new(move |args: &mut ResolvedArgs| invoke(args).map(|service| Arc::new(service) as ArcService)),
        }
    }
}

/// Type-erased [`Constructor`] stored in the registry
pub(crate) struct ErasedConstructor {
    pub(crate) params: Vec<Dependency>,
    invoke: InvokeFn<ArcService>,
}

/// Picks the constructor with the greatest parameter count, first declared wins a tie
#[inline]
fn select(constructors: &[ErasedConstructor]) -> Option<&ErasedConstructor> {
    constructors
        .iter()
        .reduce(|best, ctor| if ctor.params.len() > best.params.len() { ctor } else { best })
}

/// Builds a new instance of the entry's concrete type.
///
/// A contract is resolved to its sole implementer first. Every constructor parameter
/// is resolved with the full pipeline of the `resolver`, so nested dependencies keep
/// their own lifetimes.
pub(crate) fn create(resolver: &Resolver, entry: &TypeEntry) -> Result<ArcService, Error> {
    let (concrete, shape) = resolver.registry().concrete(entry)?;

    tracing::debug!(service = concrete.type_name, "constructing service");

    let Some(ctor) = select(&shape.constructors) else {
        return (shape.instantiate)()
            .map_err(|err| err.into_construction(concrete.type_name));
    };

    let values = ctor.params
        .iter()
        .map(|dep| resolver.resolve_erased(dep.type_id, dep.type_name))
        .collect::<Result<Vec<_>, _>>()?;

    (ctor.invoke)(&mut ResolvedArgs::new(values))
        .map_err(|err| err.into_construction(concrete.type_name))
}

#[cfg(test)]
mod tests {
    use super::{select, BoxedShared, Constructor, Dependency, ResolvedArgs};
    use crate::Error;
    use std::sync::Arc;

    struct Config(&'static str);
    struct Cache;

    struct Client {
        config: Arc<Config>,
        cache: Option<Arc<Cache>>,
    }

    #[test]
    fn it_describes_params() {
        let ctor = Constructor::new(|config: Arc<Config>, cache: Arc<Cache>| Ok(Client { config, cache: Some(cache) }));

        assert_eq!(ctor.arity(), 2);
        assert_eq!(ctor.params(), &[Dependency::of::<Config>(), Dependency::of::<Cache>()]);
    }

    #[test]
    fn it_creates_nullary_constructor() {
        let ctor = Constructor::new(|| Ok(Cache));

        assert_eq!(ctor.arity(), 0);
    }

    #[test]
    fn it_selects_constructor_with_most_params() {
        let constructors = vec![
            Constructor::new(|config: Arc<Config>| Ok(Client { config, cache: None })).erase(),
            Constructor::new(|config: Arc<Config>, cache: Arc<Cache>| Ok(Client { config, cache: Some(cache) })).erase(),
            Constructor::new(|| Ok(Client { config: Arc::new(Config("default")), cache: None })).erase(),
        ];

        let ctor = select(&constructors).unwrap();

        assert_eq!(ctor.params.len(), 2);
    }

    #[test]
    fn it_selects_first_constructor_on_tie() {
        let constructors = vec![
            Constructor::new(|config: Arc<Config>| Ok(Client { config, cache: None })).erase(),
            Constructor::new(|cache: Arc<Cache>| Ok(Client { config: Arc::new(Config("default")), cache: Some(cache) })).erase(),
        ];

        let ctor = select(&constructors).unwrap();

        assert_eq!(ctor.params, vec![Dependency::of::<Config>()]);
    }

    #[test]
    fn it_selects_nothing_without_constructors() {
        assert!(select(&[]).is_none());
    }

    #[test]
    fn it_invokes_with_resolved_args() {
        let ctor = Constructor::new(|config: Arc<Config>| Ok(Client { config, cache: None }));
        let mut args = ResolvedArgs::new(vec![Box::new(Arc::new(Config("local"))) as BoxedShared]);

        let client = (ctor.invoke)(&mut args).unwrap();

        assert_eq!(client.config.0, "local");
        assert!(client.cache.is_none());
    }

    #[test]
    fn it_fails_on_mismatched_arg() {
        let ctor = Constructor::new(|config: Arc<Config>| Ok(Client { config, cache: None }));
        let mut args = ResolvedArgs::new(vec![Box::new(Arc::new(Cache)) as BoxedShared]);

        let err = (ctor.invoke)(&mut args).err();

        assert!(matches!(err, Some(Error::ResolveFailed(_))));
    }

    #[test]
    fn it_reads_unsized_args() {
        let shared: Arc<str> = Arc::from("value");
        let mut args = ResolvedArgs::new(vec![Box::new(shared) as BoxedShared]);

        let value = args.next::<str>().unwrap();

        assert_eq!(&*value, "value");
        assert!(args.next::<str>().is_err());
    }
}
