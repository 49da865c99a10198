//! Registry of concrete types, contracts and the bindings between them

use crate::{
    error::Error,
    factory::{ArcService, BoxedShared, ErasedConstructor},
    inject::{Contract, Injectable},
    key::ServiceKey,
    lifetime::Declaration
};
use std::{
    any::{TypeId, type_name},
    collections::HashMap,
    fmt,
    hash::{BuildHasherDefault, Hasher},
    sync::Arc
};

/// Converts an erased concrete instance into a boxed `Arc<Requested>`
type ProjectFn = Box<
    dyn Fn(ArcService) -> Result<BoxedShared, Error>
    + Send
    + Sync
>;

pub(crate) type TypeIdMap<V> = HashMap<
    TypeId,
    V,
    BuildHasherDefault<TypeIdHasher>
>;

#[derive(Default, Clone)]
pub(crate) struct TypeIdHasher(u64);

impl Hasher for TypeIdHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.0
    }

    #[cold]
    fn write(&mut self, _: &[u8]) {
        unreachable!("TypeId calls write_u64");
    }

    #[inline]
    fn write_u64(&mut self, id: u64) {
        self.0 = id;
    }
}

/// Everything the registry knows about a single type
pub(crate) struct TypeEntry {
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) declaration: Declaration,
    pub(crate) pool_size: fn() -> Option<usize>,
    pub(crate) service_key: fn() -> Option<ServiceKey>,
    pub(crate) shape: Shape,
}

impl fmt::Debug for TypeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeEntry")
            .field("type_name", &self.type_name)
            .field("declaration", &self.declaration)
            .finish_non_exhaustive()
    }
}

pub(crate) enum Shape {
    Concrete(ConcreteShape),
    Contract(ContractShape),
}

pub(crate) struct ConcreteShape {
    pub(crate) constructors: Vec<ErasedConstructor>,
    pub(crate) instantiate: fn() -> Result<ArcService, Error>,
    pub(crate) contracts: Vec<TypeId>,
    project: fn(ArcService) -> Result<BoxedShared, Error>,
}

#[derive(Default)]
pub(crate) struct ContractShape {
    implementations: Vec<Implementation>,
}

/// A concrete type bound to a contract
pub(crate) struct Implementation {
    pub(crate) concrete: TypeId,
    pub(crate) type_name: &'static str,
    project: ProjectFn,
}

/// Maps contracts to their implementers and holds per-type metadata.
///
/// Populated once by the [`ResolverBuilder`](crate::ResolverBuilder) and read-only afterwards.
#[derive(Default)]
pub(crate) struct TypeRegistry {
    entries: TypeIdMap<TypeEntry>,
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.entries.len())
            .finish()
    }
}

impl TypeRegistry {
    /// Registers a concrete type, keeps the existing entry if already registered
    pub(crate) fn register<T: Injectable>(&mut self) {
        self.entries
            .entry(TypeId::of::<T>())
            .or_insert_with(|| TypeEntry {
                type_id: TypeId::of::<T>(),
                type_name: type_name::<T>(),
                declaration: Declaration::new(T::CAPABILITY, T::TAG),
                pool_size: T::pool_size,
                service_key: T::service_key,
                shape: Shape::Concrete(ConcreteShape {
                    constructors: T::constructors()
                        .into_iter()
                        .map(|ctor| ctor.erase())
                        .collect(),
                    instantiate: instantiate_erased::<T>,
                    contracts: Vec::new(),
                    project: project_concrete::<T>,
                }),
            });
    }

    /// Registers a contract, keeps the existing entry if already registered
    pub(crate) fn contract<C: Contract + ?Sized>(&mut self) {
        self.entries
            .entry(TypeId::of::<C>())
            .or_insert_with(|| TypeEntry {
                type_id: TypeId::of::<C>(),
                type_name: type_name::<C>(),
                declaration: Declaration::new(C::CAPABILITY, C::TAG),
                pool_size: C::pool_size,
                service_key: C::service_key,
                shape: Shape::Contract(ContractShape::default()),
            });
    }

    /// Binds `T` as an implementer of `C`, registering both if needed
    pub(crate) fn bind<C, T, F>(&mut self, upcast: F)
    where
        C: Contract + ?Sized,
        T: Injectable,
        F: Fn(Arc<T>) -> Arc<C> + Send + Sync + 'static
    {
        self.register::<T>();
        self.contract::<C>();

        let contract_id = TypeId::of::<C>();
        let concrete_id = TypeId::of::<T>();

        if let Some(Shape::Contract(contract)) = self.entries.get_mut(&contract_id).map(|e| &mut e.shape) {
            if contract.implementations.iter().any(|i| i.concrete == concrete_id) {
                return;
            }
            contract.implementations.push(Implementation {
                concrete: concrete_id,
                type_name: type_name::<T>(),
                project: Box::new(move |instance: ArcService| instance
                    .downcast::<T>()
                    .map(|service| Box::new(upcast(service)) as BoxedShared)
                    .map_err(|_| Error::ResolveFailed(type_name::<C>()))),
            });
        }

        if let Some(Shape::Concrete(concrete)) = self.entries.get_mut(&concrete_id).map(|e| &mut e.shape) {
            concrete.contracts.push(contract_id);
        }
    }

    /// Fetches the entry or returns an error if not registered
    #[inline]
    pub(crate) fn get(&self, type_id: TypeId, type_name: &'static str) -> Result<&TypeEntry, Error> {
        self.entries
            .get(&type_id)
            .ok_or(Error::NotRegistered(type_name))
    }

    /// Returns all concrete types bound to a contract
    #[inline]
    pub(crate) fn find_implementations<'a>(&self, contract: &'a TypeEntry) -> &'a [Implementation] {
        match &contract.shape {
            Shape::Contract(shape) => &shape.implementations,
            Shape::Concrete(_) => &[],
        }
    }

    /// Returns the sole implementer of a contract
    pub(crate) fn implementation_of<'a>(&self, contract: &'a TypeEntry) -> Result<&'a Implementation, Error> {
        match self.find_implementations(contract) {
            [implementation] => Ok(implementation),
            implementations => Err(Error::UnresolvedImplementation {
                contract: contract.type_name,
                found: implementations.len(),
            }),
        }
    }

    /// Returns the concrete entry for a type, resolving a contract to its sole implementer
    pub(crate) fn concrete<'a>(&'a self, entry: &'a TypeEntry) -> Result<(&'a TypeEntry, &'a ConcreteShape), Error> {
        let entry = match &entry.shape {
            Shape::Concrete(_) => entry,
            Shape::Contract(_) => {
                let implementation = self.implementation_of(entry)?;
                self.get(implementation.concrete, implementation.type_name)?
            }
        };
        match &entry.shape {
            Shape::Concrete(shape) => Ok((entry, shape)),
            Shape::Contract(_) => Err(Error::ResolveFailed(entry.type_name)),
        }
    }

    /// Iterates over the contracts a concrete type is bound to, in binding order
    #[inline]
    pub(crate) fn contracts_of<'a>(&'a self, shape: &'a ConcreteShape) -> impl Iterator<Item = &'a TypeEntry> {
        shape.contracts
            .iter()
            .filter_map(|id| self.entries.get(id))
    }

    /// Converts a concrete instance into the boxed `Arc` of the requested type
    pub(crate) fn project(&self, requested: &TypeEntry, instance: ArcService) -> Result<BoxedShared, Error> {
        match &requested.shape {
            Shape::Concrete(shape) => (shape.project)(instance),
            Shape::Contract(_) => (self.implementation_of(requested)?.project)(instance),
        }
    }
}

fn instantiate_erased<T: Injectable>() -> Result<ArcService, Error> {
    T::instantiate().map(|service| Arc::new(service) as ArcService)
}

fn project_concrete<T: Send + Sync + 'static>(instance: ArcService) -> Result<BoxedShared, Error> {
    instance
        .downcast::<T>()
        .map(|service| Box::new(service) as BoxedShared)
        .map_err(|_| Error::ResolveFailed(type_name::<T>()))
}
