//! Lifetime precedence rules

use super::{Declaration, Lifetime, LifetimeSource, ResolutionDescriptor};
use crate::{
    error::Error,
    registry::{Shape, TypeEntry, TypeRegistry}
};

/// Classifies the requested type, the first matching rule wins:
///
/// 1. A contract is resolved to its sole implementer first
/// 2. Capability of the implementer
/// 3. Tag of the implementer
/// 4. Capability of the contract
/// 5. Tag of the contract
///
/// For a concrete request rules 4 and 5 consult the contracts it is bound to, in binding order.
pub(crate) fn classify(registry: &TypeRegistry, requested: &TypeEntry) -> Result<ResolutionDescriptor, Error> {
    let (concrete, found) = match &requested.shape {
        Shape::Contract(_) => {
            let (concrete, _) = registry.concrete(requested)?;
            let found = implementation_rules(&concrete.declaration)
                .or_else(|| contract_capability(&requested.declaration))
                .or_else(|| contract_tag(&requested.declaration));
            (concrete, found)
        }
        Shape::Concrete(shape) => {
            let found = implementation_rules(&requested.declaration)
                .or_else(|| registry
                    .contracts_of(shape)
                    .find_map(|contract| contract_capability(&contract.declaration)))
                .or_else(|| registry
                    .contracts_of(shape)
                    .find_map(|contract| contract_tag(&contract.declaration)));
            (requested, found)
        }
    };

    let (lifetime, source) = found.ok_or(Error::UnresolvedLifetime(requested.type_name))?;

    Ok(ResolutionDescriptor {
        requested: requested.type_id,
        concrete: concrete.type_id,
        type_name: concrete.type_name,
        lifetime,
        source,
    })
}

#[inline]
fn implementation_rules(declaration: &Declaration) -> Option<(Lifetime, LifetimeSource)> {
    declaration.capability
        .map(|lifetime| (lifetime, LifetimeSource::ImplementationCapability))
        .or_else(|| declaration.tag.map(|tag| (tag.into(), LifetimeSource::ImplementationTag)))
}

#[inline]
fn contract_capability(declaration: &Declaration) -> Option<(Lifetime, LifetimeSource)> {
    declaration.capability.map(|lifetime| (lifetime, LifetimeSource::ContractCapability))
}

#[inline]
fn contract_tag(declaration: &Declaration) -> Option<(Lifetime, LifetimeSource)> {
    declaration.tag.map(|tag| (tag.into(), LifetimeSource::ContractTag))
}
