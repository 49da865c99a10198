//! Constructor functions of up to five `Arc` parameters

use super::{Dependency, Param, ResolvedArgs};
use crate::error::Error;

/// A fallible function that builds `Output` from its resolved dependencies.
///
/// `Args` is the tuple of parameter types. It only tells the arity impls apart,
/// the arguments themselves are taken one by one from [`ResolvedArgs`].
pub trait GenericFactory<Args>: Send + Sync + 'static {
    /// Constructed type
    type Output;

    /// Parameter types in declaration order
    fn dependencies() -> Vec<Dependency>;

    /// Extracts every parameter from `args` and calls the function
    fn invoke(&self, args: &mut ResolvedArgs) -> Result<Self::Output, Error>;
}

macro_rules! impl_generic_factory {
    ($($param:ident)*) => {
        impl<F, R, $($param: Param,)*> GenericFactory<($($param,)*)> for F
        where
            F: Fn($($param),*) -> Result<R, Error> + Send + Sync + 'static
        {
            type Output = R;

            #[inline]
            fn dependencies() -> Vec<Dependency> {
                vec![$($param::dependency()),*]
            }

            #[inline]
            #[allow(non_snake_case, unused_variables)]
            fn invoke(&self, args: &mut ResolvedArgs) -> Result<R, Error> {
                $(let $param = $param::from_args(args)?;)*
                (self)($($param),*)
            }
        }
    };
}

impl_generic_factory! {}
impl_generic_factory! { T1 }
impl_generic_factory! { T1 T2 }
impl_generic_factory! { T1 T2 T3 }
impl_generic_factory! { T1 T2 T3 T4 }
impl_generic_factory! { T1 T2 T3 T4 T5 }

#[cfg(test)]
mod tests {
    use super::GenericFactory;
    use crate::{
        factory::{BoxedShared, Dependency, ResolvedArgs},
        Error
    };
    use std::sync::Arc;

    #[derive(Debug, PartialEq)]
    struct Sum(i32);

    struct Left(i32);
    struct Right(i32);

    fn args(left: i32, right: i32) -> ResolvedArgs {
        ResolvedArgs::new(vec![
            Box::new(Arc::new(Left(left))) as BoxedShared,
            Box::new(Arc::new(Right(right))) as BoxedShared,
        ])
    }

    fn invoke<F: GenericFactory<A>, A>(factory: &F, args: &mut ResolvedArgs) -> Result<F::Output, Error> {
        factory.invoke(args)
    }

    fn dependencies<F: GenericFactory<A>, A>(_: &F) -> Vec<Dependency> {
        F::dependencies()
    }

    #[test]
    fn it_invokes_nullary_factory() {
        let factory = || Ok(Sum(0));

        assert!(dependencies(&factory).is_empty());
        assert_eq!(invoke(&factory, &mut ResolvedArgs::new(Vec::new())).unwrap(), Sum(0));
    }

    #[test]
    fn it_takes_args_in_declaration_order() {
        let factory = |left: Arc<Left>, right: Arc<Right>| Ok(Sum(left.0 * 10 + right.0));

        assert_eq!(dependencies(&factory), vec![Dependency::of::<Left>(), Dependency::of::<Right>()]);
        assert_eq!(invoke(&factory, &mut args(1, 2)).unwrap(), Sum(12));
    }

    #[test]
    fn it_fails_when_args_are_missing() {
        let factory = |left: Arc<Left>, right: Arc<Right>| Ok(Sum(left.0 + right.0));
        let mut args = ResolvedArgs::new(vec![Box::new(Arc::new(Left(1))) as BoxedShared]);

        assert_eq!(invoke(&factory, &mut args).err(), Some(Error::ResolveFailed(std::any::type_name::<Right>())));
    }

    #[test]
    fn it_returns_factory_error() {
        let factory = |_: Arc<Left>| -> Result<Sum, Error> { Err(Error::construction::<Sum>("negative")) };

        assert!(invoke(&factory, &mut args(-1, 0)).is_err());
    }
}
