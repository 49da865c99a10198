//! Extractor of a single constructor parameter

use super::{Dependency, ResolvedArgs};
use crate::error::Error;
use std::sync::Arc;

/// A single constructor parameter
pub trait Param: Sized {
    /// The type this parameter depends on
    fn dependency() -> Dependency;

    /// Extracts `Self` from the resolved arguments
    fn from_args(args: &mut ResolvedArgs) -> Result<Self, Error>;
}

impl<T: ?Sized + Send + Sync + 'static> Param for Arc<T> {
    #[inline]
    fn dependency() -> Dependency {
        Dependency::of::<T>()
    }

    #[inline]
    fn from_args(args: &mut ResolvedArgs) -> Result<Self, Error> {
        args.next::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::Param;
    use crate::factory::{BoxedShared, Dependency, ResolvedArgs};
    use std::sync::Arc;

    trait Named: Send + Sync {}

    struct Left(i32);

    #[test]
    fn it_depends_on_pointee_type() {
        assert_eq!(<Arc<Left> as Param>::dependency(), Dependency::of::<Left>());
        assert_eq!(<Arc<dyn Named> as Param>::dependency(), Dependency::of::<dyn Named>());
    }

    #[test]
    fn it_extracts_next_arg() {
        let mut args = ResolvedArgs::new(vec![Box::new(Arc::new(Left(1))) as BoxedShared]);

        let left = <Arc<Left> as Param>::from_args(&mut args).unwrap();

        assert_eq!(left.0, 1);
    }

    #[test]
    fn it_fails_to_extract_arg_of_other_type() {
        let mut args = ResolvedArgs::new(vec![Box::new(Arc::new(1_u8)) as BoxedShared]);

        assert!(<Arc<Left> as Param>::from_args(&mut args).is_err());
    }

    #[test]
    fn it_fails_to_extract_missing_arg() {
        let mut args = ResolvedArgs::new(Vec::new());

        assert!(<Arc<Left> as Param>::from_args(&mut args).is_err());
    }
}
