//! `#[tenure(...)]` attribute helpers

use syn::{Attribute, LitInt, Result};

/// Options of the `#[tenure(...)]` attribute
#[derive(Debug, Default)]
pub(crate) struct Options {
    /// Capacity of the pool of a `Pooled` type
    pub(crate) pool_size: Option<usize>,
}

impl Options {
    /// Collects options from every `#[tenure(...)]` attribute of an item
    pub(crate) fn from_attrs(attrs: &[Attribute]) -> Result<Self> {
        let mut options = Options::default();
        for attr in attrs.iter().filter(|attr| attr.path().is_ident("tenure")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("pool_size") {
                    let size: LitInt = meta.value()?.parse()?;
                    options.pool_size = Some(size.base10_parse()?);
                    Ok(())
                } else {
                    Err(meta.error("expected `pool_size`"))
                }
            })?;
        }
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::Options;
    use syn::{parse_quote, Attribute};

    #[test]
    fn it_parses_pool_size() {
        let attrs: Vec<Attribute> = vec![parse_quote!(#[tenure(pool_size = 16)])];

        let options = Options::from_attrs(&attrs).unwrap();

        assert_eq!(options.pool_size, Some(16));
    }

    #[test]
    fn it_ignores_foreign_attributes() {
        let attrs: Vec<Attribute> = vec![parse_quote!(#[allow(dead_code)])];

        let options = Options::from_attrs(&attrs).unwrap();

        assert!(options.pool_size.is_none());
    }

    #[test]
    fn it_fails_on_unknown_option() {
        let attrs: Vec<Attribute> = vec![parse_quote!(#[tenure(size = 16)])];

        assert!(Options::from_attrs(&attrs).is_err());
    }

    #[test]
    fn it_fails_on_non_integer() {
        let attrs: Vec<Attribute> = vec![parse_quote!(#[tenure(pool_size = "16")])];

        assert!(Options::from_attrs(&attrs).is_err());
    }
}
