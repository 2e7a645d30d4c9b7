//! `#[qp(...)]` field attribute parsing
//!
//! Accepted forms:
//! - `#[qp("key")]` / `#[qp = "key"]` - external key
//! - `#[qp("-")]` / `#[qp(skip)]` - excluded
//! - `#[qp(nested)]` - flattened nested record
//! - `#[qp("")]` - same as no annotation

use proc_macro2::Span;
use syn::parse::{Parse, ParseStream};
use syn::{Attribute, Error, Expr, ExprLit, Ident, Lit, LitStr, Meta, Result};

pub const ATTR: &str = "qp";

#[derive(Debug, Clone)]
pub enum QpAttr {
    /// No attribute, or an empty key
    Unannotated,
    Key { key: String, span: Span },
    Skip,
    Nested,
}

impl QpAttr {
    fn from_key(lit: &LitStr) -> Self {
        let key = lit.value().trim().to_string();
        match key.as_str() {
            "" => QpAttr::Unannotated,
            "-" => QpAttr::Skip,
            _ => QpAttr::Key { key, span: lit.span() },
        }
    }
}

impl Parse for QpAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        if input.peek(LitStr) {
            let lit: LitStr = input.parse()?;
            return Ok(QpAttr::from_key(&lit));
        }

        let ident: Ident = input.parse().map_err(|e| {
            Error::new(e.span(), "expected a key string, `skip` or `nested`")
        })?;
        match ident.to_string().as_str() {
            "skip" => Ok(QpAttr::Skip),
            "nested" => Ok(QpAttr::Nested),
            other => Err(Error::new(
                ident.span(),
                format!("unknown qp option `{}`, expected a key string, `skip` or `nested`", other),
            )),
        }
    }
}

/// Read the single `#[qp]` attribute of a field, if any
pub fn parse_field_attr(attrs: &[Attribute]) -> Result<QpAttr> {
    let mut found: Option<QpAttr> = None;

    for attr in attrs.iter().filter(|a| a.path().is_ident(ATTR)) {
        if found.is_some() {
            return Err(Error::new_spanned(attr, "duplicate qp attribute"));
        }
        let parsed = match &attr.meta {
            Meta::List(_) => attr.parse_args::<QpAttr>()?,
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(ExprLit { lit: Lit::Str(lit), .. }) => QpAttr::from_key(lit),
                other => return Err(Error::new_spanned(other, "qp key must be a string literal")),
            },
            Meta::Path(_) => {
                return Err(Error::new_spanned(attr, "expected #[qp(\"key\")], #[qp(skip)] or #[qp(nested)]"))
            }
        };
        found = Some(parsed);
    }

    Ok(found.unwrap_or(QpAttr::Unannotated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn parse(attr: Attribute) -> Result<QpAttr> {
        parse_field_attr(&[attr])
    }

    fn key_of(attr: QpAttr) -> Option<String> {
        match attr {
            QpAttr::Key { key, .. } => Some(key),
            _ => None,
        }
    }

    #[test]
    fn test_key_forms() {
        assert_eq!(key_of(parse(parse_quote!(#[qp("page")])).unwrap()).as_deref(), Some("page"));
        assert_eq!(key_of(parse(parse_quote!(#[qp = "page"])).unwrap()).as_deref(), Some("page"));
        assert_eq!(key_of(parse(parse_quote!(#[qp(" page ")])).unwrap()).as_deref(), Some("page"));
    }

    #[test]
    fn test_markers() {
        assert!(matches!(parse(parse_quote!(#[qp("-")])).unwrap(), QpAttr::Skip));
        assert!(matches!(parse(parse_quote!(#[qp(skip)])).unwrap(), QpAttr::Skip));
        assert!(matches!(parse(parse_quote!(#[qp(nested)])).unwrap(), QpAttr::Nested));
        assert!(matches!(parse(parse_quote!(#[qp("")])).unwrap(), QpAttr::Unannotated));
        assert!(matches!(
            parse_field_attr(&[parse_quote!(#[doc = "x"])]).unwrap(),
            QpAttr::Unannotated
        ));
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(parse(parse_quote!(#[qp(flatten)])).is_err());
        assert!(parse(parse_quote!(#[qp(42)])).is_err());
        assert!(parse(parse_quote!(#[qp = 42])).is_err());
        assert!(parse(parse_quote!(#[qp])).is_err());
        assert!(parse(parse_quote!(#[qp("a", "b")])).is_err());
    }

    #[test]
    fn test_rejects_duplicate() {
        let attrs: Vec<Attribute> = vec![parse_quote!(#[qp("a")]), parse_quote!(#[qp("b")])];
        assert!(parse_field_attr(&attrs).is_err());
    }
}
