use crate::{Regex, Symbol};
use proc_macro2::TokenStream;
use quote::quote;
use syn::Path;

impl Regex<Symbol> {
    /// Emits an expression that rebuilds this regular expression at runtime.
    ///
    /// `regex_type` is the path under which the [`Regex`] type is reachable from the emitted code.
    /// Symbols are emitted as paths, so they must name values of the alphabet type in scope there.
    pub fn emit(&self, regex_type: &TokenStream) -> syn::Result<TokenStream> {
        Ok(match self {
            Regex::EmptyString => quote!(#regex_type::EmptyString),
            Regex::EmptySet => quote!(#regex_type::EmptySet),
            Regex::Symbol(symbol) => {
                let path: Path = syn::parse_str(symbol.name())?;
                quote!(#regex_type::symbol(#path))
            }
            Regex::Repeat(inner) => {
                let inner = inner.emit(regex_type)?;
                quote!(#regex_type::repeat(#inner))
            }
            Regex::Complement(inner) => {
                let inner = inner.emit(regex_type)?;
                quote!(#regex_type::complement(#inner))
            }
            Regex::Or(l, r) => {
                let (l, r) = (l.emit(regex_type)?, r.emit(regex_type)?);
                quote!(#regex_type::or(#l, #r))
            }
            Regex::And(l, r) => {
                let (l, r) = (l.emit(regex_type)?, r.emit(regex_type)?);
                quote!(#regex_type::and(#l, #r))
            }
            Regex::Concat(l, r) => {
                let (l, r) = (l.emit(regex_type)?, r.emit(regex_type)?);
                quote!(#regex_type::concat(#l, #r))
            }
        })
    }
}
