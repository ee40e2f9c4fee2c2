use crate::label::impl_label;
use nabl_regular_expressions::{Regex, Symbol};
use proc_macro::TokenStream;
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::{parse_macro_input, DeriveInput, Token, Type};

mod label;

#[proc_macro_derive(Label)]
pub fn label_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    impl_label(input)
}

struct RegexInput {
    alphabet_type: Type,
    _colon: Token![:],
    regex: Regex<Symbol>,
}

impl Parse for RegexInput {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        Ok(Self {
            alphabet_type: input.parse()?,
            _colon: input.parse()?,
            regex: input.parse()?,
        })
    }
}

#[proc_macro]
pub fn regex(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as RegexInput);
    let alphabet_type = input.alphabet_type;
    let regex_type = quote!(nabl::Regex::<#alphabet_type>);

    match input.regex.emit(&regex_type) {
        Ok(regex) => quote!({ #regex }).into(),
        Err(err) => err.to_compile_error().into(),
    }
}
