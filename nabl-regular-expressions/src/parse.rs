//! Parser for regular expressions written as Rust tokens.
//!
//! Syntax, from loosest to tightest binding:
//!
//! ```text
//! regex  := and ('|' and)*
//! and    := seq ('&' seq)*
//! seq    := unary unary*                 (juxtaposition, right-associative)
//! unary  := '~' neg | atom ('*' | '+' | '?')*
//! neg    := '~' neg | atom
//! atom   := '0' | 'e' | label-path | '(' regex ')'
//! ```
//!
//! A postfix operator directly after a `~` operand is rejected as ambiguous.

use crate::regex::Symbol;
use crate::Regex;
use syn::parse::{Parse, ParseStream};
use syn::{parenthesized, Path, Token};

fn starts_atom(input: ParseStream) -> bool {
    input.peek(syn::token::Paren)
        || input.peek(syn::LitInt)
        || input.peek(syn::Ident)
        || input.peek(Token![~])
}

fn starts_postfix(input: ParseStream) -> bool {
    input.peek(Token![*]) || input.peek(Token![+]) || input.peek(Token![?])
}

fn parse_or(input: ParseStream) -> syn::Result<Regex<Symbol>> {
    let mut regex = parse_and(input)?;
    // or is left-associative
    while input.peek(Token![|]) {
        input.parse::<Token![|]>()?;
        regex = Regex::or(regex, parse_and(input)?);
    }
    Ok(regex)
}

fn parse_and(input: ParseStream) -> syn::Result<Regex<Symbol>> {
    let mut regex = parse_seq(input)?;
    // and is left-associative, and binds tighter than or
    while input.peek(Token![&]) {
        input.parse::<Token![&]>()?;
        regex = Regex::and(regex, parse_seq(input)?);
    }
    Ok(regex)
}

fn parse_seq(input: ParseStream) -> syn::Result<Regex<Symbol>> {
    let first = parse_unary(input)?;
    let mut rest = Vec::new();
    while starts_atom(input) {
        rest.push(parse_unary(input)?);
    }

    // concat is right-associative
    let Some(mut regex) = rest.pop() else {
        return Ok(first);
    };
    while let Some(part) = rest.pop() {
        regex = Regex::concat(part, regex);
    }
    Ok(Regex::concat(first, regex))
}

fn parse_unary(input: ParseStream) -> syn::Result<Regex<Symbol>> {
    if input.peek(Token![~]) {
        let regex = parse_neg(input)?;
        if starts_postfix(input) {
            let op = if input.peek(Token![*]) {
                '*'
            } else if input.peek(Token![+]) {
                '+'
            } else {
                '?'
            };
            return Err(input.error(format!(
                "ambiguous regex: simultaneous use of '~' prefix and '{op}' postfix operator"
            )));
        }
        return Ok(regex);
    }

    let mut regex = parse_atom(input)?;
    loop {
        if input.peek(Token![*]) {
            input.parse::<Token![*]>()?;
            regex = Regex::repeat(regex);
        } else if input.peek(Token![+]) {
            input.parse::<Token![+]>()?;
            regex = Regex::plus(regex);
        } else if input.peek(Token![?]) {
            input.parse::<Token![?]>()?;
            regex = Regex::optional(regex);
        } else {
            return Ok(regex);
        }
    }
}

fn parse_neg(input: ParseStream) -> syn::Result<Regex<Symbol>> {
    if input.peek(Token![~]) {
        input.parse::<Token![~]>()?;
        Ok(Regex::complement(parse_neg(input)?))
    } else {
        parse_atom(input)
    }
}

fn parse_atom(input: ParseStream) -> syn::Result<Regex<Symbol>> {
    let lookahead = input.lookahead1();

    // Rust performs parenthesis matching: leverage that here.
    if lookahead.peek(syn::token::Paren) {
        let inner;
        parenthesized!(inner in input);
        let regex = parse_or(&inner)?;
        if !inner.is_empty() {
            return Err(inner.error("unexpected token in parenthesized regular expression"));
        }
        return Ok(regex);
    }

    if lookahead.peek(syn::LitInt) {
        let val = input.parse::<syn::LitInt>()?;
        return match val.base10_parse::<u64>() {
            Ok(0) => Ok(Regex::EmptySet),
            _ => Err(syn::Error::new(val.span(), "only '0' is allowed as a literal")),
        };
    }

    if lookahead.peek(syn::Ident) {
        let name = Path::parse_mod_style(input)?;
        if name.is_ident("e") {
            return Ok(Regex::EmptyString);
        }
        let name = name
            .segments
            .iter()
            .map(|segment| segment.ident.to_string())
            .collect::<Vec<_>>()
            .join("::");
        return Ok(Regex::Symbol(Symbol { name }));
    }

    if input.is_empty() || starts_postfix(input) || input.peek(Token![|]) || input.peek(Token![&]) {
        return Err(input.error(
            "expected '0', 'e', '~', label or parenthesized regular expression here",
        ));
    }
    Err(lookahead.error())
}

impl Parse for Regex<Symbol> {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let regex = parse_or(input)?;
        if !input.is_empty() {
            return Err(input.error("residual input after parsing finished"));
        }
        Ok(regex)
    }
}
