//! Regular expressions over edge labels, and the derivative-based automata that match them.
//!
//! A [`Regex`] describes which label sequences form well-formed resolution paths.
//! [`Regex::compile`] turns it into an [`Automaton`] over a [`FiniteAlphabet`], and a
//! [`RegexMatcher`] walks that automaton one label at a time. Matchers are immutable:
//! stepping returns a new matcher, so a search can keep one per branch.

use proc_macro2::{LexError, TokenStream};
use thiserror::Error;

mod alphabet;
mod builder;
mod compile;
mod emit;
mod matcher;
mod parse;
mod regex;

#[cfg(feature = "dot")]
mod dot;

pub use alphabet::FiniteAlphabet;
pub use builder::{Deriver, RegexBuilder};
pub use compile::{Automaton, MatchState, StateID};
pub use matcher::RegexMatcher;
pub use regex::{Regex, Symbol};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("lex error: {0}")]
    Lex(#[from] LexError),
    #[error("parse error: {0}")]
    Parse(#[from] syn::Error),
}

/// A symbol in a parsed regular expression that does not name any label.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown symbol `{0}` in regular expression")]
pub struct UnknownSymbol(pub String);

/// parse a string to a regular expression
pub fn parse_regex(input: impl AsRef<str>) -> Result<Regex<Symbol>, ParseError> {
    let stream: TokenStream = input.as_ref().parse()?;
    Ok(parse_regex_token_stream(stream)?)
}

/// parse a rust [`TokenStream`](TokenStream) to a regular expression
pub fn parse_regex_token_stream(input: TokenStream) -> syn::Result<Regex<Symbol>> {
    syn::parse2(input)
}
