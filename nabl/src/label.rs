use nabl_regular_expressions::FiniteAlphabet;
use std::fmt::Debug;
use std::hash::Hash;

#[cfg(feature = "dynamic-regex")]
use nabl_regular_expressions::{parse_regex, ParseError, Regex, UnknownSymbol};
#[cfg(feature = "dynamic-regex")]
use thiserror::Error;

/// Represents types that can be used as labels on scope graph edges.
///
/// Can, and should, be derived using the [`Label`](nabl_macros::Label) derive macro.
/// Code in this crate relies on [`to_usize`](Label::to_usize) returning consecutive indices
/// from 0 in the order [`iter`](Label::iter) yields the labels.
pub trait Label: Copy + Eq + Hash + Debug {
    /// Convert any label to a unique usize.
    fn to_usize(&self) -> usize;

    /// Iterate over all possible labels that this label type could be.
    fn iter() -> impl Iterator<Item = Self>;

    /// The name of the variant, as written in regular expressions.
    fn name(&self) -> &'static str;

    /// All labels, in declaration order.
    fn alphabet() -> FiniteAlphabet<Self> {
        FiniteAlphabet::new(Self::iter())
    }
}

#[cfg(feature = "dynamic-regex")]
#[derive(Error, Debug)]
pub enum LabelRegexError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    UnknownSymbol(#[from] UnknownSymbol),
}

/// Parses a regular expression at runtime, reading each symbol as the name of a label.
///
/// ```rust
/// use nabl::{parse_label_regex, Label, Regex};
///
/// #[derive(Label, Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum Lbl {
///     P,
///     I,
/// }
///
/// let regex = parse_label_regex::<Lbl>("P* I?").unwrap();
/// assert!(regex.is_nullable());
/// assert!(parse_label_regex::<Lbl>("Q").is_err());
/// ```
#[cfg(feature = "dynamic-regex")]
pub fn parse_label_regex<L: Label>(input: &str) -> Result<Regex<L>, LabelRegexError> {
    let regex = parse_regex(input)?;
    Ok(regex.resolve_symbols(|name| L::iter().find(|l| l.name() == name))?)
}
