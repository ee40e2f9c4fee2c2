use std::fmt::{Debug, Formatter};

/// A finite, ordered set of symbols.
///
/// The order is the order in which symbols were first given, duplicates are dropped.
/// The index of a symbol is used to order regular expressions during normalization and to
/// index transition tables, so an alphabet is fixed for the lifetime of an [`Automaton`](crate::Automaton).
#[derive(Clone, PartialEq, Eq)]
pub struct FiniteAlphabet<S> {
    symbols: Vec<S>,
}

impl<S: PartialEq> FiniteAlphabet<S> {
    pub fn new(symbols: impl IntoIterator<Item = S>) -> Self {
        let mut unique: Vec<S> = Vec::new();
        for symbol in symbols {
            if !unique.contains(&symbol) {
                unique.push(symbol);
            }
        }
        Self { symbols: unique }
    }

    pub fn contains(&self, symbol: &S) -> bool {
        self.symbols.contains(symbol)
    }

    /// Position of `symbol` in this alphabet, or `None` if it is not part of it.
    pub fn index_of(&self, symbol: &S) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }
}

impl<S> FiniteAlphabet<S> {
    pub fn iter(&self) -> impl Iterator<Item = &S> {
        self.symbols.iter()
    }

    pub fn get(&self, index: usize) -> Option<&S> {
        self.symbols.get(index)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl<S: PartialEq> FromIterator<S> for FiniteAlphabet<S> {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::new(iter)
    }
}

impl<'a, S> IntoIterator for &'a FiniteAlphabet<S> {
    type Item = &'a S;
    type IntoIter = std::slice::Iter<'a, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.symbols.iter()
    }
}

impl<S: Debug> Debug for FiniteAlphabet<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.symbols.iter()).finish()
    }
}
