use crate::alphabet::FiniteAlphabet;
use crate::UnknownSymbol;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt::{Debug, Display, Formatter};
use std::hash::Hash;
use std::rc::Rc;

/// A label name as written in regular expression syntax, before it is resolved to a label type.
#[derive(Hash, Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Symbol {
    pub(crate) name: String,
}

impl Symbol {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self {
            name: value.to_string(),
        }
    }
}

/// Regular expression over symbols `S`.
///
/// Values built with the associated constructors below are kept exactly as written.
/// The normalized form used as automaton states is produced by [`RegexBuilder`](crate::RegexBuilder).
#[derive(Hash, Debug, Clone, PartialEq, Eq)]
pub enum Regex<S> {
    /// `e`: matches only the empty sequence.
    EmptyString,
    /// `0`: matches nothing.
    EmptySet,
    Symbol(S),
    Repeat(Rc<Regex<S>>),
    Complement(Rc<Regex<S>>),
    Or(Rc<Regex<S>>, Rc<Regex<S>>),
    And(Rc<Regex<S>>, Rc<Regex<S>>),
    Concat(Rc<Regex<S>>, Rc<Regex<S>>),
}

impl<S> Regex<S> {
    pub fn symbol(symbol: S) -> Self {
        Regex::Symbol(symbol)
    }

    pub fn repeat(inner: Self) -> Self {
        Regex::Repeat(Rc::new(inner))
    }

    /// `r+`, encoded as `r r*`.
    pub fn plus(inner: Self) -> Self {
        let inner = Rc::new(inner);
        Regex::Concat(inner.clone(), Rc::new(Regex::Repeat(inner)))
    }

    /// `r?`, encoded as `e | r`.
    pub fn optional(inner: Self) -> Self {
        Regex::Or(Rc::new(Regex::EmptyString), Rc::new(inner))
    }

    pub fn complement(inner: Self) -> Self {
        Regex::Complement(Rc::new(inner))
    }

    pub fn or(left: Self, right: Self) -> Self {
        Regex::Or(Rc::new(left), Rc::new(right))
    }

    pub fn and(left: Self, right: Self) -> Self {
        Regex::And(Rc::new(left), Rc::new(right))
    }

    pub fn concat(left: Self, right: Self) -> Self {
        Regex::Concat(Rc::new(left), Rc::new(right))
    }

    /// Whether this expression accepts the empty sequence.
    pub fn is_nullable(&self) -> bool {
        match self {
            Regex::EmptyString => true,
            Regex::EmptySet => false,
            Regex::Symbol(_) => false,
            Regex::Repeat(_) => true,
            Regex::Complement(inner) => !inner.is_nullable(),
            Regex::Or(l, r) => l.is_nullable() || r.is_nullable(),
            Regex::And(l, r) => l.is_nullable() && r.is_nullable(),
            Regex::Concat(l, r) => l.is_nullable() && r.is_nullable(),
        }
    }

    /// `~0`, the expression that matches every sequence.
    pub(crate) fn is_universal(&self) -> bool {
        matches!(self, Regex::Complement(inner) if matches!(inner.as_ref(), Regex::EmptySet))
    }

    /// Applies `f` to every symbol, stopping at the first error.
    pub fn try_map_symbols<T, E>(&self, f: &mut impl FnMut(&S) -> Result<T, E>) -> Result<Regex<T>, E> {
        Ok(match self {
            Regex::EmptyString => Regex::EmptyString,
            Regex::EmptySet => Regex::EmptySet,
            Regex::Symbol(s) => Regex::Symbol(f(s)?),
            Regex::Repeat(inner) => Regex::Repeat(Rc::new(inner.try_map_symbols(f)?)),
            Regex::Complement(inner) => Regex::Complement(Rc::new(inner.try_map_symbols(f)?)),
            Regex::Or(l, r) => Regex::Or(
                Rc::new(l.try_map_symbols(f)?),
                Rc::new(r.try_map_symbols(f)?),
            ),
            Regex::And(l, r) => Regex::And(
                Rc::new(l.try_map_symbols(f)?),
                Rc::new(r.try_map_symbols(f)?),
            ),
            Regex::Concat(l, r) => Regex::Concat(
                Rc::new(l.try_map_symbols(f)?),
                Rc::new(r.try_map_symbols(f)?),
            ),
        })
    }

    fn rank(&self) -> u8 {
        match self {
            Regex::EmptyString => 0,
            Regex::EmptySet => 1,
            Regex::Symbol(_) => 2,
            Regex::Repeat(_) => 3,
            Regex::Complement(_) => 4,
            Regex::Or(_, _) => 5,
            Regex::And(_, _) => 6,
            Regex::Concat(_, _) => 7,
        }
    }
}

impl<S: PartialEq> Regex<S> {
    /// Total order used to sort the operands of `|` and `&`.
    /// Symbols are ordered by their position in `ab`.
    pub(crate) fn compare(&self, other: &Regex<S>, ab: &FiniteAlphabet<S>) -> Ordering {
        match (self, other) {
            (Regex::Symbol(a), Regex::Symbol(b)) => {
                let a = ab.index_of(a).unwrap_or(usize::MAX);
                let b = ab.index_of(b).unwrap_or(usize::MAX);
                a.cmp(&b)
            }
            (Regex::Repeat(a), Regex::Repeat(b)) | (Regex::Complement(a), Regex::Complement(b)) => {
                a.compare(b, ab)
            }
            (Regex::Or(l1, r1), Regex::Or(l2, r2))
            | (Regex::And(l1, r1), Regex::And(l2, r2))
            | (Regex::Concat(l1, r1), Regex::Concat(l2, r2)) => {
                l1.compare(l2, ab).then_with(|| r1.compare(r2, ab))
            }
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl<S: Clone + Hash + Eq> Regex<S> {
    /// All symbols that occur in this expression.
    pub fn alphabet(&self) -> HashSet<S> {
        let mut alphabet = HashSet::new();
        let mut todo = vec![self];
        while let Some(regex) = todo.pop() {
            match regex {
                Regex::EmptyString | Regex::EmptySet => {}
                Regex::Symbol(s) => {
                    alphabet.insert(s.clone());
                }
                Regex::Repeat(i) | Regex::Complement(i) => todo.push(i),
                Regex::Or(l, r) | Regex::And(l, r) | Regex::Concat(l, r) => {
                    todo.push(l);
                    todo.push(r);
                }
            }
        }
        alphabet
    }
}

impl Regex<Symbol> {
    /// Replaces every symbol name by the value `lookup` returns for it.
    pub fn resolve_symbols<T>(
        &self,
        mut lookup: impl FnMut(&str) -> Option<T>,
    ) -> Result<Regex<T>, UnknownSymbol> {
        self.try_map_symbols(&mut |s: &Symbol| {
            lookup(&s.name).ok_or_else(|| UnknownSymbol(s.name.clone()))
        })
    }
}

impl<S: Display> Display for Regex<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Regex::EmptyString => write!(f, "e"),
            Regex::EmptySet => write!(f, "0"),
            Regex::Symbol(s) => write!(f, "{s}"),
            Regex::Repeat(r) => write!(f, "({r})*"),
            Regex::Complement(c) => write!(f, "~({c})"),
            Regex::Or(a, b) => write!(f, "({a} | {b})"),
            Regex::And(a, b) => write!(f, "({a} & {b})"),
            Regex::Concat(a, b) => write!(f, "{a} {b}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{parse_regex, Regex, Symbol, UnknownSymbol};

    #[test]
    fn nullable() {
        assert!(parse_regex("e").unwrap().is_nullable());
        assert!(!parse_regex("0").unwrap().is_nullable());

        assert!(parse_regex("e | e").unwrap().is_nullable());
        assert!(parse_regex("e | A").unwrap().is_nullable());
        assert!(parse_regex("A | e").unwrap().is_nullable());
        assert!(!parse_regex("A | B").unwrap().is_nullable());

        assert!(parse_regex("e & e").unwrap().is_nullable());
        assert!(!parse_regex("e & A").unwrap().is_nullable());
        assert!(!parse_regex("A & B").unwrap().is_nullable());

        assert!(!parse_regex("A e").unwrap().is_nullable());
        assert!(!parse_regex("e B").unwrap().is_nullable());
        assert!(!parse_regex("A B").unwrap().is_nullable());

        assert!(parse_regex("A*").unwrap().is_nullable());
        assert!(!parse_regex("A+").unwrap().is_nullable());
        assert!(parse_regex("A?").unwrap().is_nullable());
        assert!(parse_regex("~A").unwrap().is_nullable());
        assert!(!parse_regex("~e").unwrap().is_nullable());
    }

    #[test]
    fn alphabet() {
        let regex = parse_regex("A* (B | C) A").unwrap();
        let alphabet = regex.alphabet();
        assert_eq!(3, alphabet.len());
        assert!(alphabet.contains(&Symbol::from("B")));
    }

    #[test]
    fn resolve_symbols() {
        let regex = parse_regex("A B*").unwrap();
        let resolved = regex
            .resolve_symbols(|name| name.chars().next())
            .unwrap();
        assert_eq!(
            Regex::concat(Regex::symbol('A'), Regex::repeat(Regex::symbol('B'))),
            resolved
        );

        let err = regex
            .resolve_symbols(|name| (name == "A").then_some(0))
            .unwrap_err();
        assert_eq!(UnknownSymbol("B".to_string()), err);
    }
}
