use crate::compile::{Automaton, MatchState, StateID};
use crate::{FiniteAlphabet, Regex};
use std::fmt::{Debug, Formatter};
use std::hash::Hash;
use std::rc::Rc;

/// Incremental matcher for a compiled regular expression.
///
/// A matcher is a position in an [`Automaton`]. Matching a symbol never changes the matcher
/// itself but returns a new one, so one matcher can be extended along several branches.
/// Cloning is cheap: all matchers derived from the same [`RegexMatcher::new`] share the automaton.
pub struct RegexMatcher<S> {
    automaton: Rc<Automaton<S>>,
    state: StateID,
}

impl<S> Clone for RegexMatcher<S> {
    fn clone(&self) -> Self {
        Self {
            automaton: self.automaton.clone(),
            state: self.state,
        }
    }
}

impl<S> RegexMatcher<S>
where
    S: Clone + Hash + Eq + Debug,
{
    /// Compiles `regex` over `alphabet` and returns a matcher at its initial state.
    pub fn new(regex: Regex<S>, alphabet: FiniteAlphabet<S>) -> Self {
        Self::from_automaton(Rc::new(regex.compile(alphabet)))
    }
}

impl<S> RegexMatcher<S> {
    pub fn from_automaton(automaton: Rc<Automaton<S>>) -> Self {
        Self {
            state: automaton.initial,
            automaton,
        }
    }

    fn current(&self) -> &MatchState<S> {
        self.automaton.state(self.state)
    }

    /// Whether the symbols matched so far form an accepted sequence.
    pub fn is_accepting(&self) -> bool {
        self.current().is_accepting()
    }

    /// Whether no continuation of the symbols matched so far can be accepted.
    pub fn is_stuck(&self) -> bool {
        self.current().is_stuck()
    }

    /// The residual expression that remains to be matched.
    pub fn regex(&self) -> &Rc<Regex<S>> {
        &self.current().regex
    }

    pub fn alphabet(&self) -> &FiniteAlphabet<S> {
        &self.automaton.alphabet
    }

    pub fn automaton(&self) -> &Rc<Automaton<S>> {
        &self.automaton
    }
}

impl<S: PartialEq + Debug> RegexMatcher<S> {
    /// Returns the matcher after consuming `symbol`.
    ///
    /// # Panics
    ///
    /// When `symbol` is not in the alphabet the matcher was compiled for.
    pub fn match_symbol(&self, symbol: &S) -> Self {
        let Some(index) = self.automaton.alphabet.index_of(symbol) else {
            panic!(
                "symbol {symbol:?} is not in the alphabet {:?}",
                self.automaton.alphabet
            );
        };
        Self {
            automaton: self.automaton.clone(),
            state: self.current().transition_table[index],
        }
    }

    /// Matches `symbols` from left to right.
    pub fn match_all<'a>(&self, symbols: impl IntoIterator<Item = &'a S>) -> Self
    where
        S: 'a,
    {
        symbols
            .into_iter()
            .fold(self.clone(), |matcher, symbol| matcher.match_symbol(symbol))
    }

    /// Returns true if the sequence `symbols` is accepted from this matcher's state.
    pub fn accepts<'a>(&self, symbols: impl IntoIterator<Item = &'a S>) -> bool
    where
        S: 'a,
    {
        let mut matcher = self.clone();
        for symbol in symbols {
            matcher = matcher.match_symbol(symbol);
            if matcher.is_stuck() {
                return false;
            }
        }
        matcher.is_accepting()
    }
}

impl<S> PartialEq for RegexMatcher<S> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.automaton, &other.automaton) && self.state == other.state
    }
}

impl<S> Eq for RegexMatcher<S> {}

impl<S: Debug> Debug for RegexMatcher<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegexMatcher")
            .field("state", &self.state)
            .field("regex", self.regex())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::{parse_regex, FiniteAlphabet, RegexMatcher, Symbol};

    fn matcher(regex: &str, alphabet: &str) -> RegexMatcher<Symbol> {
        let ab = FiniteAlphabet::new(alphabet.split_whitespace().map(Symbol::from));
        RegexMatcher::new(parse_regex(regex).unwrap(), ab)
    }

    fn syms(input: &str) -> Vec<Symbol> {
        input.split_whitespace().map(Symbol::from).collect()
    }

    #[test]
    fn star_then_symbol() {
        let m = matcher("a* b", "a b");

        let aab = m.match_all(&syms("a a b"));
        assert!(aab.is_accepting());
        assert!(!aab.is_stuck());

        let b = m.match_symbol(&Symbol::from("b"));
        assert!(b.is_accepting());
        assert!(!b.is_stuck());

        let ba = b.match_symbol(&Symbol::from("a"));
        assert!(ba.is_stuck());
        assert!(!ba.is_accepting());
    }

    #[test]
    fn matching_does_not_change_the_receiver() {
        let m = matcher("a b", "a b");
        let after = m.match_symbol(&Symbol::from("a"));
        assert_ne!(m, after);
        assert!(!m.is_accepting());
        assert!(after.match_symbol(&Symbol::from("b")).is_accepting());
        assert!(m.match_symbol(&Symbol::from("b")).is_stuck());
    }

    #[test]
    fn empty_language_is_stuck_immediately() {
        let m = matcher("0", "a");
        assert!(m.is_stuck());
        assert!(m.match_symbol(&Symbol::from("a")).is_stuck());
    }

    #[test]
    fn accepts() {
        let m = matcher("a b*", "a b");
        assert!(m.accepts(&syms("a")));
        assert!(m.accepts(&syms("a b")));
        assert!(m.accepts(&syms("a b b b b b")));
        assert!(!m.accepts(&syms("b a")));
        assert!(!m.accepts(&syms("")));
    }

    #[test]
    fn complement_and_intersection() {
        let not_ab = matcher("~(a b)", "a b");
        assert!(not_ab.accepts(&syms("")));
        assert!(not_ab.accepts(&syms("a")));
        assert!(!not_ab.accepts(&syms("a b")));
        assert!(not_ab.accepts(&syms("a b a")));

        let both = matcher("a* b* & (a | b)*", "a b");
        assert!(both.accepts(&syms("a a b")));
        assert!(!both.accepts(&syms("b a")));
    }

    #[test]
    #[should_panic(expected = "not in the alphabet")]
    fn symbol_outside_alphabet() {
        matcher("a", "a").match_symbol(&Symbol::from("z"));
    }
}
