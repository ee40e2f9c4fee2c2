use crate::alphabet::FiniteAlphabet;
use crate::builder::{Deriver, RegexBuilder};
use crate::Regex;
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;

pub type StateID = usize;

/// One state of an [`Automaton`]: the residual regular expression still to be matched.
#[derive(Debug, Clone)]
pub struct MatchState<S> {
    pub regex: Rc<Regex<S>>,
    nullable: bool,
    live: bool,
    /// Successor per alphabet symbol, indexed by [`FiniteAlphabet::index_of`].
    pub transition_table: Vec<StateID>,
}

impl<S> MatchState<S> {
    /// This state accepts the sequence consumed so far.
    pub fn is_accepting(&self) -> bool {
        self.nullable
    }

    /// No sequence of further symbols leads from this state to an accepting state.
    pub fn is_stuck(&self) -> bool {
        !self.live
    }
}

/// Deterministic automaton whose states are derivatives of one regular expression.
#[derive(Debug)]
pub struct Automaton<S> {
    pub regex: Rc<Regex<S>>,
    pub alphabet: FiniteAlphabet<S>,
    pub states: Vec<MatchState<S>>,
    pub initial: StateID,
}

impl<S> Automaton<S> {
    pub fn state(&self, id: StateID) -> &MatchState<S> {
        &self.states[id]
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

struct RegexCompiler<'a, S> {
    derivers: Vec<Deriver<'a, S>>,
    state_ids: HashMap<Rc<Regex<S>>, StateID>,
    regexes: Vec<Rc<Regex<S>>>,
    state_transitions: Vec<Vec<StateID>>,
    reverse_transitions: Vec<HashSet<StateID>>,
}

impl<'a, S> RegexCompiler<'a, S>
where
    S: Clone + Hash + Eq,
{
    fn new(builder: RegexBuilder<'a, S>) -> Self {
        let derivers = builder
            .alphabet()
            .iter()
            .map(|symbol| Deriver::new(symbol.clone(), builder))
            .collect();

        Self {
            derivers,
            state_ids: HashMap::new(),
            regexes: Vec::new(),
            state_transitions: Vec::new(),
            reverse_transitions: Vec::new(),
        }
    }

    /// Returns the id of `state`, and whether it was seen for the first time.
    fn intern(&mut self, state: Rc<Regex<S>>) -> (StateID, bool) {
        if let Some(&id) = self.state_ids.get(&state) {
            return (id, false);
        }
        let id = self.regexes.len();
        self.state_ids.insert(state.clone(), id);
        self.regexes.push(state);
        self.state_transitions.push(Vec::new());
        self.reverse_transitions.push(HashSet::new());
        (id, true)
    }

    fn create_transitions(&mut self, initial: Rc<Regex<S>>) -> StateID {
        let (initial, _) = self.intern(initial);
        let mut work_list = vec![initial];

        while let Some(id) = work_list.pop() {
            let state = self.regexes[id].clone();
            let mut transitions = Vec::with_capacity(self.derivers.len());

            for index in 0..self.derivers.len() {
                let next_state = self.derivers[index].derive(&state);
                let (next_id, fresh) = self.intern(next_state);

                self.reverse_transitions[next_id].insert(id);
                transitions.push(next_id);

                if fresh {
                    work_list.push(next_id);
                }
            }

            self.state_transitions[id] = transitions;
        }

        initial
    }

    /// Backward reachability from the nullable states over the reverse transitions.
    fn find_live(&self) -> Vec<bool> {
        let mut live = vec![false; self.regexes.len()];
        let mut work_list: Vec<StateID> = (0..self.regexes.len())
            .filter(|&id| self.regexes[id].is_nullable())
            .collect();

        while let Some(id) = work_list.pop() {
            if live[id] {
                continue;
            }
            live[id] = true;
            for &previous in &self.reverse_transitions[id] {
                if !live[previous] {
                    work_list.push(previous);
                }
            }
        }
        live
    }

    fn compile(mut self, regex: Rc<Regex<S>>, initial: Rc<Regex<S>>, alphabet: FiniteAlphabet<S>) -> Automaton<S> {
        let initial = self.create_transitions(initial);
        let live = self.find_live();

        let states: Vec<_> = self
            .regexes
            .into_iter()
            .zip(self.state_transitions)
            .zip(live)
            .map(|((regex, transition_table), live)| MatchState {
                nullable: regex.is_nullable(),
                live,
                transition_table,
                regex,
            })
            .collect();

        log::debug!(
            "compiled automaton with {} states over {} symbols",
            states.len(),
            alphabet.len()
        );

        Automaton {
            regex,
            alphabet,
            states,
            initial,
        }
    }
}

impl<S> Regex<S>
where
    S: Clone + Hash + Eq + Debug,
{
    /// Builds the automaton for this expression over `alphabet`.
    ///
    /// # Panics
    ///
    /// When this expression mentions a symbol that is not in `alphabet`.
    pub fn compile(self, alphabet: FiniteAlphabet<S>) -> Automaton<S> {
        for symbol in self.alphabet() {
            assert!(
                alphabet.contains(&symbol),
                "symbol {symbol:?} is not in the alphabet {alphabet:?}"
            );
        }

        let builder = RegexBuilder::new(&alphabet);
        let initial = builder.normalize(&self);
        let compiler = RegexCompiler::new(builder);
        compiler.compile(Rc::new(self), initial, alphabet.clone())
    }
}

#[cfg(test)]
mod tests {
    use crate::{parse_regex, Automaton, FiniteAlphabet, Regex, StateID, Symbol};
    use std::collections::{HashSet, VecDeque};

    fn automaton(regex: &str, alphabet: &str) -> Automaton<Symbol> {
        let ab = FiniteAlphabet::new(alphabet.split_whitespace().map(Symbol::from));
        parse_regex(regex).unwrap().compile(ab)
    }

    /// Independent forward check: can an accepting state be reached from `start`?
    fn reaches_accepting(automaton: &Automaton<Symbol>, start: StateID) -> bool {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([start]);
        while let Some(id) = queue.pop_front() {
            if !seen.insert(id) {
                continue;
            }
            let state = automaton.state(id);
            if state.is_accepting() {
                return true;
            }
            queue.extend(state.transition_table.iter().copied());
        }
        false
    }

    fn check_liveness(regex: &str, alphabet: &str) {
        let automaton = automaton(regex, alphabet);
        for id in 0..automaton.len() {
            assert_eq!(
                reaches_accepting(&automaton, id),
                !automaton.state(id).is_stuck(),
                "liveness of state {} in {regex}",
                automaton.state(id).regex,
            );
        }
    }

    #[test]
    fn liveness_agrees_with_forward_search() {
        check_liveness("a* b", "a b");
        check_liveness("a b | b a", "a b");
        check_liveness("(a b)* c", "a b c");
        check_liveness("~(a b)", "a b");
        check_liveness("a* & b*", "a b");
        check_liveness("0", "a");
        check_liveness("e", "a b");
        check_liveness("a+ b? c*", "a b c");
    }

    #[test]
    fn states_are_finite_and_deduplicated() {
        // a* has a single residual: a* itself, plus the dead state 0.
        let automaton = automaton("a*", "a b");
        assert_eq!(2, automaton.len());

        let initial = automaton.state(automaton.initial);
        assert!(initial.is_accepting());
        assert_eq!(automaton.initial, initial.transition_table[0]);
    }

    #[test]
    fn every_state_has_a_transition_per_symbol() {
        let automaton = automaton("(a | b)* c b", "a b c");
        for state in &automaton.states {
            assert_eq!(3, state.transition_table.len());
        }
    }

    #[test]
    #[should_panic]
    fn symbols_must_be_in_alphabet() {
        let _ = Regex::symbol('x').compile(FiniteAlphabet::new(['a']));
    }
}
