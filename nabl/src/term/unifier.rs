use crate::term::{Term, TermError, TermOp, TermVar};
use im::HashMap;

/// A persistent substitution from variables and operator terms to their representatives.
///
/// Lookups may compress binding chains, which yields a new unifier; the old one stays valid.
/// Bindings never form a cycle, so [`find`](TermUnifier::find) always terminates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermUnifier {
    var_reps: HashMap<TermVar, Term>,
    op_reps: HashMap<TermOp, Term>,
}

/// Result of [`TermUnifier::find`].
#[derive(Debug, Clone)]
pub struct FindResult {
    /// The representative of the term that was looked up.
    pub rep: Term,
    /// The unifier with the followed chain pointing directly at `rep`.
    pub unifier: TermUnifier,
    /// Number of bindings that were rewritten. Zero means `unifier` equals the receiver.
    pub compressed: usize,
}

impl TermUnifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn binding(&self, term: &Term) -> Option<&Term> {
        match term {
            Term::Var(var) => self.var_reps.get(var),
            Term::Op(op) => self.op_reps.get(op),
            _ => None,
        }
    }

    fn rebind(&mut self, key: Term, rep: Term) {
        match key {
            Term::Var(var) => {
                self.var_reps.insert(var, rep);
            }
            Term::Op(op) => {
                self.op_reps.insert(op, rep);
            }
            _ => {}
        }
    }

    /// Follows bindings from `term` to its representative without compressing.
    pub(crate) fn walk<'a>(&'a self, term: &'a Term) -> &'a Term {
        let mut current = term;
        while let Some(next) = self.binding(current) {
            current = next;
        }
        current
    }

    /// Resolves `term` to its representative.
    ///
    /// Every binding on the followed chain that does not point at the representative yet
    /// is rewritten in the returned unifier.
    pub fn find(&self, term: &Term) -> FindResult {
        let mut chain = Vec::new();
        let mut current = term;
        while let Some(next) = self.binding(current) {
            chain.push(current);
            current = next;
        }
        let rep = current.clone();

        let mut unifier = self.clone();
        let mut compressed = 0;
        for key in chain {
            if self.binding(key) != Some(&rep) {
                unifier.rebind(key.clone(), rep.clone());
                compressed += 1;
            }
        }
        if compressed > 0 {
            log::trace!("compressed {compressed} bindings to {rep}");
        }

        FindResult {
            rep,
            unifier,
            compressed,
        }
    }

    /// Compresses every bound variable and operator so it points directly at its representative.
    pub fn find_all(&self) -> TermUnifier {
        let keys: Vec<Term> = self
            .var_reps
            .keys()
            .cloned()
            .map(Term::Var)
            .chain(self.op_reps.keys().cloned().map(Term::Op))
            .collect();

        keys.iter()
            .fold(self.clone(), |unifier, key| unifier.find(key).unifier)
    }

    pub fn variables(&self) -> impl Iterator<Item = &TermVar> + '_ {
        self.var_reps.keys()
    }

    pub fn operators(&self) -> impl Iterator<Item = &TermOp> + '_ {
        self.op_reps.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.var_reps.is_empty() && self.op_reps.is_empty()
    }

    /// Binds `var` to `term`, returning the extended unifier.
    pub fn bind_var(&self, var: TermVar, term: Term) -> Result<TermUnifier, TermError> {
        self.bind(Term::Var(var), term)
    }

    /// Binds the operator term `op` to `term`, returning the extended unifier.
    pub fn bind_op(&self, op: TermOp, term: Term) -> Result<TermUnifier, TermError> {
        self.bind(Term::Op(op), term)
    }

    fn bind(&self, key: Term, term: Term) -> Result<TermUnifier, TermError> {
        if self.binding(&key).is_some() {
            return Err(TermError::AlreadyBound(key.to_string()));
        }
        if *self.walk(&term) == key {
            return Ok(self.clone());
        }
        if self.occurs(&key, &term) {
            return Err(TermError::CyclicBinding(key.to_string()));
        }

        let mut unifier = self.clone();
        unifier.rebind(key, term);
        Ok(unifier)
    }

    /// Whether `key` appears in `term` once the substitution is applied.
    fn occurs(&self, key: &Term, term: &Term) -> bool {
        let mut stack = vec![term];
        while let Some(current) = stack.pop() {
            let rep = self.walk(current);
            if rep == key {
                return true;
            }
            stack.extend(rep.children());
        }
        false
    }

    /// Applies the substitution everywhere in `term`.
    pub fn substitute(&self, term: &Term) -> Term {
        enum Task<'a> {
            Visit(&'a Term),
            Appl(&'a str, usize),
            Op(&'a str, usize),
            Tuple(usize),
            Cons,
        }

        let mut tasks = vec![Task::Visit(term)];
        let mut done: Vec<Term> = Vec::new();

        while let Some(task) = tasks.pop() {
            match task {
                Task::Visit(term) => {
                    let rep = self.walk(term);
                    match rep {
                        Term::Appl(appl) => tasks.push(Task::Appl(appl.op(), appl.arity())),
                        Term::Op(op) => tasks.push(Task::Op(op.op(), op.arity())),
                        Term::Tuple(tuple) => tasks.push(Task::Tuple(tuple.args().len())),
                        Term::Cons(_) => tasks.push(Task::Cons),
                        leaf => {
                            done.push(leaf.clone());
                            continue;
                        }
                    }
                    tasks.extend(rep.children().into_iter().rev().map(Task::Visit));
                }
                Task::Appl(op, arity) => {
                    let args = done.split_off(done.len() - arity);
                    done.push(Term::appl(op, args));
                }
                Task::Op(op, arity) => {
                    let args = done.split_off(done.len() - arity);
                    done.push(Term::op(op, args));
                }
                Task::Tuple(arity) => {
                    let args = done.split_off(done.len() - arity);
                    done.push(Term::tuple(args));
                }
                Task::Cons => {
                    let tail = done.pop().unwrap_or(Term::Nil);
                    let head = done.pop().unwrap_or(Term::Nil);
                    done.push(Term::cons(head, tail));
                }
            }
        }

        done.pop().unwrap_or_else(|| term.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> TermVar {
        TermVar::new("x")
    }

    fn y() -> TermVar {
        TermVar::new("y")
    }

    fn z() -> TermVar {
        TermVar::new("z")
    }

    /// x -> y -> z -> Foo(1)
    fn chain() -> TermUnifier {
        TermUnifier::new()
            .bind_var(z(), Term::appl("Foo", [Term::int(1)]))
            .unwrap()
            .bind_var(y(), Term::Var(z()))
            .unwrap()
            .bind_var(x(), Term::Var(y()))
            .unwrap()
    }

    #[test]
    fn find_follows_chain_and_compresses() {
        let unifier = chain();
        let first = unifier.find(&Term::Var(x()));
        assert_eq!(Term::appl("Foo", [Term::int(1)]), first.rep);
        assert_eq!(2, first.compressed);

        // the receiver is untouched
        assert_eq!(Some(&Term::Var(y())), unifier.var_reps.get(&x()));
        assert_eq!(
            Some(&first.rep),
            first.unifier.var_reps.get(&x())
        );
    }

    #[test]
    fn find_is_idempotent() {
        let unifier = chain();
        let first = unifier.find(&Term::Var(x()));
        let second = first.unifier.find(&Term::Var(x()));
        let third = second.unifier.find(&Term::Var(x()));

        assert_eq!(first.rep, second.rep);
        assert_eq!(second.rep, third.rep);
        assert_eq!(0, second.compressed);
        assert_eq!(0, third.compressed);
        assert_eq!(second.unifier, third.unifier);
    }

    #[test]
    fn find_on_unbound_terms() {
        let unifier = chain();
        let result = unifier.find(&Term::var("free"));
        assert_eq!(Term::var("free"), result.rep);
        assert_eq!(0, result.compressed);

        let result = unifier.find(&Term::int(3));
        assert_eq!(Term::int(3), result.rep);
    }

    #[test]
    fn find_all_reaches_fixed_point() {
        let unifier = chain().find_all();
        for var in [x(), y(), z()] {
            assert_eq!(0, unifier.find(&Term::Var(var)).compressed);
        }
        assert_eq!(unifier, unifier.find_all());
    }

    #[test]
    fn operators_have_representatives() {
        let op = TermOp::new("typeOf", [Term::var("e")]);
        let unifier = TermUnifier::new()
            .bind_op(op.clone(), Term::appl("Int", []))
            .unwrap();
        assert_eq!(
            Term::appl("Int", []),
            unifier.find(&Term::Op(op)).rep
        );
        assert_eq!(1, unifier.operators().count());
    }

    #[test]
    fn rebinding_is_rejected() {
        let unifier = chain();
        assert_eq!(
            Err(TermError::AlreadyBound("?x".into())),
            unifier.bind_var(x(), Term::int(0))
        );
    }

    #[test]
    fn cyclic_bindings_are_rejected() {
        let unifier = TermUnifier::new()
            .bind_var(y(), Term::list([Term::Var(x())]))
            .unwrap();

        assert!(matches!(
            unifier.bind_var(x(), Term::appl("Box", [Term::Var(y())])),
            Err(TermError::CyclicBinding(_))
        ));
    }

    #[test]
    fn binding_to_itself_is_a_no_op() {
        let unifier = TermUnifier::new()
            .bind_var(y(), Term::Var(x()))
            .unwrap();
        let same = unifier.bind_var(x(), Term::Var(y())).unwrap();
        assert_eq!(unifier, same);
    }

    #[test]
    fn substitute_applies_everywhere() {
        let unifier = chain();
        let term = Term::tuple([
            Term::Var(x()),
            Term::list_with_tail([Term::Var(y())], Term::var("rest")),
        ]);

        let foo = Term::appl("Foo", [Term::int(1)]);
        assert_eq!(
            Term::tuple([
                foo.clone(),
                Term::list_with_tail([foo], Term::var("rest")),
            ]),
            unifier.substitute(&term)
        );
    }
}
