use crate::alphabet::FiniteAlphabet;
use crate::Regex;
use std::rc::Rc;

/// Builds regular expressions in normal form.
///
/// Every constructor assumes its operands are already normalized and applies the
/// similarity rules below, so that derivatives of one expression only ever produce
/// finitely many distinct states.
///
/// * `0 r = r 0 = 0`, `e r = r e = r`, and concatenation nests to the right.
/// * `|` and `&` are flattened, sorted by [`Regex::compare`] and deduplicated.
///   `0` is dropped from `|` and absorbs `&`; `~0` absorbs `|` and is dropped from `&`.
/// * `0* = e* = e`, `r** = r*` and `~~r = r`.
pub struct RegexBuilder<'a, S> {
    alphabet: &'a FiniteAlphabet<S>,
}

impl<S> Clone for RegexBuilder<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for RegexBuilder<'_, S> {}

impl<'a, S: Clone + PartialEq> RegexBuilder<'a, S> {
    pub fn new(alphabet: &'a FiniteAlphabet<S>) -> Self {
        Self { alphabet }
    }

    pub fn alphabet(&self) -> &'a FiniteAlphabet<S> {
        self.alphabet
    }

    pub fn empty_string(&self) -> Rc<Regex<S>> {
        Rc::new(Regex::EmptyString)
    }

    pub fn empty_set(&self) -> Rc<Regex<S>> {
        Rc::new(Regex::EmptySet)
    }

    pub fn symbol(&self, symbol: S) -> Rc<Regex<S>> {
        Rc::new(Regex::Symbol(symbol))
    }

    pub fn repeat(&self, inner: Rc<Regex<S>>) -> Rc<Regex<S>> {
        match inner.as_ref() {
            Regex::EmptySet | Regex::EmptyString => self.empty_string(),
            Regex::Repeat(_) => inner,
            _ => Rc::new(Regex::Repeat(inner)),
        }
    }

    pub fn complement(&self, inner: Rc<Regex<S>>) -> Rc<Regex<S>> {
        match inner.as_ref() {
            Regex::Complement(c) => c.clone(),
            _ => Rc::new(Regex::Complement(inner)),
        }
    }

    pub fn concat(&self, left: Rc<Regex<S>>, right: Rc<Regex<S>>) -> Rc<Regex<S>> {
        match (left.as_ref(), right.as_ref()) {
            (Regex::EmptySet, _) | (_, Regex::EmptySet) => self.empty_set(),
            (Regex::EmptyString, _) => right,
            (_, Regex::EmptyString) => left,
            (Regex::Concat(il, ir), _) => self.concat(il.clone(), self.concat(ir.clone(), right)),
            _ => Rc::new(Regex::Concat(left, right)),
        }
    }

    pub fn or(&self, left: Rc<Regex<S>>, right: Rc<Regex<S>>) -> Rc<Regex<S>> {
        let mut operands = Vec::new();
        flatten(left, &mut operands, |r| match r {
            Regex::Or(l, r) => Some((l.clone(), r.clone())),
            _ => None,
        });
        flatten(right, &mut operands, |r| match r {
            Regex::Or(l, r) => Some((l.clone(), r.clone())),
            _ => None,
        });

        if operands.iter().any(|o| o.is_universal()) {
            return self.complement(self.empty_set());
        }
        operands.retain(|o| !matches!(o.as_ref(), Regex::EmptySet));

        self.rebuild(operands, Regex::Or, self.empty_set())
    }

    pub fn and(&self, left: Rc<Regex<S>>, right: Rc<Regex<S>>) -> Rc<Regex<S>> {
        let mut operands = Vec::new();
        flatten(left, &mut operands, |r| match r {
            Regex::And(l, r) => Some((l.clone(), r.clone())),
            _ => None,
        });
        flatten(right, &mut operands, |r| match r {
            Regex::And(l, r) => Some((l.clone(), r.clone())),
            _ => None,
        });

        if operands.iter().any(|o| matches!(o.as_ref(), Regex::EmptySet)) {
            return self.empty_set();
        }
        operands.retain(|o| !o.is_universal());

        self.rebuild(operands, Regex::And, self.complement(self.empty_set()))
    }

    /// Sorts and deduplicates `operands`, then nests them to the right with `node`.
    fn rebuild(
        &self,
        mut operands: Vec<Rc<Regex<S>>>,
        node: fn(Rc<Regex<S>>, Rc<Regex<S>>) -> Regex<S>,
        unit: Rc<Regex<S>>,
    ) -> Rc<Regex<S>> {
        operands.sort_by(|a, b| a.compare(b, self.alphabet));
        operands.dedup();

        let Some(mut acc) = operands.pop() else {
            return unit;
        };
        while let Some(operand) = operands.pop() {
            acc = Rc::new(node(operand, acc));
        }
        acc
    }

    /// Rebuilds `regex` bottom-up through the normalizing constructors.
    pub fn normalize(&self, regex: &Regex<S>) -> Rc<Regex<S>> {
        match regex {
            Regex::EmptyString => self.empty_string(),
            Regex::EmptySet => self.empty_set(),
            Regex::Symbol(s) => self.symbol(s.clone()),
            Regex::Repeat(inner) => self.repeat(self.normalize(inner)),
            Regex::Complement(inner) => self.complement(self.normalize(inner)),
            Regex::Or(l, r) => self.or(self.normalize(l), self.normalize(r)),
            Regex::And(l, r) => self.and(self.normalize(l), self.normalize(r)),
            Regex::Concat(l, r) => self.concat(self.normalize(l), self.normalize(r)),
        }
    }
}

fn flatten<S>(
    regex: Rc<Regex<S>>,
    out: &mut Vec<Rc<Regex<S>>>,
    split: impl Fn(&Regex<S>) -> Option<(Rc<Regex<S>>, Rc<Regex<S>>)>,
) {
    let mut todo = vec![regex];
    while let Some(regex) = todo.pop() {
        match split(&regex) {
            Some((l, r)) => {
                todo.push(r);
                todo.push(l);
            }
            None => out.push(regex),
        }
    }
}

/// Computes Brzozowski derivatives with respect to one symbol.
///
/// The derivative of `r` with respect to `a` matches exactly those sequences `w`
/// for which `r` matches `a w`.
pub struct Deriver<'a, S> {
    symbol: S,
    builder: RegexBuilder<'a, S>,
}

impl<'a, S: Clone + PartialEq> Deriver<'a, S> {
    pub fn new(symbol: S, builder: RegexBuilder<'a, S>) -> Self {
        Self { symbol, builder }
    }

    pub fn symbol(&self) -> &S {
        &self.symbol
    }

    pub fn derive(&self, state: &Rc<Regex<S>>) -> Rc<Regex<S>> {
        let b = &self.builder;
        match state.as_ref() {
            // a: e => 0
            Regex::EmptyString => b.empty_set(),
            // a: 0 => 0
            Regex::EmptySet => b.empty_set(),
            // a: a => e
            // a: b => 0
            Regex::Symbol(s) => {
                if *s == self.symbol {
                    b.empty_string()
                } else {
                    b.empty_set()
                }
            }
            // a: (ab)* => b(ab)*
            Regex::Repeat(inner) => b.concat(self.derive(inner), state.clone()),
            // a: ~(ab) => ~(b)
            Regex::Complement(inner) => b.complement(self.derive(inner)),
            // a: (ab | ac) => b | c
            Regex::Or(l, r) => b.or(self.derive(l), self.derive(r)),
            // a: (ab & ac) => b & c
            Regex::And(l, r) => b.and(self.derive(l), self.derive(r)),
            // a: ab => b, and when `l` is nullable also the derivative of `r`
            Regex::Concat(l, r) => {
                let new = b.concat(self.derive(l), r.clone());
                if l.is_nullable() {
                    b.or(new, self.derive(r))
                } else {
                    new
                }
            }
        }
    }
}
