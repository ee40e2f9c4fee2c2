//! Symbolic terms with logic variables, and the substitution that gives them meaning.
//!
//! Terms are immutable and share their children, so cloning a term is cheap.
//! A [`TermUnifier`] maps variables and operator terms to representatives; it never creates
//! bindings on its own behalf, it only applies the ones the solver made.

use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use thiserror::Error;

pub mod external;
mod unifier;

pub use unifier::{FindResult, TermUnifier};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TermError {
    #[error("unsupported term kind: {0}")]
    UnsupportedTermKind(String),
    #[error("unsupported primitive kind: {0}")]
    UnsupportedPrimitiveKind(String),
    #[error("{0} is already bound")]
    AlreadyBound(String),
    #[error("binding {0} would make it part of its own representative")]
    CyclicBinding(String),
}

/// A logic variable. The resource keeps variables from separately resolved units apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TermVar {
    resource: Option<Arc<str>>,
    name: Arc<str>,
}

impl TermVar {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            resource: None,
            name: name.into(),
        }
    }

    pub fn with_resource(resource: impl Into<Arc<str>>, name: impl Into<Arc<str>>) -> Self {
        Self {
            resource: Some(resource.into()),
            name: name.into(),
        }
    }

    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Display for TermVar {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.resource {
            Some(resource) => write!(f, "?{resource}:{}", self.name),
            None => write!(f, "?{}", self.name),
        }
    }
}

/// Exactly one of an integer, a floating-point number or a string.
///
/// Reals compare and hash by their bit pattern, so `NaN == NaN` and `0.0 != -0.0`.
#[derive(Debug, Clone)]
pub enum Primitive {
    Int(i64),
    Real(f64),
    Str(Arc<str>),
}

impl PartialEq for Primitive {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Primitive::Int(a), Primitive::Int(b)) => a == b,
            (Primitive::Real(a), Primitive::Real(b)) => a.to_bits() == b.to_bits(),
            (Primitive::Str(a), Primitive::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Primitive {}

impl Hash for Primitive {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Primitive::Int(i) => i.hash(state),
            Primitive::Real(r) => r.to_bits().hash(state),
            Primitive::Str(s) => s.hash(state),
        }
    }
}

impl Display for Primitive {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Primitive::Int(i) => write!(f, "{i}"),
            Primitive::Real(r) => write!(f, "{r:?}"),
            Primitive::Str(s) => write!(f, "{:?}", s.as_ref()),
        }
    }
}

/// Constructor application `op(args..)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApplTerm {
    op: Arc<str>,
    args: Arc<[Term]>,
}

impl ApplTerm {
    pub fn op(&self) -> &str {
        &self.op
    }

    pub fn args(&self) -> &[Term] {
        &self.args
    }

    pub fn arity(&self) -> usize {
        self.args.len()
    }
}

/// A term in operator position. Like a variable, it can be bound to a representative.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TermOp {
    op: Arc<str>,
    args: Arc<[Term]>,
}

impl TermOp {
    pub fn new(op: impl Into<Arc<str>>, args: impl IntoIterator<Item = Term>) -> Self {
        Self {
            op: op.into(),
            args: args.into_iter().collect(),
        }
    }

    pub fn op(&self) -> &str {
        &self.op
    }

    pub fn args(&self) -> &[Term] {
        &self.args
    }

    pub fn arity(&self) -> usize {
        self.args.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TupleTerm {
    args: Arc<[Term]>,
}

impl TupleTerm {
    pub fn args(&self) -> &[Term] {
        &self.args
    }
}

/// One list cell. The tail is normally a [`Term::Cons`] or [`Term::Nil`],
/// but may be a variable or operator that has not been resolved yet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConsTerm {
    head: Arc<Term>,
    tail: Arc<Term>,
}

impl ConsTerm {
    pub fn head(&self) -> &Term {
        &self.head
    }

    pub fn tail(&self) -> &Term {
        &self.tail
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    Var(TermVar),
    Primitive(Primitive),
    Appl(ApplTerm),
    Tuple(TupleTerm),
    Cons(ConsTerm),
    Nil,
    Op(TermOp),
}

impl Term {
    pub fn var(name: impl Into<Arc<str>>) -> Self {
        Term::Var(TermVar::new(name))
    }

    pub fn int(value: i64) -> Self {
        Term::Primitive(Primitive::Int(value))
    }

    pub fn real(value: f64) -> Self {
        Term::Primitive(Primitive::Real(value))
    }

    pub fn string(value: impl Into<Arc<str>>) -> Self {
        Term::Primitive(Primitive::Str(value.into()))
    }

    pub fn appl(op: impl Into<Arc<str>>, args: impl IntoIterator<Item = Term>) -> Self {
        Term::Appl(ApplTerm {
            op: op.into(),
            args: args.into_iter().collect(),
        })
    }

    pub fn op(op: impl Into<Arc<str>>, args: impl IntoIterator<Item = Term>) -> Self {
        Term::Op(TermOp::new(op, args))
    }

    pub fn tuple(args: impl IntoIterator<Item = Term>) -> Self {
        Term::Tuple(TupleTerm {
            args: args.into_iter().collect(),
        })
    }

    pub fn cons(head: Term, tail: Term) -> Self {
        Term::Cons(ConsTerm {
            head: Arc::new(head),
            tail: Arc::new(tail),
        })
    }

    /// A proper list of `elements`.
    pub fn list(elements: impl IntoIterator<Item = Term>) -> Self {
        Self::list_with_tail(elements, Term::Nil)
    }

    /// `[elements.. | tail]`.
    pub fn list_with_tail(elements: impl IntoIterator<Item = Term>, tail: Term) -> Self {
        let elements: Vec<_> = elements.into_iter().collect();
        elements
            .into_iter()
            .rev()
            .fold(tail, |tail, head| Term::cons(head, tail))
    }

    /// Short name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Term::Var(_) => "variable",
            Term::Primitive(_) => "primitive",
            Term::Appl(_) => "application",
            Term::Tuple(_) => "tuple",
            Term::Cons(_) => "cons",
            Term::Nil => "nil",
            Term::Op(_) => "operator",
        }
    }

    /// The direct subterms, left to right.
    pub fn children(&self) -> Vec<&Term> {
        match self {
            Term::Appl(appl) => appl.args().iter().collect(),
            Term::Op(op) => op.args().iter().collect(),
            Term::Tuple(tuple) => tuple.args().iter().collect(),
            Term::Cons(cons) => vec![cons.head(), cons.tail()],
            Term::Var(_) | Term::Primitive(_) | Term::Nil => Vec::new(),
        }
    }

    /// True when the term mentions neither variables nor operator terms.
    pub fn is_ground(&self) -> bool {
        let mut stack = vec![self];
        while let Some(term) = stack.pop() {
            match term {
                Term::Var(_) | Term::Op(_) => return false,
                other => stack.extend(other.children()),
            }
        }
        true
    }
}

fn write_args(f: &mut Formatter<'_>, args: &[Term]) -> std::fmt::Result {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{arg}")?;
    }
    Ok(())
}

impl Display for Term {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Var(var) => write!(f, "{var}"),
            Term::Primitive(p) => write!(f, "{p}"),
            Term::Appl(appl) => {
                write!(f, "{}(", appl.op)?;
                write_args(f, appl.args())?;
                write!(f, ")")
            }
            Term::Op(op) => {
                write!(f, "#{}(", op.op)?;
                write_args(f, op.args())?;
                write!(f, ")")
            }
            Term::Tuple(tuple) => {
                write!(f, "(")?;
                write_args(f, tuple.args())?;
                write!(f, ")")
            }
            Term::Nil => write!(f, "[]"),
            Term::Cons(cons) => {
                write!(f, "[{}", cons.head())?;
                let mut tail = cons.tail();
                loop {
                    match tail {
                        Term::Cons(next) => {
                            write!(f, ", {}", next.head())?;
                            tail = next.tail();
                        }
                        Term::Nil => break,
                        open => {
                            write!(f, " | {open}")?;
                            break;
                        }
                    }
                }
                write!(f, "]")
            }
        }
    }
}
