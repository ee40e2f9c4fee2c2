//! Conversion between [`Term`]s and the host's term representation.
//!
//! Going out, terms are converted under a fully compressed substitution, so bound variables
//! are replaced by their representatives. Variables that remain become `CVar(resource, name)`.
//!
//! An unresolved list tail, a variable or an operator, cannot be written as a host list. It is
//! emitted as one extra trailing element `LazyList(tail)` and a warning is logged.
//! [`TermReader`] reads that element back as the open tail: a `CVar` as a variable, any other
//! application as an operator. Operators elsewhere are emitted as plain applications and read
//! back as such.

use crate::term::{ApplTerm, ConsTerm, Primitive, Term, TermError, TermOp, TermUnifier, TermVar, TupleTerm};

/// Constructor of variables in the host representation.
pub const VAR_CONSTRUCTOR: &str = "CVar";
/// Constructor of the element that stands in for an open list tail.
pub const LAZY_LIST_CONSTRUCTOR: &str = "LazyList";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Constructor {
    pub name: String,
    pub arity: usize,
}

/// A term as the host language sees it.
#[derive(Debug, Clone, PartialEq)]
pub enum ExternalTerm {
    Int(i64),
    Real(f64),
    String(String),
    Appl {
        constructor: Constructor,
        args: Vec<ExternalTerm>,
    },
    Tuple(Vec<ExternalTerm>),
    List(Vec<ExternalTerm>),
    /// Host-side placeholder; has no counterpart among [`Term`]s.
    Placeholder(Box<ExternalTerm>),
}

impl ExternalTerm {
    pub fn appl(name: impl Into<String>, args: Vec<ExternalTerm>) -> Self {
        ExternalTerm::Appl {
            constructor: Constructor {
                name: name.into(),
                arity: args.len(),
            },
            args,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ExternalTerm::Int(_) => "int",
            ExternalTerm::Real(_) => "real",
            ExternalTerm::String(_) => "string",
            ExternalTerm::Appl { .. } => "application",
            ExternalTerm::Tuple(_) => "tuple",
            ExternalTerm::List(_) => "list",
            ExternalTerm::Placeholder(_) => "placeholder",
        }
    }

    fn as_appl(&self, name: &str) -> Option<&[ExternalTerm]> {
        match self {
            ExternalTerm::Appl { constructor, args } if constructor.name == name => Some(args),
            _ => None,
        }
    }
}

/// Converts terms to [`ExternalTerm`]s, applying a substitution on the way.
pub struct SubstitutingBuilder {
    unifier: TermUnifier,
}

impl SubstitutingBuilder {
    /// Compresses `unifier` once up front so every lookup below is a single step.
    pub fn new(unifier: &TermUnifier) -> Self {
        Self {
            unifier: unifier.find_all(),
        }
    }

    pub fn unifier(&self) -> &TermUnifier {
        &self.unifier
    }

    pub fn term(&self, term: &Term) -> Result<ExternalTerm, TermError> {
        match self.unifier.walk(term) {
            Term::Var(var) => Ok(self.term_var(var)),
            Term::Primitive(p) => Ok(self.primitive_term(p)),
            Term::Appl(appl) => self.appl_term(appl),
            Term::Tuple(tuple) => self.tuple_term(tuple),
            list @ (Term::Cons(_) | Term::Nil) => self.list_term(list),
            Term::Op(op) => self.term_op(op),
        }
    }

    pub fn primitive_term(&self, primitive: &Primitive) -> ExternalTerm {
        match primitive {
            Primitive::Int(i) => ExternalTerm::Int(*i),
            Primitive::Real(r) => ExternalTerm::Real(*r),
            Primitive::Str(s) => ExternalTerm::String(s.to_string()),
        }
    }

    pub fn appl_term(&self, appl: &ApplTerm) -> Result<ExternalTerm, TermError> {
        Ok(ExternalTerm::appl(appl.op(), self.terms(appl.args())?))
    }

    pub fn tuple_term(&self, tuple: &TupleTerm) -> Result<ExternalTerm, TermError> {
        Ok(ExternalTerm::Tuple(self.terms(tuple.args())?))
    }

    pub fn cons_term(&self, cons: &ConsTerm) -> Result<ExternalTerm, TermError> {
        self.list_term(&Term::Cons(cons.clone()))
    }

    pub fn nil_term(&self) -> ExternalTerm {
        ExternalTerm::List(Vec::new())
    }

    /// Converts a list, following the spine under the substitution.
    pub fn list_term(&self, list: &Term) -> Result<ExternalTerm, TermError> {
        let mut elements = Vec::new();
        let mut current = self.unifier.walk(list);
        loop {
            match current {
                Term::Nil => break,
                Term::Cons(cons) => {
                    elements.push(self.term(cons.head())?);
                    current = self.unifier.walk(cons.tail());
                }
                Term::Var(var) => {
                    log::warn!("open list tail {var} emitted as a {LAZY_LIST_CONSTRUCTOR} element");
                    elements.push(ExternalTerm::appl(
                        LAZY_LIST_CONSTRUCTOR,
                        vec![self.term_var(var)],
                    ));
                    break;
                }
                Term::Op(op) => {
                    log::warn!(
                        "open list tail {} emitted as a {LAZY_LIST_CONSTRUCTOR} element",
                        current
                    );
                    elements.push(ExternalTerm::appl(LAZY_LIST_CONSTRUCTOR, vec![self.term_op(op)?]));
                    break;
                }
                other => {
                    return Err(TermError::UnsupportedTermKind(format!(
                        "{} in list position",
                        other.kind()
                    )))
                }
            }
        }
        Ok(ExternalTerm::List(elements))
    }

    pub fn term_var(&self, var: &TermVar) -> ExternalTerm {
        ExternalTerm::appl(
            VAR_CONSTRUCTOR,
            vec![
                ExternalTerm::String(var.resource().unwrap_or_default().to_string()),
                ExternalTerm::String(var.name().to_string()),
            ],
        )
    }

    pub fn term_op(&self, op: &TermOp) -> Result<ExternalTerm, TermError> {
        Ok(ExternalTerm::appl(op.op(), self.terms(op.args())?))
    }

    /// `(CVar(..), term)` for every bound variable, sorted by variable.
    pub fn substitution(&self) -> Result<Vec<ExternalTerm>, TermError> {
        let mut vars: Vec<&TermVar> = self.unifier.variables().collect();
        vars.sort();
        vars.into_iter()
            .map(|var| {
                let value = self.term(&Term::Var(var.clone()))?;
                Ok(ExternalTerm::Tuple(vec![self.term_var(var), value]))
            })
            .collect()
    }

    fn terms(&self, terms: &[Term]) -> Result<Vec<ExternalTerm>, TermError> {
        terms.iter().map(|t| self.term(t)).collect()
    }
}

/// Reads [`ExternalTerm`]s back into [`Term`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct TermReader;

impl TermReader {
    pub fn read(&self, term: &ExternalTerm) -> Result<Term, TermError> {
        match term {
            ExternalTerm::Int(_) | ExternalTerm::Real(_) | ExternalTerm::String(_) => {
                Ok(Term::Primitive(Primitive::try_from(term)?))
            }
            ExternalTerm::Appl { constructor, args } if constructor.name == VAR_CONSTRUCTOR => {
                self.read_var(args)
            }
            ExternalTerm::Appl { constructor, args } => {
                Ok(Term::appl(constructor.name.as_str(), self.read_all(args)?))
            }
            ExternalTerm::Tuple(args) => Ok(Term::tuple(self.read_all(args)?)),
            ExternalTerm::List(elements) => self.read_list(elements),
            ExternalTerm::Placeholder(_) => Err(TermError::UnsupportedTermKind(
                term.kind().to_string(),
            )),
        }
    }

    fn read_var(&self, args: &[ExternalTerm]) -> Result<Term, TermError> {
        match args {
            [ExternalTerm::String(resource), ExternalTerm::String(name)] if resource.is_empty() => {
                Ok(Term::Var(TermVar::new(name.as_str())))
            }
            [ExternalTerm::String(resource), ExternalTerm::String(name)] => Ok(Term::Var(
                TermVar::with_resource(resource.as_str(), name.as_str()),
            )),
            _ => Err(TermError::UnsupportedTermKind(format!(
                "{VAR_CONSTRUCTOR} with {} arguments",
                args.len()
            ))),
        }
    }

    fn read_list(&self, elements: &[ExternalTerm]) -> Result<Term, TermError> {
        let (elements, tail) = match elements.split_last() {
            Some((last, init)) => match last.as_appl(LAZY_LIST_CONSTRUCTOR) {
                Some([tail]) => (init, self.read_tail(tail)?),
                _ => (elements, Term::Nil),
            },
            None => (elements, Term::Nil),
        };
        Ok(Term::list_with_tail(self.read_all(elements)?, tail))
    }

    /// Only variables and operators are emitted as open tails.
    fn read_tail(&self, tail: &ExternalTerm) -> Result<Term, TermError> {
        match tail {
            ExternalTerm::Appl { constructor, args } if constructor.name != VAR_CONSTRUCTOR => {
                Ok(Term::op(constructor.name.as_str(), self.read_all(args)?))
            }
            _ => self.read(tail),
        }
    }

    fn read_all(&self, terms: &[ExternalTerm]) -> Result<Vec<Term>, TermError> {
        terms.iter().map(|t| self.read(t)).collect()
    }
}

impl TryFrom<&ExternalTerm> for Term {
    type Error = TermError;

    fn try_from(value: &ExternalTerm) -> Result<Self, Self::Error> {
        TermReader.read(value)
    }
}

impl TryFrom<&ExternalTerm> for Primitive {
    type Error = TermError;

    fn try_from(value: &ExternalTerm) -> Result<Self, Self::Error> {
        match value {
            ExternalTerm::Int(i) => Ok(Primitive::Int(*i)),
            ExternalTerm::Real(r) => Ok(Primitive::Real(*r)),
            ExternalTerm::String(s) => Ok(Primitive::Str(s.as_str().into())),
            other => Err(TermError::UnsupportedPrimitiveKind(other.kind().to_string())),
        }
    }
}
