//! Name resolution with scope graphs.
//!
//! This crate contains the primitives a constraint solver calls to resolve names:
//!
//! * [`ScopeGraph`]: scopes, declarations, references and labeled edges, stored in
//!   [persistent multimaps](pmap::PMultimap) so that snapshots are free,
//! * [`path`]: typed resolution paths whose construction rejects cycles and mismatched endpoints,
//! * [`RegexMatcher`]: automata over edge labels that decide which paths are well-formed,
//!   and detect as early as possible when a path can never become well-formed,
//! * [`resolve`]: a depth-first search that combines the three,
//! * [`term`]: terms with logic variables and the unifier that holds their bindings.
//!
//! Resolution queries look like this:
//!
//! ```rust
//! use nabl::{regex, Label, ScopeGraph};
//!
//! #[derive(Label, Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum Lbl {
//!     Lex,
//!     Imp,
//! }
//! use Lbl::*;
//!
//! let mut sg = ScopeGraph::new();
//! let global = sg.add_scope();
//! let module = sg.add_scope();
//! let local = sg.add_scope();
//!
//! let m = sg.add_decl(global, "M");
//! sg.add_associated_scope(&m, module);
//! sg.add_decl(module, "f");
//!
//! sg.add_direct_edge(local, Lex, global);
//! sg.add_import(local, Imp, "M");
//! let f = sg.add_ref(local, "f");
//!
//! let query = sg.query().with_path_regex(regex!(Lbl: Lex* Imp?));
//! let env: Vec<_> = query.resolve(&f).unwrap().collect();
//! assert_eq!(1, env.len());
//! ```
#![cfg_attr(docsrs, feature(doc_auto_cfg, doc_cfg))]

extern crate self as nabl;

mod label;
pub use label::Label;
#[cfg(feature = "dynamic-regex")]
pub use label::{parse_label_regex, LabelRegexError};

pub use nabl_regular_expressions::*;

pub mod path;
pub mod pmap;
pub mod resolve;
pub mod solver;
pub mod term;

mod scopegraph;
pub use scopegraph::{Occurrence, Scope, ScopeGraph};

/// Derive [`Label`] implementation.
///
/// ```rust
/// use nabl::Label;
///
/// #[derive(Label, Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// pub enum Alphabet {
///     A,
///     B,
///     C,
/// }
/// use Alphabet::*;
///
/// assert_eq!(vec![A, B, C], Alphabet::iter().collect::<Vec<_>>());
/// assert_eq!("B", B.name());
/// ```
pub use nabl_macros::Label;

/// Build a [`Regex`] over a label type from regular expression syntax.
///
/// Syntax: `$label_type: regex`, where symbols are labels in scope.
///
/// * `0`: matches nothing,
/// * `e`: matches the empty sequence,
/// * `r*`, `r+`, `r?`: repetition, at least once, at most once,
/// * `~r`: complement,
/// * `r s`: concatenation,
/// * `r & s`, `r | s`: intersection and union.
///
/// ```rust
/// use nabl::{regex, Label, RegexMatcher};
///
/// #[derive(Label, Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum Lbl {
///     A,
///     B,
/// }
/// use Lbl::*;
///
/// let matcher = RegexMatcher::new(regex!(Lbl: A* B), Lbl::alphabet());
/// assert!(matcher.accepts([&A, &A, &B]));
/// assert!(matcher.match_all([&B, &A]).is_stuck());
/// ```
pub use nabl_macros::regex;
