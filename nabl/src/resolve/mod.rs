//! Queries over a scope graph.
//!
//! A [`Query`] is configured with a path wellformedness (a [`RegexMatcher`] over labels)
//! and a data wellformedness (a [`DataWellformedness`]), and then resolves references:
//!
//! ```rust
//! use nabl::{regex, Label, RegexMatcher, ScopeGraph};
//!
//! #[derive(Label, Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum Lbl {
//!     P,
//! }
//! use Lbl::*;
//!
//! let mut graph = ScopeGraph::new();
//! let outer = graph.add_scope();
//! let inner = graph.add_scope();
//! graph.add_direct_edge(inner, P, outer);
//! let decl = graph.add_decl(outer, "x");
//! let reference = graph.add_ref(inner, "x");
//!
//! let query = graph
//!     .query()
//!     .with_path_wellformedness(RegexMatcher::new(regex!(Lbl: P*), Lbl::alphabet()));
//! let paths: Vec<_> = query.resolve(&reference).unwrap().collect();
//!
//! assert_eq!(1, paths.len());
//! assert_eq!(&decl, paths[0].declaration());
//! ```

use crate::{Label, Occurrence, Regex, RegexMatcher, ScopeGraph};
use thiserror::Error;

mod lookup;
mod params;

pub use lookup::Resolution;
pub use params::*;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("{0} is not a reference in this scope graph")]
    UnknownReference(Occurrence),
}

/// A query over a scope graph, built with [`ScopeGraph::query`].
pub struct Query<'sg, L, PWF = (), DWF = DefaultDataWellformedness> {
    scope_graph: &'sg ScopeGraph<L>,
    path_wellformedness: PWF,
    data_wellformedness: DWF,
}

impl<'sg, L, PWF, DWF> Query<'sg, L, PWF, DWF> {
    /// Only paths whose labels are accepted by `matcher` lead to declarations.
    pub fn with_path_wellformedness(
        self,
        matcher: RegexMatcher<L>,
    ) -> Query<'sg, L, RegexMatcher<L>, DWF> {
        Query {
            scope_graph: self.scope_graph,
            path_wellformedness: matcher,
            data_wellformedness: self.data_wellformedness,
        }
    }

    pub fn with_data_wellformedness<NDWF: DataWellformedness>(
        self,
        new_data_wellformedness: NDWF,
    ) -> Query<'sg, L, PWF, NDWF> {
        Query {
            scope_graph: self.scope_graph,
            path_wellformedness: self.path_wellformedness,
            data_wellformedness: new_data_wellformedness,
        }
    }
}

impl<'sg, L: Label, PWF, DWF> Query<'sg, L, PWF, DWF> {
    /// Compiles `regex` over all labels of `L` and uses it as path wellformedness.
    pub fn with_path_regex(self, regex: Regex<L>) -> Query<'sg, L, RegexMatcher<L>, DWF> {
        self.with_path_wellformedness(RegexMatcher::new(regex, L::alphabet()))
    }
}

impl<'sg, L: Label, DWF: DataWellformedness> Query<'sg, L, RegexMatcher<L>, DWF> {
    /// Lazily enumerates the paths from `reference` to the declarations it resolves to.
    ///
    /// Every call starts a fresh search over the scope graph as it is now. Paths are produced
    /// as the search reaches them, except through imports: the first time the search steps
    /// through an import, that import is resolved completely. The result is reused whenever
    /// the same [`Resolution`] reaches that import again with the same imports excluded.
    pub fn resolve<'q>(&'q self, reference: &Occurrence) -> Result<Resolution<'q, L, DWF>, ResolveError> {
        let scope = self
            .scope_graph
            .scope_of_reference(reference)
            .ok_or_else(|| ResolveError::UnknownReference(reference.clone()))?;

        log::debug!("resolving {reference} from {scope}");
        Ok(Resolution::new(
            self.scope_graph,
            &self.path_wellformedness,
            &self.data_wellformedness,
            reference.clone(),
            scope,
        ))
    }
}

impl<L: Label> ScopeGraph<L> {
    /// Starts building a query. A path wellformedness must be set before resolving.
    pub fn query(&self) -> Query<'_, L> {
        Query {
            scope_graph: self,
            path_wellformedness: (),
            data_wellformedness: DefaultDataWellformedness::default(),
        }
    }
}
