//! Resolution paths through a scope graph.
//!
//! There are four kinds of paths, distinguished by their endpoints:
//!
//! * [`ScopePath`]: from a scope to a scope,
//! * [`DeclPath`]: from a scope to a declaration,
//! * [`RefPath`]: from a reference to a scope,
//! * [`FullPath`]: from a reference to a declaration.
//!
//! Atoms are built with the constructors on each type and have size 0.
//! Longer paths are built with [`concat`], which refuses to join paths whose endpoints
//! disagree or whose result would visit a scope twice. Every path that exists is
//! therefore acyclic and endpoint-consistent.
//!
//! Paths are immutable and share their operands, so one prefix can be extended in many
//! directions at once.

use crate::{Occurrence, Scope};
use im::HashSet;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use thiserror::Error;

mod concat;

pub use concat::{concat, Concat};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("cannot join a path ending in {left} to a path starting in {right}")]
    ScopeMismatch { left: Scope, right: Scope },
    #[error("path would visit {scope} more than once")]
    CyclicPath { scope: Scope },
}

/// Bookkeeping shared by all path kinds.
#[derive(Clone)]
struct Meta {
    size: usize,
    /// Number of scope positions along the path; equal to `scopes.len()` iff the path is acyclic.
    visits: usize,
    scopes: HashSet<Scope>,
    references: HashSet<Occurrence>,
}

impl Meta {
    fn atom(scopes: impl IntoIterator<Item = Scope>, visits: usize) -> Self {
        Self {
            size: 0,
            visits,
            scopes: scopes.into_iter().collect(),
            references: HashSet::new(),
        }
    }
}

/// One labeled step of a path.
#[derive(Clone)]
pub enum Step<L> {
    Edge {
        source: Scope,
        label: L,
        target: Scope,
    },
    /// A named edge, taken by resolving an import reference and entering a scope associated
    /// with the declaration it resolved to.
    Import {
        source: Scope,
        label: L,
        resolution: FullPath<L>,
        target: Scope,
    },
}

impl<L: Clone + PartialEq> PartialEq for Step<L> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Step::Edge {
                    source,
                    label,
                    target,
                },
                Step::Edge {
                    source: other_source,
                    label: other_label,
                    target: other_target,
                },
            ) => source == other_source && label == other_label && target == other_target,
            (
                Step::Import {
                    source,
                    label,
                    resolution,
                    target,
                },
                Step::Import {
                    source: other_source,
                    label: other_label,
                    resolution: other_resolution,
                    target: other_target,
                },
            ) => {
                source == other_source
                    && label == other_label
                    && target == other_target
                    && resolution == other_resolution
            }
            _ => false,
        }
    }
}

impl<L: Clone + Eq> Eq for Step<L> {}

impl<L: Clone + Debug> Debug for Step<L> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Edge {
                source,
                label,
                target,
            } => write!(f, "{source:?} -{label:?}-> {target:?}"),
            Step::Import {
                source,
                label,
                resolution,
                target,
            } => write!(f, "{source:?} ={label:?}{resolution:?}=> {target:?}"),
        }
    }
}

enum ScopeShape<L> {
    Empty,
    Direct(L),
    Import(L, FullPath<L>),
    Concat(ScopePath<L>, ScopePath<L>),
}

struct ScopeNode<L> {
    source: Scope,
    target: Scope,
    meta: Meta,
    shape: ScopeShape<L>,
}

/// A path from one scope to another.
pub struct ScopePath<L>(Arc<ScopeNode<L>>);

type Endpoints<'a> = (Scope, Scope, Option<&'a Occurrence>, Option<&'a Occurrence>);

enum DeclShape<L> {
    Atom,
    Concat(ScopePath<L>, DeclPath<L>),
}

struct DeclNode<L> {
    source: Scope,
    target: Scope,
    declaration: Occurrence,
    meta: Meta,
    shape: DeclShape<L>,
}

/// A path from a scope to a declaration.
pub struct DeclPath<L>(Arc<DeclNode<L>>);

enum RefShape<L> {
    Atom,
    Concat(RefPath<L>, ScopePath<L>),
}

struct RefNode<L> {
    reference: Occurrence,
    source: Scope,
    target: Scope,
    meta: Meta,
    shape: RefShape<L>,
}

/// A path from a reference to a scope.
pub struct RefPath<L>(Arc<RefNode<L>>);

struct FullNode<L> {
    left: RefPath<L>,
    right: DeclPath<L>,
    meta: Meta,
}

/// A path from a reference to a declaration: one resolution.
pub struct FullPath<L>(Arc<FullNode<L>>);

macro_rules! impl_path_common {
    ($($path:ident),*) => {
        $(
            impl<L> Clone for $path<L> {
                fn clone(&self) -> Self {
                    Self(self.0.clone())
                }
            }

            impl<L> $path<L> {
                /// Number of joins this path was built from.
                pub fn size(&self) -> usize {
                    self.0.meta.size
                }

                /// Every scope on this path.
                pub fn scopes(&self) -> &HashSet<Scope> {
                    &self.0.meta.scopes
                }

                /// Every reference this path resolved through.
                pub fn references(&self) -> &HashSet<Occurrence> {
                    &self.0.meta.references
                }

                fn meta(&self) -> &Meta {
                    &self.0.meta
                }

                /// The steps of this path from left to right.
                pub fn steps(&self) -> Steps<'_, L> {
                    Steps {
                        stack: vec![PathRef::from(self)],
                    }
                }
            }

            impl<L: Clone + PartialEq> PartialEq for $path<L> {
                fn eq(&self, other: &Self) -> bool {
                    Arc::ptr_eq(&self.0, &other.0)
                        || (self.endpoints() == other.endpoints()
                            && self.scopes() == other.scopes()
                            && self.references() == other.references()
                            && self.steps().eq(other.steps()))
                }
            }

            impl<L: Clone + Eq> Eq for $path<L> {}
        )*
    };
}

impl_path_common!(ScopePath, DeclPath, RefPath, FullPath);

impl<L> ScopePath<L> {
    /// The path that stays in `scope`.
    pub fn empty(scope: Scope) -> Self {
        Self::atom(scope, scope, 1, ScopeShape::Empty)
    }

    /// A single edge.
    pub fn direct(source: Scope, label: L, target: Scope) -> Self {
        Self::atom(source, target, 2, ScopeShape::Direct(label))
    }

    /// A named edge through an import, resolved by `resolution`.
    pub fn import(source: Scope, label: L, resolution: FullPath<L>, target: Scope) -> Self {
        let mut meta = Meta::atom([source, target], 2);
        meta.references = resolution.references().clone();
        Self(Arc::new(ScopeNode {
            source,
            target,
            meta,
            shape: ScopeShape::Import(label, resolution),
        }))
    }

    fn atom(source: Scope, target: Scope, visits: usize, shape: ScopeShape<L>) -> Self {
        Self(Arc::new(ScopeNode {
            source,
            target,
            meta: Meta::atom([source, target], visits),
            shape,
        }))
    }

    pub fn source_scope(&self) -> Scope {
        self.0.source
    }

    pub fn target_scope(&self) -> Scope {
        self.0.target
    }

    fn endpoints(&self) -> Endpoints<'_> {
        (self.0.source, self.0.target, None, None)
    }
}

impl<L> DeclPath<L> {
    /// `declaration`, declared in `scope`.
    pub fn new(scope: Scope, declaration: Occurrence) -> Self {
        Self(Arc::new(DeclNode {
            source: scope,
            target: scope,
            declaration,
            meta: Meta::atom([scope], 1),
            shape: DeclShape::Atom,
        }))
    }

    pub fn source_scope(&self) -> Scope {
        self.0.source
    }

    /// The scope in which the declaration lives.
    pub fn target_scope(&self) -> Scope {
        self.0.target
    }

    pub fn declaration(&self) -> &Occurrence {
        &self.0.declaration
    }

    fn endpoints(&self) -> Endpoints<'_> {
        (self.0.source, self.0.target, None, Some(&self.0.declaration))
    }
}

impl<L> RefPath<L> {
    /// `reference`, occurring in `scope`.
    pub fn new(reference: Occurrence, scope: Scope) -> Self {
        let mut meta = Meta::atom([scope], 1);
        meta.references.insert(reference.clone());
        Self(Arc::new(RefNode {
            reference,
            source: scope,
            target: scope,
            meta,
            shape: RefShape::Atom,
        }))
    }

    pub fn reference(&self) -> &Occurrence {
        &self.0.reference
    }

    pub fn source_scope(&self) -> Scope {
        self.0.source
    }

    pub fn target_scope(&self) -> Scope {
        self.0.target
    }

    fn endpoints(&self) -> Endpoints<'_> {
        (self.0.source, self.0.target, Some(&self.0.reference), None)
    }
}

impl<L> FullPath<L> {
    pub fn reference(&self) -> &Occurrence {
        self.0.left.reference()
    }

    pub fn declaration(&self) -> &Occurrence {
        self.0.right.declaration()
    }

    pub fn source_scope(&self) -> Scope {
        self.0.left.source_scope()
    }

    /// The scope in which the declaration lives.
    pub fn target_scope(&self) -> Scope {
        self.0.right.target_scope()
    }

    fn endpoints(&self) -> Endpoints<'_> {
        (
            self.source_scope(),
            self.target_scope(),
            Some(self.reference()),
            Some(self.declaration()),
        )
    }
}

enum PathRef<'a, L> {
    Scope(&'a ScopePath<L>),
    Decl(&'a DeclPath<L>),
    Ref(&'a RefPath<L>),
    Full(&'a FullPath<L>),
}

macro_rules! impl_path_ref_from {
    ($($path:ident => $variant:ident),*) => {
        $(
            impl<'a, L> From<&'a $path<L>> for PathRef<'a, L> {
                fn from(path: &'a $path<L>) -> Self {
                    PathRef::$variant(path)
                }
            }
        )*
    };
}

impl_path_ref_from!(ScopePath => Scope, DeclPath => Decl, RefPath => Ref, FullPath => Full);

/// Iterator over the [`Step`]s of a path, see [`ScopePath::steps`].
pub struct Steps<'a, L> {
    stack: Vec<PathRef<'a, L>>,
}

impl<'a, L: Clone> Iterator for Steps<'a, L> {
    type Item = Step<L>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(path) = self.stack.pop() {
            match path {
                PathRef::Scope(path) => {
                    let node = &*path.0;
                    match &node.shape {
                        ScopeShape::Empty => {}
                        ScopeShape::Direct(label) => {
                            return Some(Step::Edge {
                                source: node.source,
                                label: label.clone(),
                                target: node.target,
                            })
                        }
                        ScopeShape::Import(label, resolution) => {
                            return Some(Step::Import {
                                source: node.source,
                                label: label.clone(),
                                resolution: resolution.clone(),
                                target: node.target,
                            })
                        }
                        ScopeShape::Concat(left, right) => {
                            self.stack.push(PathRef::Scope(right));
                            self.stack.push(PathRef::Scope(left));
                        }
                    }
                }
                PathRef::Decl(path) => {
                    if let DeclShape::Concat(left, right) = &path.0.shape {
                        self.stack.push(PathRef::Decl(right));
                        self.stack.push(PathRef::Scope(left));
                    }
                }
                PathRef::Ref(path) => {
                    if let RefShape::Concat(left, right) = &path.0.shape {
                        self.stack.push(PathRef::Scope(right));
                        self.stack.push(PathRef::Ref(left));
                    }
                }
                PathRef::Full(path) => {
                    self.stack.push(PathRef::Decl(&path.0.right));
                    self.stack.push(PathRef::Ref(&path.0.left));
                }
            }
        }
        None
    }
}

fn fmt_steps<L: Clone + Debug>(f: &mut Formatter<'_>, start: Scope, steps: Steps<'_, L>) -> std::fmt::Result {
    write!(f, "{start:?}")?;
    for step in steps {
        match step {
            Step::Edge { label, target, .. } => write!(f, " -{label:?}-> {target:?}")?,
            Step::Import {
                label,
                resolution,
                target,
                ..
            } => write!(f, " ={label:?}[{}]=> {target:?}", resolution.declaration())?,
        }
    }
    Ok(())
}

impl<L: Clone + Debug> Debug for ScopePath<L> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ScopePath(")?;
        fmt_steps(f, self.source_scope(), self.steps())?;
        write!(f, ")")
    }
}

impl<L: Clone + Debug> Debug for DeclPath<L> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "DeclPath(")?;
        fmt_steps(f, self.source_scope(), self.steps())?;
        write!(f, " : {})", self.declaration())
    }
}

impl<L: Clone + Debug> Debug for RefPath<L> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "RefPath({} in ", self.reference())?;
        fmt_steps(f, self.source_scope(), self.steps())?;
        write!(f, ")")
    }
}

impl<L: Clone + Debug> Debug for FullPath<L> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "FullPath({} in ", self.reference())?;
        fmt_steps(f, self.source_scope(), self.steps())?;
        write!(f, " : {})", self.declaration())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atoms_contain_their_endpoints() {
        let (a, b) = (Scope(0), Scope(1));
        let direct = ScopePath::direct(a, 'P', b);
        assert_eq!(0, direct.size());
        assert!(direct.scopes().contains(&a));
        assert!(direct.scopes().contains(&b));

        let empty: ScopePath<char> = ScopePath::empty(a);
        assert_eq!(a, empty.target_scope());
        assert_eq!(0, empty.steps().count());

        let reference = Occurrence::new("x", 0);
        let ref_path: RefPath<char> = RefPath::new(reference.clone(), a);
        assert!(ref_path.references().contains(&reference));
        assert!(ref_path.scopes().contains(&a));
    }

    #[test]
    fn direct_edge_is_one_step() {
        let path = ScopePath::direct(Scope(0), 'P', Scope(1));
        assert_eq!(
            vec![Step::Edge {
                source: Scope(0),
                label: 'P',
                target: Scope(1)
            }],
            path.steps().collect::<Vec<_>>()
        );
        assert_eq!("ScopePath(#0 -'P'-> #1)", format!("{path:?}"));
    }
}
