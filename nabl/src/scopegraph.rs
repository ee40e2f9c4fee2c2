use crate::pmap::PMultimap;
use crate::Label;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

/// A node in the scope graph. Scopes are equal only if they are the same node.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Scope(pub usize);

impl Debug for Scope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl Display for Scope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A named declaration or reference site.
///
/// The position makes occurrences with the same name distinct.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Occurrence {
    name: Arc<str>,
    position: usize,
}

impl Occurrence {
    pub fn new(name: impl Into<Arc<str>>, position: usize) -> Self {
        Self {
            name: name.into(),
            position,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> usize {
        self.position
    }
}

impl Debug for Occurrence {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.name, self.position)
    }
}

impl Display for Occurrence {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.name, self.position)
    }
}

/// A scope graph with labels `L`.
///
/// All edges live in persistent multimaps, so cloning the graph takes a snapshot in O(1)
/// that later additions do not affect.
pub struct ScopeGraph<L> {
    next_scope: usize,
    next_occurrence: usize,
    declarations: PMultimap<Scope, Occurrence>,
    references: PMultimap<Scope, Occurrence>,
    reference_scopes: im::HashMap<Occurrence, Scope>,
    direct_edges: PMultimap<(Scope, L), Scope>,
    import_edges: PMultimap<(Scope, L), Occurrence>,
    associated_scopes: PMultimap<Occurrence, Scope>,
}

impl<L: Clone> Clone for ScopeGraph<L> {
    fn clone(&self) -> Self {
        Self {
            next_scope: self.next_scope,
            next_occurrence: self.next_occurrence,
            declarations: self.declarations.clone(),
            references: self.references.clone(),
            reference_scopes: self.reference_scopes.clone(),
            direct_edges: self.direct_edges.clone(),
            import_edges: self.import_edges.clone(),
            associated_scopes: self.associated_scopes.clone(),
        }
    }
}

impl<L> Default for ScopeGraph<L> {
    fn default() -> Self {
        Self {
            next_scope: 0,
            next_occurrence: 0,
            declarations: PMultimap::default(),
            references: PMultimap::default(),
            reference_scopes: im::HashMap::default(),
            direct_edges: PMultimap::default(),
            import_edges: PMultimap::default(),
            associated_scopes: PMultimap::default(),
        }
    }
}

impl<L: Label> ScopeGraph<L> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_scope(&mut self) -> Scope {
        let scope = Scope(self.next_scope);
        self.next_scope += 1;
        scope
    }

    fn add_occurrence(&mut self, name: impl Into<Arc<str>>) -> Occurrence {
        let occurrence = Occurrence::new(name, self.next_occurrence);
        self.next_occurrence += 1;
        occurrence
    }

    /// Declares `name` in `scope`.
    pub fn add_decl(&mut self, scope: Scope, name: impl Into<Arc<str>>) -> Occurrence {
        let decl = self.add_occurrence(name);
        self.declarations.insert(scope, decl.clone());
        decl
    }

    /// Adds a reference to `name` in `scope`.
    pub fn add_ref(&mut self, scope: Scope, name: impl Into<Arc<str>>) -> Occurrence {
        let reference = self.add_occurrence(name);
        self.references.insert(scope, reference.clone());
        self.reference_scopes.insert(reference.clone(), scope);
        reference
    }

    pub fn add_direct_edge(&mut self, source: Scope, label: L, target: Scope) {
        self.direct_edges.insert((source, label), target);
    }

    /// Adds a reference to `name` in `scope` and a named edge from `scope` through it.
    ///
    /// During resolution the edge leads to the scopes associated with whatever the
    /// reference resolves to.
    pub fn add_import(&mut self, scope: Scope, label: L, name: impl Into<Arc<str>>) -> Occurrence {
        let reference = self.add_ref(scope, name);
        self.import_edges.insert((scope, label), reference.clone());
        reference
    }

    /// Associates `scope` with `declaration`, e.g. the body of a module with its name.
    pub fn add_associated_scope(&mut self, declaration: &Occurrence, scope: Scope) {
        self.associated_scopes.insert(declaration.clone(), scope);
    }

    pub fn decls(&self, scope: Scope) -> im::HashSet<Occurrence> {
        self.declarations.get(&scope)
    }

    pub fn refs(&self, scope: Scope) -> im::HashSet<Occurrence> {
        self.references.get(&scope)
    }

    pub fn direct_edges(&self, source: Scope, label: L) -> im::HashSet<Scope> {
        self.direct_edges.get(&(source, label))
    }

    pub fn imports(&self, scope: Scope, label: L) -> im::HashSet<Occurrence> {
        self.import_edges.get(&(scope, label))
    }

    pub fn associated_scopes(&self, declaration: &Occurrence) -> im::HashSet<Scope> {
        self.associated_scopes.get(declaration)
    }

    pub fn scope_of_reference(&self, reference: &Occurrence) -> Option<Scope> {
        self.reference_scopes.get(reference).copied()
    }

    pub fn scopes(&self) -> impl Iterator<Item = Scope> {
        (0..self.next_scope).map(Scope)
    }

    pub fn edge_count(&self) -> usize {
        self.direct_edges.len() + self.import_edges.len()
    }
}

impl<L: Label> Debug for ScopeGraph<L> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeGraph")
            .field("scopes", &self.next_scope)
            .field("declarations", &self.declarations)
            .field("references", &self.references)
            .field("direct_edges", &self.direct_edges)
            .field("import_edges", &self.import_edges)
            .field("associated_scopes", &self.associated_scopes)
            .finish()
    }
}
