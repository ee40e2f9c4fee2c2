//! This module contains the lookup-based name resolution algorithm.
//!
//! Starting from a reference in a scope, it traverses the scope graph depth-first to find
//! matching declarations. Pending branches live on an explicit stack, each one a partial
//! path paired with the matcher state for the labels on it. A branch is dropped as soon as
//! its matcher is stuck or extending its path would make it cyclic.
//!
//! Import references are resolved by nested searches that sit on a second stack above the
//! search that reached the import. A finished import resolution is recorded per query,
//! keyed by the import and the imports it was not allowed to go through.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::rc::Rc;

use crate::path::{Concat, DeclPath, FullPath, RefPath, ScopePath};
use crate::resolve::DataWellformedness;
use crate::{Label, Occurrence, RegexMatcher, Scope, ScopeGraph};

struct Frame<L> {
    path: RefPath<L>,
    matcher: RegexMatcher<L>,
}

/// An import edge reached at the end of `path`, not resolved yet.
struct PendingImport<L> {
    path: RefPath<L>,
    label: L,
    matcher: RegexMatcher<L>,
    import: Occurrence,
}

enum Task<L> {
    Expand(Frame<L>),
    Import(PendingImport<L>),
}

/// The search for the declarations of one reference.
struct Search<L> {
    reference: Occurrence,
    /// Import references that enclosing searches are already going through.
    excluded: im::HashSet<Occurrence>,
    /// Imports this search (or one nested in it) skipped because they were excluded.
    blocked: im::HashSet<Occurrence>,
    tasks: Vec<Task<L>>,
    found: VecDeque<FullPath<L>>,
    /// The import of the enclosing search that this search resolves, if any.
    resolving: Option<PendingImport<L>>,
}

impl<L: Label> Search<L> {
    fn new(
        reference: Occurrence,
        scope: Scope,
        matcher: &RegexMatcher<L>,
        excluded: im::HashSet<Occurrence>,
        resolving: Option<PendingImport<L>>,
    ) -> Self {
        let initial = Frame {
            path: RefPath::new(reference.clone(), scope),
            matcher: matcher.clone(),
        };
        Self {
            reference,
            excluded,
            blocked: im::HashSet::new(),
            tasks: vec![Task::Expand(initial)],
            found: VecDeque::new(),
            resolving,
        }
    }
}

#[derive(Clone)]
struct Resolved<L> {
    blocked: im::HashSet<Occurrence>,
    resolutions: Rc<[FullPath<L>]>,
}

/// Import resolutions finished during one query.
struct ImportTable<L> {
    resolved: HashMap<(Occurrence, Vec<Occurrence>), Resolved<L>>,
    /// Per import, the blocked sets of the searches that found nothing.
    unresolvable: HashMap<Occurrence, Vec<im::HashSet<Occurrence>>>,
}

impl<L: Label> ImportTable<L> {
    fn new() -> Self {
        Self {
            resolved: HashMap::new(),
            unresolvable: HashMap::new(),
        }
    }

    fn get(&self, import: &Occurrence, excluded: &im::HashSet<Occurrence>) -> Option<Resolved<L>> {
        if let Some(resolved) = self.resolved.get(&(import.clone(), sorted(excluded.clone()))) {
            return Some(resolved.clone());
        }
        // Excluding more imports never finds more, so a search that came up empty stays
        // empty under every exclusion that still contains the imports it was blocked on.
        self.unresolvable
            .get(import)?
            .iter()
            .find(|blocked| blocked.is_subset(excluded))
            .map(|blocked| Resolved {
                blocked: blocked.clone(),
                resolutions: Rc::from(Vec::new()),
            })
    }

    fn insert(&mut self, import: Occurrence, excluded: &im::HashSet<Occurrence>, resolved: Resolved<L>) {
        if resolved.resolutions.is_empty() {
            self.unresolvable
                .entry(import.clone())
                .or_default()
                .push(resolved.blocked.clone());
        }
        self.resolved.insert((import, sorted(excluded.clone())), resolved);
    }
}

/// Lazy iterator over the resolutions of one reference, see [`Query::resolve`](crate::resolve::Query::resolve).
pub struct Resolution<'q, L, DWF> {
    scope_graph: &'q ScopeGraph<L>,
    path_wellformedness: &'q RegexMatcher<L>,
    data_wellformedness: &'q DWF,
    reference: Occurrence,
    /// The queried reference at the bottom, the imports it is waiting for above it.
    searches: Vec<Search<L>>,
    imports: ImportTable<L>,
}

fn sorted<T: Ord + Hash + Eq + Clone>(set: im::HashSet<T>) -> Vec<T> {
    let mut values: Vec<T> = set.into_iter().collect();
    values.sort();
    values
}

impl<'q, L: Label, DWF: DataWellformedness> Resolution<'q, L, DWF> {
    pub(super) fn new(
        scope_graph: &'q ScopeGraph<L>,
        path_wellformedness: &'q RegexMatcher<L>,
        data_wellformedness: &'q DWF,
        reference: Occurrence,
        scope: Scope,
    ) -> Self {
        let root = Search::new(
            reference.clone(),
            scope,
            path_wellformedness,
            im::HashSet::new(),
            None,
        );
        Self {
            scope_graph,
            path_wellformedness,
            data_wellformedness,
            reference,
            searches: vec![root],
            imports: ImportTable::new(),
        }
    }

    pub fn reference(&self) -> &Occurrence {
        &self.reference
    }

    fn expand(&mut self, frame: Frame<L>) {
        if frame.matcher.is_stuck() {
            log::trace!("dropping {:?}: no accepting continuation", frame.path);
            return;
        }
        let scope = frame.path.target_scope();
        log::trace!("expanding {:?}", frame.path);

        if frame.matcher.is_accepting() {
            self.resolve_declarations(&frame.path, scope);
        }

        let mut next = Vec::new();
        for label in frame.matcher.alphabet().iter() {
            let matcher = frame.matcher.match_symbol(label);
            if matcher.is_stuck() {
                continue;
            }

            for target in sorted(self.scope_graph.direct_edges(scope, *label)) {
                let step = ScopePath::direct(scope, *label, target);
                match frame.path.concat(&step) {
                    Ok(path) => next.push(Task::Expand(Frame {
                        path,
                        matcher: matcher.clone(),
                    })),
                    Err(err) => log::trace!("pruned {label:?} edge {scope} -> {target}: {err}"),
                }
            }

            for import in sorted(self.scope_graph.imports(scope, *label)) {
                next.push(Task::Import(PendingImport {
                    path: frame.path.clone(),
                    label: *label,
                    matcher: matcher.clone(),
                    import,
                }));
            }
        }

        if let Some(search) = self.searches.last_mut() {
            search.tasks.extend(next.into_iter().rev());
        }
    }

    fn resolve_declarations(&mut self, path: &RefPath<L>, scope: Scope) {
        let Some(search) = self.searches.last_mut() else {
            return;
        };
        for decl in sorted(self.scope_graph.decls(scope)) {
            if !self.data_wellformedness.data_wf(&search.reference, &decl) {
                continue;
            }
            match path.concat(&DeclPath::new(scope, decl)) {
                Ok(full) => {
                    log::debug!("resolved {} to {}", search.reference, full.declaration());
                    search.found.push_back(full);
                }
                Err(err) => log::trace!("pruned declaration in {scope}: {err}"),
            }
        }
    }

    /// Continues through `pending` with a recorded resolution of its import, or starts a
    /// nested search for it.
    fn follow_import(&mut self, pending: PendingImport<L>) {
        let Some(search) = self.searches.last_mut() else {
            return;
        };
        let import = pending.import.clone();
        if pending.path.references().contains(&import) {
            log::trace!("skipping import {import}: already on the path");
            return;
        }
        if search.excluded.contains(&import) {
            log::trace!("skipping import {import}: already resolving through it");
            search.blocked.insert(import);
            return;
        }
        let Some(import_scope) = self.scope_graph.scope_of_reference(&import) else {
            log::warn!("import {import} is not a reference in the scope graph");
            return;
        };

        let mut excluded = search.excluded.clone();
        excluded.extend(pending.path.references().iter().cloned());

        if let Some(resolved) = self.imports.get(&import, &excluded) {
            log::trace!("reusing {} resolution(s) of import {import}", resolved.resolutions.len());
            self.step_into_import(pending, &resolved);
            return;
        }

        log::trace!("resolving import {import} from {import_scope}");
        let nested = Search::new(
            import,
            import_scope,
            self.path_wellformedness,
            excluded,
            Some(pending),
        );
        self.searches.push(nested);
    }

    /// Records the finished nested search and continues the search that was waiting for it.
    fn finish_import(&mut self) {
        let Some(Search {
            excluded,
            blocked,
            found,
            resolving: Some(pending),
            ..
        }) = self.searches.pop()
        else {
            return;
        };

        let resolved = Resolved {
            blocked: blocked
                .into_iter()
                .filter(|import| excluded.contains(import))
                .collect(),
            resolutions: found.into_iter().collect(),
        };
        log::trace!(
            "import {} resolved to {} declaration(s)",
            pending.import,
            resolved.resolutions.len()
        );
        self.imports.insert(pending.import.clone(), &excluded, resolved.clone());
        self.step_into_import(pending, &resolved);
    }

    /// Steps from the end of `pending.path` into every scope associated with a resolution of its import.
    fn step_into_import(&mut self, pending: PendingImport<L>, resolved: &Resolved<L>) {
        let Some(search) = self.searches.last_mut() else {
            return;
        };
        search.blocked.extend(resolved.blocked.iter().cloned());

        let source = pending.path.target_scope();
        let mut next = Vec::new();
        for resolution in resolved.resolutions.iter() {
            for target in sorted(self.scope_graph.associated_scopes(resolution.declaration())) {
                let step = ScopePath::import(source, pending.label, resolution.clone(), target);
                match pending.path.concat(&step) {
                    Ok(path) => next.push(Task::Expand(Frame {
                        path,
                        matcher: pending.matcher.clone(),
                    })),
                    Err(err) => log::trace!("pruned import {} into {target}: {err}", pending.import),
                }
            }
        }
        search.tasks.extend(next.into_iter().rev());
    }
}

impl<'q, L: Label, DWF: DataWellformedness> Iterator for Resolution<'q, L, DWF> {
    type Item = FullPath<L>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let [root] = self.searches.as_mut_slice() {
                if let Some(path) = root.found.pop_front() {
                    return Some(path);
                }
            }
            let search = self.searches.last_mut()?;
            match search.tasks.pop() {
                Some(Task::Expand(frame)) => self.expand(frame),
                Some(Task::Import(pending)) => self.follow_import(pending),
                None if self.searches.len() > 1 => self.finish_import(),
                None => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::path::Step;
    use crate::resolve::ResolveError;
    use crate::{regex, Label, Occurrence, RegexMatcher, ScopeGraph};

    #[derive(Label, Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Lbl {
        Lex,
        Imp,
    }
    use Lbl::*;

    #[ctor::ctor]
    fn init() {
        env_logger::init();
    }

    fn names(paths: &[crate::path::FullPath<Lbl>]) -> Vec<(usize, usize)> {
        paths
            .iter()
            .map(|p| (p.declaration().position(), p.size()))
            .collect()
    }

    #[test]
    fn test_follow_lexical_chain() {
        let mut sg = ScopeGraph::new();
        let s0 = sg.add_scope();
        let s1 = sg.add_scope();
        let s2 = sg.add_scope();
        sg.add_direct_edge(s0, Lex, s1);
        sg.add_direct_edge(s1, Lex, s2);
        let d = sg.add_decl(s2, "x");
        let r = sg.add_ref(s0, "x");

        let query = sg.query().with_path_regex(regex!(Lbl: Lex*));
        let env: Vec<_> = query.resolve(&r).unwrap().collect();

        assert_eq!(1, env.len());
        assert_eq!(&d, env[0].declaration());
        assert_eq!(&r, env[0].reference());
        assert_eq!(3, env[0].size());
        let targets: Vec<_> = env[0]
            .steps()
            .map(|s| match s {
                Step::Edge { target, .. } | Step::Import { target, .. } => target,
            })
            .collect();
        assert_eq!(vec![s1, s2], targets);
    }

    #[test]
    fn test_empty_language_resolves_nothing() {
        let mut sg = ScopeGraph::new();
        let s0 = sg.add_scope();
        let s1 = sg.add_scope();
        sg.add_direct_edge(s0, Lex, s1);
        sg.add_decl(s0, "x");
        sg.add_decl(s1, "x");
        let r = sg.add_ref(s0, "x");

        let matcher = RegexMatcher::new(regex!(Lbl: 0), Lbl::alphabet());
        assert!(matcher.match_symbol(&Lex).is_stuck());

        let query = sg.query().with_path_wellformedness(matcher);
        assert_eq!(0, query.resolve(&r).unwrap().count());
    }

    #[test]
    fn test_all_visible_declarations() {
        let mut sg = ScopeGraph::new();
        let s0 = sg.add_scope();
        let s1 = sg.add_scope();
        sg.add_direct_edge(s1, Lex, s0);
        let outer = sg.add_decl(s0, "x");
        let inner = sg.add_decl(s1, "x");
        sg.add_decl(s1, "y");
        let r = sg.add_ref(s1, "x");

        let query = sg.query().with_path_regex(regex!(Lbl: Lex*));
        let env: Vec<_> = query.resolve(&r).unwrap().collect();

        assert_eq!(
            vec![(inner.position(), 1), (outer.position(), 2)],
            names(&env)
        );
    }

    #[test]
    fn test_path_wellformedness_prunes() {
        let mut sg = ScopeGraph::new();
        let s0 = sg.add_scope();
        let s1 = sg.add_scope();
        let s2 = sg.add_scope();
        sg.add_direct_edge(s0, Lex, s1);
        sg.add_direct_edge(s1, Lex, s2);
        let near = sg.add_decl(s1, "x");
        sg.add_decl(s2, "x");
        let r = sg.add_ref(s0, "x");

        let query = sg.query().with_path_regex(regex!(Lbl: Lex));
        let env: Vec<_> = query.resolve(&r).unwrap().collect();
        assert_eq!(vec![(near.position(), 2)], names(&env));
    }

    #[test]
    fn test_cycles_terminate() {
        let mut sg = ScopeGraph::new();
        let s0 = sg.add_scope();
        let s1 = sg.add_scope();
        sg.add_direct_edge(s0, Lex, s1);
        sg.add_direct_edge(s1, Lex, s0);
        sg.add_direct_edge(s1, Lex, s1);
        let d = sg.add_decl(s1, "x");
        let r = sg.add_ref(s0, "x");

        let query = sg.query().with_path_regex(regex!(Lbl: Lex*));
        let env: Vec<_> = query.resolve(&r).unwrap().collect();
        assert_eq!(vec![(d.position(), 2)], names(&env));
    }

    #[test]
    fn test_import_module() {
        // module M { def y }  s1: import M; ref y
        let mut sg = ScopeGraph::new();
        let s0 = sg.add_scope();
        let module_scope = sg.add_scope();
        let s1 = sg.add_scope();
        let module = sg.add_decl(s0, "M");
        sg.add_associated_scope(&module, module_scope);
        let y = sg.add_decl(module_scope, "y");
        sg.add_direct_edge(s1, Lex, s0);
        let import = sg.add_import(s1, Imp, "M");
        let r = sg.add_ref(s1, "y");

        let query = sg.query().with_path_regex(regex!(Lbl: Lex* Imp?));
        let env: Vec<_> = query.resolve(&r).unwrap().collect();

        assert_eq!(1, env.len());
        assert_eq!(&y, env[0].declaration());
        assert!(env[0].references().contains(&import));
        match env[0].steps().next() {
            Some(Step::Import {
                resolution, target, ..
            }) => {
                assert_eq!(&module, resolution.declaration());
                assert_eq!(module_scope, target);
            }
            other => panic!("expected an import step, got {other:?}"),
        }
    }

    #[test]
    fn test_mutual_imports_terminate() {
        let mut sg = ScopeGraph::new();
        let root = sg.add_scope();
        let a_scope = sg.add_scope();
        let b_scope = sg.add_scope();
        let a = sg.add_decl(root, "A");
        let b = sg.add_decl(root, "B");
        sg.add_associated_scope(&a, a_scope);
        sg.add_associated_scope(&b, b_scope);
        sg.add_direct_edge(a_scope, Lex, root);
        sg.add_direct_edge(b_scope, Lex, root);
        sg.add_import(a_scope, Imp, "B");
        sg.add_import(b_scope, Imp, "A");
        let x = sg.add_decl(b_scope, "x");
        let r = sg.add_ref(a_scope, "x");

        let query = sg.query().with_path_regex(regex!(Lbl: Lex* Imp*));
        let env: Vec<_> = query.resolve(&r).unwrap().collect();
        assert_eq!(vec![(x.position(), 2)], names(&env));
    }

    #[test]
    fn test_many_unresolvable_imports() {
        // s0: import M0 .. M11, none of them declared; ref x
        let mut sg = ScopeGraph::new();
        let s0 = sg.add_scope();
        let s1 = sg.add_scope();
        sg.add_direct_edge(s0, Lex, s1);
        for i in 0..12 {
            sg.add_import(s0, Imp, format!("M{i}"));
        }
        let x = sg.add_decl(s1, "x");
        let r = sg.add_ref(s0, "x");

        let query = sg.query().with_path_regex(regex!(Lbl: Lex* Imp*));
        let env: Vec<_> = query.resolve(&r).unwrap().collect();
        assert_eq!(vec![(x.position(), 2)], names(&env));
    }

    #[test]
    fn test_many_module_imports() {
        // module Mi { def x }  local: import M0 .. M7; ref x
        let mut sg = ScopeGraph::new();
        let root = sg.add_scope();
        let local = sg.add_scope();
        sg.add_direct_edge(local, Lex, root);
        let mut expected = Vec::new();
        for i in 0..8 {
            let module_scope = sg.add_scope();
            let module = sg.add_decl(root, format!("M{i}"));
            sg.add_associated_scope(&module, module_scope);
            let x = sg.add_decl(module_scope, "x");
            sg.add_import(local, Imp, format!("M{i}"));
            expected.push((x.position(), 2));
        }
        let r = sg.add_ref(local, "x");

        let query = sg.query().with_path_regex(regex!(Lbl: Lex* Imp?));
        let env: Vec<_> = query.resolve(&r).unwrap().collect();
        assert_eq!(expected, names(&env));
        for path in &env {
            assert_eq!(2, path.references().len());
        }
    }

    #[test]
    fn test_data_wellformedness() {
        let mut sg = ScopeGraph::new();
        let s0 = sg.add_scope();
        sg.add_decl(s0, "x");
        let y = sg.add_decl(s0, "y");
        let r = sg.add_ref(s0, "x");

        let query = sg
            .query()
            .with_path_regex(regex!(Lbl: e))
            .with_data_wellformedness(|_: &Occurrence, d: &Occurrence| d.name() == "y");
        let env: Vec<_> = query.resolve(&r).unwrap().collect();
        assert_eq!(vec![(y.position(), 1)], names(&env));
    }

    #[test]
    fn test_resolution_is_restartable() {
        let mut sg = ScopeGraph::new();
        let s0 = sg.add_scope();
        let s1 = sg.add_scope();
        sg.add_direct_edge(s0, Lex, s1);
        sg.add_decl(s1, "x");
        let r = sg.add_ref(s0, "x");

        let snapshot = sg.clone();
        sg.add_decl(s0, "x");

        let before = snapshot.query().with_path_regex(regex!(Lbl: Lex*));
        assert_eq!(1, before.resolve(&r).unwrap().count());
        assert_eq!(1, before.resolve(&r).unwrap().count());

        let after = sg.query().with_path_regex(regex!(Lbl: Lex*));
        assert_eq!(2, after.resolve(&r).unwrap().count());
    }

    #[test]
    fn test_unknown_reference() {
        let mut sg: ScopeGraph<Lbl> = ScopeGraph::new();
        let s0 = sg.add_scope();
        let d = sg.add_decl(s0, "x");

        let query = sg.query().with_path_regex(regex!(Lbl: Lex*));
        assert_eq!(
            Some(ResolveError::UnknownReference(d.clone())),
            query.resolve(&d).err()
        );
    }
}
