use crate::path::{
    DeclNode, DeclPath, DeclShape, FullNode, FullPath, Meta, PathError, RefNode, RefPath, RefShape,
    ScopeNode, ScopePath, ScopeShape,
};
use crate::Scope;
use im::HashSet;
use std::hash::Hash;
use std::sync::Arc;

/// Joining two paths end to start.
///
/// Implemented for the four combinations that produce a path:
///
/// | left        | right       | output      |
/// |-------------|-------------|-------------|
/// | `RefPath`   | `DeclPath`  | `FullPath`  |
/// | `RefPath`   | `ScopePath` | `RefPath`   |
/// | `ScopePath` | `DeclPath`  | `DeclPath`  |
/// | `ScopePath` | `ScopePath` | `ScopePath` |
pub trait Concat<Rhs> {
    type Output;

    /// Fails with [`PathError::ScopeMismatch`] if `self` does not end where `right` starts,
    /// and with [`PathError::CyclicPath`] if the result would visit a scope twice.
    fn concat(&self, right: &Rhs) -> Result<Self::Output, PathError>;
}

/// `left` followed by `right`, see [`Concat`].
pub fn concat<Lhs, Rhs>(left: &Lhs, right: &Rhs) -> Result<Lhs::Output, PathError>
where
    Lhs: Concat<Rhs>,
{
    left.concat(right)
}

/// Adds the smaller set to a clone of the larger one.
fn union<T: Hash + Eq + Clone>(a: &HashSet<T>, b: &HashSet<T>) -> HashSet<T> {
    let (large, small) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let mut result = large.clone();
    for value in small {
        result.insert(value.clone());
    }
    result
}

/// Checks that two paths can be joined at `junction` and computes the bookkeeping of the result.
fn join(left: &Meta, left_target: Scope, right: &Meta, right_source: Scope) -> Result<Meta, PathError> {
    if left_target != right_source {
        return Err(PathError::ScopeMismatch {
            left: left_target,
            right: right_source,
        });
    }
    let junction = left_target;

    // the junction is the only position the two operands share
    let visits = left.visits + right.visits - 1;
    let scopes = union(&left.scopes, &right.scopes);
    if scopes.len() < visits {
        let scope = left
            .scopes
            .iter()
            .find(|s| **s != junction && right.scopes.contains(*s))
            .copied()
            .unwrap_or(junction);
        return Err(PathError::CyclicPath { scope });
    }

    Ok(Meta {
        size: left.size + 1 + right.size,
        visits,
        scopes,
        references: union(&left.references, &right.references),
    })
}

impl<L> Concat<DeclPath<L>> for RefPath<L> {
    type Output = FullPath<L>;

    fn concat(&self, right: &DeclPath<L>) -> Result<FullPath<L>, PathError> {
        let meta = join(self.meta(), self.target_scope(), right.meta(), right.source_scope())?;
        Ok(FullPath(Arc::new(FullNode {
            left: self.clone(),
            right: right.clone(),
            meta,
        })))
    }
}

impl<L> Concat<ScopePath<L>> for RefPath<L> {
    type Output = RefPath<L>;

    fn concat(&self, right: &ScopePath<L>) -> Result<RefPath<L>, PathError> {
        let meta = join(self.meta(), self.target_scope(), right.meta(), right.source_scope())?;
        Ok(RefPath(Arc::new(RefNode {
            reference: self.reference().clone(),
            source: self.source_scope(),
            target: right.target_scope(),
            meta,
            shape: RefShape::Concat(self.clone(), right.clone()),
        })))
    }
}

impl<L> Concat<DeclPath<L>> for ScopePath<L> {
    type Output = DeclPath<L>;

    fn concat(&self, right: &DeclPath<L>) -> Result<DeclPath<L>, PathError> {
        let meta = join(self.meta(), self.target_scope(), right.meta(), right.source_scope())?;
        Ok(DeclPath(Arc::new(DeclNode {
            source: self.source_scope(),
            target: right.target_scope(),
            declaration: right.declaration().clone(),
            meta,
            shape: DeclShape::Concat(self.clone(), right.clone()),
        })))
    }
}

impl<L> Concat<ScopePath<L>> for ScopePath<L> {
    type Output = ScopePath<L>;

    fn concat(&self, right: &ScopePath<L>) -> Result<ScopePath<L>, PathError> {
        let meta = join(self.meta(), self.target_scope(), right.meta(), right.source_scope())?;
        Ok(ScopePath(Arc::new(ScopeNode {
            source: self.source_scope(),
            target: right.target_scope(),
            meta,
            shape: ScopeShape::Concat(self.clone(), right.clone()),
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::Step;
    use crate::Occurrence;

    const A: Scope = Scope(0);
    const B: Scope = Scope(1);
    const C: Scope = Scope(2);
    const D: Scope = Scope(3);

    fn edge(source: Scope, target: Scope) -> ScopePath<char> {
        ScopePath::direct(source, 'I', target)
    }

    #[test]
    fn size_counts_joins() {
        let ab = edge(A, B);
        let bc = edge(B, C);
        let abc = concat(&ab, &bc).unwrap();
        assert_eq!(1, abc.size());

        let cd = edge(C, D);
        let abcd = concat(&abc, &cd).unwrap();
        assert_eq!(abc.size() + 1 + cd.size(), abcd.size());
        assert_eq!(A, abcd.source_scope());
        assert_eq!(D, abcd.target_scope());
    }

    #[test]
    fn mismatched_endpoints_are_rejected() {
        assert_eq!(
            Err(PathError::ScopeMismatch { left: B, right: C }),
            concat(&edge(A, B), &edge(C, D))
        );

        let decl = DeclPath::new(C, Occurrence::new("x", 0));
        assert!(matches!(
            concat(&edge(A, B), &decl),
            Err(PathError::ScopeMismatch { .. })
        ));
    }

    #[test]
    fn going_back_is_cyclic() {
        assert_eq!(
            Err(PathError::CyclicPath { scope: A }),
            concat(&edge(A, B), &edge(B, A))
        );
    }

    #[test]
    fn revisiting_any_earlier_scope_is_cyclic() {
        let abc = concat(&edge(A, B), &edge(B, C)).unwrap();
        assert_eq!(
            Err(PathError::CyclicPath { scope: B }),
            concat(&abc, &edge(C, B))
        );
    }

    #[test]
    fn self_loops_are_cyclic() {
        let reference = RefPath::new(Occurrence::new("x", 0), A);
        assert_eq!(
            Err(PathError::CyclicPath { scope: A }),
            concat(&reference, &edge(A, A))
        );
    }

    #[test]
    fn empty_paths_join_without_visiting_twice() {
        let path = concat(&ScopePath::empty(A), &edge(A, B)).unwrap();
        assert_eq!(1, path.size());
        assert_eq!(2, path.scopes().len());
    }

    #[test]
    fn concatenation_is_associative() {
        let (ab, bc, cd) = (edge(A, B), edge(B, C), edge(C, D));
        let left = concat(&concat(&ab, &bc).unwrap(), &cd).unwrap();
        let right = concat(&ab, &concat(&bc, &cd).unwrap()).unwrap();

        assert_eq!(left.scopes(), right.scopes());
        assert_eq!(left.references(), right.references());
        assert_eq!(left.size(), right.size());
        assert_eq!(
            left.steps().collect::<Vec<_>>(),
            right.steps().collect::<Vec<_>>()
        );
        assert_eq!(left, right);
    }

    #[test]
    fn steps_are_left_to_right() {
        let reference = RefPath::new(Occurrence::new("x", 0), A);
        let path = concat(&reference, &edge(A, B)).unwrap();
        let path = concat(&path, &edge(B, C)).unwrap();

        let targets: Vec<_> = path
            .steps()
            .map(|step| match step {
                Step::Edge { target, .. } => target,
                Step::Import { target, .. } => target,
            })
            .collect();
        assert_eq!(vec![B, C], targets);
    }

    #[test]
    fn full_path_through_two_edges() {
        let x = Occurrence::new("x", 0);
        let d = Occurrence::new("x", 1);

        let reference = RefPath::new(x.clone(), A);
        let scopes = concat(&edge(A, B), &edge(B, C)).unwrap();
        let decl = concat(&scopes, &DeclPath::new(C, d.clone())).unwrap();
        let full = concat(&reference, &decl).unwrap();

        assert_eq!(3, full.size());
        assert_eq!(&x, full.reference());
        assert_eq!(&d, full.declaration());
        assert_eq!(A, full.source_scope());
        assert_eq!(C, full.target_scope());
        assert_eq!(3, full.scopes().len());
        assert_eq!(2, full.steps().count());

        // built the other way around
        let prefix = concat(&concat(&reference, &edge(A, B)).unwrap(), &edge(B, C)).unwrap();
        let other = concat(&prefix, &DeclPath::new(C, d)).unwrap();
        assert_eq!(full, other);
    }

    #[test]
    fn imports_carry_their_references() {
        let module = Occurrence::new("M", 0);
        let import = Occurrence::new("M", 1);
        let resolution =
            concat(&RefPath::new(import.clone(), A), &DeclPath::new(A, module)).unwrap();

        let step = ScopePath::import(A, 'I', resolution, B);
        let path = concat(&RefPath::new(Occurrence::new("x", 2), A), &step).unwrap();

        assert!(path.references().contains(&import));
        assert_eq!(2, path.references().len());
        assert!(matches!(
            path.steps().next(),
            Some(Step::Import { target: B, .. })
        ));
    }
}
