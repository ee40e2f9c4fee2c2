use crate::Occurrence;

/// Binary predicate over a reference and a candidate declaration.
///
/// Used to select declarations that a query can resolve to.
pub trait DataWellformedness {
    /// returns true if `declaration` is a valid target for `reference`.
    fn data_wf(&self, reference: &Occurrence, declaration: &Occurrence) -> bool;
}

impl<T> DataWellformedness for T
where
    T: Fn(&Occurrence, &Occurrence) -> bool,
{
    fn data_wf(&self, reference: &Occurrence, declaration: &Occurrence) -> bool {
        self(reference, declaration)
    }
}

/// Default data wellformedness: a declaration matches a reference with the same name.
#[derive(Default, Debug, Clone, Copy)]
pub struct DefaultDataWellformedness {}

impl DataWellformedness for DefaultDataWellformedness {
    fn data_wf(&self, reference: &Occurrence, declaration: &Occurrence) -> bool {
        reference.name() == declaration.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_compares_names() {
        let x = Occurrence::new("x", 0);
        assert!(DefaultDataWellformedness {}.data_wf(&x, &Occurrence::new("x", 1)));
        assert!(!DefaultDataWellformedness {}.data_wf(&x, &Occurrence::new("y", 2)));
    }

    #[test]
    fn closures_are_wellformedness() {
        let any = |_: &Occurrence, _: &Occurrence| true;
        assert!(any.data_wf(&Occurrence::new("x", 0), &Occurrence::new("y", 1)));
    }
}
