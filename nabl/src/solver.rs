//! What a solving step hands back to the driver.

use crate::term::TermUnifier;

/// The solution found so far, plus the constraints the driver still has to solve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveResult<C> {
    pub solution: TermUnifier,
    pub constraints: Vec<C>,
}

impl<C> SolveResult<C> {
    /// A result with nothing left to solve.
    pub fn new(solution: TermUnifier) -> Self {
        Self {
            solution,
            constraints: Vec::new(),
        }
    }

    pub fn with_constraints(solution: TermUnifier, constraints: impl IntoIterator<Item = C>) -> Self {
        Self {
            solution,
            constraints: constraints.into_iter().collect(),
        }
    }

    /// True when no residual constraints remain.
    pub fn is_complete(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn map_constraints<D>(self, f: impl FnMut(C) -> D) -> SolveResult<D> {
        SolveResult {
            solution: self.solution,
            constraints: self.constraints.into_iter().map(f).collect(),
        }
    }
}

impl<C> From<TermUnifier> for SolveResult<C> {
    fn from(solution: TermUnifier) -> Self {
        Self::new(solution)
    }
}
