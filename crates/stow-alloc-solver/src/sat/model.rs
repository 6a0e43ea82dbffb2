// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use pumpkin_solver::Solver;
use pumpkin_solver::constraints::{self, Constraint};
use pumpkin_solver::variables::{AffineView, DomainId, Literal, TransformableVariable};

/// A bounded integer decision variable together with the bounds it was
/// created with. Bounds are carried so callers can derive objective
/// ranges without asking the backend.
#[derive(Debug, Clone, Copy)]
pub struct IntVar {
    domain: DomainId,
    lb: i64,
    ub: i64,
}

impl IntVar {
    #[inline]
    pub fn lower_bound(&self) -> i64 {
        self.lb
    }

    #[inline]
    pub fn upper_bound(&self) -> i64 {
        self.ub
    }

    #[inline]
    pub(crate) fn domain(&self) -> DomainId {
        self.domain
    }
}

/// A model boolean. The literal side participates in clauses and
/// half-reified implications; the channel side is a 0/1 integer usable in
/// linear sums and products. Both views are tied together at creation.
#[derive(Debug, Clone, Copy)]
pub struct BoolVar {
    literal: Literal,
    channel: IntVar,
}

impl BoolVar {
    #[inline]
    pub fn literal(&self) -> Literal {
        self.literal
    }

    #[inline]
    pub fn channel(&self) -> IntVar {
        self.channel
    }
}

/// The model cannot be expressed within the backend's variable domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelBuildError {
    BoundOutOfRange(i64),
    CoefficientOutOfRange(i64),
}

impl std::fmt::Display for ModelBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelBuildError::BoundOutOfRange(v) => {
                write!(f, "Variable bound {v} exceeds the backend's integer domain")
            }
            ModelBuildError::CoefficientOutOfRange(v) => {
                write!(f, "Coefficient {v} exceeds the backend's integer domain")
            }
        }
    }
}

impl std::error::Error for ModelBuildError {}

#[inline]
fn narrow(value: i64) -> Result<i32, ModelBuildError> {
    i32::try_from(value).map_err(|_| ModelBuildError::BoundOutOfRange(value))
}

#[inline]
fn narrow_coeff(value: i64) -> Result<i32, ModelBuildError> {
    i32::try_from(value).map_err(|_| ModelBuildError::CoefficientOutOfRange(value))
}

/// A CP model under construction. Posting a constraint that conflicts at
/// the root does not abort building; it flips [`SatModel::root_conflict`]
/// and the driver reports INFEASIBLE without searching.
pub struct SatModel {
    solver: Solver,
    root_conflict: bool,
}

impl std::fmt::Debug for SatModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SatModel")
            .field("root_conflict", &self.root_conflict)
            .finish_non_exhaustive()
    }
}

impl Default for SatModel {
    fn default() -> Self {
        Self::new()
    }
}

impl SatModel {
    pub fn new() -> Self {
        Self {
            solver: Solver::default(),
            root_conflict: false,
        }
    }

    #[inline]
    pub fn root_conflict(&self) -> bool {
        self.root_conflict
    }

    pub(crate) fn into_solver(self) -> (Solver, bool) {
        (self.solver, self.root_conflict)
    }

    /// A bounded integer variable.
    pub fn new_int(&mut self, lb: i64, ub: i64) -> Result<IntVar, ModelBuildError> {
        let lower = narrow(lb)?;
        let upper = narrow(ub)?;
        // A prior post() may have already flagged a root conflict, which
        // leaves the backend in a state where creating further variables
        // panics. The driver reports INFEASIBLE without searching in that
        // case, so the domain below is never read; avoid touching the
        // solver.
        if self.root_conflict {
            return Ok(IntVar {
                domain: DomainId::new(0),
                lb,
                ub,
            });
        }
        let domain = self.solver.new_bounded_integer(lower, upper);
        Ok(IntVar { domain, lb, ub })
    }

    /// A boolean usable only in clauses and implications.
    pub fn new_flag(&mut self) -> Literal {
        if self.root_conflict {
            return Literal::new(DomainId::new(0));
        }
        self.solver.new_literal()
    }

    /// A boolean with a channeled 0/1 integer view.
    pub fn new_bool(&mut self) -> Result<BoolVar, ModelBuildError> {
        let literal = self.new_flag();
        let channel = self.new_int(0, 1)?;
        let tag1 = self.solver.new_constraint_tag();
        let tag2 = self.solver.new_constraint_tag();
        self.post(
            constraints::equals(vec![channel.domain], 1, tag1),
            Some(literal),
        );
        self.post(
            constraints::equals(vec![channel.domain], 0, tag2),
            Some(!literal),
        );
        Ok(BoolVar { literal, channel })
    }

    fn post<C: Constraint>(&mut self, constraint: C, reified: Option<Literal>) {
        if self.root_conflict {
            return;
        }
        let poster = self.solver.add_constraint(constraint);
        let result = match reified {
            Some(literal) => poster.implied_by(literal),
            None => poster.post(),
        };
        if result.is_err() {
            self.root_conflict = true;
        }
    }

    fn linear(
        &mut self,
        terms: &[(IntVar, i64)],
    ) -> Result<Vec<AffineView<DomainId>>, ModelBuildError> {
        // A zero coefficient contributes nothing to the sum; the backend
        // rejects scaling a variable by zero, so drop such terms rather
        // than constructing a degenerate affine view.
        terms
            .iter()
            .filter(|(_, coeff)| *coeff != 0)
            .map(|(var, coeff)| Ok(var.domain.scaled(narrow_coeff(*coeff)?)))
            .collect()
    }

    /// `Σ coeff·var = rhs`.
    pub fn post_linear_eq(
        &mut self,
        terms: &[(IntVar, i64)],
        rhs: i64,
    ) -> Result<(), ModelBuildError> {
        let vars = self.linear(terms)?;
        let rhs = narrow(rhs)?;
        let tag = self.solver.new_constraint_tag();
        self.post(constraints::equals(vars, rhs, tag), None);
        Ok(())
    }

    /// `Σ coeff·var ≤ rhs`.
    pub fn post_linear_le(
        &mut self,
        terms: &[(IntVar, i64)],
        rhs: i64,
    ) -> Result<(), ModelBuildError> {
        let vars = self.linear(terms)?;
        let rhs = narrow(rhs)?;
        let tag = self.solver.new_constraint_tag();
        self.post(constraints::less_than_or_equals(vars, rhs, tag), None);
        Ok(())
    }

    /// `flag → Σ coeff·var = rhs`.
    pub fn post_linear_eq_if(
        &mut self,
        terms: &[(IntVar, i64)],
        rhs: i64,
        flag: Literal,
    ) -> Result<(), ModelBuildError> {
        let vars = self.linear(terms)?;
        let rhs = narrow(rhs)?;
        let tag = self.solver.new_constraint_tag();
        self.post(constraints::equals(vars, rhs, tag), Some(flag));
        Ok(())
    }

    /// `flag → Σ coeff·var ≤ rhs`.
    pub fn post_linear_le_if(
        &mut self,
        terms: &[(IntVar, i64)],
        rhs: i64,
        flag: Literal,
    ) -> Result<(), ModelBuildError> {
        let vars = self.linear(terms)?;
        let rhs = narrow(rhs)?;
        let tag = self.solver.new_constraint_tag();
        self.post(constraints::less_than_or_equals(vars, rhs, tag), Some(flag));
        Ok(())
    }

    /// At least one literal holds.
    pub fn post_clause<I>(&mut self, literals: I)
    where
        I: IntoIterator<Item = Literal>,
    {
        let literals: Vec<Literal> = literals.into_iter().collect();
        let tag = self.solver.new_constraint_tag();
        self.post(constraints::clause(literals, tag), None);
    }

    /// Force a boolean to a constant.
    pub fn fix_bool(&mut self, var: &BoolVar, value: bool) {
        self.post_clause([if value { var.literal } else { !var.literal }]);
    }

    /// `product = a · b`, with `product` freshly created over the product
    /// of the operand ranges.
    pub fn def_product(&mut self, a: IntVar, b: IntVar) -> Result<IntVar, ModelBuildError> {
        // Operands in this codebase are non-negative; a tight [0, ub·ub]
        // range keeps the objective bounds honest.
        let ub = a
            .ub
            .checked_mul(b.ub)
            .ok_or(ModelBuildError::BoundOutOfRange(i64::MAX))?;
        let product = self.new_int(0, ub)?;
        let tag = self.solver.new_constraint_tag();
        self.post(
            constraints::times(a.domain, b.domain, product.domain, tag),
            None,
        );
        Ok(product)
    }

    /// A fresh variable constrained to `Σ coeff·var + constant`, bounded
    /// by `[lb, ub]`.
    pub fn def_int_eq_sum(
        &mut self,
        lb: i64,
        ub: i64,
        terms: &[(IntVar, i64)],
        constant: i64,
    ) -> Result<IntVar, ModelBuildError> {
        let defined = self.new_int(lb, ub)?;
        let mut all: Vec<(IntVar, i64)> = Vec::with_capacity(terms.len() + 1);
        all.extend_from_slice(terms);
        all.push((defined, -1));
        // Σ coeff·var − defined = −constant
        self.post_linear_eq(&all, -constant)?;
        Ok(defined)
    }
}
