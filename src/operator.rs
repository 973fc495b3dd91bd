use std::fmt::{self, Display};

use derivative::Derivative;
use thiserror::Error;

use crate::propagator::Propagator;
use crate::symbol::Symbol;

/// A quantum field operator: one insertion point in an operator product.
///
/// `pos` is the vertex label; several operators may share a label when
/// they originate from the same interaction vertex. `charge` is 1 for
/// a creation operator, -1 for an annihilation operator and 0 for a
/// self-conjugate field.
///
/// Equality and ordering only look at `(pos, species, charge)`. This
/// ordering groups structurally identical operators next to each other
/// during the contraction search; it carries no physical meaning.
#[derive(Copy, Clone, Debug, Derivative)]
#[derivative(Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Operator {
    pos: Symbol,
    species: Symbol,
    charge: i32,
    #[derivative(
        PartialEq = "ignore",
        PartialOrd = "ignore",
        Ord = "ignore",
        Hash = "ignore"
    )]
    fermionic: bool,
    #[derivative(
        PartialEq = "ignore",
        PartialOrd = "ignore",
        Ord = "ignore",
        Hash = "ignore"
    )]
    external: bool,
}

#[derive(Debug, Error)]
pub enum OperatorError {
    #[error("charge must be 1, -1, or 0, got {0}")]
    InvalidCharge(i32),
    #[error("charge must be 1 or -1 for a charged field, got {0}")]
    ChargeRequired(i32),
}

/// Two operators that cannot form a propagator.
///
/// Only ever an error for the specific pair: the contraction engine
/// catches it and treats the branch as a dead end.
#[derive(Copy, Clone, Debug, Error)]
#[error("cannot contract {0} with {1}")]
pub struct IncompatiblePair(pub Operator, pub Operator);

impl Operator {
    pub fn new(
        pos: Symbol,
        species: Symbol,
        charge: i32,
        fermionic: bool,
        external: bool,
    ) -> Result<Self, OperatorError> {
        if !matches!(charge, 1 | -1 | 0) {
            return Err(OperatorError::InvalidCharge(charge));
        }
        Ok(Self {
            pos,
            species,
            charge,
            fermionic,
            external,
        })
    }

    /// Dirac fermion insertion. Self-conjugate (charge 0) fermions go
    /// through [`Operator::new`] instead.
    pub fn fermion(
        pos: Symbol,
        species: Symbol,
        charge: i32,
        external: bool,
    ) -> Result<Self, OperatorError> {
        if !matches!(charge, 1 | -1) {
            return Err(OperatorError::ChargeRequired(charge));
        }
        Self::new(pos, species, charge, true, external)
    }

    pub fn charged_boson(
        pos: Symbol,
        species: Symbol,
        charge: i32,
        external: bool,
    ) -> Result<Self, OperatorError> {
        if !matches!(charge, 1 | -1) {
            return Err(OperatorError::ChargeRequired(charge));
        }
        Self::new(pos, species, charge, false, external)
    }

    pub fn neutral_boson(pos: Symbol, species: Symbol, external: bool) -> Self {
        Self {
            pos,
            species,
            charge: 0,
            fermionic: false,
            external,
        }
    }

    pub fn pos(&self) -> Symbol {
        self.pos
    }

    pub fn species(&self) -> Symbol {
        self.species
    }

    pub fn charge(&self) -> i32 {
        self.charge
    }

    pub fn is_fermionic(&self) -> bool {
        self.fermionic
    }

    pub fn is_external(&self) -> bool {
        self.external
    }

    /// Whether `self` and `other` can form a propagator: same species,
    /// same statistics, opposite charge.
    pub fn can_contract(&self, other: &Operator) -> bool {
        self.species == other.species
            && self.fermionic == other.fermionic
            && self.charge + other.charge == 0
    }

    /// Contract two operators into a propagator.
    ///
    /// A +1/-1 pair gives a directed propagator running from the +1
    /// operator's vertex to the -1 operator's vertex; a 0/0 pair gives
    /// an undirected one.
    pub fn contract(
        &self,
        other: &Operator,
    ) -> Result<Propagator, IncompatiblePair> {
        if !self.can_contract(other) {
            return Err(IncompatiblePair(*self, *other));
        }
        let prop = match self.charge {
            1 => Propagator::directed(self.species, self.pos, other.pos),
            -1 => Propagator::directed(self.species, other.pos, self.pos),
            _ => Propagator::undirected(self.species, self.pos, other.pos),
        };
        Ok(prop)
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.species.fmt(f)?;
        match self.charge {
            1 => '+'.fmt(f)?,
            -1 => '-'.fmt(f)?,
            _ => {}
        }
        write!(f, "({})", self.pos)?;
        if self.external {
            '*'.fmt(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols;

    #[test]
    fn charge_validation() {
        symbols!(e, x);
        assert!(Operator::new(x, e, 2, true, false).is_err());
        assert!(Operator::new(x, e, 0, true, false).is_ok());
        assert!(Operator::fermion(x, e, 0, false).is_err());
        assert!(Operator::charged_boson(x, e, 0, false).is_err());
        assert!(Operator::fermion(x, e, -1, false).is_ok());
    }

    #[test]
    fn contraction_orientation() {
        symbols!(e, x, y);
        let creation = Operator::fermion(x, e, 1, false).unwrap();
        let annihilation = Operator::fermion(y, e, -1, false).unwrap();

        let p = creation.contract(&annihilation).unwrap();
        assert_eq!(p, Propagator::directed(e, x, y));

        // same propagator regardless of which operand comes first
        let q = annihilation.contract(&creation).unwrap();
        assert_eq!(p, q);
    }

    #[test]
    fn neutral_contraction() {
        symbols!(ph, x, y);
        let a = Operator::neutral_boson(x, ph, true);
        let b = Operator::neutral_boson(y, ph, false);
        let p = a.contract(&b).unwrap();
        assert!(!p.has_arrow());
        assert!(p.connects(x, y));
    }

    #[test]
    fn incompatible_pairs() {
        symbols!(e, mu, x, y);
        let a = Operator::fermion(x, e, 1, false).unwrap();
        // wrong species
        let b = Operator::fermion(y, mu, -1, false).unwrap();
        assert!(a.contract(&b).is_err());
        // wrong statistics
        let c = Operator::charged_boson(y, e, -1, false).unwrap();
        assert!(a.contract(&c).is_err());
        // charges do not cancel
        let d = Operator::fermion(y, e, 1, false).unwrap();
        assert!(a.contract(&d).is_err());
    }

    #[test]
    fn comparison_ignores_flags() {
        symbols!(e, x);
        let a = Operator::new(x, e, 0, true, true).unwrap();
        let b = Operator::new(x, e, 0, false, false).unwrap();
        assert_eq!(a, b);
    }
}
