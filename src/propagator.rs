use std::fmt::{self, Display};

use serde::Serialize;

use crate::symbol::Symbol;

/// A single completed contraction: one edge of a Feynman diagram.
///
/// Directed propagators arise from contracting a charge +1 with a
/// charge -1 operator and run from the +1 endpoint to the -1 endpoint.
/// Undirected propagators connect two self-conjugate operators; their
/// endpoints are normalized into sorted order at construction, so the
/// derived equality and ordering are insensitive to the order in which
/// the endpoints were supplied.
#[derive(
    Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize,
)]
pub struct Propagator {
    species: Symbol,
    from: Symbol,
    to: Symbol,
    arrow: bool,
}

impl Propagator {
    /// Charge-carrying propagator from `from` to `to`.
    pub fn directed(species: Symbol, from: Symbol, to: Symbol) -> Self {
        Self {
            species,
            from,
            to,
            arrow: true,
        }
    }

    /// Neutral propagator between two endpoints, stored in canonical
    /// endpoint order.
    pub fn undirected(species: Symbol, from: Symbol, to: Symbol) -> Self {
        let (from, to) = if to < from { (to, from) } else { (from, to) };
        Self {
            species,
            from,
            to,
            arrow: false,
        }
    }

    pub fn species(&self) -> Symbol {
        self.species
    }

    pub fn from(&self) -> Symbol {
        self.from
    }

    pub fn to(&self) -> Symbol {
        self.to
    }

    /// Whether this propagator carries a directed charge flow.
    pub fn has_arrow(&self) -> bool {
        self.arrow
    }

    /// Whether this propagator connects the vertices `a` and `b`,
    /// in either orientation.
    pub fn connects(&self, a: Symbol, b: Symbol) -> bool {
        (self.from, self.to) == (a, b) || (self.from, self.to) == (b, a)
    }
}

impl Display for Propagator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.arrow {
            write!(f, "{}({} ->- {})", self.species, self.from, self.to)
        } else {
            write!(f, "{}({} --- {})", self.species, self.from, self.to)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols;

    #[test]
    fn directed_order_matters() {
        symbols!(e, x, y);
        let p = Propagator::directed(e, x, y);
        let q = Propagator::directed(e, y, x);
        assert_ne!(p, q);
        assert_eq!(p.from(), x);
        assert_eq!(p.to(), y);
        assert!(p.connects(y, x));
    }

    #[test]
    fn undirected_normalizes() {
        symbols!(ph, x, y);
        let p = Propagator::undirected(ph, x, y);
        let q = Propagator::undirected(ph, y, x);
        assert_eq!(p, q);
        assert_eq!(p.from(), x);
        assert!(!p.has_arrow());
    }

    #[test]
    fn canonical_sort() {
        symbols!(e, ph, x, y, z);
        let mut props = vec![
            Propagator::undirected(ph, z, y),
            Propagator::directed(e, x, y),
            Propagator::undirected(ph, x, y),
        ];
        props.sort();
        assert_eq!(
            props,
            [
                Propagator::directed(e, x, y),
                Propagator::undirected(ph, x, y),
                Propagator::undirected(ph, y, z),
            ]
        );
    }
}
