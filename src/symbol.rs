use std::cmp::Ordering;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// Interned identifier for vertex labels and particle species.
///
/// Symbols compare by name, not by interning order, so sorting
/// operators gives the same result no matter in which order their
/// labels were first created.
#[derive(
    Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Deserialize, Serialize,
)]
#[serde(transparent)]
pub struct Symbol(math_symbols::Symbol);

impl Symbol {
    pub fn new(name: &str) -> Self {
        Self(math_symbols::Symbol::new(name))
    }

    pub fn name(&self) -> String {
        self.0.name()
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name().cmp(&other.name())
    }
}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[macro_export]
macro_rules! symbols {
    ( $( $x:ident ),* ) => {
        $(
            let $x = $crate::symbol::Symbol::new(stringify!($x));
        )*
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_by_name() {
        let z = Symbol::new("z");
        let a = Symbol::new("a");
        assert!(a < z);
        assert_eq!(a, Symbol::new("a"));
    }
}
