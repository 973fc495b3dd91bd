use itertools::Itertools;
use log::{debug, trace};
use thiserror::Error;

use crate::diagram::Diagram;
use crate::operator::Operator;
use crate::propagator::Propagator;
use crate::symbol::Symbol;

#[derive(Debug, Error)]
pub enum ContractionError {
    #[error("operators must pair completely: got {0}, which is odd")]
    OddOperatorCount(usize),
    #[error("creation/annihilation imbalance: charges sum to {0}")]
    ChargeImbalance(i32),
    #[error("no complete contraction exists for this operator set")]
    NoValidContraction,
}

/// Enumerate all Wick contractions of an operator product.
///
/// Returns every distinct complete pairing of `operators` into
/// propagators, each packaged as a [`Diagram`] together with its
/// signed multiplicity. The multiplicity counts structurally
/// equivalent ways of picking the same pairing and carries the
/// fermionic anticommutation sign.
///
/// With `forbid_external_pairs` set, two external operators are never
/// contracted with each other (LSZ reduction).
///
/// The result order follows the depth-first search and is
/// deterministic, but callers should only rely on the diagram
/// contents, not on their position in the list.
pub fn contract_diagrams(
    operators: &[Operator],
    forbid_external_pairs: bool,
) -> Result<Vec<(Diagram, i32)>, ContractionError> {
    if operators.len() % 2 != 0 {
        return Err(ContractionError::OddOperatorCount(operators.len()));
    }
    let total_charge: i32 = operators.iter().map(Operator::charge).sum();
    if total_charge != 0 {
        return Err(ContractionError::ChargeImbalance(total_charge));
    }

    let outer: Vec<Symbol> = operators
        .iter()
        .filter(|op| op.is_external())
        .map(Operator::pos)
        .collect();
    let inner: Vec<Symbol> = operators
        .iter()
        .filter(|op| !op.is_external())
        .map(Operator::pos)
        .collect();

    // Canonical order groups identical operators next to each other,
    // which the search relies on to skip duplicate pairings. The sort
    // has to be stable: operators tied in (pos, species, charge) may
    // still differ in their ignored flags.
    let mut sorted = operators.to_vec();
    sorted.sort();
    debug!(
        "contracting {} operators: [{}]",
        sorted.len(),
        sorted.iter().join(", ")
    );

    let mut search = Search {
        forbid_external_pairs,
        completed: Vec::new(),
    };
    search.run(sorted, Vec::new(), 1);

    let npairs = operators.len() / 2;
    let mut diagrams = Vec::new();
    for (propagators, multiplicity) in search.completed {
        // a branch that stalled before pairing everything is no diagram
        if propagators.len() != npairs {
            continue;
        }
        let dia = Diagram::new(
            outer.iter().copied(),
            inner.iter().copied(),
            propagators,
        );
        diagrams.push((dia, multiplicity));
    }
    if diagrams.is_empty() {
        return Err(ContractionError::NoValidContraction);
    }
    debug!("found {} contractions", diagrams.len());
    Ok(diagrams)
}

struct Search {
    forbid_external_pairs: bool,
    completed: Vec<(Vec<Propagator>, i32)>,
}

impl Search {
    /// Pair `remaining[0]` with every admissible partner and recurse.
    ///
    /// `multiplicity` is the signed count accumulated along this
    /// branch. Within one layer a per-candidate counter picks up the
    /// number of structurally identical partners (only looking one
    /// position ahead in the sorted order) and the fermionic sign,
    /// flipped whenever the pairing index is even. The sign rule is a
    /// shortcut for full permutation-parity tracking that holds for
    /// this restricted contraction order.
    fn run(
        &mut self,
        remaining: Vec<Operator>,
        contracted: Vec<Propagator>,
        multiplicity: i32,
    ) {
        if remaining.len() == 2 {
            let (first, last) = (remaining[0], remaining[1]);
            if self.forbid_external_pairs
                && first.is_external()
                && last.is_external()
            {
                trace!("dead end: {first} and {last} are both external");
                return;
            }
            match first.contract(&last) {
                Ok(pair) => {
                    let mut propagators = contracted;
                    propagators.push(pair);
                    self.completed.push((propagators, multiplicity));
                }
                Err(err) => trace!("dead end: {err}"),
            }
            return;
        }

        let first = remaining[0];
        let mut layer = 1;
        for i in 1..remaining.len() {
            // identical successor: defer to the next candidate and
            // count this one into the multiplicity instead
            if i + 1 < remaining.len() && remaining[i] == remaining[i + 1] {
                layer += 1;
                continue;
            }
            if self.forbid_external_pairs
                && first.is_external()
                && remaining[i].is_external()
            {
                trace!("skipping external pair {first}, {}", remaining[i]);
                continue;
            }
            let pair = match first.contract(&remaining[i]) {
                Ok(pair) => pair,
                Err(_) => continue,
            };
            if first.is_fermionic() && i % 2 == 0 {
                layer = -layer;
            }
            trace!("contracting {first} with {}: {pair}", remaining[i]);
            let mut rest = Vec::with_capacity(remaining.len() - 2);
            rest.extend_from_slice(&remaining[1..i]);
            rest.extend_from_slice(&remaining[i + 1..]);
            let mut acc = contracted.clone();
            acc.push(pair);
            self.run(rest, acc, multiplicity * layer);
            layer = 1;
        }
    }
}
