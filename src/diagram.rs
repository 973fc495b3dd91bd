use std::fmt::{self, Display};

use ahash::AHashMap;
use derivative::Derivative;
use itertools::Itertools;
use petgraph::algo::connected_components;
use petgraph::graph::UnGraph;
use serde::Serialize;

use crate::propagator::Propagator;
use crate::symbol::Symbol;

/// One complete Wick contraction, packaged as a Feynman diagram.
///
/// Vertex labels are split into outer (external legs) and inner
/// (integrated interaction points). The propagator list is kept in
/// canonical sorted order, so two diagrams built from the same pairing
/// in different contraction orders compare equal. Diagrams that only
/// differ by a relabelling of inner vertices are *not* identified;
/// isomorphism checking is out of scope here.
#[derive(Clone, Debug, Derivative, Serialize)]
#[derivative(Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Diagram {
    outer_vertices: Vec<Symbol>,
    inner_vertices: Vec<Symbol>,
    propagators: Vec<Propagator>,
    #[derivative(
        PartialEq = "ignore",
        PartialOrd = "ignore",
        Ord = "ignore",
        Hash = "ignore"
    )]
    #[serde(skip)]
    particles: Vec<(Symbol, bool)>,
}

impl Diagram {
    pub fn new(
        outer_vertices: impl IntoIterator<Item = Symbol>,
        inner_vertices: impl IntoIterator<Item = Symbol>,
        mut propagators: Vec<Propagator>,
    ) -> Self {
        propagators.sort();
        let particles = propagators
            .iter()
            .map(|p| (p.species(), p.has_arrow()))
            .sorted()
            .dedup()
            .collect();
        Self {
            outer_vertices: outer_vertices.into_iter().sorted().dedup().collect(),
            inner_vertices: inner_vertices.into_iter().sorted().dedup().collect(),
            propagators,
            particles,
        }
    }

    pub fn outer_vertices(&self) -> &[Symbol] {
        &self.outer_vertices
    }

    pub fn inner_vertices(&self) -> &[Symbol] {
        &self.inner_vertices
    }

    pub fn propagators(&self) -> &[Propagator] {
        &self.propagators
    }

    /// The distinct `(species, arrow)` pairs appearing among the
    /// propagators.
    pub fn particles(&self) -> &[(Symbol, bool)] {
        &self.particles
    }

    /// Undirected graph view, for consumers that want to walk the
    /// diagram topologically. Node weights are vertex labels, edge
    /// weights the propagators.
    pub fn graph(&self) -> UnGraph<Symbol, Propagator> {
        let mut g = UnGraph::new_undirected();
        let mut nodes = AHashMap::new();
        let vertices = self
            .outer_vertices
            .iter()
            .chain(&self.inner_vertices)
            .copied();
        for v in vertices {
            nodes.entry(v).or_insert_with(|| g.add_node(v));
        }
        for p in &self.propagators {
            for v in [p.from(), p.to()] {
                nodes.entry(v).or_insert_with(|| g.add_node(v));
            }
            g.add_edge(nodes[&p.from()], nodes[&p.to()], *p);
        }
        g
    }

    /// Whether all vertices hang together in a single component.
    /// Disconnected diagrams are products of vacuum bubbles or of
    /// independent subprocesses.
    pub fn is_connected(&self) -> bool {
        connected_components(&self.graph()) == 1
    }
}

impl Display for Diagram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Diagram {{ outer: [{}], inner: [{}], propagators: [{}] }}",
            self.outer_vertices.iter().join(", "),
            self.inner_vertices.iter().join(", "),
            self.propagators.iter().join(", "),
        )
    }
}
