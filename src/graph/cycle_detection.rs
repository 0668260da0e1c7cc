use crate::core::member::MemberId;
use crate::settlement::engine::NetTransfer;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A circular chain of net transfers, e.g. A pays B, B pays C, C pays A.
///
/// Pairwise netting leaves such chains in place. Reporting them shows how
/// much money could be kept from moving if the group agreed to settle
/// beyond pairs; the settlement itself is never rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementCycle {
    /// Members in payment order. The last one pays back to the first.
    pub members: Vec<MemberId>,
    /// Smallest transfer on the cycle.
    pub bottleneck: Decimal,
}

impl SettlementCycle {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Total transfer volume removed by cancelling the bottleneck around the cycle.
    pub fn potential_savings(&self) -> Decimal {
        self.bottleneck * Decimal::from(self.members.len())
    }
}

/// Directed graph of net transfers, members as nodes.
struct TransferGraph {
    graph: DiGraph<MemberId, Decimal>,
}

impl TransferGraph {
    fn from_transfers(transfers: &[NetTransfer]) -> Self {
        let mut graph: DiGraph<MemberId, Decimal> = DiGraph::new();
        let mut nodes: HashMap<MemberId, NodeIndex> = HashMap::new();

        for t in transfers {
            let from = *nodes
                .entry(t.debtor.clone())
                .or_insert_with(|| graph.add_node(t.debtor.clone()));
            let to = *nodes
                .entry(t.creditor.clone())
                .or_insert_with(|| graph.add_node(t.creditor.clone()));
            match graph.find_edge(from, to) {
                Some(edge) => graph[edge] += t.amount,
                None => {
                    graph.add_edge(from, to, t.amount);
                }
            }
        }
        Self { graph }
    }

    fn amount(&self, from: NodeIndex, to: NodeIndex) -> Decimal {
        self.graph
            .find_edge(from, to)
            .map(|e| self.graph[e])
            .unwrap_or(Decimal::ZERO)
    }
}

/// Longest cycle [`find_cycles`] looks for.
///
/// Simple-cycle enumeration is exponential in dense transfer graphs.
pub const DEFAULT_MAX_CYCLE_LEN: usize = 4;

/// Detect simple cycles of up to [`DEFAULT_MAX_CYCLE_LEN`] members.
pub fn find_cycles(transfers: &[NetTransfer]) -> Vec<SettlementCycle> {
    find_cycles_up_to(transfers, DEFAULT_MAX_CYCLE_LEN)
}

/// Detect all simple cycles of at most `max_len` members among a set of
/// net transfers.
///
/// Strongly connected components are found first (Tarjan); only members
/// sharing a component can lie on a common cycle. Within each component a
/// DFS from every member explores only members ordered after the start,
/// so each cycle is reported exactly once, rotated to begin at its
/// smallest member.
///
/// Returns cycles ordered by potential savings (largest first).
pub fn find_cycles_up_to(transfers: &[NetTransfer], max_len: usize) -> Vec<SettlementCycle> {
    let tg = TransferGraph::from_transfers(transfers);
    let mut cycles = Vec::new();

    for component in tarjan_scc(&tg.graph) {
        if component.len() < 2 {
            continue;
        }
        let allowed: HashSet<NodeIndex> = component.iter().copied().collect();
        let mut starts = component.clone();
        starts.sort_by(|a, b| tg.graph[*a].cmp(&tg.graph[*b]));

        for &start in &starts {
            let mut path = vec![start];
            dfs_find_cycles(&tg, start, &allowed, max_len, &mut path, &mut cycles);
        }
    }

    cycles.sort_by(|a, b| {
        b.potential_savings()
            .cmp(&a.potential_savings())
            .then_with(|| a.members.cmp(&b.members))
    });
    cycles
}

fn dfs_find_cycles(
    tg: &TransferGraph,
    start: NodeIndex,
    allowed: &HashSet<NodeIndex>,
    max_len: usize,
    path: &mut Vec<NodeIndex>,
    cycles: &mut Vec<SettlementCycle>,
) {
    let Some(&current) = path.last() else {
        return;
    };
    for next in tg.graph.neighbors(current) {
        if next == start && path.len() >= 2 {
            cycles.push(SettlementCycle {
                members: path.iter().map(|n| tg.graph[*n].clone()).collect(),
                bottleneck: compute_bottleneck(tg, path),
            });
        } else if path.len() < max_len
            && allowed.contains(&next)
            && !path.contains(&next)
            && tg.graph[next] > tg.graph[start]
        {
            path.push(next);
            dfs_find_cycles(tg, start, allowed, max_len, path, cycles);
            path.pop();
        }
    }
}

/// Minimum transfer along a cycle.
fn compute_bottleneck(tg: &TransferGraph, path: &[NodeIndex]) -> Decimal {
    let mut min = Decimal::MAX;
    for i in 0..path.len() {
        let amount = tg.amount(path[i], path[(i + 1) % path.len()]);
        if amount < min {
            min = amount;
        }
    }
    min
}
