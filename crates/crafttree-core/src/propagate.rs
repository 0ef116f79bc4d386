//! Quantity propagation over a materialized crafting tree.
//!
//! The interactive tree is edited piecemeal (a recipe swapped here, a node
//! removed there), so quantities are re-derived from the target node after
//! every change instead of being rebuilt from the catalog. The arithmetic is
//! the same as [`crate::expand`]: whole recipe executions, materials scaled by
//! executions, and several consumers of one material summed into its node.
//!
//! Propagation first collects the demand links reachable from the target,
//! following edges backwards from consumer to material. Nodes are then
//! evaluated in topological order (Kahn's algorithm over the number of
//! consumers still pending), so every node's quantity is final before its
//! own materials are charged and a single pass is exact on an acyclic tree.
//!
//! Nodes left over by the sort sit on or below a feedback loop. They are
//! appended in key order, and links pointing backwards in that order read the
//! previous pass. Passes then repeat until two in a row agree, bounded by
//! [`PropagateConfig::max_passes`].

use crate::expand::executions_for;
use crate::id::*;
use crate::tree::{CraftEdge, CraftNode};
use slotmap::SlotMap;
use std::collections::{HashMap, HashSet, VecDeque};

/// Tuning for [`propagate_quantities`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropagateConfig {
    /// Hard limit on convergence passes over a feedback loop. Acyclic trees
    /// always resolve in one pass.
    pub max_passes: u32,
}

impl Default for PropagateConfig {
    fn default() -> Self {
        Self { max_passes: 64 }
    }
}

/// Recompute node quantities for `target_quantity` units of `target_item`.
///
/// Returns a new node map; edges are never touched and no catalog lookups are
/// made. A node whose recipe does not produce its own item contributes
/// nothing. Resource nodes and nodes unreachable from the target end with no
/// quantity. If no node carries `target_item` the nodes are returned as-is.
pub fn propagate_quantities(
    nodes: &SlotMap<NodeId, CraftNode>,
    edges: &SlotMap<EdgeId, CraftEdge>,
    target_item: ItemId,
    target_quantity: u64,
    config: &PropagateConfig,
) -> SlotMap<NodeId, CraftNode> {
    let Some(target) = find_target(nodes, edges, target_item) else {
        tracing::debug!(item = %target_item, "no node for propagation target");
        return nodes.clone();
    };

    // Material nodes feeding each consumer, in edge order.
    let mut materials: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
    for edge in edges.values() {
        if nodes.contains_key(edge.from) && nodes.contains_key(edge.to) {
            materials.entry(edge.to).or_default().push(edge.from);
        }
    }

    let (reachable, demands) = collect_demands(nodes, &materials, target);
    let order = evaluation_order(&reachable, &demands, target);
    let plan = Plan::new(order, demands, target, target_quantity);

    let mut current = plan.run_pass(&HashMap::new());
    if plan.has_feedback() {
        let mut converged = false;
        for pass in 2..=config.max_passes.max(1) {
            let next = plan.run_pass(&current);
            if next == current {
                tracing::debug!(pass, "quantities converged over a feedback loop");
                converged = true;
                break;
            }
            current = next;
        }
        if !converged {
            tracing::warn!(
                max_passes = config.max_passes,
                item = %target_item,
                "quantity propagation hit the pass cap on a feedback loop"
            );
        }
    }

    let mut out = nodes.clone();
    for (id, node) in out.iter_mut() {
        let quantity = if node.resource {
            None
        } else {
            current.get(&id).copied()
        };
        node.executions = quantity.and_then(|q| {
            let per = node.recipe.as_ref()?.output_quantity_for(node.item)?;
            Some(executions_for(q, per))
        });
        node.quantity = quantity;
    }
    out
}

/// Pick the node carrying `item`, preferring one nothing consumes.
fn find_target(
    nodes: &SlotMap<NodeId, CraftNode>,
    edges: &SlotMap<EdgeId, CraftEdge>,
    item: ItemId,
) -> Option<NodeId> {
    let consumed: HashSet<NodeId> = edges.values().map(|e| e.from).collect();
    let mut candidates = nodes
        .iter()
        .filter(|(_, node)| node.item == item)
        .map(|(id, _)| id)
        .peekable();
    let first = *candidates.peek()?;
    Some(
        candidates
            .find(|id| !consumed.contains(id))
            .unwrap_or(first),
    )
}

/// What one crafting node charges its material nodes per execution.
#[derive(Debug)]
struct Demand {
    per_execution: u32,
    inputs: Vec<(NodeId, u32)>,
}

/// Breadth-first walk from the target. Returns every reachable node, target
/// first, and the demand links of the nodes that actually craft.
fn collect_demands(
    nodes: &SlotMap<NodeId, CraftNode>,
    materials: &HashMap<NodeId, Vec<NodeId>>,
    target: NodeId,
) -> (Vec<NodeId>, HashMap<NodeId, Demand>) {
    let mut reachable = vec![target];
    let mut demands = HashMap::new();
    let mut visited = HashSet::from([target]);
    let mut queue = VecDeque::from([target]);

    while let Some(id) = queue.pop_front() {
        let Some(node) = nodes.get(id) else { continue };
        if node.resource {
            continue;
        }
        let Some(recipe) = node.recipe.as_ref() else {
            continue;
        };
        let Some(per_execution) = recipe.output_quantity_for(node.item) else {
            tracing::debug!(item = %node.item, recipe = %recipe.id, "recipe does not produce node item");
            continue;
        };

        let feeders = materials.get(&id).map(Vec::as_slice).unwrap_or(&[]);
        let mut inputs = Vec::new();
        for (input, per) in recipe.material_inputs() {
            let Some(&material) = feeders
                .iter()
                .find(|&&m| nodes.get(m).is_some_and(|n| n.item == input))
            else {
                continue;
            };
            inputs.push((material, per));
            if visited.insert(material) {
                reachable.push(material);
                queue.push_back(material);
            }
        }
        demands.insert(
            id,
            Demand {
                per_execution,
                inputs,
            },
        );
    }

    (reachable, demands)
}

/// Consumers before materials. Nodes the sort cannot place are on or below a
/// feedback loop and follow in key order, target first.
fn evaluation_order(
    reachable: &[NodeId],
    demands: &HashMap<NodeId, Demand>,
    target: NodeId,
) -> Vec<NodeId> {
    let mut pending: HashMap<NodeId, usize> = reachable.iter().map(|&id| (id, 0)).collect();
    for demand in demands.values() {
        for &(material, _) in &demand.inputs {
            *pending.entry(material).or_insert(0) += 1;
        }
    }

    let mut queue: VecDeque<NodeId> = reachable
        .iter()
        .copied()
        .filter(|id| pending.get(id) == Some(&0))
        .collect();
    let mut order = Vec::with_capacity(reachable.len());

    while let Some(id) = queue.pop_front() {
        order.push(id);
        let Some(demand) = demands.get(&id) else {
            continue;
        };
        for &(material, _) in &demand.inputs {
            if let Some(count) = pending.get_mut(&material) {
                *count -= 1;
                if *count == 0 {
                    queue.push_back(material);
                }
            }
        }
    }

    if order.len() < reachable.len() {
        let placed: HashSet<NodeId> = order.iter().copied().collect();
        let mut rest: Vec<NodeId> = reachable
            .iter()
            .copied()
            .filter(|id| !placed.contains(id))
            .collect();
        rest.sort_by_key(|&id| (id != target, id));
        tracing::debug!(nodes = rest.len(), "feedback loop in crafting tree");
        order.extend(rest);
    }
    order
}

/// A fixed evaluation order plus the demand links to charge along it.
struct Plan {
    order: Vec<NodeId>,
    position: HashMap<NodeId, usize>,
    demands: HashMap<NodeId, Demand>,
    target: NodeId,
    target_quantity: u64,
}

impl Plan {
    fn new(
        order: Vec<NodeId>,
        demands: HashMap<NodeId, Demand>,
        target: NodeId,
        target_quantity: u64,
    ) -> Self {
        let position = order.iter().enumerate().map(|(i, &id)| (id, i)).collect();
        Self {
            order,
            position,
            demands,
            target,
            target_quantity,
        }
    }

    /// True if `material` is evaluated after `consumer` in this pass.
    fn is_forward(&self, consumer: NodeId, material: NodeId) -> bool {
        match (self.position.get(&consumer), self.position.get(&material)) {
            (Some(c), Some(m)) => m > c,
            _ => false,
        }
    }

    fn has_feedback(&self) -> bool {
        self.demands.iter().any(|(&consumer, demand)| {
            demand
                .inputs
                .iter()
                .any(|&(material, _)| !self.is_forward(consumer, material))
        })
    }

    /// One pass in evaluation order. Forward links use quantities from this
    /// pass, backward links use `previous`.
    fn run_pass(&self, previous: &HashMap<NodeId, u64>) -> HashMap<NodeId, u64> {
        let mut next: HashMap<NodeId, u64> = HashMap::with_capacity(self.order.len());

        for (&consumer, demand) in &self.demands {
            let quantity = previous.get(&consumer).copied().unwrap_or(0);
            let executions = executions_for(quantity, demand.per_execution);
            for &(material, per) in &demand.inputs {
                if !self.is_forward(consumer, material) {
                    charge(&mut next, material, executions.saturating_mul(u64::from(per)));
                }
            }
        }

        for &id in &self.order {
            let seed = if id == self.target {
                self.target_quantity
            } else {
                0
            };
            charge(&mut next, id, seed);
            let Some(demand) = self.demands.get(&id) else {
                continue;
            };
            let quantity = next.get(&id).copied().unwrap_or(0);
            let executions = executions_for(quantity, demand.per_execution);
            for &(material, per) in &demand.inputs {
                if self.is_forward(id, material) {
                    charge(&mut next, material, executions.saturating_mul(u64::from(per)));
                }
            }
        }

        next
    }
}

fn charge(quantities: &mut HashMap<NodeId, u64>, node: NodeId, amount: u64) {
    let slot = quantities.entry(node).or_insert(0);
    *slot = slot.saturating_add(amount);
}
