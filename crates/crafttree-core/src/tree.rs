use crate::catalog::{Catalog, Recipe};
use crate::id::*;
use crate::propagate::{PropagateConfig, propagate_quantities};
use serde::{Deserialize, Serialize};
use slotmap::{SecondaryMap, SlotMap};
use std::collections::{HashMap, HashSet};

// ---------------------------------------------------------------------------
// Core data structures
// ---------------------------------------------------------------------------

/// One crafting step shown in the tree: an item and the recipe chosen for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CraftNode {
    pub item: ItemId,
    /// The recipe the user picked for this item. `None` for base materials.
    pub recipe: Option<Recipe>,
    /// Resources never display a propagated quantity.
    #[serde(default)]
    pub resource: bool,
    /// Units required, filled in by propagation.
    #[serde(default)]
    pub quantity: Option<u64>,
    /// Recipe executions required, filled in by propagation.
    #[serde(default)]
    pub executions: Option<u64>,
}

impl CraftNode {
    pub fn new(item: ItemId) -> Self {
        Self {
            item,
            recipe: None,
            resource: false,
            quantity: None,
            executions: None,
        }
    }

    pub fn with_recipe(mut self, recipe: Option<Recipe>) -> Self {
        self.recipe = recipe;
        self
    }

    pub fn resource(mut self, resource: bool) -> Self {
        self.resource = resource;
        self
    }
}

/// A material dependency. Points from the consumed material's node to the
/// node that consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CraftEdge {
    /// Material node.
    pub from: NodeId,
    /// Consumer node.
    pub to: NodeId,
    /// Per-execution quantity shown on the edge. Display only.
    #[serde(default)]
    pub quantity: Option<u32>,
}

/// Adjacency lists for a single node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct NodeAdjacency {
    /// Edges bringing materials into this node.
    materials: Vec<EdgeId>,
    /// Edges carrying this node's item to its consumers.
    consumers: Vec<EdgeId>,
}

// ---------------------------------------------------------------------------
// CraftTree
// ---------------------------------------------------------------------------

/// The interactive crafting tree: nodes, material edges and per-node
/// adjacency. Edited incrementally and re-propagated after each change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CraftTree {
    nodes: SlotMap<NodeId, CraftNode>,
    edges: SlotMap<EdgeId, CraftEdge>,
    adjacency: SecondaryMap<NodeId, NodeAdjacency>,
}

impl CraftTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree for `quantity` units of `item` from primary recipes, one
    /// node per distinct item, then propagate quantities through it.
    ///
    /// An input that would lead back to an item on the current path gets no
    /// edge, so the result is acyclic even for cyclic catalogs.
    pub fn from_catalog(catalog: &Catalog, item: ItemId, quantity: u64) -> Self {
        let mut tree = Self::new();
        let mut by_item = HashMap::new();
        let mut path = HashSet::new();
        tree.grow(catalog, item, &mut by_item, &mut path);
        tree.propagate(item, quantity, &PropagateConfig::default());
        tree
    }

    fn grow(
        &mut self,
        catalog: &Catalog,
        item: ItemId,
        by_item: &mut HashMap<ItemId, NodeId>,
        path: &mut HashSet<ItemId>,
    ) -> NodeId {
        if let Some(&node) = by_item.get(&item) {
            return node;
        }

        let resource = catalog.item(item).is_some_and(|i| i.resource);
        let recipe = if catalog.is_base_material(item) {
            None
        } else {
            catalog.recipe_for_output(item).cloned()
        };
        let inputs: Vec<(ItemId, u32)> = recipe
            .as_ref()
            .map(|r| r.material_inputs().collect())
            .unwrap_or_default();

        let node = self.add_node(CraftNode::new(item).with_recipe(recipe).resource(resource));
        by_item.insert(item, node);

        path.insert(item);
        for (input, per) in inputs {
            if path.contains(&input) {
                tracing::debug!(%item, %input, "skipping edge back to an ancestor");
                continue;
            }
            let material = self.grow(catalog, input, by_item, path);
            self.connect_labeled(material, node, Some(per));
        }
        path.remove(&item);

        node
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    pub fn add_node(&mut self, node: CraftNode) -> NodeId {
        let id = self.nodes.insert(node);
        self.adjacency.insert(id, NodeAdjacency::default());
        id
    }

    /// Remove a node and every edge touching it.
    pub fn remove_node(&mut self, node: NodeId) -> Option<CraftNode> {
        let edges: Vec<EdgeId> = self
            .adjacency
            .get(node)
            .map(|adj| adj.materials.iter().chain(&adj.consumers).copied().collect())
            .unwrap_or_default();
        for edge in edges {
            self.disconnect(edge);
        }
        self.adjacency.remove(node);
        self.nodes.remove(node)
    }

    /// Connect `material` into `consumer`. `None` if either node is missing.
    pub fn connect(&mut self, material: NodeId, consumer: NodeId) -> Option<EdgeId> {
        self.connect_labeled(material, consumer, None)
    }

    /// Like [`connect`](Self::connect), with a per-execution label.
    pub fn connect_labeled(
        &mut self,
        material: NodeId,
        consumer: NodeId,
        quantity: Option<u32>,
    ) -> Option<EdgeId> {
        if !self.nodes.contains_key(material) || !self.nodes.contains_key(consumer) {
            return None;
        }
        let edge = self.edges.insert(CraftEdge {
            from: material,
            to: consumer,
            quantity,
        });
        if let Some(adj) = self.adjacency.get_mut(material) {
            adj.consumers.push(edge);
        }
        if let Some(adj) = self.adjacency.get_mut(consumer) {
            adj.materials.push(edge);
        }
        Some(edge)
    }

    pub fn disconnect(&mut self, edge: EdgeId) -> Option<CraftEdge> {
        let data = self.edges.remove(edge)?;
        if let Some(adj) = self.adjacency.get_mut(data.from) {
            adj.consumers.retain(|&e| e != edge);
        }
        if let Some(adj) = self.adjacency.get_mut(data.to) {
            adj.materials.retain(|&e| e != edge);
        }
        Some(data)
    }

    /// Swap the recipe chosen for a node. Returns false if the node is gone.
    pub fn set_recipe(&mut self, node: NodeId, recipe: Option<Recipe>) -> bool {
        match self.nodes.get_mut(node) {
            Some(data) => {
                data.recipe = recipe;
                true
            }
            None => false,
        }
    }

    pub fn set_resource(&mut self, node: NodeId, resource: bool) -> bool {
        match self.nodes.get_mut(node) {
            Some(data) => {
                data.resource = resource;
                true
            }
            None => false,
        }
    }

    /// Recompute every node's quantity for `quantity` units of `target_item`.
    pub fn propagate(&mut self, target_item: ItemId, quantity: u64, config: &PropagateConfig) {
        self.nodes = propagate_quantities(&self.nodes, &self.edges, target_item, quantity, config);
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn node(&self, node: NodeId) -> Option<&CraftNode> {
        self.nodes.get(node)
    }

    pub fn edge(&self, edge: EdgeId) -> Option<&CraftEdge> {
        self.edges.get(edge)
    }

    /// First node (in insertion order) carrying `item`.
    pub fn find_by_item(&self, item: ItemId) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, node)| node.item == item)
            .map(|(id, _)| id)
    }

    /// Nodes feeding materials into `node`.
    pub fn materials_of(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency
            .get(node)
            .into_iter()
            .flat_map(|adj| adj.materials.iter())
            .filter_map(|&edge| self.edges.get(edge).map(|e| e.from))
    }

    /// Nodes consuming `node`'s item.
    pub fn consumers_of(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency
            .get(node)
            .into_iter()
            .flat_map(|adj| adj.consumers.iter())
            .filter_map(|&edge| self.edges.get(edge).map(|e| e.to))
    }

    pub fn nodes(&self) -> &SlotMap<NodeId, CraftNode> {
        &self.nodes
    }

    pub fn edges(&self) -> &SlotMap<EdgeId, CraftEdge> {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Sum of recipe executions over all nodes.
    pub fn total_executions(&self) -> u64 {
        self.nodes
            .values()
            .filter_map(|n| n.executions)
            .fold(0u64, u64::saturating_add)
    }
}
