//! Tidy tree placement (Reingold–Tilford with Buchheim's linear-time refinement).
//!
//! Same algorithm and conventions as d3-hierarchy's `tree()` with a fixed `nodeSize` and a
//! constant separation: a parent is centred over its children, adjacent subtrees are pushed
//! apart until their contours are `separation` apart, and depth `d` sits at `y = d * height`.
//!
//! The forest is hung under a virtual root that is never emitted, so several roots are
//! placed side by side and a single root lands at `x = 0`. Children are ordered by node
//! insertion order.

use std::collections::HashMap;

use crate::model::{Edge, Node, Position};

use super::config::LayoutConfig;
use super::error::LayoutError;

/// Result of one placement pass.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeLayout {
    /// Target position per node id, in node order.
    pub positions: Vec<(String, Position)>,
    pub roots: usize,
}

const SENTINEL: usize = 0;
const VIRTUAL_ROOT: usize = 1;

#[derive(Debug)]
struct TreeNode {
    parent: usize,
    children: Vec<usize>,
    /// Index among siblings.
    i: usize,
    depth: usize,
    /// Default ancestor used by `apportion`.
    default_ancestor: Option<usize>,
    ancestor: usize,
    prelim: f64,
    modifier: f64,
    change: f64,
    shift: f64,
    thread: Option<usize>,
    x: f64,
}

impl TreeNode {
    fn new(own: usize, parent: usize, i: usize) -> Self {
        Self {
            parent,
            children: Vec::new(),
            i,
            depth: 0,
            default_ancestor: None,
            ancestor: own,
            prelim: 0.0,
            modifier: 0.0,
            change: 0.0,
            shift: 0.0,
            thread: None,
            x: 0.0,
        }
    }
}

struct Tidy {
    arena: Vec<TreeNode>,
    separation: f64,
}

/// Places every node of the forest described by `nodes` and `edges`.
pub fn layout_forest(
    nodes: &[Node],
    edges: &[Edge],
    config: &LayoutConfig,
) -> Result<TreeLayout, LayoutError> {
    // arena index of graph node k is k + 2
    let slot: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(k, n)| (n.id.as_str(), k + 2))
        .collect();

    let mut parent_of: HashMap<usize, (usize, &str)> = HashMap::new();
    for edge in edges {
        let (Some(&s), Some(&t)) = (slot.get(edge.source.as_str()), slot.get(edge.target.as_str()))
        else {
            continue;
        };
        if let Some((_, first)) = parent_of.insert(t, (s, edge.source.as_str())) {
            return Err(LayoutError::MultipleParents {
                node_id: edge.target.clone(),
                first: first.to_string(),
                second: edge.source.clone(),
            });
        }
    }

    let mut arena: Vec<TreeNode> = Vec::with_capacity(nodes.len() + 2);
    arena.push(TreeNode::new(SENTINEL, SENTINEL, 0));
    arena.push(TreeNode::new(VIRTUAL_ROOT, SENTINEL, 0));
    arena[SENTINEL].children.push(VIRTUAL_ROOT);
    for k in 0..nodes.len() {
        let own = k + 2;
        let parent = parent_of.get(&own).map_or(VIRTUAL_ROOT, |&(p, _)| p);
        arena.push(TreeNode::new(own, parent, 0));
    }
    // node order, so siblings keep insertion order
    for own in 2..arena.len() {
        let parent = arena[own].parent;
        arena[own].i = arena[parent].children.len();
        arena[parent].children.push(own);
    }
    let roots = arena[VIRTUAL_ROOT].children.len();

    let mut tidy = Tidy {
        arena,
        separation: config.separation,
    };
    let order = tidy.pre_order(VIRTUAL_ROOT);
    // nodes on a cycle hang off each other, never off the virtual root
    if order.len() != nodes.len() + 1 {
        let reached: std::collections::HashSet<usize> = order.iter().copied().collect();
        let node_id = (2..tidy.arena.len())
            .find(|own| !reached.contains(own))
            .map(|own| nodes[own - 2].id.clone())
            .unwrap_or_default();
        return Err(LayoutError::Cycle { node_id });
    }

    for &v in &order {
        if v != VIRTUAL_ROOT {
            let p = tidy.arena[v].parent;
            tidy.arena[v].depth = tidy.arena[p].depth + 1;
        }
    }
    for v in tidy.post_order(VIRTUAL_ROOT) {
        tidy.first_walk(v);
    }
    tidy.arena[SENTINEL].modifier = -tidy.arena[VIRTUAL_ROOT].prelim;
    for &v in &order {
        tidy.second_walk(v);
    }

    let positions = nodes
        .iter()
        .enumerate()
        .map(|(k, n)| {
            let t = &tidy.arena[k + 2];
            let depth = t.depth.saturating_sub(1) as f64;
            (
                n.id.clone(),
                Position::new(t.x * config.node_width, depth * config.node_height),
            )
        })
        .collect();
    Ok(TreeLayout { positions, roots })
}

impl Tidy {
    fn pre_order(&self, root: usize) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.arena.len());
        let mut stack = vec![root];
        while let Some(v) = stack.pop() {
            out.push(v);
            stack.extend(self.arena[v].children.iter().rev().copied());
        }
        out
    }

    /// Children before parents, siblings left to right.
    fn post_order(&self, root: usize) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.arena.len());
        let mut stack = vec![(root, false)];
        while let Some((v, expanded)) = stack.pop() {
            if expanded {
                out.push(v);
                continue;
            }
            stack.push((v, true));
            for &c in self.arena[v].children.iter().rev() {
                stack.push((c, false));
            }
        }
        out
    }

    fn next_left(&self, v: usize) -> Option<usize> {
        self.arena[v].children.first().copied().or(self.arena[v].thread)
    }

    fn next_right(&self, v: usize) -> Option<usize> {
        self.arena[v].children.last().copied().or(self.arena[v].thread)
    }

    fn left_sibling(&self, v: usize) -> Option<usize> {
        let node = &self.arena[v];
        if node.i == 0 {
            None
        } else {
            Some(self.arena[node.parent].children[node.i - 1])
        }
    }

    fn first_walk(&mut self, v: usize) {
        let w = self.left_sibling(v);
        let parent = self.arena[v].parent;
        if let (Some(&first), Some(&last)) = (
            self.arena[v].children.first(),
            self.arena[v].children.last(),
        ) {
            self.execute_shifts(v);
            let midpoint = (self.arena[first].prelim + self.arena[last].prelim) / 2.0;
            match w {
                Some(w) => {
                    let prelim = self.arena[w].prelim + self.separation;
                    self.arena[v].prelim = prelim;
                    self.arena[v].modifier = prelim - midpoint;
                }
                None => self.arena[v].prelim = midpoint,
            }
        } else if let Some(w) = w {
            self.arena[v].prelim = self.arena[w].prelim + self.separation;
        }
        let default_ancestor = self.arena[parent]
            .default_ancestor
            .unwrap_or(self.arena[parent].children[0]);
        let next = self.apportion(v, w, default_ancestor);
        self.arena[parent].default_ancestor = Some(next);
    }

    fn second_walk(&mut self, v: usize) {
        let parent_mod = self.arena[self.arena[v].parent].modifier;
        let node = &mut self.arena[v];
        node.x = node.prelim + parent_mod;
        node.modifier += parent_mod;
    }

    fn execute_shifts(&mut self, v: usize) {
        let mut shift = 0.0;
        let mut change = 0.0;
        for k in (0..self.arena[v].children.len()).rev() {
            let w = self.arena[v].children[k];
            let node = &mut self.arena[w];
            node.prelim += shift;
            node.modifier += shift;
            change += node.change;
            shift += node.shift + change;
        }
    }

    fn move_subtree(&mut self, wm: usize, wp: usize, shift: f64) {
        let change = shift / (self.arena[wp].i - self.arena[wm].i) as f64;
        self.arena[wp].change -= change;
        self.arena[wp].shift += shift;
        self.arena[wm].change += change;
        self.arena[wp].prelim += shift;
        self.arena[wp].modifier += shift;
    }

    fn next_ancestor(&self, vim: usize, v: usize, ancestor: usize) -> usize {
        let a = self.arena[vim].ancestor;
        if self.arena[a].parent == self.arena[v].parent {
            a
        } else {
            ancestor
        }
    }

    /// Pushes the subtree of `v` right until it clears the subtrees of its left siblings.
    fn apportion(&mut self, v: usize, w: Option<usize>, mut ancestor: usize) -> usize {
        let Some(w) = w else {
            return ancestor;
        };
        let (mut vip, mut vop, mut vim) = (v, v, w);
        let mut vom = self.arena[self.arena[v].parent].children[0];
        let mut sip = self.arena[vip].modifier;
        let mut sop = self.arena[vop].modifier;
        let mut sim = self.arena[vim].modifier;
        let mut som = self.arena[vom].modifier;

        let mut next_im = self.next_right(vim);
        let mut next_ip = self.next_left(vip);
        while let (Some(im), Some(ip)) = (next_im, next_ip) {
            vim = im;
            vip = ip;
            vom = self.next_left(vom).unwrap_or(vom);
            vop = self.next_right(vop).unwrap_or(vop);
            self.arena[vop].ancestor = v;
            let shift = self.arena[vim].prelim + sim - self.arena[vip].prelim - sip + self.separation;
            if shift > 0.0 {
                let wm = self.next_ancestor(vim, v, ancestor);
                self.move_subtree(wm, v, shift);
                sip += shift;
                sop += shift;
            }
            sim += self.arena[vim].modifier;
            sip += self.arena[vip].modifier;
            som += self.arena[vom].modifier;
            sop += self.arena[vop].modifier;
            next_im = self.next_right(vim);
            next_ip = self.next_left(vip);
        }

        if let Some(im) = next_im {
            if self.next_right(vop).is_none() {
                self.arena[vop].thread = Some(im);
                self.arena[vop].modifier += sim - sop;
            }
        }
        if let Some(ip) = next_ip {
            if self.next_left(vom).is_none() {
                self.arena[vom].thread = Some(ip);
                self.arena[vom].modifier += sip - som;
                ancestor = v;
            }
        }
        ancestor
    }
}
