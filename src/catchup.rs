use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::forest::Forest;
use super::hash::{Hash, NodeHasher};
use super::proof::{Proof, ProofStep, Side};

/// Record of one [`Forest::update`] cycle that helps the proofs
/// created for the previous state of the forest catch up with the
/// new state. The record stays meaningful until the next update:
/// patch all outstanding proofs before mutating the forest again.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Catchup {
    /// Leaves deleted during the cycle.
    pub(crate) deleted: HashSet<Hash>,
    /// New neighbor for every node that was re-paired during the cycle,
    /// keyed by the node's own hash. Untouched parts of the forest
    /// contribute no entries.
    pub(crate) updated: HashMap<Hash, ProofStep>,
}

impl Catchup {
    pub(crate) fn new() -> Catchup {
        Catchup::default()
    }

    /// Records a single merge of two subtree roots into a parent node.
    pub(crate) fn record_pair(&mut self, left: &Hash, right: &Hash) {
        self.updated.insert(
            *left,
            ProofStep {
                neighbor: *right,
                side: Side::Right,
            },
        );
        self.updated.insert(
            *right,
            ProofStep {
                neighbor: *left,
                side: Side::Left,
            },
        );
    }

    pub(crate) fn record_deletion(&mut self, leaf: &Hash) {
        self.deleted.insert(*leaf);
    }

    /// Returns the new neighbor of a node that was re-paired
    /// during the update.
    pub(crate) fn step_for(&self, hash: &Hash) -> Option<&ProofStep> {
        self.updated.get(hash)
    }

    pub(crate) fn is_deleted(&self, leaf: &Hash) -> bool {
        self.deleted.contains(leaf)
    }

    /// Creates a proof of inclusion for an item inserted by the update
    /// that produced this catchup, by following the recorded merges from
    /// the leaf up to a root of the updated forest. The result is
    /// meaningless for any other item.
    pub fn proof<H: NodeHasher>(&self, forest: &Forest<H>, leaf: &Hash) -> Proof {
        let mut proof = Proof {
            leaf: *leaf,
            steps: Vec::new(),
        };
        let mut current = *leaf;
        while let Some(step) = self.updated.get(&current) {
            proof.steps.push(step.clone());
            current = forest.parent(&current, step);
        }
        proof
    }
}
