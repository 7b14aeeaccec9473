use serde::{Deserialize, Serialize};

use super::catchup::Catchup;
use super::errors::UtreexoError;
use super::forest::Forest;
use super::hash::{Hash, NodeHasher};

/// Side of the neighbor node relative to the node being authenticated.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Side {
    /// The neighbor is the left child of the shared parent.
    Left,
    /// The neighbor is the right child of the shared parent.
    Right,
}

/// A single level of a merkle path: the hash of the neighbor node
/// and the side on which it is combined.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ProofStep {
    /// Hash of the neighbor node at this level.
    pub neighbor: Hash,
    /// Side of the neighbor relative to the node being authenticated.
    pub side: Side,
}

/// Merkle proof of inclusion of an item in the forest:
/// the list of neighbors on the path from the item's leaf to the root
/// of one of the forest's trees, ordered from the lowest level up.
/// An empty list means the leaf is itself a level-0 root.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Proof {
    /// Hash of the item whose inclusion this proof authenticates.
    pub leaf: Hash,
    /// Neighbors on the path from the leaf to the root.
    pub steps: Vec<ProofStep>,
}

impl Side {
    /// Orders the (neighbor, node) pair of hashes as (left, right)
    /// according to the neighbor's side.
    pub fn order<T>(self, neighbor: T, node: T) -> (T, T) {
        match self {
            Side::Left => (neighbor, node),
            Side::Right => (node, neighbor),
        }
    }
}

impl Proof {
    /// Patches the proof against the new state of the forest produced by
    /// [`Forest::update`], using the catchup record returned from the same
    /// call. Fails with `ItemDeleted` if the item was deleted by that
    /// update, or with `InvalidProof` if the proof does not lead to any of
    /// the new roots. The proof is left unchanged on failure, but is no
    /// longer usable against the updated forest and must be discarded.
    pub fn update<H: NodeHasher>(
        &mut self,
        forest: &Forest<H>,
        catchup: &Catchup,
    ) -> Result<(), UtreexoError> {
        if catchup.is_deleted(&self.leaf) {
            return Err(UtreexoError::ItemDeleted);
        }

        // Patch a scratch copy of the steps, committed only on success.
        let mut steps = self.steps.clone();
        let mut hash = self.leaf;
        let mut level = 0;
        loop {
            if forest.root_at(level) == Some(&hash) {
                // The node became a root of the new forest:
                // the levels above it were merged away.
                steps.truncate(level);
                self.steps = steps;
                return Ok(());
            }
            match catchup.step_for(&hash) {
                Some(step) => {
                    // The node was re-paired during the update,
                    // so this level gets the new neighbor.
                    if level == steps.len() {
                        steps.push(step.clone());
                    } else {
                        steps[level] = step.clone();
                    }
                }
                None => {
                    if level == steps.len() {
                        // Out of steps without meeting a root.
                        return Err(UtreexoError::InvalidProof);
                    }
                }
            }
            hash = forest.parent(&hash, &steps[level]);
            level += 1;
        }
    }
}
