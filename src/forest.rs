use std::collections::HashMap;
use subtle::ConstantTimeEq;

use super::catchup::Catchup;
use super::errors::UtreexoError;
use super::hash::{Hash, NodeHasher};
use super::proof::{Proof, ProofStep};

/// Forest consists of a number of roots of perfect merkle binary trees,
/// at most one per level: a forest of `n` items keeps a tree of `1 << h`
/// items exactly for each bit `h` set in `n`. The forest owns the injected
/// node hasher and is mutated only through [`Forest::update`].
#[derive(Clone)]
pub struct Forest<H: NodeHasher> {
    roots: Vec<Option<Hash>>, // roots of the trees for levels 0, 1, 2...
    hasher: H,
}

/// State of the forest in the middle of an update: deletions break trees
/// into several standalone subtrees per level, and the merge phase
/// reassembles them into at most one per level. Discarded after the cycle.
struct WorkForest {
    levels: Vec<Vec<Hash>>, // levels[h] lists roots of perfect subtrees with 1 << h items
    index: HashMap<Hash, usize>, // level at which a hash currently stands
}

impl<H: NodeHasher> Forest<H> {
    /// Creates a new empty forest with the given node hasher.
    pub fn new(hasher: H) -> Self {
        Forest {
            roots: Vec::new(),
            hasher,
        }
    }

    /// Total number of items in the forest.
    pub fn count(&self) -> u64 {
        self.roots_iter()
            .fold(0u64, |total, (level, _)| total + (1 << level))
    }

    /// Roots of the standing trees indexed by level: slot `h` is occupied
    /// exactly when the forest holds a tree of `1 << h` items.
    /// The highest slot is always occupied.
    pub fn roots(&self) -> &[Option<Hash>] {
        &self.roots
    }

    /// Folds the roots of all the trees into a single commitment to the
    /// entire forest: `hash(R3, hash(R2, hash(R1, R0)))` for standing
    /// roots R0..R3. Returns `None` for an empty forest.
    pub fn root(&self) -> Option<Hash> {
        self.roots_iter().fold(None, |lower, (_level, root)| {
            match lower {
                // previous hash is of a lower level, so it goes to the right
                Some(l) => Some(self.hasher.intermediate(root, &l)),
                None => Some(*root),
            }
        })
    }

    /// Verifies the proof of inclusion against the current state
    /// of the forest.
    pub fn verify(&self, proof: &Proof) -> Result<(), UtreexoError> {
        let computed = proof
            .steps
            .iter()
            .fold(proof.leaf, |hash, step| self.parent(&hash, step));
        match self.root_at(proof.steps.len()) {
            Some(root) if computed.ct_eq(root).unwrap_u8() == 1 => Ok(()),
            _ => Err(UtreexoError::InvalidProof),
        }
    }

    /// Computes the hash of the parent node from a child hash and the
    /// proof step carrying the child's neighbor.
    pub fn parent(&self, child: &Hash, step: &ProofStep) -> Hash {
        let (l, r) = step.side.order(&step.neighbor, child);
        self.hasher.intermediate(l, r)
    }

    /// Applies a batch of deletions (each authorized by a proof of
    /// inclusion against the current forest) followed by a batch of
    /// insertions, re-merges the trees and commits the new roots.
    /// Returns the [`Catchup`] record with which outstanding proofs
    /// patch themselves via [`Proof::update`](crate::Proof::update).
    ///
    /// If any deletion proof is invalid, the forest is left unchanged.
    /// Insertions must be distinct from each other and from the items
    /// already in the forest; duplicates leave the accumulator in an
    /// unspecified state.
    pub fn update(
        &mut self,
        deletions: &[Proof],
        insertions: &[Hash],
    ) -> Result<Catchup, UtreexoError> {
        let mut work = WorkForest::new(&self.roots);
        let mut catchup = Catchup::new();

        // All deletions are validated before any insertion lands in the
        // work forest; the first invalid proof aborts the cycle while all
        // mutations so far have touched only the scratch state.
        for proof in deletions {
            self.delete(proof, &mut work)?;
            catchup.record_deletion(&proof.leaf);
        }

        for hash in insertions {
            work.push(0, *hash);
        }

        work.merge(&self.hasher, &mut catchup);

        // Single atomic overwrite of the committed roots.
        self.roots = work.into_roots();
        Ok(catchup)
    }

    pub(crate) fn root_at(&self, level: usize) -> Option<&Hash> {
        self.roots.get(level).and_then(|root| root.as_ref())
    }

    /// Validates one deletion proof against the pre-update forest and
    /// takes the deleted item's tree apart in the work forest.
    fn delete(&self, proof: &Proof, work: &mut WorkForest) -> Result<(), UtreexoError> {
        // The proof must lead to a tree that actually stands in the forest.
        if self.root_at(proof.steps.len()).is_none() {
            return Err(UtreexoError::InvalidProof);
        }

        let mut hash = proof.leaf;
        for (level, step) in proof.steps.iter().enumerate() {
            if work.contains_at(&hash, level) {
                // Lowest ancestor still standing whole in the work forest:
                // the running hash authenticates the item against it.
                return work.remove(&hash, level);
            }
            // The neighbor outlives the deleted item and stands on its own
            // until it re-merges or is deleted itself.
            work.push(level, step.neighbor);
            hash = self.parent(&hash, step);
        }

        // Reached the top without meeting an ancestor: the running hash
        // must be a root that still stands. If an earlier deletion took
        // that tree apart, the walk had to meet one of the promoted
        // subtrees instead, so this proof does not authenticate anything.
        if work.contains_at(&hash, proof.steps.len()) {
            return work.remove(&hash, proof.steps.len());
        }
        Err(UtreexoError::InvalidProof)
    }

    /// Returns an iterator over the standing roots,
    /// from the lowest level to the highest.
    fn roots_iter<'a>(&'a self) -> impl DoubleEndedIterator<Item = (usize, &'a Hash)> + 'a {
        self.roots
            .iter()
            .enumerate()
            .filter_map(|(level, root)| root.as_ref().map(|r| (level, r)))
    }
}

impl WorkForest {
    fn new(roots: &[Option<Hash>]) -> Self {
        let mut work = WorkForest {
            levels: vec![Vec::new(); roots.len()],
            index: HashMap::new(),
        };
        for (level, root) in roots.iter().enumerate() {
            if let Some(root) = root {
                work.levels[level].push(*root);
                work.index.insert(*root, level);
            }
        }
        work
    }

    fn contains_at(&self, hash: &Hash, level: usize) -> bool {
        self.index.get(hash) == Some(&level)
    }

    fn push(&mut self, level: usize, hash: Hash) {
        while self.levels.len() <= level {
            self.levels.push(Vec::new());
        }
        self.levels[level].push(hash);
        self.index.insert(hash, level);
    }

    fn remove(&mut self, hash: &Hash, level: usize) -> Result<(), UtreexoError> {
        let bucket = &mut self.levels[level];
        let position = bucket
            .iter()
            .position(|h| h == hash)
            .ok_or(UtreexoError::InvalidProof)?;
        bucket.swap_remove(position);
        self.index.remove(hash);
        Ok(())
    }

    /// Merges same-level subtrees pairwise until every level holds at most
    /// one root, recording every merge in the catchup.
    fn merge<H: NodeHasher>(&mut self, hasher: &H, catchup: &mut Catchup) {
        let mut level = 0;
        while level < self.levels.len() {
            while let Some((left, right)) = self.pop_pair(level) {
                let parent = hasher.intermediate(&left, &right);
                self.push(level + 1, parent);
                catchup.record_pair(&left, &right);
            }
            level += 1;
        }
    }

    /// Pops the tail pair of a level in (second-to-last, last) order.
    /// The extraction order decides which subtree ends up as the left
    /// child of every merge, and with it the neighbor bookkeeping that
    /// patched proofs must mirror.
    fn pop_pair(&mut self, level: usize) -> Option<(Hash, Hash)> {
        if self.levels[level].len() < 2 {
            return None;
        }
        let right = self.levels[level].pop()?;
        let left = self.levels[level].pop()?;
        self.index.remove(&right);
        self.index.remove(&left);
        Some((left, right))
    }

    /// Consumes the work forest into the final root array,
    /// with the trailing empty levels trimmed off.
    fn into_roots(mut self) -> Vec<Option<Hash>> {
        while self.levels.last().map_or(false, |level| level.is_empty()) {
            self.levels.pop();
        }
        self.levels
            .into_iter()
            .map(|mut level| level.pop())
            .collect()
    }
}
