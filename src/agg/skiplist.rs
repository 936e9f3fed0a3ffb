//! The aggregator's state representation (spec §4.6): a probabilistic
//! skiplist of time-keyed elements, `O(log n)` splice-around-a-range.
//!
//! Grounded directly on `original_source/src/SkipListAggregation.c`:
//! `skiplist_make`'s balanced bulk-link construction, `skiplist_alloc`'s
//! free-list reclamation, and the level-up coin-flip (there: `ffs` of
//! random bits; here: `rand`'s `gen_bool`, the crate the pack's services
//! already reach for when they need an RNG). The node arena is a plain
//! `Vec<Node<T>>` — per the Open Question resolution in `DESIGN.md`, no
//! `bumpalo` arena is introduced since the skiplist already owns its slab.

use crate::timeset::Timestamp;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const MAX_LEVEL: usize = 32;

struct Node<T> {
    value: Option<T>,
    key: Option<Timestamp>,
    height: usize,
    next: [Option<usize>; MAX_LEVEL],
}

impl<T> Node<T> {
    fn head() -> Self {
        Node { value: None, key: None, height: 1, next: [None; MAX_LEVEL] }
    }
    fn tail() -> Self {
        Node { value: None, key: None, height: MAX_LEVEL, next: [None; MAX_LEVEL] }
    }
}

/// A skiplist of `T` ordered by `Timestamp` key, with free-list-backed slot
/// reuse (spec §4.6 "A free-list reclaims deallocated slots").
pub struct SkipList<T> {
    nodes: Vec<Node<T>>,
    head: usize,
    free: Vec<usize>,
    len: usize,
    rng: StdRng,
}

impl<T: Clone> SkipList<T> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Construct with an explicit RNG seed, the only way to get
    /// deterministic level selection (spec §2 ambient stack note: level
    /// selection is test-deterministic only via an injected `StdRng` seed).
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        let mut nodes = Vec::with_capacity(16);
        nodes.push(Node::head());
        nodes.push(Node::tail());
        let mut head_node = Node::head();
        head_node.next[0] = Some(1);
        nodes[0] = head_node;
        SkipList { nodes, head: 0, free: Vec::new(), len: 0, rng }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn tail_idx(&self) -> usize {
        1
    }

    fn random_height(&mut self) -> usize {
        let mut h = 1;
        while h < MAX_LEVEL && self.rng.gen_bool(0.5) {
            h += 1;
        }
        h
    }

    fn alloc(&mut self, value: T, key: Timestamp, height: usize) -> usize {
        let node = Node { value: Some(value), key: Some(key), height, next: [None; MAX_LEVEL] };
        if let Some(idx) = self.free.pop() {
            self.nodes[idx] = node;
            idx
        } else {
            self.nodes.push(node);
            self.nodes.len() - 1
        }
    }

    /// Insert one `(key, value)` pair in sorted position (spec §4.6 step 3's
    /// "splice the result back in", applied to a single element at a time).
    pub fn insert(&mut self, key: Timestamp, value: T) {
        let height = self.random_height();
        let mut update = [self.head; MAX_LEVEL];
        let mut cur = self.head;

        for level in (0..MAX_LEVEL).rev() {
            while let Some(next) = self.nodes[cur].next[level] {
                if next == self.tail_idx() {
                    break;
                }
                if self.nodes[next].key.unwrap() < key {
                    cur = next;
                } else {
                    break;
                }
            }
            update[level] = cur;
        }

        let new_idx = self.alloc(value, key, height);
        for level in 0..height {
            let anchor = update[level];
            self.nodes[new_idx].next[level] = self.nodes[anchor].next[level].or(Some(self.tail_idx()));
            self.nodes[anchor].next[level] = Some(new_idx);
        }
        self.len += 1;
    }

    /// Remove and return every element whose key lies in `[lo, hi]`, the
    /// "locate leftmost / locate rightmost / pull out" of spec §4.6 steps 1-2.
    pub fn extract_range(&mut self, lo: Timestamp, hi: Timestamp) -> Vec<(Timestamp, T)> {
        let mut removed = Vec::new();
        let mut prev_per_level = [self.head; MAX_LEVEL];
        let mut cur = self.head;

        for level in (0..MAX_LEVEL).rev() {
            while let Some(next) = self.nodes[cur].next[level] {
                if next == self.tail_idx() {
                    break;
                }
                if self.nodes[next].key.unwrap() < lo {
                    cur = next;
                } else {
                    break;
                }
            }
            prev_per_level[level] = cur;
        }

        let mut target = self.nodes[cur].next[0];
        while let Some(idx) = target {
            if idx == self.tail_idx() {
                break;
            }
            let key = self.nodes[idx].key.unwrap();
            if key > hi {
                break;
            }
            let value = self.nodes[idx].value.clone().unwrap();
            removed.push((key, value));
            let next_idx = self.nodes[idx].next[0];
            let height = self.nodes[idx].height;
            for level in 0..height {
                if self.nodes[prev_per_level[level]].next[level] == Some(idx) {
                    self.nodes[prev_per_level[level]].next[level] = self.nodes[idx].next[level];
                }
            }
            self.free.push(idx);
            self.len -= 1;
            target = next_idx;
        }

        removed
    }

    /// All elements in key order.
    pub fn to_vec(&self) -> Vec<(Timestamp, T)> {
        let mut out = Vec::with_capacity(self.len);
        let mut cur = self.nodes[self.head].next[0];
        while let Some(idx) = cur {
            if idx == self.tail_idx() {
                break;
            }
            out.push((self.nodes[idx].key.unwrap(), self.nodes[idx].value.clone().unwrap()));
            cur = self.nodes[idx].next[0];
        }
        out
    }
}

impl<T: Clone> Default for SkipList<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn t(d: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2000, 1, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn seeded_rng_gives_reproducible_level_selection() {
        let mut a = SkipList::with_seed(42);
        let mut b = SkipList::with_seed(42);
        for d in 1..=20 {
            a.insert(t(d), d);
            b.insert(t(d), d);
        }
        assert_eq!(a.to_vec(), b.to_vec());
    }

    #[test]
    fn insert_keeps_sorted_order() {
        let mut sl = SkipList::new();
        sl.insert(t(3), "c");
        sl.insert(t(1), "a");
        sl.insert(t(2), "b");
        let all = sl.to_vec();
        assert_eq!(all.iter().map(|(_, v)| *v).collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn extract_range_removes_only_covered_keys() {
        let mut sl = SkipList::new();
        for d in 1..=5 {
            sl.insert(t(d), d);
        }
        let removed = sl.extract_range(t(2), t(4));
        assert_eq!(removed.iter().map(|(_, v)| *v).collect::<Vec<_>>(), vec![2, 3, 4]);
        assert_eq!(sl.len(), 2);
        let remaining = sl.to_vec();
        assert_eq!(remaining.iter().map(|(_, v)| *v).collect::<Vec<_>>(), vec![1, 5]);
    }

    #[test]
    fn freed_slots_are_reused() {
        let mut sl = SkipList::new();
        for d in 1..=10 {
            sl.insert(t(d), d);
        }
        let before = sl.to_vec().len();
        sl.extract_range(t(3), t(7));
        sl.insert(t(3), 99);
        assert_eq!(sl.to_vec().len(), before - 4);
    }
}
