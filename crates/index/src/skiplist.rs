//! Span-augmented skip list
//!
//! Nodes live in an arena (`Vec<Node>` with a free list) and reference each
//! other through `u32` handles; each node carries a flat forward-pointer
//! array and a parallel span array sized once at allocation. The span of a
//! forward pointer is the number of level-0 steps it bypasses; summing spans
//! along a search path yields the 1-based rank without a level-0 scan.
//!
//! # Structure
//!
//! - `MAX_LEVEL` = 18, p = 0.5, geometric level choice.
//! - Header sentinel at slot 0 present at every level; it is never the
//!   target of a forward pointer, so its key is never compared.
//! - `by_user` side map keeps exactly one live node per `user_id`.

use podium_core::types::RankKey;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Maximum number of levels a node may occupy.
pub const MAX_LEVEL: usize = 18;

/// Null handle: no successor at this level.
const NIL: u32 = u32::MAX;

/// Handle of the header sentinel.
const HEAD: u32 = 0;

/// Outcome of an upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The user was not present; a node was inserted.
    Inserted,
    /// The user was present; its score was replaced (or unchanged).
    Updated,
}

/// One entry of an ordered read, rank included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedEntry {
    /// User identifier.
    pub user_id: Arc<str>,
    /// Current score.
    pub score: i64,
    /// 1-based dense rank.
    pub rank: u64,
}

struct Node {
    user_id: Arc<str>,
    score: i64,
    /// Successor handle per level, length = node level.
    forward: Box<[u32]>,
    /// Level-0 steps bypassed by the matching forward pointer.
    span: Box<[u64]>,
}

/// Ordered ranking index over `(score desc, user_id asc)`.
pub struct RankIndex {
    nodes: Vec<Node>,
    free: Vec<u32>,
    /// Current level watermark (number of levels in use, ≥ 1).
    level: usize,
    len: usize,
    by_user: FxHashMap<Arc<str>, u32>,
    rng: StdRng,
}

impl RankIndex {
    /// Create an empty index with an entropy-seeded level generator.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create an empty index with a deterministic level generator.
    ///
    /// Identical op sequences on identically seeded indexes produce
    /// identical internal shapes; useful for reproducing failures.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        let head = Node {
            user_id: Arc::from(""),
            score: 0,
            forward: vec![NIL; MAX_LEVEL].into_boxed_slice(),
            span: vec![0u64; MAX_LEVEL].into_boxed_slice(),
        };
        RankIndex {
            nodes: vec![head],
            free: Vec::new(),
            level: 1,
            len: 0,
            by_user: FxHashMap::default(),
            rng,
        }
    }

    /// Number of users in the index.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the index holds no users.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert or update a user's score.
    ///
    /// An existing user with an unchanged score is a no-op; a changed score
    /// repositions the node (unlink + re-insert). The index never holds two
    /// nodes for the same `user_id`.
    pub fn upsert(&mut self, user_id: &str, score: i64) -> UpsertOutcome {
        if let Some(&idx) = self.by_user.get(user_id) {
            if self.nodes[idx as usize].score == score {
                return UpsertOutcome::Updated;
            }
            // Reuse the interned Arc so node and map keep sharing one
            // allocation across the reposition.
            let uid = self
                .by_user
                .get_key_value(user_id)
                .map(|(k, _)| Arc::clone(k))
                .expect("side map entry vanished");
            self.unlink(&uid);
            self.insert(uid, score);
            UpsertOutcome::Updated
        } else {
            self.insert(Arc::from(user_id), score);
            UpsertOutcome::Inserted
        }
    }

    /// The user's current score, O(1).
    #[inline]
    pub fn score_of(&self, user_id: &str) -> Option<i64> {
        self.by_user
            .get(user_id)
            .map(|&idx| self.nodes[idx as usize].score)
    }

    /// The user's 1-based rank, O(log n) expected.
    ///
    /// Sums the spans followed on the search path to the user's node.
    pub fn rank_of(&self, user_id: &str) -> Option<u64> {
        let &idx = self.by_user.get(user_id)?;
        let node = &self.nodes[idx as usize];
        let target = RankKey::new(node.score, &node.user_id);

        let mut rank: u64 = 0;
        let mut x = HEAD;
        for i in (0..self.level).rev() {
            loop {
                let nxt = self.nodes[x as usize].forward[i];
                if nxt != NIL && self.key(nxt) <= target {
                    rank += self.nodes[x as usize].span[i];
                    x = nxt;
                } else {
                    break;
                }
            }
        }
        debug_assert_eq!(x, idx, "rank search must land on the user's node");
        Some(rank)
    }

    /// The top `k` users in ranking order, ranks starting at 1.
    ///
    /// Walks level-0 forward pointers from the header; returns a snapshot
    /// list. Fewer than `k` users yields all of them; `k = 0` yields none.
    pub fn top_k(&self, k: usize) -> Vec<RankedEntry> {
        let mut out = Vec::with_capacity(k.min(self.len));
        let mut x = self.nodes[HEAD as usize].forward[0];
        let mut rank: u64 = 1;
        while x != NIL && out.len() < k {
            let node = &self.nodes[x as usize];
            out.push(RankedEntry {
                user_id: Arc::clone(&node.user_id),
                score: node.score,
                rank,
            });
            rank += 1;
            x = node.forward[0];
        }
        out
    }

    /// Iterate all `(user_id, score)` pairs in ranking order.
    ///
    /// Level-0 walk; used for checkpointing and full scans.
    pub fn iter_ordered(&self) -> OrderedIter<'_> {
        OrderedIter {
            index: self,
            cur: self.nodes[HEAD as usize].forward[0],
        }
    }

    #[inline]
    fn key(&self, idx: u32) -> RankKey<'_> {
        let node = &self.nodes[idx as usize];
        RankKey::new(node.score, &node.user_id)
    }

    /// Geometric level in `1..=MAX_LEVEL`, p = 0.5.
    fn random_level(&mut self) -> usize {
        let mut level = 1;
        while level < MAX_LEVEL && self.rng.gen::<bool>() {
            level += 1;
        }
        level
    }

    fn alloc(&mut self, user_id: Arc<str>, score: i64, level: usize) -> u32 {
        let node = Node {
            user_id,
            score,
            forward: vec![NIL; level].into_boxed_slice(),
            span: vec![0u64; level].into_boxed_slice(),
        };
        if let Some(idx) = self.free.pop() {
            self.nodes[idx as usize] = node;
            idx
        } else {
            self.nodes.push(node);
            (self.nodes.len() - 1) as u32
        }
    }

    /// Splice a new node in at every level ≤ its own.
    ///
    /// `rank[i]` tracks the 0-based position of `update[i]` so span
    /// arithmetic stays exact at every level.
    fn insert(&mut self, user_id: Arc<str>, score: i64) {
        debug_assert!(!self.by_user.contains_key(&*user_id));

        let mut update = [HEAD; MAX_LEVEL];
        let mut rank = [0u64; MAX_LEVEL];
        {
            let target = RankKey::new(score, &user_id);
            let mut x = HEAD;
            for i in (0..self.level).rev() {
                rank[i] = if i == self.level - 1 { 0 } else { rank[i + 1] };
                loop {
                    let nxt = self.nodes[x as usize].forward[i];
                    if nxt != NIL && self.key(nxt) < target {
                        rank[i] += self.nodes[x as usize].span[i];
                        x = nxt;
                    } else {
                        break;
                    }
                }
                update[i] = x;
            }
        }

        let level = self.random_level();
        if level > self.level {
            for i in self.level..level {
                rank[i] = 0;
                update[i] = HEAD;
                self.nodes[HEAD as usize].span[i] = self.len as u64;
            }
            self.level = level;
        }

        let idx = self.alloc(Arc::clone(&user_id), score, level);
        for i in 0..level {
            let u = update[i] as usize;
            let nxt = self.nodes[u].forward[i];
            self.nodes[idx as usize].forward[i] = nxt;
            self.nodes[u].forward[i] = idx;

            let stepped = rank[0] - rank[i];
            let u_span = self.nodes[u].span[i];
            self.nodes[idx as usize].span[i] = u_span - stepped;
            self.nodes[u].span[i] = stepped + 1;
        }
        for i in level..self.level {
            self.nodes[update[i] as usize].span[i] += 1;
        }

        self.len += 1;
        self.by_user.insert(user_id, idx);
    }

    /// Remove a user's node, repairing forward pointers and spans.
    fn unlink(&mut self, user_id: &Arc<str>) {
        let idx = match self.by_user.get(&**user_id) {
            Some(&idx) => idx,
            None => return,
        };
        let target = self.key(idx);
        let target = RankKey::new(target.score, user_id);

        let mut update = [HEAD; MAX_LEVEL];
        let mut x = HEAD;
        for i in (0..self.level).rev() {
            loop {
                let nxt = self.nodes[x as usize].forward[i];
                if nxt != NIL && self.key(nxt) < target {
                    x = nxt;
                } else {
                    break;
                }
            }
            update[i] = x;
        }
        debug_assert_eq!(self.nodes[update[0] as usize].forward[0], idx);

        let victim_levels = self.nodes[idx as usize].forward.len();
        for i in 0..self.level {
            let u = update[i] as usize;
            if i < victim_levels && self.nodes[u].forward[i] == idx {
                let bypassed = self.nodes[idx as usize].span[i];
                self.nodes[u].span[i] += bypassed - 1;
                self.nodes[u].forward[i] = self.nodes[idx as usize].forward[i];
            } else {
                self.nodes[u].span[i] -= 1;
            }
        }
        while self.level > 1 && self.nodes[HEAD as usize].forward[self.level - 1] == NIL {
            self.level -= 1;
        }

        self.by_user.remove(&**user_id);
        self.len -= 1;
        // Release the node's payload; the slot waits on the free list.
        self.nodes[idx as usize] = Node {
            user_id: Arc::from(""),
            score: 0,
            forward: Vec::new().into_boxed_slice(),
            span: Vec::new().into_boxed_slice(),
        };
        self.free.push(idx);
    }
}

impl Default for RankIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RankIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RankIndex")
            .field("len", &self.len)
            .field("level", &self.level)
            .field("arena_slots", &self.nodes.len())
            .finish()
    }
}

/// Level-0 iterator over `(user_id, score)` in ranking order.
pub struct OrderedIter<'a> {
    index: &'a RankIndex,
    cur: u32,
}

impl<'a> Iterator for OrderedIter<'a> {
    type Item = (&'a str, i64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cur == NIL {
            return None;
        }
        let node = &self.index.nodes[self.cur as usize];
        self.cur = node.forward[0];
        Some((&*node.user_id, node.score))
    }
}
