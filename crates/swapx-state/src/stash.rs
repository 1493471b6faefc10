//! Stash book: per-(token, asset-tag) advertised liquidity, ordered.
//!
//! Each (token, asset-tag) pair owns an intrusive singly-linked list of
//! owners in non-increasing order of stash value, so callers can page through
//! the largest sellers first without sorting. The list is intrusive via keys:
//! every member's node carries the next owner and its own value, and the
//! sentinel `Principal::ZERO` node carries the head pointer. A principal with
//! zero value is not a member.
//!
//! Operations walk the list from the sentinel and are O(k) in the list
//! length; the set of active sellers per asset pair is expected to be small.

use serde::{Deserialize, Serialize};

use swapx_core::error::SwapError;
use swapx_core::types::{Amount, AssetTag, Principal, TokenId};

use crate::db::StateDb;

/// One list node: the owner's stash value and the next owner in descending
/// order (`Principal::ZERO` terminates the list).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StashNode {
    pub next: Principal,
    pub value: Amount,
}

impl Default for StashNode {
    fn default() -> Self {
        Self { next: Principal::ZERO, value: Amount::zero() }
    }
}

/// Ordered per-(token, asset-tag, owner) balances over the state database.
pub struct StashBook<'a> {
    db: &'a StateDb,
}

impl<'a> StashBook<'a> {
    pub fn new(db: &'a StateDb) -> Self {
        Self { db }
    }

    fn node(&self, token: TokenId, asset: &AssetTag, p: &Principal) -> Result<StashNode, SwapError> {
        Ok(self.db.get_stash_node(token, asset, p)?.unwrap_or_default())
    }

    fn write_node(
        &self,
        token: TokenId,
        asset: &AssetTag,
        p: &Principal,
        node: StashNode,
    ) -> Result<(), SwapError> {
        if node.next.is_zero() && node.value.is_zero() {
            self.db.remove_stash_node(token, asset, p)
        } else {
            self.db.put_stash_node(token, asset, p, &node)
        }
    }

    fn set_next(
        &self,
        token: TokenId,
        asset: &AssetTag,
        p: &Principal,
        next: Principal,
    ) -> Result<(), SwapError> {
        let mut node = self.node(token, asset, p)?;
        node.next = next;
        self.write_node(token, asset, p, node)
    }

    fn set_value(
        &self,
        token: TokenId,
        asset: &AssetTag,
        p: &Principal,
        value: Amount,
    ) -> Result<(), SwapError> {
        let mut node = self.node(token, asset, p)?;
        node.value = value;
        self.write_node(token, asset, p, node)
    }

    /// Current stash value of `owner`, zero if not a member.
    pub fn value_of(
        &self,
        token: TokenId,
        asset: &AssetTag,
        owner: &Principal,
    ) -> Result<Amount, SwapError> {
        Ok(self.node(token, asset, owner)?.value)
    }

    /// Grow `owner`'s stash by `delta`, relocating it so the list stays in
    /// non-increasing order. An update that leaves the position unchanged
    /// relative to its neighbours is a value rewrite, not a move, which keeps
    /// FIFO order within ties. Returns the new total.
    pub fn add(
        &self,
        token: TokenId,
        asset: &AssetTag,
        owner: &Principal,
        delta: Amount,
    ) -> Result<Amount, SwapError> {
        if delta.is_zero() {
            return Err(SwapError::ZeroValue);
        }
        let current = self.node(token, asset, owner)?.value;
        let new_total = current + delta;

        // Insertion predecessor: the first node whose successor's value drops
        // below the new total.
        let mut prev = Principal::ZERO;
        loop {
            let next = self.node(token, asset, &prev)?.next;
            if next.is_zero() || self.node(token, asset, &next)?.value < new_total {
                break;
            }
            prev = next;
        }

        let mut replace = false;
        if !current.is_zero() {
            // Already a member: locate the old predecessor.
            let mut old_prev = Principal::ZERO;
            loop {
                let next = self.node(token, asset, &old_prev)?.next;
                if next == *owner {
                    break;
                }
                old_prev = next;
            }
            if prev == old_prev {
                replace = true;
            } else {
                // Unlink from the old position.
                let owner_next = self.node(token, asset, owner)?.next;
                self.set_next(token, asset, &old_prev, owner_next)?;
            }
        }

        if !replace {
            // Splice in after `prev`.
            let prev_next = self.node(token, asset, &prev)?.next;
            self.set_next(token, asset, owner, prev_next)?;
            self.set_next(token, asset, &prev, *owner)?;
        }
        self.set_value(token, asset, owner, new_total)?;
        Ok(new_total)
    }

    /// Shrink `owner`'s stash by `delta`. Draining to zero removes the node
    /// entirely; otherwise the owner is relocated forward as needed (the
    /// value only decreases, so the new position is at or after the current
    /// one). Returns the new total.
    pub fn remove(
        &self,
        token: TokenId,
        asset: &AssetTag,
        owner: &Principal,
        delta: Amount,
    ) -> Result<Amount, SwapError> {
        if delta.is_zero() {
            return Err(SwapError::ZeroValue);
        }
        let current = self.node(token, asset, owner)?.value;
        if delta > current {
            return Err(SwapError::StashNotBigEnough {
                owner: *owner,
                asset: *asset,
                requested: delta,
                available: current,
            });
        }
        let new_total = current - delta;

        // Locate the old predecessor.
        let mut old_prev = Principal::ZERO;
        loop {
            let next = self.node(token, asset, &old_prev)?.next;
            if next == *owner {
                break;
            }
            old_prev = next;
        }

        if new_total.is_zero() {
            // Drained: unlink and delete the node.
            let owner_next = self.node(token, asset, owner)?.next;
            self.set_next(token, asset, &old_prev, owner_next)?;
            self.db.remove_stash_node(token, asset, owner)?;
            return Ok(new_total);
        }

        // Scan forward from the owner for the new predecessor.
        let mut prev = *owner;
        loop {
            let next = self.node(token, asset, &prev)?.next;
            if next.is_zero() || self.node(token, asset, &next)?.value < new_total {
                break;
            }
            prev = next;
        }

        if prev != *owner {
            // Relocate after `prev`.
            let owner_next = self.node(token, asset, owner)?.next;
            self.set_next(token, asset, &old_prev, owner_next)?;
            let prev_next = self.node(token, asset, &prev)?.next;
            self.set_next(token, asset, owner, prev_next)?;
            self.set_next(token, asset, &prev, *owner)?;
        }
        self.set_value(token, asset, owner, new_total)?;
        Ok(new_total)
    }

    /// Page through the list in descending order: skip `offset` members, then
    /// collect up to `limit`.
    pub fn list(
        &self,
        token: TokenId,
        asset: &AssetTag,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<(Principal, Amount)>, SwapError> {
        let mut cursor = self.node(token, asset, &Principal::ZERO)?.next;
        let mut skipped = 0;
        while skipped < offset && !cursor.is_zero() {
            cursor = self.node(token, asset, &cursor)?.next;
            skipped += 1;
        }
        let mut out = Vec::new();
        while out.len() < limit && !cursor.is_zero() {
            let node = self.node(token, asset, &cursor)?;
            out.push((cursor, node.value));
            cursor = node.next;
        }
        Ok(out)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_db(name: &str) -> StateDb {
        let dir = std::env::temp_dir().join(format!("swapx_stash_test_{}", name));
        let _ = std::fs::remove_dir_all(&dir);
        StateDb::open(&dir).expect("open temp db")
    }

    fn p(b: u8) -> Principal {
        Principal::from_bytes([b; 20])
    }

    fn asset(b: u8) -> AssetTag {
        AssetTag::from_bytes([b; 32])
    }

    fn amt(n: u64) -> Amount {
        Amount::from(n)
    }

    const NATIVE: TokenId = TokenId::Native;

    fn entries(book: &StashBook<'_>, asset: &AssetTag) -> Vec<(Principal, u64)> {
        book.list(NATIVE, asset, 0, usize::MAX)
            .unwrap()
            .into_iter()
            .map(|(owner, value)| (owner, value.as_u64()))
            .collect()
    }

    #[test]
    fn deposits_order_descending() {
        let db = temp_db("order");
        let book = StashBook::new(&db);
        let x = asset(0xA1);

        book.add(NATIVE, &x, &p(0x0A), amt(30)).unwrap();
        book.add(NATIVE, &x, &p(0x0B), amt(20)).unwrap();
        book.add(NATIVE, &x, &p(0x0C), amt(10)).unwrap();

        assert_eq!(entries(&book, &x), vec![(p(0x0A), 30), (p(0x0B), 20), (p(0x0C), 10)]);
    }

    #[test]
    fn growth_relocates_towards_head() {
        let db = temp_db("growth");
        let book = StashBook::new(&db);
        let x = asset(0xA1);

        // S4: A(30), B(20), C(10); C grows past both, then B shrinks out.
        book.add(NATIVE, &x, &p(0x0A), amt(30)).unwrap();
        book.add(NATIVE, &x, &p(0x0B), amt(20)).unwrap();
        book.add(NATIVE, &x, &p(0x0C), amt(10)).unwrap();

        book.add(NATIVE, &x, &p(0x0C), amt(25)).unwrap();
        assert_eq!(entries(&book, &x), vec![(p(0x0C), 35), (p(0x0A), 30), (p(0x0B), 20)]);

        book.remove(NATIVE, &x, &p(0x0B), amt(15)).unwrap();
        assert_eq!(entries(&book, &x), vec![(p(0x0C), 35), (p(0x0A), 30), (p(0x0B), 5)]);

        book.remove(NATIVE, &x, &p(0x0B), amt(5)).unwrap();
        assert_eq!(entries(&book, &x), vec![(p(0x0C), 35), (p(0x0A), 30)]);
        assert!(book.value_of(NATIVE, &x, &p(0x0B)).unwrap().is_zero());
    }

    #[test]
    fn equal_values_keep_arrival_order() {
        let db = temp_db("ties");
        let book = StashBook::new(&db);
        let x = asset(0xA1);

        book.add(NATIVE, &x, &p(1), amt(50)).unwrap();
        book.add(NATIVE, &x, &p(2), amt(50)).unwrap();
        book.add(NATIVE, &x, &p(3), amt(50)).unwrap();

        // New arrivals at the same value go after existing ones.
        assert_eq!(entries(&book, &x), vec![(p(1), 50), (p(2), 50), (p(3), 50)]);

        // Growing into a tie from below also lands after the tie band.
        book.add(NATIVE, &x, &p(4), amt(20)).unwrap();
        book.add(NATIVE, &x, &p(4), amt(30)).unwrap();
        assert_eq!(
            entries(&book, &x),
            vec![(p(1), 50), (p(2), 50), (p(3), 50), (p(4), 50)]
        );
    }

    #[test]
    fn unchanged_relative_position_is_a_value_rewrite() {
        let db = temp_db("inplace");
        let book = StashBook::new(&db);
        let x = asset(0xA1);

        book.add(NATIVE, &x, &p(1), amt(100)).unwrap();
        book.add(NATIVE, &x, &p(2), amt(50)).unwrap();
        book.add(NATIVE, &x, &p(3), amt(10)).unwrap();

        // p(2) grows but stays between 100 and 10.
        book.add(NATIVE, &x, &p(2), amt(40)).unwrap();
        assert_eq!(entries(&book, &x), vec![(p(1), 100), (p(2), 90), (p(3), 10)]);

        // p(2) shrinks but stays in place.
        book.remove(NATIVE, &x, &p(2), amt(70)).unwrap();
        assert_eq!(entries(&book, &x), vec![(p(1), 100), (p(2), 20), (p(3), 10)]);
    }

    #[test]
    fn remove_more_than_held_is_rejected() {
        let db = temp_db("overdraw");
        let book = StashBook::new(&db);
        let x = asset(0xA1);

        book.add(NATIVE, &x, &p(1), amt(10)).unwrap();
        let err = book.remove(NATIVE, &x, &p(1), amt(11)).unwrap_err();
        assert!(matches!(err, SwapError::StashNotBigEnough { .. }));
        // Untouched on failure.
        assert_eq!(entries(&book, &x), vec![(p(1), 10)]);
    }

    #[test]
    fn head_removal_relinks_sentinel() {
        let db = temp_db("head");
        let book = StashBook::new(&db);
        let x = asset(0xA1);

        book.add(NATIVE, &x, &p(1), amt(30)).unwrap();
        book.add(NATIVE, &x, &p(2), amt(20)).unwrap();

        book.remove(NATIVE, &x, &p(1), amt(30)).unwrap();
        assert_eq!(entries(&book, &x), vec![(p(2), 20)]);

        book.remove(NATIVE, &x, &p(2), amt(20)).unwrap();
        assert_eq!(entries(&book, &x), vec![]);
    }

    #[test]
    fn shrink_relocates_past_equal_values() {
        let db = temp_db("shrink_tie");
        let book = StashBook::new(&db);
        let x = asset(0xA1);

        book.add(NATIVE, &x, &p(1), amt(60)).unwrap();
        book.add(NATIVE, &x, &p(2), amt(40)).unwrap();
        book.add(NATIVE, &x, &p(3), amt(40)).unwrap();

        // p(1) shrinks to 40: moves after the existing 40s.
        book.remove(NATIVE, &x, &p(1), amt(20)).unwrap();
        assert_eq!(entries(&book, &x), vec![(p(2), 40), (p(3), 40), (p(1), 40)]);
    }

    #[test]
    fn scopes_are_independent() {
        let db = temp_db("scopes");
        let book = StashBook::new(&db);
        let x = asset(0xA1);
        let y = asset(0xA2);
        let token = TokenId::Token([0xEE; 20]);

        book.add(NATIVE, &x, &p(1), amt(10)).unwrap();
        book.add(NATIVE, &y, &p(1), amt(20)).unwrap();
        book.add(token, &x, &p(1), amt(30)).unwrap();

        assert_eq!(book.value_of(NATIVE, &x, &p(1)).unwrap(), amt(10));
        assert_eq!(book.value_of(NATIVE, &y, &p(1)).unwrap(), amt(20));
        assert_eq!(book.value_of(token, &x, &p(1)).unwrap(), amt(30));
        assert_eq!(entries(&book, &y), vec![(p(1), 20)]);
    }

    #[test]
    fn paging_walks_in_list_order() {
        let db = temp_db("paging");
        let book = StashBook::new(&db);
        let x = asset(0xA1);

        for i in 1..=5u8 {
            book.add(NATIVE, &x, &p(i), amt(100 - i as u64)).unwrap();
        }

        let page = book.list(NATIVE, &x, 1, 2).unwrap();
        assert_eq!(page, vec![(p(2), amt(98)), (p(3), amt(97))]);

        // Offset past the end stops early.
        let page = book.list(NATIVE, &x, 7, 2).unwrap();
        assert!(page.is_empty());

        // Limit past the end returns the tail.
        let page = book.list(NATIVE, &x, 3, 10).unwrap();
        assert_eq!(page, vec![(p(4), amt(96)), (p(5), amt(95))]);
    }
}
