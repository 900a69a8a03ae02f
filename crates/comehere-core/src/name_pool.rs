//! Collision-free fresh-identifier allocation.
//!
//! Vends identifiers of the form `<prefix>_<n>`, checked against a set of
//! names already present in the source so synthesized names never shadow or
//! collide with anything the author wrote. Kept tree-free: callers seed the
//! pool with whatever identifiers they scanned out of the CST.

use std::collections::HashSet;

/// Allocates fresh `<prefix>_<n>` identifiers that avoid a reserved set.
#[derive(Debug, Clone, Default)]
pub struct NamePool {
    taken: HashSet<String>,
    next_by_prefix: std::collections::HashMap<String, u32>,
}

impl NamePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the pool with identifiers already present in the source, so
    /// freshly-vended names never collide with author-written ones.
    pub fn seed(&mut self, existing: impl IntoIterator<Item = impl Into<String>>) {
        self.taken.extend(existing.into_iter().map(Into::into));
    }

    pub fn is_taken(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    /// Vend a fresh identifier `<prefix>_<n>`, the lowest `n >= 0` not
    /// already taken, and reserve it for future calls.
    pub fn fresh(&mut self, prefix: &str) -> String {
        let mut n = *self.next_by_prefix.get(prefix).unwrap_or(&0);
        loop {
            let candidate = format!("{prefix}_{n}");
            n += 1;
            if !self.taken.contains(&candidate) {
                self.next_by_prefix.insert(prefix.to_string(), n);
                self.taken.insert(candidate.clone());
                return candidate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_names_are_sequential() {
        let mut pool = NamePool::new();
        assert_eq!(pool.fresh("seek"), "seek_0");
        assert_eq!(pool.fresh("seek"), "seek_1");
        assert_eq!(pool.fresh("seek"), "seek_2");
    }

    #[test]
    fn fresh_names_skip_seeded_collisions() {
        let mut pool = NamePool::new();
        pool.seed(["seek_0", "seek_1"]);
        assert_eq!(pool.fresh("seek"), "seek_2");
    }

    #[test]
    fn different_prefixes_do_not_interfere() {
        let mut pool = NamePool::new();
        assert_eq!(pool.fresh("seek"), "seek_0");
        assert_eq!(pool.fresh("mask"), "mask_0");
        assert_eq!(pool.fresh("seek"), "seek_1");
    }

    #[test]
    fn fresh_reserves_the_name_against_future_collisions() {
        let mut pool = NamePool::new();
        let first = pool.fresh("helper");
        assert!(pool.is_taken(&first));
    }

    #[test]
    fn seeding_after_allocation_does_not_unreserve() {
        let mut pool = NamePool::new();
        let n = pool.fresh("x");
        pool.seed(Vec::<String>::new());
        assert!(pool.is_taken(&n));
    }
}
