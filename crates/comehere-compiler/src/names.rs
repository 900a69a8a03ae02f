//! On-demand allocation of names for synthesized helpers (C4), built on
//! top of [`comehere_core::NamePool`] so every vended name is guaranteed
//! distinct from identifiers already present in the source.

use comehere_core::NamePool;

use crate::model::SupportNames;

/// Vends the handful of well-known helper names the control driver and
/// preamble emitter need, allocating each lazily from a shared
/// [`NamePool`] the first time it's asked for.
pub struct NameRegistry {
    pool: NamePool,
    support: SupportNames,
}

impl NameRegistry {
    pub fn new(pool: NamePool) -> Self {
        Self {
            pool,
            support: SupportNames::new(),
        }
    }

    pub fn pool_mut(&mut self) -> &mut NamePool {
        &mut self.pool
    }

    pub fn seek(&mut self) -> String {
        if let Some(name) = &self.support.seek {
            return name.clone();
        }
        let name = self.pool.fresh("seek");
        self.support.seek = Some(name.clone());
        name
    }

    pub fn active_mask(&mut self) -> String {
        if let Some(name) = &self.support.active_mask {
            return name.clone();
        }
        let name = self.pool.fresh("activeMask");
        self.support.active_mask = Some(name.clone());
        name
    }

    pub fn maybe_not_empty_iterator(&mut self) -> String {
        if let Some(name) = &self.support.maybe_not_empty_iterator {
            return name.clone();
        }
        let name = self.pool.fresh("maybeNotEmptyIterator");
        self.support.maybe_not_empty_iterator = Some(name.clone());
        name
    }

    pub fn maybe_not_empty_key_iterator(&mut self) -> String {
        if let Some(name) = &self.support.maybe_not_empty_key_iterator {
            return name.clone();
        }
        let name = self.pool.fresh("maybeNotEmptyKeyIterator");
        self.support.maybe_not_empty_key_iterator = Some(name.clone());
        name
    }

    pub fn or_helper(&mut self) -> String {
        if let Some(name) = &self.support.or_helper {
            return name.clone();
        }
        let name = self.pool.fresh("or");
        self.support.or_helper = Some(name.clone());
        name
    }

    pub fn and_helper(&mut self) -> String {
        if let Some(name) = &self.support.and_helper {
            return name.clone();
        }
        let name = self.pool.fresh("and");
        self.support.and_helper = Some(name.clone());
        name
    }

    /// Fresh name for a one-off synthesized local: a returned-value
    /// capture (`R`), a switch sentinel, a constructed receiver, etc.
    pub fn fresh(&mut self, prefix: &str) -> String {
        self.pool.fresh(prefix)
    }

    pub fn active_bit_local(&mut self, bit: u32) -> String {
        // Reserve the exact spelling the driver writes at call sites so a
        // colliding user identifier can never shadow it.
        let wanted = crate::model::ActiveFrameRegistry::local_name(bit);
        if !self.pool.is_taken(&wanted) {
            self.pool.seed([wanted.clone()]);
            return wanted;
        }
        self.pool.fresh(&format!("active_{bit}"))
    }

    pub fn into_support(self) -> (NamePool, SupportNames) {
        (self.pool, self.support)
    }

    pub fn support(&self) -> &SupportNames {
        &self.support
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn support_names_are_stable_across_repeated_lookups() {
        let mut registry = NameRegistry::new(NamePool::new());
        let first = registry.seek();
        let second = registry.seek();
        assert_eq!(first, second);
    }

    #[test]
    fn distinct_helpers_get_distinct_names() {
        let mut registry = NameRegistry::new(NamePool::new());
        assert_ne!(registry.seek(), registry.active_mask());
        assert_ne!(
            registry.maybe_not_empty_iterator(),
            registry.maybe_not_empty_key_iterator()
        );
    }

    #[test]
    fn seeded_collision_forces_a_fresh_active_bit_name() {
        let mut pool = NamePool::new();
        pool.seed(["active_0".to_string()]);
        let mut registry = NameRegistry::new(pool);
        assert_ne!(registry.active_bit_local(0), "active_0");
    }
}
