//! Child id generation.
//!
//! Children get `${parent_id}-${suffix}`, so every descendant carries its ancestors' ids
//! as `-`-terminated prefixes. The context extractor uses this to recognise a node's
//! own lineage.

use std::sync::atomic::{AtomicU64, Ordering};

/// Source of id suffixes for new child nodes.
pub trait IdGenerator: Send + Sync {
    fn next_suffix(&self) -> String;
}

/// Random 8-hex-digit suffixes (uuid v4).
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_suffix(&self) -> String {
        let mut s = uuid::Uuid::new_v4().simple().to_string();
        s.truncate(8);
        s
    }
}

/// Counter suffixes `1`, `2`, ...; deterministic ids for tests and demos.
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn next_suffix(&self) -> String {
        (self.next.fetch_add(1, Ordering::Relaxed) + 1).to_string()
    }
}

/// Id of a child of `parent_id`.
pub fn child_id(parent_id: &str, suffix: &str) -> String {
    format!("{}-{}", parent_id, suffix)
}

/// True when `candidate` was spawned (directly or transitively) under `ancestor_id`.
pub fn is_descendant_id(candidate: &str, ancestor_id: &str) -> bool {
    candidate
        .strip_prefix(ancestor_id)
        .map_or(false, |rest| rest.starts_with('-'))
}
