//! Rotation bookkeeping for the signing key registry.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};

/// Aggregate rotation metadata, one logical document per deployment.
///
/// Rewritten after every rotation and every process cold start; never
/// historized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRegistryMetadata {
    /// Key id currently used for signing
    pub current_key_id: String,

    /// Every key id still servable for verification
    pub active_key_ids: HashSet<String>,

    /// When the last rotation (or cold start republication) happened
    pub last_rotation_at: DateTime<Utc>,

    /// When the next scheduled rotation is due
    pub next_rotation_at: DateTime<Utc>,

    /// Number of keys currently retained
    pub total_key_count: usize,
}

impl KeyRegistryMetadata {
    /// Builds metadata, enforcing that the current key is among the active
    /// set.
    pub fn new(
        current_key_id: String,
        active_key_ids: HashSet<String>,
        last_rotation_at: DateTime<Utc>,
        next_rotation_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if !active_key_ids.contains(&current_key_id) {
            return Err(DomainError::Validation {
                message: "Current key id must be in the active key set".to_string(),
            });
        }

        let total_key_count = active_key_ids.len();

        Ok(Self {
            current_key_id,
            active_key_ids,
            last_rotation_at,
            next_rotation_at,
            total_key_count,
        })
    }
}
