// SPDX-License-Identifier: PMPL-1.0-or-later
//! Retention configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the retention sweeper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Entries older than this many days are purged by a default sweep.
    pub days_to_keep: u32,
    /// Maximum entries deleted per store round-trip.
    pub batch_size: usize,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            days_to_keep: 90,
            batch_size: 500,
        }
    }
}
