use serde::{Deserialize, Serialize};

use crate::errors::{GateError, GateResult};

pub const DEFAULT_BUCKETS: u32 = 10;

/// Sum of the token's UTF-16 code units modulo `total_buckets`, enabled when
/// below `enabled_buckets`. Zero buckets is never enabled.
pub fn is_enabled(token: &str, total_buckets: u32, enabled_buckets: u32) -> bool {
    if total_buckets == 0 {
        return false;
    }
    let sum: u64 = token.encode_utf16().map(u64::from).sum();
    sum % u64::from(total_buckets) < u64::from(enabled_buckets)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolloutGate {
    pub total_buckets: u32,
    pub enabled_buckets: u32,
}

impl Default for RolloutGate {
    fn default() -> Self {
        Self {
            total_buckets: DEFAULT_BUCKETS,
            enabled_buckets: DEFAULT_BUCKETS,
        }
    }
}

impl RolloutGate {
    pub fn new(total_buckets: u32, enabled_buckets: u32) -> GateResult<Self> {
        if total_buckets == 0 {
            return Err(GateError::InvalidBuckets {
                total: total_buckets,
                enabled: enabled_buckets,
            });
        }
        Ok(Self {
            total_buckets,
            enabled_buckets,
        })
    }

    pub fn is_enabled(&self, token: &str) -> bool {
        is_enabled(token, self.total_buckets, self.enabled_buckets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_buckets_enabled_admits_everything() {
        for token in ["abc", "", "0f2c9e1d", "ünïcødé"] {
            assert!(is_enabled(token, 10, 10), "{token}");
            assert!(!is_enabled(token, 10, 0), "{token}");
        }
    }

    #[test]
    fn bucket_is_code_unit_sum() {
        // 'a' + 'b' + 'c' = 294 -> bucket 4
        assert!(is_enabled("abc", 10, 5));
        assert!(!is_enabled("abc", 10, 4));
        assert!(!is_enabled("abc", 0, 0));
    }

    #[test]
    fn gate_rejects_zero_total() {
        assert!(RolloutGate::new(0, 1).is_err());
        let gate = RolloutGate::new(10, 5).unwrap();
        assert!(gate.is_enabled("abc"));
        assert!(RolloutGate::default().is_enabled("anything"));
    }
}
