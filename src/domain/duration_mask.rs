//! Duration validity masks.
//!
//! Bit `d` (0 ≤ d < 31) means "valid for exactly `d` nights", bit 31 means
//! "valid for 31 nights or more".

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, DomainResult};

/// Highest bit of a mask; every stay of 31 nights or more maps onto it.
pub const OPEN_ENDED_BIT: u32 = 31;

/// 32-bit set of valid stay durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DurationMask(pub u32);

impl DurationMask {
    pub const ALL: DurationMask = DurationMask(u32::MAX);
    pub const EMPTY: DurationMask = DurationMask(0);

    /// Build a mask from explicit bit positions.
    pub fn from_bits<I: IntoIterator<Item = u32>>(bits: I) -> DomainResult<Self> {
        let mut mask = 0u32;
        for bit in bits {
            check_bit(bit)?;
            mask |= 1 << bit;
        }
        Ok(Self(mask))
    }

    /// Test a raw bit position, rejecting positions outside `[0, 31]`.
    pub fn has_bit(self, bit: u32) -> DomainResult<bool> {
        check_bit(bit)?;
        Ok(self.0 & (1 << bit) != 0)
    }

    /// Test a stay duration; durations of 31 nights or more test bit 31.
    pub fn allows(self, nights: u32) -> bool {
        self.0 & (1 << duration_bit(nights)) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Runs of consecutive set bits as inclusive `(start, end)` pairs, ascending.
    pub fn runs(self) -> Vec<(u32, u32)> {
        let mut runs = Vec::new();
        let mut i = 0;
        while i <= OPEN_ENDED_BIT {
            if self.0 & (1 << i) == 0 {
                i += 1;
                continue;
            }
            let start = i;
            while i < OPEN_ENDED_BIT && self.0 & (1 << (i + 1)) != 0 {
                i += 1;
            }
            runs.push((start, i));
            i += 1;
        }
        runs
    }
}

impl fmt::Display for DurationMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&mask_to_ranges(self.0))
    }
}

impl From<u32> for DurationMask {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

fn check_bit(bit: u32) -> DomainResult<()> {
    if bit > OPEN_ENDED_BIT {
        return Err(DomainError::invalid_argument(format!(
            "mask bit {} outside [0, {}]",
            bit, OPEN_ENDED_BIT
        )));
    }
    Ok(())
}

/// Map a stay duration onto its mask bit.
pub fn duration_bit(nights: u32) -> u32 {
    nights.min(OPEN_ENDED_BIT)
}

/// Convert a signed duration coming from untyped input into nights.
pub fn nights(duration: i64) -> DomainResult<u32> {
    u32::try_from(duration)
        .map_err(|_| DomainError::invalid_argument(format!("duration {} is not a night count", duration)))
}

/// Render a mask as comma-joined ranges: `"0-3"`, `"5"`, `"≥ 28"`.
///
/// A run reaching bit 31 is open-ended. An empty mask renders as an empty string.
pub fn mask_to_ranges(mask: u32) -> String {
    DurationMask(mask)
        .runs()
        .into_iter()
        .map(|(start, end)| {
            if end == OPEN_ENDED_BIT {
                format!("≥ {}", start)
            } else if end > start {
                format!("{}-{}", start, end)
            } else {
                start.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Whether two masks describe the same set of duration runs.
pub fn ranges_describe_same_set(a_mask: u32, b_mask: u32) -> bool {
    DurationMask(a_mask).runs() == DurationMask(b_mask).runs()
}
