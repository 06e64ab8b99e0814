//! Raw segment records and the sentinel codes that interpret them.

use rr_core::{LinkId, WaterbodyId};

/// Sentinel values used by the source topology table.
///
/// The terminal code marks "no downstream segment"; the waterbody null
/// code marks "not a waterbody member". Both vary between domains
/// (legacy flat tables use -999/0, hydrofabric tables use other
/// conventions), so neither is ever hardcoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TopologyCodes {
    pub terminal_code: i64,
    pub waterbody_null_code: i64,
}

impl Default for TopologyCodes {
    fn default() -> Self {
        Self {
            terminal_code: -999,
            waterbody_null_code: 0,
        }
    }
}

/// One row of the segment connectivity table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentRecord {
    pub id: LinkId,
    pub downstream_id: LinkId,
    pub length_m: f64,
    /// Raw waterbody column value; equal to the null code for
    /// non-member segments. Interpreted through [`TopologyCodes`].
    pub waterbody_raw: i64,
}

impl SegmentRecord {
    pub fn new(id: i64, downstream_id: i64, length_m: f64, waterbody_raw: i64) -> Self {
        Self {
            id: LinkId(id),
            downstream_id: LinkId(downstream_id),
            length_m,
            waterbody_raw,
        }
    }

    /// Waterbody membership of this segment, if any.
    pub fn waterbody(&self, codes: TopologyCodes) -> Option<WaterbodyId> {
        if self.waterbody_raw == codes.waterbody_null_code {
            None
        } else {
            Some(WaterbodyId(self.waterbody_raw))
        }
    }

    /// True when the downstream column holds the terminal sentinel.
    pub fn is_terminal(&self, codes: TopologyCodes) -> bool {
        self.downstream_id.raw() == codes.terminal_code
    }
}
