use core::fmt;

/// Key of one routable link in the network.
///
/// Link ids come from the source topology table and are opaque: they are
/// compared and hashed, never arithmetic'd. After waterbody breaking the
/// same key space also carries waterbody ids (the two ranges are disjoint
/// in every supported domain).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct LinkId(pub i64);

impl LinkId {
    pub fn raw(self) -> i64 {
        self.0
    }
}

impl fmt::Debug for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LinkId({})", self.0)
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for LinkId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

/// Key of a waterbody (reservoir or lake).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct WaterbodyId(pub i64);

impl WaterbodyId {
    pub fn raw(self) -> i64 {
        self.0
    }

    /// The link-space key this waterbody occupies once the network has
    /// been broken at waterbody boundaries.
    pub fn as_link(self) -> LinkId {
        LinkId(self.0)
    }
}

impl fmt::Debug for WaterbodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WaterbodyId({})", self.0)
    }
}

impl fmt::Display for WaterbodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for WaterbodyId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

/// Key of a stream gage supplying observations for data assimilation.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct GageId(pub String);

impl GageId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GageId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_id_round_trip() {
        for raw in [0_i64, 8, 180, 2800, -999] {
            assert_eq!(LinkId(raw).raw(), raw);
        }
    }

    #[test]
    fn waterbody_occupies_link_space() {
        let wb = WaterbodyId(401);
        assert_eq!(wb.as_link(), LinkId(401));
    }

    #[test]
    fn ids_order_by_raw_key() {
        let mut ids = vec![LinkId(2800), LinkId(8), LinkId(0), LinkId(180)];
        ids.sort();
        assert_eq!(ids, vec![LinkId(0), LinkId(8), LinkId(180), LinkId(2800)]);
    }
}
