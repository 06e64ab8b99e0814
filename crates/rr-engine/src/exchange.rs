//! Host-boundary flattening.
//!
//! Some hosts can only exchange flat numeric and character arrays, not
//! structured records. Each exchange point therefore has a typed struct
//! on the inside and a flattened mirror at the boundary: a row-major
//! value array plus parallel index and length arrays, with
//! fixed-width padding for station identifiers and date strings. The
//! flat layout is a wire contract and must not change shape between
//! releases.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use rr_core::{GageId, LinkId, WaterbodyId};
use rr_state::{LastObs, SegmentState, WaterbodyState};

/// Width station identifiers are padded to at the boundary.
pub const STATION_ID_WIDTH: usize = 15;
/// Width of boundary date strings, "%Y-%m-%d_%H:%M:%S".
pub const DATE_STRING_WIDTH: usize = 19;

const DATE_FORMAT: &str = "%Y-%m-%d_%H:%M:%S";

/// A segment- or waterbody-indexed table flattened to parallel arrays.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlattenedTable {
    /// Column names, concatenated without separators.
    pub column_chars: Vec<u8>,
    pub column_lengths: Vec<u32>,
    pub n_col: usize,
    /// Row keys.
    pub index: Vec<i64>,
    pub n_index: usize,
    /// Row-major cell values, `n_index * n_col` long.
    pub values: Vec<f64>,
}

impl FlattenedTable {
    fn new(columns: &[&str], index: Vec<i64>, values: Vec<f64>) -> Self {
        let mut column_chars = Vec::new();
        let mut column_lengths = Vec::with_capacity(columns.len());
        for col in columns {
            column_chars.extend_from_slice(col.as_bytes());
            column_lengths.push(col.len() as u32);
        }
        let n_index = index.len();
        Self {
            column_chars,
            column_lengths,
            n_col: columns.len(),
            index,
            n_index,
            values,
        }
    }
}

/// A list of strings flattened to one padded character buffer plus a
/// per-entry length array. Entries longer than `width` are truncated.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlattenedStrings {
    pub chars: Vec<u8>,
    pub lengths: Vec<u32>,
    pub width: usize,
}

impl FlattenedStrings {
    pub fn pack<'a>(entries: impl IntoIterator<Item = &'a str>, width: usize) -> Self {
        let mut chars = Vec::new();
        let mut lengths = Vec::new();
        for entry in entries {
            let bytes = entry.as_bytes();
            let used = bytes.len().min(width);
            chars.extend_from_slice(&bytes[..used]);
            chars.resize(chars.len() + (width - used), b' ');
            lengths.push(used as u32);
        }
        Self {
            chars,
            lengths,
            width,
        }
    }

    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    /// The i-th entry with its padding stripped.
    pub fn get(&self, i: usize) -> Option<&str> {
        let used = *self.lengths.get(i)? as usize;
        let start = i * self.width;
        std::str::from_utf8(&self.chars[start..start + used]).ok()
    }
}

/// Flattened mirror of the per-segment flow table. Columns follow the
/// checkpoint convention: qu0, qd0, h0.
pub fn flatten_segment_states(states: &BTreeMap<LinkId, SegmentState>) -> FlattenedTable {
    let mut index = Vec::with_capacity(states.len());
    let mut values = Vec::with_capacity(states.len() * 3);
    for (&id, s) in states {
        index.push(id.raw());
        values.push(s.upstream_flow_cms);
        values.push(s.downstream_flow_cms);
        values.push(s.depth_m);
    }
    FlattenedTable::new(&["qu0", "qd0", "h0"], index, values)
}

/// Inverse of [`flatten_segment_states`]. Rows with a malformed shape
/// are impossible by construction, so this only re-keys.
pub fn unflatten_segment_states(table: &FlattenedTable) -> BTreeMap<LinkId, SegmentState> {
    let mut states = BTreeMap::new();
    for (row, &raw) in table.index.iter().enumerate() {
        let base = row * table.n_col;
        states.insert(
            LinkId(raw),
            SegmentState {
                upstream_flow_cms: table.values[base],
                downstream_flow_cms: table.values[base + 1],
                depth_m: table.values[base + 2],
            },
        );
    }
    states
}

/// Flattened mirror of the per-waterbody level table.
pub fn flatten_waterbody_states(states: &BTreeMap<WaterbodyId, WaterbodyState>) -> FlattenedTable {
    let mut index = Vec::with_capacity(states.len());
    let mut values = Vec::with_capacity(states.len() * 2);
    for (&id, w) in states {
        index.push(id.raw());
        values.push(w.elevation_m);
        values.push(w.outflow_cms);
    }
    FlattenedTable::new(&["elevation", "outflow"], index, values)
}

pub fn unflatten_waterbody_states(table: &FlattenedTable) -> BTreeMap<WaterbodyId, WaterbodyState> {
    let mut states = BTreeMap::new();
    for (row, &raw) in table.index.iter().enumerate() {
        let base = row * table.n_col;
        states.insert(
            WaterbodyId(raw),
            WaterbodyState {
                elevation_m: table.values[base],
                outflow_cms: table.values[base + 1],
            },
        );
    }
    states
}

/// Flattened mirror of the last-observation table: padded gage ids,
/// time offsets, discharges, all index-aligned.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlattenedLastObs {
    pub gages: FlattenedStrings,
    pub time_since_s: Vec<f64>,
    pub discharge_cms: Vec<f64>,
}

pub fn flatten_lastobs(lastobs: &BTreeMap<GageId, LastObs>) -> FlattenedLastObs {
    let gages = FlattenedStrings::pack(
        lastobs.keys().map(GageId::as_str),
        STATION_ID_WIDTH,
    );
    FlattenedLastObs {
        gages,
        time_since_s: lastobs.values().map(|o| o.time_since_s).collect(),
        discharge_cms: lastobs.values().map(|o| o.discharge_cms).collect(),
    }
}

pub fn unflatten_lastobs(flat: &FlattenedLastObs) -> BTreeMap<GageId, LastObs> {
    let mut lastobs = BTreeMap::new();
    for i in 0..flat.gages.len() {
        if let Some(gage) = flat.gages.get(i) {
            lastobs.insert(
                GageId::from(gage),
                LastObs {
                    time_since_s: flat.time_since_s[i],
                    discharge_cms: flat.discharge_cms[i],
                },
            );
        }
    }
    lastobs
}

/// A model timestamp padded to the boundary date width.
pub fn pack_date(time: NaiveDateTime) -> FlattenedStrings {
    let formatted = time.format(DATE_FORMAT).to_string();
    FlattenedStrings::pack([formatted.as_str()], DATE_STRING_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn segment_table_round_trips() {
        let mut states = BTreeMap::new();
        states.insert(
            LinkId(17),
            SegmentState {
                upstream_flow_cms: 1.0,
                downstream_flow_cms: 0.9,
                depth_m: 0.3,
            },
        );
        states.insert(
            LinkId(180),
            SegmentState {
                upstream_flow_cms: 2.0,
                downstream_flow_cms: 2.1,
                depth_m: 0.5,
            },
        );

        let flat = flatten_segment_states(&states);
        assert_eq!(flat.n_col, 3);
        assert_eq!(flat.n_index, 2);
        assert_eq!(flat.index, vec![17, 180]);
        assert_eq!(flat.values.len(), 6);
        assert_eq!(flat.column_chars, b"qu0qd0h0");
        assert_eq!(flat.column_lengths, vec![3, 3, 2]);
        assert_eq!(unflatten_segment_states(&flat), states);
    }

    #[test]
    fn waterbody_table_round_trips() {
        let mut states = BTreeMap::new();
        states.insert(
            WaterbodyId(401),
            WaterbodyState {
                elevation_m: 98.3,
                outflow_cms: 0.7,
            },
        );

        let flat = flatten_waterbody_states(&states);
        assert_eq!(flat.values, vec![98.3, 0.7]);
        assert_eq!(unflatten_waterbody_states(&flat), states);
    }

    #[test]
    fn station_ids_are_padded_to_fixed_width() {
        let flat = FlattenedStrings::pack(["08158000", "0214657975"], STATION_ID_WIDTH);
        assert_eq!(flat.chars.len(), 2 * STATION_ID_WIDTH);
        assert_eq!(flat.lengths, vec![8, 10]);
        assert_eq!(flat.get(0), Some("08158000"));
        assert_eq!(flat.get(1), Some("0214657975"));
        assert_eq!(&flat.chars[8..STATION_ID_WIDTH], b"       ");
    }

    #[test]
    fn lastobs_round_trips_through_the_boundary() {
        let mut lastobs = BTreeMap::new();
        lastobs.insert(
            GageId::from("08158000"),
            LastObs {
                time_since_s: 900.0,
                discharge_cms: 4.4,
            },
        );
        lastobs.insert(
            GageId::from("08159000"),
            LastObs {
                time_since_s: 1800.0,
                discharge_cms: 2.2,
            },
        );

        let flat = flatten_lastobs(&lastobs);
        assert_eq!(flat.gages.len(), 2);
        assert_eq!(unflatten_lastobs(&flat), lastobs);
    }

    #[test]
    fn dates_use_the_underscore_format() {
        let t = NaiveDate::from_ymd_opt(2021, 8, 24)
            .unwrap()
            .and_hms_opt(13, 0, 0)
            .unwrap();
        let flat = pack_date(t);
        assert_eq!(flat.get(0), Some("2021-08-24_13:00:00"));
        assert_eq!(flat.chars.len(), DATE_STRING_WIDTH);
    }
}
