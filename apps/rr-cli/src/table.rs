//! Plain-text table readers for the topology and waterbody inputs.
//!
//! Both tables are comma-separated with an optional header line.
//! Topology columns: id, downstream id, length (m), waterbody id.
//! Waterbody columns: id, area (km2), weir coeff, weir length (m),
//! orifice coeff, orifice area (m2), max elevation (m), initial
//! elevation (m), kind.

use std::path::Path;

use rr_core::{ensure_finite, WaterbodyId};
use rr_network::{SegmentRecord, WaterbodyKind, WaterbodyParams, WaterbodyTable};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("Failed to read table {path}")]
    Read {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("{path}:{line}: {message}")]
    Parse {
        path: std::path::PathBuf,
        line: usize,
        message: String,
    },
}

fn is_header(line: &str) -> bool {
    line.split(',')
        .next()
        .is_some_and(|first| first.trim().parse::<i64>().is_err())
}

fn parse_field<T: std::str::FromStr>(
    field: Option<&str>,
    what: &str,
    path: &Path,
    line: usize,
) -> Result<T, TableError> {
    field
        .map(str::trim)
        .and_then(|raw| raw.parse().ok())
        .ok_or_else(|| TableError::Parse {
            path: path.to_path_buf(),
            line,
            message: format!("bad or missing {what} column"),
        })
}

pub fn read_segment_table(path: &Path) -> Result<Vec<SegmentRecord>, TableError> {
    let content = std::fs::read_to_string(path).map_err(|source| TableError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut records = Vec::new();
    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || (number == 0 && is_header(line)) {
            continue;
        }
        let mut fields = line.split(',');
        let id: i64 = parse_field(fields.next(), "id", path, number + 1)?;
        let downstream: i64 = parse_field(fields.next(), "downstream id", path, number + 1)?;
        let length: f64 = parse_field(fields.next(), "length", path, number + 1)?;
        let waterbody: i64 = parse_field(fields.next(), "waterbody id", path, number + 1)?;
        ensure_finite(length, "segment length").map_err(|e| TableError::Parse {
            path: path.to_path_buf(),
            line: number + 1,
            message: e.to_string(),
        })?;
        records.push(SegmentRecord::new(id, downstream, length, waterbody));
    }
    Ok(records)
}

fn parse_kind(raw: &str, path: &Path, line: usize) -> Result<WaterbodyKind, TableError> {
    match raw.trim() {
        "level_pool" => Ok(WaterbodyKind::LevelPool),
        "hybrid_usgs" => Ok(WaterbodyKind::HybridUsgs),
        "hybrid_usace" => Ok(WaterbodyKind::HybridUsace),
        "rfc" => Ok(WaterbodyKind::Rfc),
        other => Err(TableError::Parse {
            path: path.to_path_buf(),
            line,
            message: format!("unknown waterbody kind '{other}'"),
        }),
    }
}

pub fn read_waterbody_table(path: &Path) -> Result<WaterbodyTable, TableError> {
    let content = std::fs::read_to_string(path).map_err(|source| TableError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut table = WaterbodyTable::new();
    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || (number == 0 && is_header(line)) {
            continue;
        }
        let n = number + 1;
        let mut fields = line.split(',');
        let id: i64 = parse_field(fields.next(), "id", path, n)?;
        let params = WaterbodyParams {
            area_sq_km: parse_field(fields.next(), "area", path, n)?,
            weir_coeff: parse_field(fields.next(), "weir coeff", path, n)?,
            weir_length_m: parse_field(fields.next(), "weir length", path, n)?,
            orifice_coeff: parse_field(fields.next(), "orifice coeff", path, n)?,
            orifice_area_sq_m: parse_field(fields.next(), "orifice area", path, n)?,
            max_elevation_m: parse_field(fields.next(), "max elevation", path, n)?,
            initial_elevation_m: parse_field(fields.next(), "initial elevation", path, n)?,
            kind: parse_kind(
                fields.next().unwrap_or("level_pool"),
                path,
                n,
            )?,
        };
        table.insert(WaterbodyId(id), params);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rr_core::LinkId;
    use std::io::Write;

    #[test]
    fn reads_a_topology_table_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routelink.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "link,to,Length,NHDWaterbodyComID").unwrap();
        writeln!(f, "1,4,178.0,0").unwrap();
        writeln!(f, "4,0,798.0,403").unwrap();
        drop(f);

        let records = read_segment_table(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, LinkId(1));
        assert_eq!(records[1].waterbody_raw, 403);
    }

    #[test]
    fn reports_the_line_of_a_bad_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routelink.csv");
        std::fs::write(&path, "1,4,178.0,0\n2,oops,52.0,0\n").unwrap();

        let err = read_segment_table(&path).unwrap_err();
        assert!(err.to_string().contains(":2:"));
        assert!(err.to_string().contains("downstream id"));
    }

    #[test]
    fn non_finite_length_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routelink.csv");
        std::fs::write(&path, "1,4,NaN,0\n").unwrap();

        let err = read_segment_table(&path).unwrap_err();
        assert!(err.to_string().contains("Non-finite"));
    }

    #[test]
    fn reads_a_waterbody_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lake.csv");
        std::fs::write(
            &path,
            "lake,area,wc,wl,oc,oa,maxe,inite,kind\n401,1.5,0.4,10.0,0.1,1.0,100.0,97.0,level_pool\n",
        )
        .unwrap();

        let table = read_waterbody_table(&path).unwrap();
        assert!(table.contains(WaterbodyId(401)));
        assert_eq!(table.get(WaterbodyId(401)).unwrap().initial_elevation_m, 97.0);
    }
}
