//! Integration tests for rr-network against the reference NHD-style
//! test domain: 32 segments, three tailwaters, three reservoirs.

use std::collections::{BTreeMap, HashMap};

use rr_core::{LinkId, WaterbodyId};
use rr_network::{
    NetworkBuilder, NetworkError, NetworkGraph, NetworkPartition, Reach, SegmentRecord,
    TopologyCodes, UnknownWaterbodyPolicy, WaterbodyKind, WaterbodyNetwork, WaterbodyParams,
    WaterbodyTable,
};

/// Rows: (id, length, downstream id, waterbody id). Terminal code -999,
/// waterbody null code 0. Segment 2800 drains to 2700, which is outside
/// the domain, so it is a tailwater too.
fn network_clean() -> Vec<SegmentRecord> {
    let rows: &[(i64, f64, i64, i64)] = &[
        (0, 456.0, -999, 0),
        (1, 178.0, 4, 0),
        (2, 394.0, 0, 0),
        (3, 301.0, 2, 0),
        (4, 798.0, 0, 403),
        (5, 679.0, 4, 403),
        (6, 523.0, 0, 0),
        (7, 815.0, 2, 0),
        (8, 841.0, -999, 0),
        (9, 514.0, 8, 0),
        (10, 458.0, 9, 0),
        (11, 832.0, 10, 0),
        (12, 543.0, 11, 0),
        (13, 240.0, 12, 0),
        (14, 548.0, 13, 0),
        (15, 920.0, 14, 0),
        (16, 920.0, 15, 401),
        (17, 514.0, 16, 401),
        (18, 458.0, 17, 0),
        (180, 458.0, 17, 0),
        (181, 458.0, 180, 0),
        (19, 832.0, 18, 0),
        (20, 543.0, 19, 0),
        (21, 240.0, 16, 401),
        (22, 548.0, 21, 0),
        (23, 920.0, 22, 0),
        (24, 240.0, 23, 0),
        (25, 548.0, 12, 0),
        (26, 920.0, 25, 402),
        (27, 920.0, 26, 402),
        (28, 920.0, 27, 0),
        (2800, 920.0, 2700, 0),
    ];
    rows.iter()
        .map(|&(id, dx, down, wbody)| SegmentRecord::new(id, down, dx, wbody))
        .collect()
}

fn network_circulars() -> Vec<SegmentRecord> {
    let rows: &[(i64, f64, i64, i64)] = &[
        (50, 178.0, 51, 0),
        (51, 178.0, 50, 0),
        (60, 178.0, 61, 0),
        (61, 178.0, 62, 0),
        (62, 178.0, 60, 0),
        (70, 178.0, 71, 0),
        (71, 178.0, 72, 0),
        (72, 178.0, 73, 0),
        (73, 178.0, 70, 0),
        (80, 178.0, 81, 0),
        (81, 178.0, 82, 0),
        (82, 178.0, 83, 0),
        (83, 178.0, 84, 0),
        (84, 178.0, 80, 0),
    ];
    let mut records: Vec<SegmentRecord> = rows
        .iter()
        .map(|&(id, dx, down, wbody)| SegmentRecord::new(id, down, dx, wbody))
        .collect();
    records.extend(network_clean());
    records
}

fn codes() -> TopologyCodes {
    TopologyCodes {
        terminal_code: -999,
        waterbody_null_code: 0,
    }
}

fn clean_graph() -> NetworkGraph {
    let mut builder = NetworkBuilder::new(codes());
    builder.extend_segments(network_clean());
    builder.build().unwrap()
}

fn expected_connections() -> HashMap<LinkId, Vec<LinkId>> {
    let table: &[(i64, &[i64])] = &[
        (0, &[]),
        (1, &[4]),
        (2, &[0]),
        (3, &[2]),
        (4, &[0]),
        (5, &[4]),
        (6, &[0]),
        (7, &[2]),
        (8, &[]),
        (9, &[8]),
        (10, &[9]),
        (11, &[10]),
        (12, &[11]),
        (13, &[12]),
        (14, &[13]),
        (15, &[14]),
        (16, &[15]),
        (17, &[16]),
        (18, &[17]),
        (180, &[17]),
        (181, &[180]),
        (19, &[18]),
        (20, &[19]),
        (21, &[16]),
        (22, &[21]),
        (23, &[22]),
        (24, &[23]),
        (25, &[12]),
        (26, &[25]),
        (27, &[26]),
        (28, &[27]),
        (2800, &[]),
    ];
    table
        .iter()
        .map(|&(id, down)| (LinkId(id), down.iter().copied().map(LinkId).collect()))
        .collect()
}

fn expected_rconn() -> HashMap<LinkId, Vec<LinkId>> {
    let table: &[(i64, &[i64])] = &[
        (0, &[2, 4, 6]),
        (1, &[]),
        (2, &[3, 7]),
        (3, &[]),
        (4, &[1, 5]),
        (5, &[]),
        (6, &[]),
        (7, &[]),
        (8, &[9]),
        (9, &[10]),
        (10, &[11]),
        (11, &[12]),
        (12, &[13, 25]),
        (13, &[14]),
        (14, &[15]),
        (15, &[16]),
        (16, &[17, 21]),
        (17, &[18, 180]),
        (18, &[19]),
        (180, &[181]),
        (181, &[]),
        (19, &[20]),
        (20, &[]),
        (21, &[22]),
        (22, &[23]),
        (23, &[24]),
        (24, &[]),
        (25, &[26]),
        (26, &[27]),
        (27, &[28]),
        (28, &[]),
        (2800, &[]),
    ];
    table
        .iter()
        .map(|&(id, ups)| (LinkId(id), ups.iter().copied().map(LinkId).collect()))
        .collect()
}

fn reservoir_table() -> WaterbodyTable {
    let params = WaterbodyParams {
        area_sq_km: 2.1,
        weir_coeff: 0.4,
        weir_length_m: 10.0,
        orifice_coeff: 0.1,
        orifice_area_sq_m: 1.0,
        max_elevation_m: 105.0,
        initial_elevation_m: 98.0,
        kind: WaterbodyKind::LevelPool,
    };
    let mut table = WaterbodyTable::new();
    for id in [401, 402, 403] {
        table.insert(WaterbodyId(id), params);
    }
    table
}

fn resolved_waterbodies() -> WaterbodyNetwork {
    WaterbodyNetwork::resolve(
        &network_clean(),
        codes(),
        &reservoir_table(),
        UnknownWaterbodyPolicy::Error,
    )
    .unwrap()
}

#[test]
fn connections_match_reference_tables() {
    let graph = clean_graph();
    assert_eq!(graph.connections(), &expected_connections());
    assert_eq!(graph.rconn(), &expected_rconn());
}

#[test]
fn tailwaters_are_terminal_and_out_of_domain_links() {
    let graph = clean_graph();
    assert_eq!(graph.outlets(), &[LinkId(0), LinkId(8), LinkId(2800)]);
}

#[test]
fn circular_networks_are_rejected_with_chains() {
    let mut builder = NetworkBuilder::new(codes());
    builder.extend_segments(network_circulars());
    match builder.build().unwrap_err() {
        NetworkError::Cycles { chains } => {
            let raw: Vec<Vec<i64>> = chains
                .iter()
                .map(|chain| chain.iter().map(|id| id.raw()).collect())
                .collect();
            assert_eq!(
                raw,
                vec![
                    vec![50, 51, 50],
                    vec![60, 61, 62, 60],
                    vec![70, 71, 72, 73, 70],
                    vec![80, 81, 82, 83, 84, 80],
                ]
            );
        }
        other => panic!("expected cycle error, got {other:?}"),
    }
}

#[test]
fn waterbody_crosswalk_matches_reference() {
    let wbodies = resolved_waterbodies();
    let expected: BTreeMap<LinkId, WaterbodyId> = [
        (4, 403),
        (5, 403),
        (16, 401),
        (17, 401),
        (21, 401),
        (26, 402),
        (27, 402),
    ]
    .into_iter()
    .map(|(seg, wb)| (LinkId(seg), WaterbodyId(wb)))
    .collect();
    assert_eq!(wbodies.crosswalk(), &expected);
    assert_eq!(
        wbodies.members(WaterbodyId(401)),
        &[LinkId(16), LinkId(17), LinkId(21)]
    );
}

#[test]
fn partition_covers_every_link_exactly_once() {
    let graph = clean_graph();
    let partition = NetworkPartition::build(&graph, &WaterbodyNetwork::default());

    let mut seen: Vec<LinkId> = partition.flatten();
    assert_eq!(seen.len(), graph.len());
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), graph.len());

    let nets = partition.independent_networks();
    assert_eq!(
        nets.keys().copied().collect::<Vec<_>>(),
        vec![LinkId(0), LinkId(8), LinkId(2800)]
    );
    assert!(nets[&LinkId(0)].contains(&LinkId(5)));
    assert!(nets[&LinkId(8)].contains(&LinkId(24)));
    assert_eq!(nets[&LinkId(2800)].len(), 1);
}

#[test]
fn reach_order_puts_every_link_before_its_downstream() {
    let graph = clean_graph();
    let partition = NetworkPartition::build(&graph, &WaterbodyNetwork::default());

    for reaches in partition.reaches_by_tailwater().values() {
        let position: HashMap<LinkId, usize> = reaches
            .iter()
            .enumerate()
            .map(|(i, reach)| (reach.key(), i))
            .collect();
        for reach in reaches {
            let id = reach.key();
            if let Some(downstream) = graph.downstream(id) {
                assert!(
                    position[&id] < position[&downstream],
                    "{id} ordered after its downstream {downstream}"
                );
            }
        }
    }
}

#[test]
fn partition_round_trips_the_adjacency() {
    let graph = clean_graph();
    let partition = NetworkPartition::build(&graph, &WaterbodyNetwork::default());

    // Re-derive the forward adjacency from the partition output alone.
    let mut rebuilt: HashMap<LinkId, Vec<LinkId>> = HashMap::new();
    for (tailwater, reaches) in partition.reaches_by_tailwater() {
        let members = &partition.independent_networks()[tailwater];
        for reach in reaches {
            let id = reach.key();
            let downstream = graph
                .downstream(id)
                .filter(|down| members.contains(down))
                .into_iter()
                .collect();
            rebuilt.insert(id, downstream);
        }
    }
    assert_eq!(&rebuilt, graph.connections());
}

#[test]
fn broken_network_keeps_each_waterbody_atomic() {
    let graph = clean_graph();
    let wbodies = resolved_waterbodies();
    let broken = wbodies.break_network(&graph).unwrap();

    // 32 links, 7 reservoir members collapsed into 3 waterbody nodes.
    assert_eq!(broken.len(), 32 - 7 + 3);
    assert_eq!(broken.downstream(LinkId(401)), Some(LinkId(15)));
    assert_eq!(broken.downstream(LinkId(402)), Some(LinkId(25)));
    assert_eq!(broken.downstream(LinkId(403)), Some(LinkId(0)));
    assert_eq!(broken.upstreams(LinkId(403)), &[LinkId(1)]);
    assert_eq!(
        broken.upstreams(LinkId(401)),
        &[LinkId(18), LinkId(180), LinkId(22)]
    );
    assert_eq!(broken.outlets(), &[LinkId(0), LinkId(8), LinkId(2800)]);

    let partition = NetworkPartition::build(&broken, &wbodies);
    let mut waterbody_reaches: Vec<(LinkId, WaterbodyId, Vec<LinkId>)> = Vec::new();
    for (tailwater, reaches) in partition.reaches_by_tailwater() {
        for reach in reaches {
            if let Reach::Waterbody { id, members } = reach {
                waterbody_reaches.push((*tailwater, *id, members.clone()));
            }
        }
    }
    waterbody_reaches.sort_by_key(|(_, wb, _)| *wb);
    assert_eq!(
        waterbody_reaches,
        vec![
            (
                LinkId(8),
                WaterbodyId(401),
                vec![LinkId(16), LinkId(17), LinkId(21)]
            ),
            (LinkId(8), WaterbodyId(402), vec![LinkId(26), LinkId(27)]),
            (LinkId(0), WaterbodyId(403), vec![LinkId(4), LinkId(5)]),
        ]
    );
}

#[test]
fn zero_waterbody_domain_breaks_to_the_same_partition() {
    let graph = clean_graph();
    let wbodies = WaterbodyNetwork::default();
    let broken = wbodies.break_network(&graph).unwrap();
    assert_eq!(&broken, &graph);

    let plain = NetworkPartition::build(&graph, &wbodies);
    let after_break = NetworkPartition::build(&broken, &wbodies);
    assert_eq!(plain, after_break);
}
