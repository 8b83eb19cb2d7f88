//! End-to-end pipeline: events → index → graph → GML.

use std::collections::HashSet;

use citenet_common::{Credibility, LabelTable, ProfileTable, SourceLabel};
use citenet_graph::{
    build_cocitation_graph, write_gml, CitationEvent, CitationIndex, CociteParams, NodeClass,
    Threshold,
};

fn labels() -> LabelTable {
    let mut table = LabelTable::new();
    table.insert(
        "A".into(),
        SourceLabel {
            credibility: Credibility::Reliable,
            bias: "center".into(),
        },
    );
    table.insert(
        "B".into(),
        SourceLabel {
            credibility: Credibility::Unreliable,
            bias: "right".into(),
        },
    );
    table
}

#[test]
fn worked_example_through_export() {
    let events = vec![
        CitationEvent::new("A", Some("https://twitter.com/x/status/1?ref_src=abc".into())),
        CitationEvent::new("A", Some("https://twitter.com/x/status/2".into())),
        CitationEvent::new("A", Some("https://twitter.com/y/status/3".into())),
        CitationEvent::new("B", Some("https://twitter.com/x/status/1".into())),
        // noise that must not reach the index
        CitationEvent::new("B", None),
        CitationEvent::new("B", Some("https://example.com/not-a-tweet".into())),
    ];

    let index = CitationIndex::from_events(&events, &HashSet::new());
    assert_eq!(index.num_sources(), 2);
    let a = index.probabilities("A").unwrap();
    assert!((a["x"] - 2.0 / 3.0).abs() < 1e-9);
    assert!((a["y"] - 1.0 / 3.0).abs() < 1e-9);
    assert!((index.probabilities("B").unwrap()["x"] - 1.0).abs() < 1e-9);

    let params = CociteParams {
        threshold: Threshold::Explicit(0.5),
        ..Default::default()
    };
    let graph = build_cocitation_graph(&index, &ProfileTable::new(), &labels(), &params);

    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.edge_count(), 1);
    let weight = graph
        .edge_weight((NodeClass::News, "A"), (NodeClass::News, "B"))
        .unwrap();
    assert!((weight - 2.0 / 3.0).abs() < 1e-9);

    let mut buf = Vec::new();
    write_gml(&graph, &mut buf).unwrap();
    let gml = String::from_utf8(buf).unwrap();
    assert!(gml.contains("label \"A\""));
    assert!(gml.contains("credibility \"reliable\""));
    assert!(gml.contains("credibility \"unreliable\""));
    assert!(gml.contains("bias \"right\""));

    // Ranking: x cited three times, y once.
    let ranking = index.author_ranking();
    assert_eq!(ranking[0], ("x".to_string(), 3));
    assert_eq!(ranking[1], ("y".to_string(), 1));
}

#[test]
fn unlisted_sources_default_to_unlabeled() {
    let events = vec![
        CitationEvent::new("A", Some("twitter.com/x/s/1".into())),
        CitationEvent::new("mystery", Some("twitter.com/x/s/1".into())),
    ];
    let index = CitationIndex::from_events(&events, &HashSet::new());
    let params = CociteParams {
        threshold: Threshold::Explicit(0.0),
        ..Default::default()
    };
    let graph = build_cocitation_graph(&index, &ProfileTable::new(), &labels(), &params);

    let mut buf = Vec::new();
    write_gml(&graph, &mut buf).unwrap();
    let gml = String::from_utf8(buf).unwrap();
    assert!(gml.contains("label \"mystery\""));
    assert!(gml.contains("credibility \"unlabeled\""));
}
