//! Tests for cross-reference scanning of classifier labels

use rstest::rstest;

use casemix::domain::{scan, segments_text, LinkKind, Segment};

#[rstest]
#[case("")]
#[case("Age < 2 ans")]
#[case("Acte A-12 ou diagnostic D$2.5")]
#[case("05C021 puis noeud 12, fin")]
#[case("A-1A-2D$1.1")]
fn given_any_text_when_scanned_then_segments_reproduce_it(#[case] text: &str) {
    let segments = scan(text);
    assert_eq!(segments_text(&segments), text);
}

#[test]
fn given_mixed_references_when_scanned_then_kinds_follow_text_order() {
    // Arrange
    let text = "Acte A-7 avec DP D$3.1, orienté vers 05C021 sinon noeud 42";

    // Act
    let segments = scan(text);

    // Assert
    let tokens: Vec<_> = segments
        .iter()
        .filter_map(Segment::token)
        .map(|t| (t.kind, t.id))
        .collect();
    assert_eq!(
        tokens,
        vec![
            (LinkKind::Procedure, "A-7".to_string()),
            (LinkKind::Diagnosis, "D$3.1".to_string()),
            (LinkKind::GhmRoot, "05C02".to_string()),
            (LinkKind::Node, "42".to_string()),
        ]
    );
    assert_eq!(segments.first(), Some(&Segment::text("Acte ")));
}

#[test]
fn given_adjacent_references_when_scanned_then_no_empty_text_segments() {
    let segments = scan("A-1A-2");

    assert_eq!(segments.len(), 2);
    assert!(segments.iter().all(|s| s.token().is_some()));
}

#[test]
fn given_link_segments_when_serialized_then_plain_text_stays_string() {
    let json = serde_json::to_value(scan("voir noeud 3")).unwrap();

    assert_eq!(json[0], "voir ");
    assert_eq!(json[1]["kind"], "node");
    assert_eq!(json[1]["id"], "3");
    assert_eq!(json[1]["text"], "noeud 3");
}
