//! Round-trip tests for detailed record persistence

use bgg_common::persistence::{load_detailed_records, save_detailed_records};
use bgg_common::{DetailedRecord, PlayerCountRecommendation};
use tempfile::TempDir;

fn full_record() -> DetailedRecord {
    DetailedRecord {
        id: "224517".to_string(),
        numeric_id: Some(224517),
        name: "Brass: Birmingham".to_string(),
        year_published: Some(2018),
        rank: Some(1),
        bayes_average: Some(8.41),
        description: Some("Industrial strategy &amp; network building".to_string()),
        min_players: Some(2),
        max_players: Some(4),
        min_play_time: Some(60),
        max_play_time: Some(120),
        playing_time: Some(120),
        min_age: Some(14),
        users_rated: Some(48000),
        average: Some(8.6),
        standard_deviation: Some(1.4),
        owned: Some(70000),
        trading: Some(400),
        wanting: Some(1800),
        wishing: Some(15000),
        num_comments: Some(8000),
        num_weights: Some(2300),
        average_weight: Some(3.87),
        categories: vec!["Economic".to_string(), "Industry / Manufacturing".to_string()],
        mechanics: vec!["Hand Management".to_string()],
        designers: vec!["Gavan Brown".to_string(), "Matt Tolman".to_string()],
        artists: vec![],
        publishers: vec!["Roxley".to_string()],
        best_player_count: Some(3),
        recommended_player_count: Some(4),
        player_count_recommendations: vec![
            PlayerCountRecommendation { num_players: 2, best: 100, recommended: 400, not_recommended: 50 },
            PlayerCountRecommendation { num_players: 4, best: 600, recommended: 300, not_recommended: 10 },
            PlayerCountRecommendation { num_players: 3, best: 700, recommended: 150, not_recommended: 5 },
        ],
    }
}

#[test]
fn test_round_trip_preserves_every_field() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("detailed.json");

    let sparse = DetailedRecord::new("99999");
    let records = vec![full_record(), sparse];

    save_detailed_records(&records, &path).unwrap();
    let loaded = load_detailed_records(&path).unwrap();

    assert_eq!(loaded, records);
}

#[test]
fn test_round_trip_keeps_empty_lists_present() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("detailed.json");

    save_detailed_records(&[DetailedRecord::new("5")], &path).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let first = &raw[0];
    assert_eq!(first["artists"], serde_json::json!([]));
    assert_eq!(first["playerCountRecommendations"], serde_json::json!([]));
    assert!(first["rank"].is_null());

    let loaded = load_detailed_records(&path).unwrap();
    assert!(loaded[0].artists.is_empty());
    assert!(loaded[0].rank.is_none());
}

#[test]
fn test_saved_order_is_rank_ascending_unranked_last() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("detailed.json");

    let mut unranked = DetailedRecord::new("1");
    unranked.rank = None;
    let mut tenth = DetailedRecord::new("2");
    tenth.rank = Some(10);
    let mut second = DetailedRecord::new("3");
    second.rank = Some(2);

    save_detailed_records(&[unranked, tenth, second], &path).unwrap();
    let loaded = load_detailed_records(&path).unwrap();

    let ranks: Vec<Option<u32>> = loaded.iter().map(|r| r.rank).collect();
    assert_eq!(ranks, vec![Some(2), Some(10), None]);
}
