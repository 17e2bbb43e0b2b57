use std::collections::BTreeMap;

use steamrec_domain::{
	Contribution, Curator, Error, Graph, GraphNode, RecommendationEvent, TagDistribution,
	TimeWindow, extract_bias,
};

const START_MS: i64 = 1_411_344_000_000;
const END_MS: i64 = 1_494_012_977_000;

fn window() -> TimeWindow {
	TimeWindow::new(START_MS, END_MS).expect("Expected a valid window.")
}

fn event(appid: &str, recommended: bool, info: bool, epoch: i64) -> RecommendationEvent {
	RecommendationEvent { appid: appid.to_string(), recommended, info, epoch }
}

#[test]
fn bias_grows_with_recency() {
	let events = [event("g1", true, false, 1_450_000_000_000)];
	let bias = extract_bias(&events, "g1", &window(), true).expect("Expected a contribution.");

	assert!((bias - 0.4676).abs() < 1e-3, "Unexpected bias: {bias}");
	assert_eq!(extract_bias(&events, "g1", &window(), true), Some(bias));
}

#[test]
fn rejection_flips_sign() {
	let events = [event("g1", false, false, 1_450_000_000_000)];
	let bias = extract_bias(&events, "g1", &window(), true).expect("Expected a contribution.");

	assert!((bias + 0.4676).abs() < 1e-3, "Unexpected bias: {bias}");
}

#[test]
fn informational_event_never_contributes() {
	for recommended in [true, false] {
		for epoch in [START_MS, 1_450_000_000_000, END_MS] {
			let events = [event("g1", recommended, true, epoch)];

			assert_eq!(extract_bias(&events, "g1", &window(), true), None);
			assert_eq!(extract_bias(&events, "g1", &window(), false), None);
		}
	}
}

#[test]
fn first_event_for_a_game_wins() {
	let events = [
		event("g1", true, true, 1_450_000_000_000),
		event("g1", true, false, 1_460_000_000_000),
	];

	assert_eq!(extract_bias(&events, "g1", &window(), true), None);

	let events = [
		event("g2", true, false, 1_450_000_000_000),
		event("g1", false, false, 1_430_000_000_000),
		event("g1", true, false, 1_480_000_000_000),
	];
	let bias = extract_bias(&events, "g1", &window(), true).expect("Expected a contribution.");

	assert!(bias < 0.0, "The first g1 event is a rejection: {bias}");
}

#[test]
fn bias_at_window_start_is_a_zero_contribution() {
	let events = [event("g1", true, false, START_MS)];

	assert_eq!(extract_bias(&events, "g1", &window(), true), Some(0.0));
	assert_eq!(extract_bias(&events, "g2", &window(), true), None);
}

#[test]
fn enforced_window_drops_outside_events() {
	let early = [event("g1", true, false, START_MS - 1)];
	let late = [event("g1", true, false, END_MS + 1)];

	assert_eq!(extract_bias(&early, "g1", &window(), true), None);
	assert_eq!(extract_bias(&late, "g1", &window(), true), None);
	assert_eq!(extract_bias(&[event("g1", true, false, END_MS)], "g1", &window(), true), Some(1.0));
}

#[test]
fn unenforced_window_clamps_early_events_only() {
	let early = [event("g1", true, false, START_MS - 86_400_000)];
	let late = [event("g1", true, false, END_MS + window().span_ms())];

	assert_eq!(extract_bias(&early, "g1", &window(), false), Some(0.0));

	let bias = extract_bias(&late, "g1", &window(), false).expect("Expected a contribution.");

	assert!((bias - 2.0).abs() < 1e-12, "Late bias is not capped: {bias}");
}

#[test]
fn window_must_be_ordered() {
	assert_eq!(
		TimeWindow::new(END_MS, START_MS),
		Err(Error::InvalidWindow { start_ms: END_MS, end_ms: START_MS })
	);
	assert!(TimeWindow::new(START_MS, START_MS).is_err());
}

#[test]
fn window_displays_as_rfc3339() {
	let rendered = window().to_string();

	assert_eq!(rendered, "2014-09-22T00:00:00Z..2017-05-05T19:36:17Z");
}

#[test]
fn curator_endorsement_ignores_info_and_rejections() {
	let curator = Curator {
		id: "A".to_string(),
		name: "Curator A".to_string(),
		events: vec![
			event("g1", true, true, START_MS),
			event("g2", false, false, START_MS),
			event("g3", true, false, START_MS),
		],
	};

	assert!(!curator.endorses("g1"));
	assert!(!curator.endorses("g2"));
	assert!(curator.endorses("g3"));
}

#[test]
fn graph_snapshot_json_round_trips() {
	let tags: BTreeMap<String, u64> =
		[("RPG".to_string(), 3), ("Indie".to_string(), 1)].into_iter().collect();
	let node = GraphNode {
		tag_ratios: TagDistribution::from_counts(&tags).expect("Expected a distribution."),
		contributions: vec![Contribution { curator_id: "A".to_string(), bias: 0.5 }],
	};
	let graph = Graph::new(window(), [("g1".to_string(), node)].into_iter().collect());
	let raw = serde_json::to_string(&graph).expect("Failed to encode graph.");
	let decoded: Graph = serde_json::from_str(&raw).expect("Failed to decode graph.");

	assert_eq!(decoded, graph);
	assert!(raw.contains("\"tag_ratios\":{\"Indie\":0.25,\"RPG\":0.75}"), "Unexpected JSON: {raw}");
}

#[test]
fn degenerate_window_is_rejected_when_decoding() {
	let decoded: TimeWindow = serde_json::from_str(r#"{"start_ms":10,"end_ms":20}"#)
		.expect("Failed to decode window.");

	assert_eq!(decoded, TimeWindow::new(10, 20).expect("Expected a valid window."));

	for raw in [r#"{"start_ms":20,"end_ms":20}"#, r#"{"start_ms":30,"end_ms":20}"#] {
		let err = serde_json::from_str::<TimeWindow>(raw).expect_err("Expected a rejected window.");

		assert!(err.to_string().contains("Invalid time window"), "Unexpected error: {err}");
	}

	let snapshot = r#"{"window":{"start_ms":5,"end_ms":5},"nodes":{}}"#;

	assert!(serde_json::from_str::<Graph>(snapshot).is_err());
}

#[test]
fn extreme_epochs_do_not_overflow_the_bias() {
	let events = [event("early", true, false, i64::MIN), event("late", true, false, i64::MAX)];

	assert_eq!(extract_bias(&events, "early", &window(), false), Some(0.0));
	assert_eq!(extract_bias(&events, "early", &window(), true), None);

	let late = extract_bias(&events, "late", &window(), false).expect("Expected a contribution.");

	assert!(late.is_finite() && late > 1.0, "Unexpected bias: {late}");

	let wide = TimeWindow::new(i64::MIN, i64::MAX).expect("Expected a valid window.");

	assert_eq!(wide.span_ms(), i64::MAX);
	assert!(wide.bias(0, true).is_finite());
}
