use steamrec_storage::{Dataset, Error, LoadReport, dataset};
use steamrec_testkit::{Workspace, sample_catalog};

#[test]
fn loads_sample_catalog_sorted_by_id() {
	let workspace = Workspace::new().expect("Failed to create workspace.");
	let (curators, games) = sample_catalog();
	let (curators_path, games_path) =
		workspace.write_dataset(&curators, &games).expect("Failed to write dataset.");
	let (dataset, report) =
		Dataset::load(&curators_path, &games_path).expect("Failed to load dataset.");

	assert_eq!(
		report,
		LoadReport { curators_loaded: 3, curators_skipped: 0, games_loaded: 5, games_skipped: 0 }
	);

	let game_ids: Vec<&str> = dataset.games().iter().map(|game| game.id.as_str()).collect();

	assert_eq!(game_ids, vec!["ignored", "puzzle-1", "rpg-1", "rpg-2", "untagged"]);
	assert_eq!(dataset.curator("bob").map(|curator| curator.events.len()), Some(2));
	assert_eq!(dataset.curator_name("carol"), "Curator carol");
	assert_eq!(dataset.curator_name("nobody"), "nobody");
	assert!(dataset.game("untagged").map(|game| !game.has_tags()).unwrap_or(false));
}

#[test]
fn malformed_entries_are_skipped_not_coerced() {
	let raw = r#"{
		"good": { "name": "Good", "list": [
			{ "appid": "10", "recommended": true, "info": false, "epoch": 1450000000000 }
		] },
		"missing-list": { "name": "Broken" },
		"bad-epoch": { "name": "Broken", "list": [
			{ "appid": "10", "recommended": true, "info": false, "epoch": "yesterday" }
		] }
	}"#;
	let (curators, skipped) =
		dataset::parse_curators_document(raw).expect("Top-level document is valid.");

	assert_eq!(skipped, 2);
	assert_eq!(curators.len(), 1);
	assert_eq!(curators[0].id, "good");
	assert_eq!(curators[0].events[0].appid, "10");
}

#[test]
fn game_tags_accept_missing_empty_and_array_forms() {
	let raw = r#"{
		"with-tags": { "name": "A", "tags": { "RPG": 3, "Indie": 1 } },
		"no-field": { "name": "B" },
		"null": { "tags": null },
		"empty-object": { "tags": {} },
		"empty-array": { "tags": [] },
		"array": { "tags": ["RPG"] },
		"negative": { "tags": { "RPG": -1 } }
	}"#;
	let (games, skipped) = dataset::parse_games_document(raw).expect("Top-level document is valid.");
	let dataset = Dataset::new(Vec::new(), games);

	assert_eq!(skipped, 2);
	assert!(dataset.game("array").is_none());
	assert!(dataset.game("negative").is_none());
	assert!(dataset.game("with-tags").map(|game| game.has_tags()).unwrap_or(false));

	for id in ["no-field", "null", "empty-object", "empty-array"] {
		let game = dataset.game(id).expect("Game must be loaded.");

		assert!(!game.has_tags(), "Game {id} must have no usable tags.");
	}
}

#[test]
fn malformed_top_level_document_is_fatal() {
	let workspace = Workspace::new().expect("Failed to create workspace.");
	let curators_path =
		workspace.write_raw("curators.json", "[1, 2, 3]").expect("Failed to write curators.");
	let games_path = workspace.write_raw("games.json", "{}").expect("Failed to write games.");
	let err = Dataset::load(&curators_path, &games_path).expect_err("Expected a parse error.");

	assert!(matches!(err, Error::ParseDataset { .. }), "Unexpected error: {err:?}");

	let missing = workspace.path().join("missing.json");
	let err = Dataset::load(&missing, &games_path).expect_err("Expected a read error.");

	assert!(matches!(err, Error::ReadDataset { .. }), "Unexpected error: {err:?}");
}
