use std::fs;
use std::path::Path;

use pitch_sim::config::SimConfig;
use pitch_sim::runner::GameRunner;
use tempfile::tempdir;

fn load_config(output_dir: &Path, seed: u64) -> SimConfig {
    let yaml = format!(
        r#"
run_id: "test_smoke"
games:
  seed: {seed}
  count: 3
agents:
  - name: "normal_a"
    difficulty: "normal"
  - name: "easy_a"
    difficulty: "easy"
  - name: "normal_b"
    difficulty: "normal"
  - name: "easy_b"
    difficulty: "easy"
outputs:
  jsonl: "{jsonl}"
  summary_md: "{summary}"
logging:
  enable_structured: false
"#,
        jsonl = output_dir.join("games.jsonl").display(),
        summary = output_dir.join("summary.md").display(),
    );

    let mut cfg: SimConfig = serde_yaml::from_str(&yaml).expect("valid yaml");
    cfg.validate().expect("config validates");
    cfg
}

/// Rows with the wall-clock field zeroed out.
fn normalized_rows(path: &Path) -> Vec<serde_json::Value> {
    let jsonl = fs::read_to_string(path).expect("jsonl readable");
    jsonl
        .lines()
        .map(|line| {
            let mut value: serde_json::Value =
                serde_json::from_str(line).expect("row decodes to JSON");
            if let Some(obj) = value.as_object_mut() {
                obj.insert("speed_ms_decision".to_string(), serde_json::json!(0.0));
            }
            value
        })
        .collect()
}

fn run_once(seed: u64) -> (tempfile::TempDir, pitch_sim::runner::RunSummary) {
    let dir = tempdir().expect("temp dir");
    let config = load_config(dir.path(), seed);
    let outputs = config.resolved_outputs();
    let runner = GameRunner::new(config, outputs).expect("runner created");
    let summary = runner.run().expect("games complete");
    (dir, summary)
}

#[test]
fn simulation_writes_one_row_per_seat_per_game() {
    let (_dir, summary) = run_once(4242);

    assert_eq!(summary.games_played, 3);
    assert_eq!(summary.rows_written, 12);
    assert!(summary.hands_played >= 3, "every game scores at least one hand");

    let rows = normalized_rows(&summary.jsonl_path);
    assert_eq!(rows.len(), 12);
    for game in rows.chunks(4) {
        let seats: Vec<&str> = game.iter().map(|r| r["seat"].as_str().unwrap()).collect();
        assert_eq!(seats, ["north", "east", "south", "west"]);
        if game[0]["finished"].as_bool().unwrap() {
            let winners = game.iter().filter(|r| r["won"].as_bool().unwrap()).count();
            assert_eq!(winners, 2, "both members of the winning team are marked");
            let best = game.iter().map(|r| r["team_score"].as_i64().unwrap()).max().unwrap();
            assert!(best >= 21);
        }
    }

    let markdown = fs::read_to_string(&summary.summary_path).expect("summary readable");
    assert!(markdown.contains("# Table Summary: test_smoke"));
    for agent in ["normal_a", "easy_a", "normal_b", "easy_b"] {
        assert!(markdown.contains(agent), "summary lists {agent}");
    }
    assert_eq!(summary.agents.iter().map(|a| a.games).sum::<usize>(), 12);
}

#[test]
fn same_seed_replays_identically() {
    let (_first_dir, first) = run_once(77);
    let (_second_dir, second) = run_once(77);
    assert_eq!(
        normalized_rows(&first.jsonl_path),
        normalized_rows(&second.jsonl_path)
    );
}

#[test]
fn config_file_round_trips_through_loader() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("table.yaml");
    fs::write(
        &path,
        r#"
run_id: "from_disk"
games: { count: 1 }
agents:
  - { name: "n", difficulty: "normal" }
  - { name: "e", difficulty: "easy" }
  - { name: "s" }
  - { name: "w", difficulty: "easy" }
outputs:
  jsonl: "out/{run_id}.jsonl"
  summary_md: "out/{run_id}.md"
"#,
    )
    .expect("write config");

    let config = SimConfig::from_path(&path).expect("loads");
    assert_eq!(config.run_id, "from_disk");
    assert_eq!(
        config.resolved_outputs().jsonl,
        Path::new("out/from_disk.jsonl")
    );

    fs::write(&path, "run_id: \"x\"\ngames: { count: 1 }\nagents: []\noutputs: { jsonl: a, summary_md: b }\n")
        .expect("rewrite config");
    let err = SimConfig::from_path(&path).expect_err("no agents");
    assert_eq!(err.path(), path.as_path());
}
