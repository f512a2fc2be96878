//! Command execution over snapshot files

use newsboard_board::BoardConfig;
use newsboard_cli::{command, run, Invocation};
use newsboard_core::{ItemId, PriorityRating, WorkflowStage};
use newsboard_store::MemoryStore;
use newsboard_test_utils::{draft_item, published_item, seeded_store, ScriptedTrigger};
use newsboard_trigger::TriggerFailure;
use pretty_assertions::assert_eq;
use std::path::Path;

fn write_snapshot(path: &Path) {
    seeded_store(vec![
        draft_item("a1", WorkflowStage::Idea),
        draft_item("a2", WorkflowStage::Draft),
        published_item("p1"),
    ])
    .save_snapshot(path)
    .unwrap();
}

fn invocation(path: &Path, args: &[&str]) -> Invocation {
    let data = path.to_str().unwrap();
    let mut argv = vec!["newsboard", "--data", data];
    argv.extend_from_slice(args);
    Invocation::from_matches(&command().try_get_matches_from(argv).unwrap()).unwrap()
}

async fn exec(
    path: &Path,
    args: &[&str],
    trigger: std::sync::Arc<ScriptedTrigger>,
) -> anyhow::Result<String> {
    let mut out = Vec::new();
    run(&invocation(path, args), &BoardConfig::default(), trigger, &mut out).await?;
    Ok(String::from_utf8(out).unwrap())
}

#[tokio::test]
async fn board_lists_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.json");
    write_snapshot(&path);

    let text = exec(&path, &["board"], ScriptedTrigger::new()).await.unwrap();

    assert!(text.contains("Idea (1)"));
    assert!(text.contains("Writing (0)"));
    assert!(text.contains("Draft (1)"));
    assert!(text.contains("Published (1)"));
    assert!(text.contains("drafts.a1"));
}

#[tokio::test]
async fn board_json_has_four_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.json");
    write_snapshot(&path);

    let text = exec(&path, &["board", "--json"], ScriptedTrigger::new())
        .await
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();

    let stages: Vec<&str> = value["columns"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["stage"].as_str().unwrap())
        .collect();
    assert_eq!(stages, vec!["idea", "writing", "draft", "published"]);
}

#[tokio::test]
async fn move_to_writing_saves_snapshot_and_triggers_job() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.json");
    write_snapshot(&path);
    let trigger = ScriptedTrigger::new();

    let text = exec(&path, &["move", "drafts.a1", "writing"], trigger.clone())
        .await
        .unwrap();

    assert!(text.contains("moved drafts.a1 to writing"));
    assert!(text.contains("writing job started"));
    assert_eq!(trigger.writing_calls(), vec![ItemId::new("drafts.a1")]);

    let saved = MemoryStore::load_snapshot(&path).unwrap();
    let item = saved.get(&ItemId::new("drafts.a1")).unwrap();
    assert_eq!(item.stage, Some(WorkflowStage::Writing));
    assert_eq!(item.body.len(), 1);
}

#[tokio::test]
async fn dry_run_move_prints_columns_without_saving() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.json");
    write_snapshot(&path);
    let before = std::fs::read_to_string(&path).unwrap();
    let trigger = ScriptedTrigger::new();

    let text = exec(&path, &["move", "drafts.a1", "writing", "--dry-run"], trigger.clone())
        .await
        .unwrap();

    assert!(text.contains("Idea (0)"));
    assert!(text.contains("Writing (1)"));
    assert!(trigger.writing_calls().is_empty());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
}

#[tokio::test]
async fn failed_trigger_leaves_snapshot_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.json");
    write_snapshot(&path);
    let before = std::fs::read_to_string(&path).unwrap();
    let trigger = ScriptedTrigger::new();
    trigger.fail_next_writing(TriggerFailure::RequestFailed { status: 503 });

    let err = exec(&path, &["move", "drafts.a1", "writing"], trigger)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("503"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
}

#[tokio::test]
async fn publish_and_rate_round_through_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.json");
    write_snapshot(&path);

    let text = exec(&path, &["publish", "drafts.a2"], ScriptedTrigger::new())
        .await
        .unwrap();
    assert_eq!(text.trim(), "published as a2");

    exec(&path, &["rate", "a2", "HC"], ScriptedTrigger::new())
        .await
        .unwrap();

    let saved = MemoryStore::load_snapshot(&path).unwrap();
    assert!(saved.get(&ItemId::new("drafts.a2")).is_none());
    let published = saved.get(&ItemId::new("a2")).unwrap();
    assert_eq!(published.stage, Some(WorkflowStage::Published));
    assert_eq!(published.priority_rating, Some(PriorityRating::HighConfidence));
}

#[tokio::test]
async fn missing_snapshot_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");

    let err = exec(&path, &["board"], ScriptedTrigger::new())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("failed to load snapshot"));
}

#[tokio::test]
async fn plan_reports_ack() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("unused.json");
    let trigger = ScriptedTrigger::new();

    let text = exec(&path, &["plan"], trigger.clone()).await.unwrap();

    assert_eq!(text.trim(), "planning started");
    assert_eq!(trigger.planning_calls(), 1);
}
