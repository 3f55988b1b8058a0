use stack_sync::apply::{apply_entries, apply_paths, FileChange};
use stack_sync::diff::{diff, ChangeKind, DiffEntry};
use stack_sync::filter::PatternSet;
use stack_sync::history::{SyncHistoryEntry, SyncHistoryStore, MAX_HISTORY_SIZE};
use stack_sync::repository::RepositoryConfig;
use stack_sync::scanner::scan;
use stack_sync::select::{select_entries, select_paths, ScriptedOperator, Selection};
use stack_sync::sync::{sync_repository, SyncOptions, SyncOutcome};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &[u8]) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Source tree with a nested layout, VCS metadata and mixed extensions
fn create_source_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    write(root, "README.md", b"# protos\n");
    write(root, "api/user.proto", b"message User {}\n");
    write(root, "api/v1/order.proto", b"message Order {}\n");
    write(root, "internal/secret.proto", b"message Secret {}\n");
    write(root, "build/gen.txt", b"generated");
    write(root, ".git/HEAD", b"ref: refs/heads/main\n");
    write(root, ".git/objects/ab/cdef", b"blob");

    dir
}

#[test]
fn test_end_to_end_txt_only_scenario() {
    let source = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    write(source.path(), "a.txt", b"0123456789");
    write(source.path(), "b.log", b"01234");

    let patterns = PatternSet::new(vec!["*.txt".to_string()], Vec::new());

    let scanned = scan(source.path(), &patterns).unwrap();
    assert_eq!(scanned, vec!["a.txt".to_string()]);

    let entries = diff(source.path(), target.path(), &patterns).unwrap();
    assert_eq!(entries, vec![DiffEntry::new("a.txt", ChangeKind::Added)]);

    let mut operator = ScriptedOperator::new(["a"]);
    let selection = select_paths(&scanned, &mut operator)
        .unwrap()
        .into_confirmed()
        .unwrap();

    let changes = apply_paths(source.path(), target.path(), &selection).unwrap();
    assert_eq!(changes, vec![FileChange::new("a.txt", ChangeKind::Added, 10)]);
    assert_eq!(fs::read(target.path().join("a.txt")).unwrap(), b"0123456789");
    assert!(!target.path().join("b.log").exists());
}

#[test]
fn test_full_diff_against_empty_target_reproduces_subset() {
    let source = create_source_tree();
    let target = TempDir::new().unwrap();
    let patterns = PatternSet::new(
        vec!["*.proto".to_string(), "*.md".to_string()],
        vec!["internal/*".to_string()],
    );

    let entries = diff(source.path(), target.path(), &patterns).unwrap();
    assert!(entries.iter().all(|e| e.kind == ChangeKind::Added));

    let mut operator = ScriptedOperator::new(["c"]);
    let selection = select_entries(&entries, source.path(), target.path(), &mut operator)
        .unwrap()
        .into_confirmed()
        .unwrap();
    let changes = apply_entries(source.path(), target.path(), &selection).unwrap();

    let expected = scan(source.path(), &patterns).unwrap();
    assert_eq!(
        expected,
        vec!["README.md", "api/user.proto", "api/v1/order.proto"]
    );
    assert_eq!(scan(target.path(), &patterns).unwrap(), expected);

    for change in &changes {
        let source_len = fs::metadata(source.path().join(&change.path)).unwrap().len();
        let target_len = fs::metadata(target.path().join(&change.path)).unwrap().len();
        assert_eq!(change.size, source_len);
        assert_eq!(target_len, source_len);
    }

    assert!(!target.path().join(".git").exists());
    assert!(!target.path().join("internal").exists());
    assert!(!target.path().join("build").exists());

    // A second diff sees every file on both sides
    let again = diff(source.path(), target.path(), &patterns).unwrap();
    assert_eq!(again.len(), expected.len());
    assert!(again.iter().all(|e| e.kind == ChangeKind::Modified));
}

#[test]
fn test_cancelled_diff_preview_is_not_recorded() {
    let source = create_source_tree();
    let work = TempDir::new().unwrap();
    let history_path = work.path().join("history.json");

    let repository = RepositoryConfig::new("protos", source.path(), work.path().join("target"));
    let options = SyncOptions {
        diff: true,
        history_path: Some(history_path.clone()),
        run_post_sync: false,
        ..SyncOptions::default()
    };

    // Seed one earlier entry so the count has something to compare against
    let mut store = SyncHistoryStore::from_path(Some(history_path.clone())).unwrap();
    store
        .append(SyncHistoryEntry::success("protos", "main", Vec::new(), 0))
        .unwrap();

    let mut operator = ScriptedOperator::new(["t 1", "v 2", "q"]);
    let outcome = sync_repository(&repository, &options, &mut operator).unwrap();

    assert_eq!(outcome, SyncOutcome::Cancelled);
    assert_eq!(
        SyncHistoryStore::from_path(Some(history_path)).unwrap().len(),
        1
    );
    assert!(!work.path().join("target").exists());
}

#[test]
fn test_confirmed_sync_is_recorded_once_with_counts() {
    let source = create_source_tree();
    let work = TempDir::new().unwrap();
    let target = work.path().join("target");
    write(&target, "stale.proto", b"old!");
    let history_path = work.path().join("history.json");

    let mut repository = RepositoryConfig::new("protos", source.path(), &target);
    repository.file_patterns = vec!["*.proto".to_string()];
    repository.exclude_patterns = vec!["internal/*".to_string()];

    let options = SyncOptions {
        diff: true,
        history_path: Some(history_path.clone()),
        run_post_sync: false,
        ..SyncOptions::default()
    };

    let mut operator = ScriptedOperator::new(["c"]);
    let outcome = sync_repository(&repository, &options, &mut operator).unwrap();

    let SyncOutcome::Synced(changes) = outcome else {
        panic!("expected a sync, got {outcome:?}");
    };
    assert_eq!(changes.len(), 3);
    assert!(!target.join("stale.proto").exists());

    let history = SyncHistoryStore::from_path(Some(history_path)).unwrap();
    let recorded = history.for_repository("protos", 0);
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].added_count, 2);
    assert_eq!(recorded[0].deleted_count, 1);
    assert_eq!(recorded[0].file_changes, changes);
    assert!(!recorded[0].id.is_empty());
}

#[test]
fn test_number_selection_through_mode_prompt() {
    let source = create_source_tree();
    let patterns = PatternSet::new(vec!["*.proto".to_string()], Vec::new());
    let candidates = scan(source.path(), &patterns).unwrap();
    assert_eq!(
        candidates,
        vec!["api/user.proto", "api/v1/order.proto", "internal/secret.proto"]
    );

    // Out-of-range first, then a valid range
    let mut operator = ScriptedOperator::new(["n", "4", "2-3"]);
    let selection = select_paths(&candidates, &mut operator).unwrap();

    assert_eq!(
        selection,
        Selection::Confirmed(vec![
            "api/v1/order.proto".to_string(),
            "internal/secret.proto".to_string(),
        ])
    );
}

#[test]
fn test_history_cap_keeps_most_recent() {
    let work = TempDir::new().unwrap();
    let history_path = work.path().join("history.json");
    let mut store = SyncHistoryStore::from_path(Some(history_path.clone())).unwrap();

    for i in 0..=MAX_HISTORY_SIZE {
        let mut entry = SyncHistoryEntry::success(format!("repo-{i}"), "main", Vec::new(), 0);
        entry.id = format!("entry-{i}");
        store.histories.insert(0, entry);
        if store.histories.len() > MAX_HISTORY_SIZE {
            store.histories.truncate(MAX_HISTORY_SIZE);
        }
    }
    // The last append goes through the public path and persists
    let newest = SyncHistoryEntry::success("repo-newest", "main", Vec::new(), 0);
    store.append(newest).unwrap();

    let reloaded = SyncHistoryStore::from_path(Some(history_path)).unwrap();
    assert_eq!(reloaded.len(), MAX_HISTORY_SIZE);
    assert_eq!(reloaded.histories[0].repository, "repo-newest");
    assert!(reloaded.histories.iter().all(|e| e.id != "entry-0"));
    assert!(reloaded.histories.iter().all(|e| e.id != "entry-1"));
}
