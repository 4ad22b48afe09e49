// SPDX-License-Identifier: MIT
// Copyright 2026 Prep-Tracker contributors

//! Reconciliation scenarios: first login, cross-device convergence,
//! idempotency, and partial-sync recovery.

mod common;

use common::{init_tracing, make_identity};
use prep_tracker::models::{ProblemId, ProgressRecord, ProgressStatus};
use prep_tracker::services::Reconciler;
use prep_tracker::store::kv::MemoryStore;
use prep_tracker::store::{LocalLedger, RemoteLedger};
use std::sync::Arc;

fn make_local() -> LocalLedger {
    LocalLedger::new(Arc::new(MemoryStore::new()), "prep:")
}

fn make_reconciler(local: &LocalLedger, remote: &RemoteLedger) -> Reconciler {
    Reconciler::new(local.clone(), remote.clone(), 8)
}

fn remote_record(status: ProgressStatus, stamp: &str) -> ProgressRecord {
    let mut record = ProgressRecord::new(stamp);
    record.status = status;
    if status == ProgressStatus::Solved {
        record.solved_at = Some(stamp.to_string());
    }
    record
}

#[tokio::test]
async fn test_first_login_pushes_local_progress() {
    init_tracing();
    let local = make_local();
    let remote = RemoteLedger::new_memory();
    let id = ProblemId::from("lc_1");
    local.set_status(&id, ProgressStatus::Solved).unwrap();
    let before = local.get(&id).unwrap().unwrap();

    let summary = make_reconciler(&local, &remote)
        .reconcile(&make_identity("u1"))
        .await;
    assert_eq!(summary.pushed, 1);
    assert_eq!(summary.skipped, 0);

    let pushed = remote.get("u1", &id).await.unwrap().unwrap();
    assert_eq!(pushed.status, ProgressStatus::Solved);
    assert_eq!(pushed.solved_at, before.record.solved_at);

    // The pull overwrites local with the merged remote value, which on a
    // first login is the same record.
    let after = local.get(&id).unwrap().unwrap();
    assert_eq!(after.record, before.record);
}

#[tokio::test]
async fn test_remote_solved_wins_over_local_working() {
    let local = make_local();
    let remote = RemoteLedger::new_memory();
    let id = ProblemId::from("lc_2");

    local.set_status(&id, ProgressStatus::Working).unwrap();
    remote
        .set(
            "u1",
            &id,
            &remote_record(ProgressStatus::Solved, "2026-01-01T00:00:00Z"),
        )
        .await
        .unwrap();

    make_reconciler(&local, &remote)
        .reconcile(&make_identity("u1"))
        .await;

    assert_eq!(
        remote.get("u1", &id).await.unwrap().unwrap().status,
        ProgressStatus::Solved
    );
    assert_eq!(
        local.get(&id).unwrap().unwrap().record.status,
        ProgressStatus::Solved
    );
}

#[tokio::test]
async fn test_local_solved_wins_over_remote_not_started() {
    let local = make_local();
    let remote = RemoteLedger::new_memory();
    let id = ProblemId::from("lc_2");

    local.set_status(&id, ProgressStatus::Solved).unwrap();
    remote
        .set(
            "u1",
            &id,
            &remote_record(ProgressStatus::NotStarted, "2026-01-01T00:00:00Z"),
        )
        .await
        .unwrap();

    make_reconciler(&local, &remote)
        .reconcile(&make_identity("u1"))
        .await;

    assert_eq!(
        remote.get("u1", &id).await.unwrap().unwrap().status,
        ProgressStatus::Solved
    );
    assert_eq!(
        local.get(&id).unwrap().unwrap().record.status,
        ProgressStatus::Solved
    );
}

#[tokio::test]
async fn test_reconcile_twice_is_idempotent() {
    let local = make_local();
    let remote = RemoteLedger::new_memory();
    let reconciler = make_reconciler(&local, &remote);
    let identity = make_identity("u1");

    local
        .set_status(&ProblemId::from("lc_1"), ProgressStatus::Working)
        .unwrap();
    local.add_time(&ProblemId::from("lc_1"), 120).unwrap();
    local.record_view(&ProblemId::from("lc_2")).unwrap();

    reconciler.reconcile(&identity).await;
    let local_after_first = local.entries().unwrap();
    let remote_after_first = remote.fetch_all("u1").await.unwrap();

    reconciler.reconcile(&identity).await;
    assert_eq!(local.entries().unwrap(), local_after_first);
    assert_eq!(remote.fetch_all("u1").await.unwrap(), remote_after_first);

    // In particular the counters did not double.
    let record = remote.get("u1", &ProblemId::from("lc_1")).await.unwrap().unwrap();
    assert_eq!(record.time_spent_secs, 120);
}

#[tokio::test]
async fn test_counters_sum_across_devices() {
    let local = make_local();
    let remote = RemoteLedger::new_memory();
    let id = ProblemId::from("lc_7");

    // Another device already accumulated time remotely.
    let mut other_device = remote_record(ProgressStatus::Working, "2026-01-01T00:00:00Z");
    other_device.time_spent_secs = 600;
    other_device.view_count = 4;
    remote.set("u1", &id, &other_device).await.unwrap();

    local.record_view(&id).unwrap();
    local.add_time(&id, 90).unwrap();

    make_reconciler(&local, &remote)
        .reconcile(&make_identity("u1"))
        .await;

    let merged = remote.get("u1", &id).await.unwrap().unwrap();
    assert_eq!(merged.time_spent_secs, 690);
    assert_eq!(merged.view_count, 5);

    let entry = local.get(&id).unwrap().unwrap();
    assert_eq!(entry.record.time_spent_secs, 690);
    assert_eq!(entry.pending_time_secs(), 0);
}

#[tokio::test]
async fn test_device_a_converges_after_device_b_solves() {
    let remote = RemoteLedger::new_memory();
    let identity = make_identity("u1");
    let id = ProblemId::from("lc_2");

    // Device A: working, synced.
    let local_a = make_local();
    local_a.set_status(&id, ProgressStatus::Working).unwrap();
    make_reconciler(&local_a, &remote).reconcile(&identity).await;

    // Device B: solves and syncs.
    let local_b = make_local();
    local_b.set_status(&id, ProgressStatus::Solved).unwrap();
    make_reconciler(&local_b, &remote).reconcile(&identity).await;

    // Back on device A, the next sign-in transition reconciles again.
    make_reconciler(&local_a, &remote).reconcile(&identity).await;

    let entry = local_a.get(&id).unwrap().unwrap();
    assert_eq!(entry.record.status, ProgressStatus::Solved);
    assert!(entry.record.solved_at.is_some());
}

#[tokio::test]
async fn test_failed_record_is_skipped_and_retried_next_run() {
    let local = make_local();
    let broken = ProblemId::from("lc_13");
    let fine = ProblemId::from("lc_1");
    local.set_status(&broken, ProgressStatus::Solved).unwrap();
    local.set_status(&fine, ProgressStatus::Working).unwrap();

    let failing = RemoteLedger::new_memory_failing([broken.clone()]);
    let identity = make_identity("u1");
    let summary = make_reconciler(&local, &failing).reconcile(&identity).await;

    assert_eq!(summary.pushed, 1);
    assert_eq!(summary.skipped, 1);
    assert!(failing.get("u1", &fine).await.unwrap().is_some());

    // The next transition, with the store healthy again, picks it up. The
    // healthy ledger here shares no state with the failing one, so seed it
    // with what the first run managed to push.
    let healthy = RemoteLedger::new_memory();
    let working = failing.get("u1", &fine).await.unwrap().unwrap();
    healthy.set("u1", &fine, &working).await.unwrap();

    let summary = make_reconciler(&local, &healthy).reconcile(&identity).await;
    assert_eq!(summary.skipped, 0);
    let record = healthy.get("u1", &broken).await.unwrap().unwrap();
    assert_eq!(record.status, ProgressStatus::Solved);
}

#[tokio::test]
async fn test_remote_records_unknown_locally_are_pulled_down() {
    let local = make_local();
    let remote = RemoteLedger::new_memory();
    let id = ProblemId::from("lc_99");
    remote
        .set(
            "u1",
            &id,
            &remote_record(ProgressStatus::NeedsHelp, "2026-01-03T00:00:00Z"),
        )
        .await
        .unwrap();

    let summary = make_reconciler(&local, &remote)
        .reconcile(&make_identity("u1"))
        .await;
    assert_eq!(summary.pushed, 0);
    assert_eq!(summary.pulled, 1);

    assert_eq!(
        local.get(&id).unwrap().unwrap().record.status,
        ProgressStatus::NeedsHelp
    );
}

#[tokio::test]
async fn test_unreachable_remote_leaves_local_untouched() {
    let local = make_local();
    let id = ProblemId::from("lc_1");
    local.set_status(&id, ProgressStatus::Working).unwrap();
    let before = local.entries().unwrap();

    let summary = Reconciler::new(local.clone(), RemoteLedger::new_offline(), 8)
        .reconcile(&make_identity("u1"))
        .await;

    assert_eq!(summary.pushed, 0);
    assert_eq!(summary.skipped, 1);
    assert_eq!(local.entries().unwrap(), before);
}
