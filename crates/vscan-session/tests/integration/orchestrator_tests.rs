use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::Notify;
use vscan_models::{AnalysisResults, EntryState};
use vscan_session::{
    OrchestrationSummary, OrchestratorConfig, ProcessingStatus, RerunPolicy, SessionError, SessionEvent,
    UploadOrchestrator, UploadSession,
};

use super::support::{drain, subtitle, video, ScriptedTransfer};

fn payload(object: &str, suspicious: bool, timestamp: &str) -> AnalysisResults {
    AnalysisResults::from_value(json!([[{
        "result": {
            "is_suspicious": suspicious,
            "object_in_question": object,
            "why_suspicious": "seen near the perimeter",
            "images": ["frames/frame_0001.jpg"]
        },
        "matrix": [{
            "frame": "frames/frame_0001.jpg",
            "timestamp": timestamp,
            "lat": 31.78546,
            "lon": 35.190109,
            "alt": 878.317
        }]
    }]]))
    .unwrap()
}

async fn session_with(names: &[&str]) -> UploadSession {
    let session = UploadSession::new();
    let admitted = session
        .add_files(names.iter().enumerate().map(|(i, n)| video(n, 1000 + i as u64)))
        .await
        .unwrap();
    assert_eq!(admitted, names.len());
    session
}

async fn states(session: &UploadSession) -> Vec<EntryState> {
    session.snapshot().await.iter().map(|e| e.state).collect()
}

#[tokio::test]
async fn test_partial_failure_continues_in_order() {
    let session = session_with(&["a.mp4", "b.mp4", "c.mp4"]).await;
    let orchestrator = UploadOrchestrator::new(
        ScriptedTransfer::default().failing_once(&["b.mp4"]),
        OrchestratorConfig::default(),
    );

    let summary = orchestrator.run(&session).await.unwrap();

    assert_eq!(
        states(&session).await,
        vec![EntryState::Done, EntryState::Error, EntryState::Done]
    );
    assert_eq!(summary.attempted, 3);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(session.uploaded_count(), 2);

    assert_eq!(
        orchestrator.transfer().calls(),
        vec!["upload:a.mp4", "upload:b.mp4", "upload:c.mp4"]
    );

    let failed = session.entry(1).await.unwrap();
    let reason = failed.error.expect("failure reason should be kept");
    assert!(reason.contains("500"), "unexpected reason: {}", reason);
    assert!(session.entry(0).await.unwrap().error.is_none());
    assert_eq!(session.status().await, ProcessingStatus::Complete);
    assert!(session.can_modify());
}

#[tokio::test]
async fn test_every_entry_failing_is_a_normal_completion() {
    let session = session_with(&["a.mp4", "b.mp4"]).await;
    let orchestrator = UploadOrchestrator::new(
        ScriptedTransfer::default().failing_once(&["a.mp4", "b.mp4"]),
        OrchestratorConfig::default(),
    );

    let summary = orchestrator.run(&session).await.unwrap();
    assert_eq!(summary.succeeded, 0);
    assert_eq!(summary.failed, 2);
    assert_eq!(session.uploaded_count(), 0);
    assert_eq!(states(&session).await, vec![EntryState::Error, EntryState::Error]);
}

#[tokio::test]
async fn test_success_counter_published_after_each_entry() {
    let session = session_with(&["a.mp4", "b.mp4", "c.mp4"]).await;
    let mut rx = session.subscribe();
    let orchestrator = UploadOrchestrator::new(
        ScriptedTransfer::default().failing_once(&["b.mp4"]),
        OrchestratorConfig::default(),
    );

    orchestrator.run(&session).await.unwrap();

    let counts: Vec<usize> = drain(&mut rx)
        .into_iter()
        .filter_map(|e| match e {
            SessionEvent::UploadedCount { count } => Some(count),
            _ => None,
        })
        .collect();
    assert_eq!(counts, vec![0, 1, 2]);
}

#[tokio::test]
async fn test_subtitle_entry_is_analyzed_and_results_stored() {
    let session = session_with(&["flight.mp4", "plain.mp4"]).await;
    session.set_subtitle(0, Some(subtitle("flight.srt"))).await.unwrap();

    let mut transfer = ScriptedTransfer::default();
    transfer
        .analysis
        .insert("flight.mp4".into(), payload("drone", true, "00:01:23.500"));
    let orchestrator = UploadOrchestrator::new(transfer, OrchestratorConfig::default());

    let summary = orchestrator.run(&session).await.unwrap();
    assert!(summary.analysis_received);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(
        orchestrator.transfer().calls(),
        vec!["analyze:flight.mp4", "upload:plain.mp4"]
    );

    let aggregated = session.aggregated().await.expect("results should be stored");
    assert!(!aggregated.all_clear);
    assert_eq!(aggregated.events.len(), 1);
    assert_eq!(aggregated.events[0].timestamp, "00:01:23.500");

    let playback = session.playback().await.unwrap();
    assert_eq!(playback.name, "flight.mp4");
    assert_eq!(
        playback.seek_position(&aggregated.events[0].timestamp).unwrap(),
        Duration::from_millis(83_500)
    );
}

#[tokio::test]
async fn test_later_analysis_replaces_earlier() {
    let session = session_with(&["one.mp4", "two.mp4"]).await;
    session.set_subtitle(0, Some(subtitle("one.srt"))).await.unwrap();
    session.set_subtitle(1, Some(subtitle("two.srt"))).await.unwrap();

    let mut transfer = ScriptedTransfer::default();
    transfer
        .analysis
        .insert("one.mp4".into(), payload("drone", true, "00:00:05.000"));
    transfer
        .analysis
        .insert("two.mp4".into(), payload("bird", false, "00:00:09.000"));
    let orchestrator = UploadOrchestrator::new(transfer, OrchestratorConfig::default());

    orchestrator.run(&session).await.unwrap();

    let aggregated = session.aggregated().await.unwrap();
    assert!(aggregated.all_clear, "second payload should replace the first wholesale");
}

#[tokio::test]
async fn test_failed_analysis_keeps_previous_results() {
    let session = session_with(&["one.mp4", "two.mp4"]).await;
    session.set_subtitle(0, Some(subtitle("one.srt"))).await.unwrap();
    session.set_subtitle(1, Some(subtitle("two.srt"))).await.unwrap();

    let mut transfer = ScriptedTransfer::default().failing_once(&["two.mp4"]);
    transfer
        .analysis
        .insert("one.mp4".into(), payload("drone", true, "00:00:05.000"));
    let orchestrator = UploadOrchestrator::new(transfer, OrchestratorConfig::default());

    orchestrator.run(&session).await.unwrap();

    assert_eq!(states(&session).await, vec![EntryState::Done, EntryState::Error]);
    assert_eq!(session.aggregated().await.unwrap().events.len(), 1);
}

#[tokio::test]
async fn test_upload_progress_is_monotonic_and_ends_at_100() {
    let session = session_with(&["a.mp4"]).await;
    let mut rx = session.subscribe();

    let transfer = ScriptedTransfer {
        // 1000-byte file; the 250 report arrives out of order.
        progress_steps: vec![0, 400, 250, 900, 1000],
        ..Default::default()
    };
    let orchestrator = UploadOrchestrator::new(transfer, OrchestratorConfig::default());
    orchestrator.run(&session).await.unwrap();

    let updates: Vec<(EntryState, u8)> = drain(&mut rx)
        .into_iter()
        .filter_map(|e| match e {
            SessionEvent::EntryUpdated { index: 0, state, progress, .. } => Some((state, progress)),
            _ => None,
        })
        .collect();

    assert_eq!(updates.first(), Some(&(EntryState::Uploading, 0)));
    assert_eq!(updates.last(), Some(&(EntryState::Done, 100)));
    assert!(updates.windows(2).all(|w| w[0].1 <= w[1].1));
    assert!(updates
        .iter()
        .all(|(state, progress)| *state == EntryState::Done || *progress < 100));
}

#[tokio::test]
async fn test_analyze_progress_is_approximated_below_ceiling() {
    let session = session_with(&["flight.mp4"]).await;
    session.set_subtitle(0, Some(subtitle("flight.srt"))).await.unwrap();
    let mut rx = session.subscribe();

    let transfer = ScriptedTransfer {
        analyze_delay: Duration::from_millis(60),
        ..Default::default()
    };
    let config = OrchestratorConfig {
        analyze_tick: Duration::from_millis(1),
        analyze_step: 10,
        analyze_ceiling: 95,
        ..Default::default()
    };
    UploadOrchestrator::new(transfer, config).run(&session).await.unwrap();

    let uploading: Vec<u8> = drain(&mut rx)
        .into_iter()
        .filter_map(|e| match e {
            SessionEvent::EntryUpdated {
                state: EntryState::Uploading,
                progress,
                ..
            } => Some(progress),
            _ => None,
        })
        .collect();

    assert!(uploading.iter().any(|p| *p > 0));
    assert!(uploading.iter().all(|p| *p <= 95));
    assert!(uploading.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(session.entry(0).await.unwrap().progress, 100);
}

#[tokio::test]
async fn test_rerun_skips_completed_entries() {
    let session = session_with(&["a.mp4", "b.mp4", "c.mp4"]).await;
    let orchestrator = UploadOrchestrator::new(
        ScriptedTransfer::default().failing_once(&["b.mp4"]),
        OrchestratorConfig::default(),
    );

    orchestrator.run(&session).await.unwrap();
    let second = orchestrator.run(&session).await.unwrap();

    assert_eq!(second.skipped, 2);
    assert_eq!(second.attempted, 1);
    assert_eq!(second.succeeded, 1);
    assert_eq!(session.uploaded_count(), 1);
    assert_eq!(
        states(&session).await,
        vec![EntryState::Done, EntryState::Done, EntryState::Done]
    );
    assert!(session.entry(1).await.unwrap().error.is_none());
    assert_eq!(
        orchestrator.transfer().calls(),
        vec!["upload:a.mp4", "upload:b.mp4", "upload:c.mp4", "upload:b.mp4"]
    );
}

#[tokio::test]
async fn test_reattempt_all_policy_retransfers_everything() {
    let session = session_with(&["a.mp4", "b.mp4"]).await;
    let orchestrator = UploadOrchestrator::new(
        ScriptedTransfer::default(),
        OrchestratorConfig {
            rerun_policy: RerunPolicy::ReattemptAll,
            ..Default::default()
        },
    );

    orchestrator.run(&session).await.unwrap();
    let second = orchestrator.run(&session).await.unwrap();

    assert_eq!(second.skipped, 0);
    assert_eq!(second.attempted, 2);
    assert_eq!(orchestrator.transfer().calls().len(), 4);
}

#[tokio::test]
async fn test_selection_is_frozen_while_run_in_flight() {
    let session = session_with(&["a.mp4", "b.mp4"]).await;
    let started = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());

    let orchestrator = Arc::new(UploadOrchestrator::new(
        ScriptedTransfer {
            gate: Some((started.clone(), release.clone())),
            ..Default::default()
        },
        OrchestratorConfig::default(),
    ));

    let handle = {
        let orchestrator = orchestrator.clone();
        let session = session.clone();
        tokio::spawn(async move { orchestrator.run(&session).await })
    };

    started.notified().await;

    assert!(session.is_running());
    assert!(!session.can_modify(), "removal must be disabled once a run starts");
    assert_eq!(session.remove(0).await.unwrap_err(), SessionError::RunInProgress);
    assert_eq!(
        session.add_files(vec![video("late.mp4", 5)]).await.unwrap_err(),
        SessionError::RunInProgress
    );
    assert_eq!(
        session.set_subtitle(1, Some(subtitle("b.srt"))).await.unwrap_err(),
        SessionError::RunInProgress
    );
    assert_eq!(
        orchestrator.run(&session).await.unwrap_err(),
        SessionError::RunInProgress
    );
    assert_eq!(session.entry(0).await.unwrap().state, EntryState::Uploading);
    assert_eq!(session.entry(1).await.unwrap().state, EntryState::Pending);

    // First transfer, then the second one waits at the gate too.
    release.notify_one();
    started.notified().await;
    release.notify_one();

    let summary = handle.await.unwrap().unwrap();
    assert_eq!(summary.succeeded, 2);
    assert!(session.can_modify());
    assert_eq!(session.len().await, 2);
}

#[tokio::test]
async fn test_empty_selection_completes_immediately() {
    let session = UploadSession::new();
    let orchestrator = UploadOrchestrator::new(ScriptedTransfer::default(), OrchestratorConfig::default());

    let summary = orchestrator.run(&session).await.unwrap();
    assert_eq!(summary, OrchestrationSummary::default());
    assert_eq!(session.status().await, ProcessingStatus::Complete);
    assert!(session.aggregated().await.is_none());
}

#[tokio::test]
async fn test_zero_analyze_tick_is_clamped() {
    let session = session_with(&["flight.mp4"]).await;
    session.set_subtitle(0, Some(subtitle("flight.srt"))).await.unwrap();

    let transfer = ScriptedTransfer {
        analyze_delay: Duration::from_millis(5),
        ..Default::default()
    };
    let config = OrchestratorConfig {
        analyze_tick: Duration::ZERO,
        ..Default::default()
    };

    let summary = UploadOrchestrator::new(transfer, config).run(&session).await.unwrap();
    assert_eq!(summary.succeeded, 1);
    assert_eq!(session.entry(0).await.unwrap().state, EntryState::Done);
}
