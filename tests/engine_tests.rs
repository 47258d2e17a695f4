//! Integration tests for the extraction and concatenation engines

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{request, Event, MockConcat, MockTranscoder, RecordingReporter};
use highlight_reel::{
    Acceleration, CancelToken, ConcatStage, ExtractionOrchestrator, ExtractionStatus, RunOutcome,
    SegmentRequest,
};
use tempfile::TempDir;

fn requests(temp: &TempDir, count: usize) -> Vec<SegmentRequest> {
    (0..count).map(|i| request(temp.path(), i)).collect()
}

// Extraction orchestrator

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrency_never_exceeds_cap() {
    let temp = TempDir::new().unwrap();
    let transcoder = Arc::new(MockTranscoder::default().with_delay(Duration::from_millis(30)));
    let reporter = Arc::new(RecordingReporter::default());
    let orchestrator = ExtractionOrchestrator::new(transcoder.clone(), reporter.clone());

    let status = orchestrator
        .run(&requests(&temp, 20), Acceleration::Software, &CancelToken::new())
        .await;

    assert_eq!(status, ExtractionStatus::Finished { dispatched: 20 });
    assert_eq!(transcoder.calls(), 20);
    assert!(transcoder.max_in_flight() <= 4);
    assert!(transcoder.max_in_flight() > 1);
}

#[tokio::test]
async fn test_progress_reaches_extraction_ceiling() {
    let temp = TempDir::new().unwrap();
    let transcoder = Arc::new(MockTranscoder::default());
    let reporter = Arc::new(RecordingReporter::default());
    let orchestrator = ExtractionOrchestrator::new(transcoder, reporter.clone());

    orchestrator
        .run(&requests(&temp, 7), Acceleration::Software, &CancelToken::new())
        .await;

    let progress = reporter.progress();
    assert_eq!(progress.len(), 7);
    assert!(progress.windows(2).all(|w| w[0] <= w[1]));
    assert!(progress.iter().all(|p| *p <= 80));
    assert_eq!(progress.last(), Some(&80));
}

#[tokio::test]
async fn test_failures_do_not_stop_siblings() {
    let temp = TempDir::new().unwrap();
    let transcoder = Arc::new(
        MockTranscoder::default().failing_when(|r| r.start_seconds < 30.0),
    );
    let reporter = Arc::new(RecordingReporter::default());
    let orchestrator = ExtractionOrchestrator::new(transcoder.clone(), reporter.clone());
    let planned = requests(&temp, 5);

    let status = orchestrator
        .run(&planned, Acceleration::Software, &CancelToken::new())
        .await;

    assert!(!status.is_cancelled());
    assert_eq!(transcoder.calls(), 5);
    assert_eq!(reporter.progress().last(), Some(&80));

    let logs = reporter.logs();
    let failures = logs.iter().filter(|l| l.starts_with("Failed to extract")).count();
    let successes = logs.iter().filter(|l| l.starts_with("Extracted segment:")).count();
    assert_eq!(failures, 3);
    assert_eq!(successes, 2);

    assert!(!planned[0].output_path.exists());
    assert!(planned[3].output_path.exists());
    assert!(planned[4].output_path.exists());
}

#[tokio::test]
async fn test_cancelled_before_dispatch_submits_nothing() {
    let temp = TempDir::new().unwrap();
    let transcoder = Arc::new(MockTranscoder::default());
    let reporter = Arc::new(RecordingReporter::default());
    let orchestrator = ExtractionOrchestrator::new(transcoder.clone(), reporter.clone());

    let token = CancelToken::new();
    token.cancel();
    let status = orchestrator
        .run(&requests(&temp, 6), Acceleration::Software, &token)
        .await;

    assert_eq!(
        status,
        ExtractionStatus::Cancelled {
            dispatched: 0,
            skipped: 6
        }
    );
    assert_eq!(transcoder.calls(), 0);
    assert!(reporter.progress().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cancel_mid_run_drains_in_flight_work() {
    let temp = TempDir::new().unwrap();
    let transcoder = Arc::new(MockTranscoder::default().with_delay(Duration::from_millis(200)));
    let reporter = Arc::new(RecordingReporter::default());
    let orchestrator = ExtractionOrchestrator::new(transcoder.clone(), reporter.clone());
    let planned = requests(&temp, 12);

    let token = CancelToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let status = orchestrator.run(&planned, Acceleration::Software, &token).await;

    assert!(status.is_cancelled());
    assert!(status.dispatched() <= 4);
    assert_eq!(transcoder.calls(), status.dispatched());
    // Every dispatched task finished before run returned
    assert_eq!(reporter.progress().len(), status.dispatched());
}

#[tokio::test]
async fn test_timeout_counts_as_segment_failure() {
    let temp = TempDir::new().unwrap();
    let transcoder = Arc::new(MockTranscoder::default().with_delay(Duration::from_secs(5)));
    let reporter = Arc::new(RecordingReporter::default());
    let orchestrator = ExtractionOrchestrator::new(transcoder, reporter.clone())
        .with_timeout(Some(Duration::from_millis(50)));
    let planned = requests(&temp, 2);

    let status = orchestrator
        .run(&planned, Acceleration::Software, &CancelToken::new())
        .await;

    assert_eq!(status, ExtractionStatus::Finished { dispatched: 2 });
    let logs = reporter.logs();
    assert_eq!(logs.len(), 2);
    assert!(logs.iter().all(|l| l.contains("timed out")));
    assert!(planned.iter().all(|r| !r.output_path.exists()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_panic_stops_dispatch_and_drains_siblings() {
    let temp = TempDir::new().unwrap();
    let transcoder = Arc::new(
        MockTranscoder::default()
            .with_delay(Duration::from_millis(200))
            .panicking_when(|r| r.start_seconds == 0.0),
    );
    let reporter = Arc::new(RecordingReporter::default());
    let orchestrator = ExtractionOrchestrator::new(transcoder.clone(), reporter.clone());
    let planned = requests(&temp, 10);

    let joined = tokio::spawn(async move {
        orchestrator
            .run(&planned, Acceleration::Software, &CancelToken::new())
            .await
    })
    .await;

    let err = joined.unwrap_err();
    assert!(err.is_panic());
    assert_eq!(transcoder.in_flight(), 0);
    assert!(transcoder.calls() < 10);
    // Every sibling finished and reported before the panic surfaced
    assert_eq!(reporter.progress().len(), transcoder.calls() - 1);
}

// Concatenation stage

#[tokio::test]
async fn test_concat_uses_survivors_in_planned_order() {
    let temp = TempDir::new().unwrap();
    let planned = requests(&temp, 4);
    std::fs::write(&planned[0].output_path, b"a").unwrap();
    std::fs::write(&planned[2].output_path, b"c").unwrap();
    std::fs::write(&planned[3].output_path, b"d").unwrap();

    let concat = Arc::new(MockConcat::default());
    let reporter = Arc::new(RecordingReporter::default());
    let output = temp.path().join("reel.mp4");

    let outcome = ConcatStage::new(concat.clone(), reporter.clone())
        .run(&planned, &output, Acceleration::Software)
        .await;

    assert_eq!(
        outcome,
        RunOutcome::Completed {
            output_path: output.clone()
        }
    );
    assert_eq!(
        concat.calls(),
        vec![vec![
            planned[0].output_path.clone(),
            planned[2].output_path.clone(),
            planned[3].output_path.clone(),
        ]]
    );
    assert!(reporter
        .logs()
        .contains(&"Concatenating 3 of 4 segments...".to_string()));
    assert_eq!(reporter.events().last(), Some(&Event::Progress(100)));
    assert!(output.exists());
    assert!(planned.iter().all(|r| !r.output_path.exists()));
}

#[tokio::test]
async fn test_concat_without_survivors_fails() {
    let temp = TempDir::new().unwrap();
    let planned = requests(&temp, 3);
    let concat = Arc::new(MockConcat::default());
    let reporter = Arc::new(RecordingReporter::default());

    let outcome = ConcatStage::new(concat.clone(), reporter.clone())
        .run(&planned, &temp.path().join("reel.mp4"), Acceleration::Software)
        .await;

    assert_eq!(outcome, RunOutcome::failed("Extraction failed for all segments"));
    assert!(concat.calls().is_empty());
    assert!(reporter.progress().is_empty());
}

#[tokio::test]
async fn test_concat_failure_keeps_segments() {
    let temp = TempDir::new().unwrap();
    let planned = requests(&temp, 2);
    for request in &planned {
        std::fs::write(&request.output_path, b"x").unwrap();
    }
    let concat = Arc::new(MockConcat::failing());
    let reporter = Arc::new(RecordingReporter::default());

    let outcome = ConcatStage::new(concat, reporter.clone())
        .run(&planned, &temp.path().join("reel.mp4"), Acceleration::Software)
        .await;

    match outcome {
        RunOutcome::Failed { message } => {
            assert!(message.starts_with("Concat failed:"));
            assert!(message.contains("Invalid data found"));
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert!(!reporter.progress().contains(&100));
    assert!(planned.iter().all(|r| r.output_path.exists()));
}

#[tokio::test]
async fn test_directory_at_segment_path_is_not_a_survivor() {
    let temp = TempDir::new().unwrap();
    let planned = requests(&temp, 2);
    std::fs::create_dir(&planned[0].output_path).unwrap();
    std::fs::write(&planned[1].output_path, b"x").unwrap();

    let survivors = highlight_reel::engine::concat::existing_segments(&planned).await;

    assert_eq!(survivors, vec![planned[1].output_path.clone()]);
}
