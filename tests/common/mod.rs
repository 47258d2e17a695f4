//! Mock collaborators shared by the integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use highlight_reel::ports::{ConcatPort, ProbePort, ReportPort, TranscodePort};
use highlight_reel::{Acceleration, DomainError, JobConfig, PipelinePorts, SegmentRequest};
use tempfile::TempDir;

/// Probe answering from a fixed table; unknown paths fail
#[derive(Default)]
pub struct MockProbe {
    durations: HashMap<PathBuf, f64>,
}

impl MockProbe {
    pub fn with(mut self, path: impl Into<PathBuf>, duration: f64) -> Self {
        self.durations.insert(path.into(), duration);
        self
    }
}

#[async_trait]
impl ProbePort for MockProbe {
    async fn probe_duration(&self, file_path: &Path) -> Result<f64, DomainError> {
        self.durations
            .get(file_path)
            .copied()
            .ok_or_else(|| DomainError::ProbeFailed {
                path: file_path.display().to_string(),
                message: "no such file".to_string(),
            })
    }
}

type FailRule = Box<dyn Fn(&SegmentRequest) -> bool + Send + Sync>;

/// Transcoder that writes a small file per segment and tracks concurrency
pub struct MockTranscoder {
    delay: Duration,
    fail_rule: FailRule,
    panic_rule: FailRule,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl Default for MockTranscoder {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(5),
            fail_rule: Box::new(|_| false),
            panic_rule: Box::new(|_| false),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }
}

impl MockTranscoder {
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing_when<F>(mut self, rule: F) -> Self
    where
        F: Fn(&SegmentRequest) -> bool + Send + Sync + 'static,
    {
        self.fail_rule = Box::new(rule);
        self
    }

    pub fn panicking(self) -> Self {
        self.panicking_when(|_| true)
    }

    /// Panic immediately, before sleeping, for matching requests
    pub fn panicking_when<F>(mut self, rule: F) -> Self
    where
        F: Fn(&SegmentRequest) -> bool + Send + Sync + 'static,
    {
        self.panic_rule = Box::new(rule);
        self
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranscodePort for MockTranscoder {
    async fn extract(
        &self,
        request: &SegmentRequest,
        _acceleration: Acceleration,
    ) -> Result<String, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if (self.panic_rule)(request) {
            panic!("transcoder exploded");
        }
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if (self.fail_rule)(request) {
            return Err(DomainError::TranscodeFailed {
                message: "mock failure".to_string(),
                diagnostics: "corrupt input".to_string(),
            });
        }

        if let Some(dir) = request.output_path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        tokio::fs::write(&request.output_path, b"segment").await?;
        Ok("ok".to_string())
    }
}

/// Concatenator recording every call
#[derive(Default)]
pub struct MockConcat {
    fail: bool,
    calls: Mutex<Vec<Vec<PathBuf>>>,
}

impl MockConcat {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Vec<PathBuf>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConcatPort for MockConcat {
    async fn concat(
        &self,
        segments: &[PathBuf],
        output_path: &Path,
        _acceleration: Acceleration,
    ) -> Result<String, DomainError> {
        self.calls.lock().unwrap().push(segments.to_vec());
        if self.fail {
            return Err(DomainError::ConcatFailed {
                message: "ffmpeg exited with exit status: 1".to_string(),
                diagnostics: "Invalid data found when processing input".to_string(),
            });
        }
        if let Some(dir) = output_path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        tokio::fs::write(output_path, b"reel").await?;
        Ok(String::new())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Log(String),
    Progress(u32),
    Finished(bool, String),
}

/// Reporter keeping every event in order
#[derive(Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<Event>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn progress(&self) -> Vec<u32> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Progress(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn logs(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Log(line) => Some(line),
                _ => None,
            })
            .collect()
    }

    pub fn finished(&self) -> Vec<(bool, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Finished(success, message) => Some((success, message)),
                _ => None,
            })
            .collect()
    }
}

impl ReportPort for RecordingReporter {
    fn log(&self, message: &str) {
        self.events.lock().unwrap().push(Event::Log(message.to_string()));
    }

    fn progress(&self, percent: u32) {
        self.events.lock().unwrap().push(Event::Progress(percent));
    }

    fn finished(&self, success: bool, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Finished(success, message.to_string()));
    }
}

/// Mocks plus the port bundle built from them
pub struct Harness {
    pub probe: Arc<MockProbe>,
    pub transcoder: Arc<MockTranscoder>,
    pub concat: Arc<MockConcat>,
    pub reporter: Arc<RecordingReporter>,
}

impl Harness {
    pub fn new(probe: MockProbe, transcoder: MockTranscoder, concat: MockConcat) -> Self {
        Self {
            probe: Arc::new(probe),
            transcoder: Arc::new(transcoder),
            concat: Arc::new(concat),
            reporter: Arc::new(RecordingReporter::default()),
        }
    }

    pub fn ports(&self) -> PipelinePorts {
        PipelinePorts {
            probe: self.probe.clone(),
            transcoder: self.transcoder.clone(),
            concatenator: self.concat.clone(),
            reporter: self.reporter.clone(),
        }
    }
}

/// Sequential plan of `count` one-minute segments per file after a one
/// minute offset, writing into `temp`
pub fn sequential_config(temp: &TempDir, files: &[&str], count: u32) -> JobConfig {
    JobConfig {
        files: files.iter().map(PathBuf::from).collect(),
        count_min: count,
        count_max: count,
        segment_min: 60,
        segment_max: 60,
        start_offset_min: 1,
        output_path: temp.path().join("out").join("reel.mp4"),
        scratch_dir: Some(temp.path().join("segments")),
        seed: Some(1),
        ..JobConfig::default()
    }
}

/// Segment request writing into `dir`
pub fn request(dir: &Path, index: usize) -> SegmentRequest {
    SegmentRequest {
        source_path: PathBuf::from(format!("source_{}.mp4", index)),
        start_seconds: index as f64 * 10.0,
        duration_seconds: 10.0,
        output_path: dir.join(format!("source_{}_seg_0_{}.mp4", index, index)),
    }
}
