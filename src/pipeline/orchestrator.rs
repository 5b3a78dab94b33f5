//! Sequences the pipeline stages on a worker thread.
//!
//! One run at a time: media file in, subtitle files out. The orchestrator
//! owns two cross-cutting concerns beyond sequencing. First, accelerator
//! memory: the recognition model and the style models are never resident
//! together; the recognition model is released before the style engine
//! loads. Second, cancellation: a flag checked at every stage boundary.
//! An in-flight stage always completes, but no further stage starts once
//! cancellation is observed.

use crate::asr::prompt::build_prompt;
use crate::asr::Transcriber;
use crate::audio::extractor::{AudioExtractor, CommandExecutor};
use crate::audio::Waveform;
use crate::defaults;
use crate::error::{CantosubError, Result};
use crate::export::{export, SubtitleFormat};
use crate::merge::merge_segments;
use crate::pipeline::progress::{ProgressSender, ProgressUpdate, RunOutcome, Stage};
use crate::segment::StyledSegment;
use crate::style::{StyleEngine, StyleOptions};
use crate::vad::VoiceDetector;
use crossbeam_channel::{bounded, Receiver};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Media decoding seam so runs can be driven without ffmpeg.
pub trait MediaDecoder: Send {
    fn extract(&self, media: &Path) -> Result<Waveform>;
}

impl<E: CommandExecutor> MediaDecoder for AudioExtractor<E> {
    fn extract(&self, media: &Path) -> Result<Waveform> {
        AudioExtractor::extract(self, media)
    }
}

/// Deferred loader for the recognition model.
///
/// The backend is chosen once at orchestrator construction; the model
/// itself is loaded only when the transcription stage starts and released
/// as soon as it ends.
pub trait AsrBackend: Send {
    fn load(&self) -> Result<Box<dyn Transcriber>>;

    fn name(&self) -> &str;
}

/// Deferred loader for the style engine and its model handles.
pub trait StyleBackend: Send {
    fn load(&self) -> Result<StyleEngine>;
}

/// AsrBackend over the Whisper transcriber.
pub struct WhisperBackend {
    pub config: crate::asr::whisper::WhisperConfig,
}

impl AsrBackend for WhisperBackend {
    fn load(&self) -> Result<Box<dyn Transcriber>> {
        let transcriber = crate::asr::whisper::WhisperTranscriber::new(self.config.clone())?;
        Ok(Box::new(transcriber))
    }

    fn name(&self) -> &str {
        "whisper"
    }
}

/// Options for one run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Language hint for the recognizer.
    pub language: String,
    /// Extra vocabulary appended to the recognition prompt.
    pub custom_vocabulary: Option<String>,
    /// Merge gap tolerance in seconds.
    pub max_gap: f64,
    /// Style options applied to every segment.
    pub style: StyleOptions,
    /// Formats to write; each is attempted independently.
    pub formats: Vec<SubtitleFormat>,
    /// Directory receiving the subtitle files.
    pub output_dir: PathBuf,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            language: defaults::DEFAULT_LANGUAGE.to_string(),
            custom_vocabulary: None,
            max_gap: defaults::MAX_GAP_SECS,
            style: StyleOptions::default(),
            formats: vec![SubtitleFormat::Srt],
            output_dir: PathBuf::from("."),
        }
    }
}

/// Scope guard for a loaded model.
///
/// Dropping the guard drops the model, which releases its memory. Putting
/// the release in Drop guarantees it on every exit path out of a stage,
/// including errors, so a failed run still leaves a clean baseline.
struct ModelScope<T> {
    inner: Option<T>,
    label: &'static str,
}

impl<T> ModelScope<T> {
    fn new(inner: T, label: &'static str) -> Self {
        Self {
            inner: Some(inner),
            label,
        }
    }
}

impl<T> std::ops::Deref for ModelScope<T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.inner.as_ref().unwrap_or_else(|| unreachable!())
    }
}

impl<T> std::ops::DerefMut for ModelScope<T> {
    fn deref_mut(&mut self) -> &mut T {
        self.inner.as_mut().unwrap_or_else(|| unreachable!())
    }
}

impl<T> Drop for ModelScope<T> {
    fn drop(&mut self) {
        self.inner = None;
        eprintln!("cantosub: released {}", self.label);
    }
}

/// Handle to a running pipeline.
pub struct RunHandle {
    cancel: Arc<AtomicBool>,
    progress_rx: Receiver<ProgressUpdate>,
    outcome_rx: Receiver<RunOutcome>,
    thread: Option<JoinHandle<()>>,
}

impl RunHandle {
    /// Request cooperative cancellation.
    ///
    /// The stage currently in flight completes; no further stage starts.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// Progress updates published by the worker.
    pub fn progress(&self) -> &Receiver<ProgressUpdate> {
        &self.progress_rx
    }

    /// Block until the run reaches a terminal state.
    pub fn wait(mut self) -> RunOutcome {
        let outcome = self.outcome_rx.recv().unwrap_or_else(|_| {
            RunOutcome::Failed(CantosubError::Other(
                "pipeline worker exited without an outcome".to_string(),
            ))
        });

        if let Some(handle) = self.thread.take()
            && let Err(panic_info) = handle.join()
        {
            let msg = panic_info
                .downcast_ref::<&str>()
                .copied()
                .or_else(|| panic_info.downcast_ref::<String>().map(|s| s.as_str()))
                .unwrap_or("unknown panic");
            eprintln!("cantosub: pipeline worker panicked: {msg}");
        }

        outcome
    }
}

/// Pipeline orchestrator.
///
/// Collaborators are injected once at construction; `start` consumes the
/// orchestrator and runs the whole pipeline on one worker thread so the
/// caller's loop stays responsive.
pub struct Orchestrator {
    decoder: Box<dyn MediaDecoder>,
    detector: Box<dyn VoiceDetector>,
    asr: Box<dyn AsrBackend>,
    style: Box<dyn StyleBackend>,
    options: PipelineOptions,
}

impl Orchestrator {
    pub fn new(
        decoder: Box<dyn MediaDecoder>,
        detector: Box<dyn VoiceDetector>,
        asr: Box<dyn AsrBackend>,
        style: Box<dyn StyleBackend>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            decoder,
            detector,
            asr,
            style,
            options,
        }
    }

    /// Start the run on a worker thread.
    pub fn start(self, media: PathBuf) -> RunHandle {
        let cancel = Arc::new(AtomicBool::new(false));
        let (progress_tx, progress_rx) = bounded(64);
        let (outcome_tx, outcome_rx) = bounded(1);

        let worker_cancel = cancel.clone();
        let thread = thread::spawn(move || {
            let mut progress = ProgressSender::new(progress_tx);
            let outcome = match self.execute(&media, &worker_cancel, &mut progress) {
                Ok(Some(output_paths)) => RunOutcome::Done { output_paths },
                Ok(None) => RunOutcome::Cancelled,
                Err(e) => RunOutcome::Failed(e),
            };
            let _ = outcome_tx.send(outcome);
        });

        RunHandle {
            cancel,
            progress_rx,
            outcome_rx,
            thread: Some(thread),
        }
    }

    /// Run all stages. Returns Ok(None) when cancellation was observed.
    fn execute(
        &self,
        media: &Path,
        cancel: &AtomicBool,
        progress: &mut ProgressSender,
    ) -> Result<Option<Vec<PathBuf>>> {
        progress.stage(Stage::ExtractingAudio);
        let waveform = self.decoder.extract(media)?;
        if cancel.load(Ordering::SeqCst) {
            return Ok(None);
        }

        progress.stage(Stage::DetectingVoice);
        let intervals = self.detector.detect(&waveform)?;
        if cancel.load(Ordering::SeqCst) {
            return Ok(None);
        }

        progress.stage(Stage::Transcribing);
        let speech = {
            let asr = ModelScope::new(self.asr.load()?, "recognition model");
            let prompt = build_prompt(self.options.custom_vocabulary.as_deref());
            asr.transcribe(&waveform, &self.options.language, Some(&prompt))?
            // Scope ends: the recognition model is released before the
            // style models load. Peak memory is the largest single model,
            // not the sum.
        };
        if cancel.load(Ordering::SeqCst) {
            return Ok(None);
        }

        progress.stage(Stage::MergingSegments);
        let merged = merge_segments(&speech, &intervals, self.options.max_gap);
        if cancel.load(Ordering::SeqCst) {
            return Ok(None);
        }

        progress.stage(Stage::ApplyingStyle);
        let styled: Vec<StyledSegment> = {
            let mut engine = ModelScope::new(self.style.load()?, "style models");
            let total = merged.len().max(1);
            merged
                .iter()
                .enumerate()
                .map(|(i, seg)| {
                    let percent = Stage::ApplyingStyle.base_percent()
                        + (i * 20 / total) as u8;
                    progress.publish(Stage::ApplyingStyle, percent);
                    StyledSegment::new(seg.span, engine.transform(&seg.text, &self.options.style))
                })
                .collect()
        };
        if cancel.load(Ordering::SeqCst) {
            return Ok(None);
        }

        progress.stage(Stage::Exporting);
        let paths = self.export_all(media, &styled)?;

        progress.stage(Stage::Done);
        Ok(Some(paths))
    }

    /// Write every requested format. One format failing does not block
    /// the others; the run fails only when nothing could be written.
    fn export_all(&self, media: &Path, styled: &[StyledSegment]) -> Result<Vec<PathBuf>> {
        let stem = media
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("subtitles");

        let mut paths = Vec::new();
        let mut last_error = None;
        for format in &self.options.formats {
            let path = self
                .options
                .output_dir
                .join(format!("{}.{}", stem, format.extension()));
            match export(styled, &path, *format) {
                Ok(()) => paths.push(path),
                Err(e) => {
                    eprintln!("cantosub: {e}");
                    last_error = Some(e);
                }
            }
        }

        match (paths.is_empty(), last_error) {
            (true, Some(e)) => Err(e),
            _ => Ok(paths),
        }
    }
}
