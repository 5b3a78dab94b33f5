//! Run stages, progress reporting and terminal outcomes.

use crate::error::CantosubError;
use crossbeam_channel::Sender;
use std::path::PathBuf;

/// Stages of one pipeline run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    ExtractingAudio,
    DetectingVoice,
    Transcribing,
    MergingSegments,
    ApplyingStyle,
    Exporting,
    Done,
}

impl Stage {
    /// Human-readable label shown to the caller.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Idle => "準備中",
            Stage::ExtractingAudio => "提取音頻",
            Stage::DetectingVoice => "偵測語音",
            Stage::Transcribing => "語音識別",
            Stage::MergingSegments => "優化斷句",
            Stage::ApplyingStyle => "轉換風格",
            Stage::Exporting => "輸出字幕",
            Stage::Done => "完成",
        }
    }

    /// Percentage at which this stage begins.
    pub fn base_percent(&self) -> u8 {
        match self {
            Stage::Idle => 0,
            Stage::ExtractingAudio => 0,
            Stage::DetectingVoice => 15,
            Stage::Transcribing => 25,
            Stage::MergingSegments => 60,
            Stage::ApplyingStyle => 70,
            Stage::Exporting => 90,
            Stage::Done => 100,
        }
    }
}

/// One progress observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub stage: Stage,
    pub percent: u8,
}

impl ProgressUpdate {
    pub fn label(&self) -> &'static str {
        self.stage.label()
    }
}

/// Terminal result of one run.
#[derive(Debug)]
pub enum RunOutcome {
    /// All requested formats written (paths of the successful ones).
    Done { output_paths: Vec<PathBuf> },
    /// A stage failed; resources were released before this was reported.
    Failed(CantosubError),
    /// Cancellation observed at a stage boundary.
    Cancelled,
}

impl RunOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self, RunOutcome::Done { .. })
    }
}

/// Monotone progress publisher.
///
/// Percentages never go backwards regardless of what stages report, and
/// updates are best-effort: a full or disconnected channel drops the
/// update rather than blocking the worker.
pub struct ProgressSender {
    tx: Sender<ProgressUpdate>,
    last_percent: u8,
}

impl ProgressSender {
    pub fn new(tx: Sender<ProgressUpdate>) -> Self {
        Self {
            tx,
            last_percent: 0,
        }
    }

    /// Publish entry into a stage at its base percentage.
    pub fn stage(&mut self, stage: Stage) {
        self.publish(stage, stage.base_percent());
    }

    /// Publish an intermediate percentage within a stage.
    pub fn publish(&mut self, stage: Stage, percent: u8) {
        let percent = percent.clamp(self.last_percent, 100);
        self.last_percent = percent;
        let _ = self.tx.try_send(ProgressUpdate { stage, percent });
    }

    pub fn last_percent(&self) -> u8 {
        self.last_percent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    #[test]
    fn stage_percents_are_monotone_over_execution_order() {
        let order = [
            Stage::Idle,
            Stage::ExtractingAudio,
            Stage::DetectingVoice,
            Stage::Transcribing,
            Stage::MergingSegments,
            Stage::ApplyingStyle,
            Stage::Exporting,
            Stage::Done,
        ];
        for pair in order.windows(2) {
            assert!(pair[0].base_percent() <= pair[1].base_percent());
        }
        assert_eq!(Stage::Done.base_percent(), 100);
    }

    #[test]
    fn every_stage_has_a_label() {
        for stage in [
            Stage::Idle,
            Stage::ExtractingAudio,
            Stage::DetectingVoice,
            Stage::Transcribing,
            Stage::MergingSegments,
            Stage::ApplyingStyle,
            Stage::Exporting,
            Stage::Done,
        ] {
            assert!(!stage.label().is_empty());
        }
    }

    #[test]
    fn progress_never_decreases() {
        let (tx, rx) = bounded(16);
        let mut sender = ProgressSender::new(tx);

        sender.publish(Stage::Transcribing, 50);
        sender.publish(Stage::Transcribing, 30); // late, clamped up
        sender.publish(Stage::MergingSegments, 60);

        let percents: Vec<u8> = rx.try_iter().map(|u| u.percent).collect();
        assert_eq!(percents, vec![50, 50, 60]);
    }

    #[test]
    fn progress_caps_at_100() {
        let (tx, rx) = bounded(16);
        let mut sender = ProgressSender::new(tx);

        sender.publish(Stage::Done, 250);
        assert_eq!(rx.recv().unwrap().percent, 100);
    }

    #[test]
    fn full_channel_does_not_block() {
        let (tx, _rx) = bounded(1);
        let mut sender = ProgressSender::new(tx);

        // Second send would block a blocking sender; try_send drops it
        sender.publish(Stage::Transcribing, 30);
        sender.publish(Stage::Transcribing, 40);
        assert_eq!(sender.last_percent(), 40);
    }

    #[test]
    fn disconnected_channel_does_not_panic() {
        let (tx, rx) = bounded(1);
        drop(rx);
        let mut sender = ProgressSender::new(tx);
        sender.publish(Stage::Exporting, 95);
    }

    #[test]
    fn outcome_is_done() {
        assert!(
            RunOutcome::Done {
                output_paths: vec![]
            }
            .is_done()
        );
        assert!(!RunOutcome::Cancelled.is_done());
        assert!(!RunOutcome::Failed(CantosubError::Cancelled).is_done());
    }
}
