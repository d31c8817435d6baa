//! Delivery stages and the state machine that orders them.

use unic_langid::LanguageIdentifier;

use crate::core::types::Track;
use crate::core::utils::{escape_html, truncate_chars};
use crate::download::delivery::DeliverySink;
use crate::download::error::DeliveryFailure;
use crate::i18n;

/// Stage of a single delivery attempt, as shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Searching,
    Downloading,
    Processing,
    Sending,
    Success,
    Error(DeliveryFailure),
}

impl Stage {
    /// Position in the forward order; terminal stages share the last slot.
    fn rank(&self) -> u8 {
        match self {
            Stage::Searching => 0,
            Stage::Downloading => 1,
            Stage::Processing => 2,
            Stage::Sending => 3,
            Stage::Success | Stage::Error(_) => 4,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Success | Stage::Error(_))
    }

    /// Progress shown in the bar
    pub fn percent(&self) -> u8 {
        match self {
            Stage::Searching => 10,
            Stage::Downloading => 35,
            Stage::Processing => 65,
            Stage::Sending => 85,
            Stage::Success => 100,
            Stage::Error(_) => 0,
        }
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Searching => "searching",
            Stage::Downloading => "downloading",
            Stage::Processing => "processing",
            Stage::Sending => "sending",
            Stage::Success => "success",
            Stage::Error(_) => "error",
        }
    }
}

/// Enforces the stage order of one pipeline run.
///
/// A run starts at `Searching` or `Downloading`, then moves strictly one
/// step forward at a time. `Error` is accepted from any non-terminal point,
/// including before anything was emitted, and exactly one terminal stage is
/// ever accepted.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    current: Option<Stage>,
    history: Vec<Stage>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether moving to `next` is a legal transition.
    pub fn can_advance(&self, next: &Stage) -> bool {
        match (&self.current, next) {
            (Some(cur), _) if cur.is_terminal() => false,
            (_, Stage::Error(_)) => true,
            (None, Stage::Searching | Stage::Downloading) => true,
            (None, _) => false,
            (Some(cur), next) => next.rank() == cur.rank() + 1,
        }
    }

    /// Records `next` if legal. Illegal transitions are logged and dropped.
    pub fn advance(&mut self, next: Stage) -> bool {
        if !self.can_advance(&next) {
            log::warn!(
                "⚠️ Ignoring stage transition {:?} -> {}",
                self.current.as_ref().map(Stage::name),
                next.name()
            );
            return false;
        }
        self.history.push(next.clone());
        self.current = Some(next);
        true
    }

    /// Records the transition and forwards it to the sink.
    pub async fn emit(&mut self, sink: &dyn DeliverySink, stage: Stage, track: &Track) {
        if !self.advance(stage.clone()) {
            return;
        }
        log::debug!("Stage {} for '{}'", stage.name(), track.title);
        sink.show_stage(&stage, track).await;
    }

    pub fn current(&self) -> Option<&Stage> {
        self.current.as_ref()
    }

    pub fn history(&self) -> &[Stage] {
        &self.history
    }

    pub fn is_finished(&self) -> bool {
        self.current.as_ref().is_some_and(Stage::is_terminal)
    }
}

/// Ten-cell bar, e.g. `[███░░░░░░░] 35%`
fn progress_bar(percent: u8) -> String {
    let percent = percent.min(100);
    let filled = (percent / 10) as usize;
    format!("[{}{}] {}%", "█".repeat(filled), "░".repeat(10 - filled), percent)
}

/// Localized status line for a stage, with the bar and a short title.
pub fn render_status(lang: &LanguageIdentifier, stage: &Stage, title: &str) -> String {
    let label = match stage {
        Stage::Searching => i18n::t(lang, "searching"),
        Stage::Downloading => i18n::t(lang, "downloading"),
        Stage::Processing => i18n::t(lang, "processing"),
        Stage::Sending => i18n::t(lang, "sending"),
        Stage::Success => i18n::t(lang, "success"),
        Stage::Error(DeliveryFailure::Timeout { .. }) => i18n::t(lang, "error-timeout"),
        Stage::Error(DeliveryFailure::TooLarge { .. }) => i18n::t(lang, "error-too-large"),
        Stage::Error(_) => i18n::t(lang, "error"),
    };

    let short_title = escape_html(&truncate_chars(title, 30));
    if matches!(stage, Stage::Error(_)) {
        return format!("{}\n🎵 {}", label, short_title);
    }
    format!("{}\n{}\n🎵 {}", label, progress_bar(stage.percent()), short_title)
}
