//! Delivery sink that records every call instead of talking to Telegram

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Mutex;

use cloudtune::download::{AudioUpload, DeliveryFailure, DeliverySink, Stage};
use cloudtune::{AppError, AppResult, Track};

#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Stage(Stage),
    ExternalLink { url: String, size_mb: f64, limit_mb: f64 },
    Audio(AudioUpload),
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SinkEvent>>,
    fail_upload: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink whose uploads are rejected
    pub fn failing_upload() -> Self {
        Self {
            fail_upload: true,
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn stages(&self) -> Vec<Stage> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SinkEvent::Stage(stage) => Some(stage),
                _ => None,
            })
            .collect()
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages().iter().map(Stage::name).collect()
    }

    pub fn uploads(&self) -> Vec<AudioUpload> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SinkEvent::Audio(upload) => Some(upload),
                _ => None,
            })
            .collect()
    }

    pub fn external_links(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SinkEvent::ExternalLink { url, .. } => Some(url),
                _ => None,
            })
            .collect()
    }

    /// Failure carried by the terminal stage, if it was an error
    pub fn failure(&self) -> Option<DeliveryFailure> {
        self.stages().into_iter().rev().find_map(|s| match s {
            Stage::Error(failure) => Some(failure),
            _ => None,
        })
    }
}

#[async_trait]
impl DeliverySink for RecordingSink {
    async fn show_stage(&self, stage: &Stage, _track: &Track) {
        self.events.lock().unwrap().push(SinkEvent::Stage(stage.clone()));
    }

    async fn offer_external_link(&self, track: &Track, size_mb: f64, limit_mb: f64) {
        self.events.lock().unwrap().push(SinkEvent::ExternalLink {
            url: track.webpage_url.clone(),
            size_mb,
            limit_mb,
        });
    }

    async fn send_audio(&self, upload: AudioUpload) -> AppResult<()> {
        if self.fail_upload {
            return Err(AppError::Validation("upload rejected".to_string()));
        }
        // The file must still be on disk while it is being uploaded
        assert!(upload.path.exists(), "upload path {} is gone", upload.path.display());
        self.events.lock().unwrap().push(SinkEvent::Audio(upload));
        Ok(())
    }
}
