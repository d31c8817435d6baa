//! Search, download and delivery of SoundCloud audio

pub mod delivery;
pub mod discovery;
pub mod error;
pub mod orchestrator;
pub mod progress;
pub mod search;
pub mod source;
pub mod temp;

// Re-exports for convenience
pub use delivery::{AudioUpload, DeliverySink};
pub use discovery::{Discovery, SmartPlaylist, SMART_PLAYLISTS};
pub use error::{DeliveryFailure, ExtractorError};
pub use orchestrator::{DownloadOrchestrator, SizeEstimate};
pub use progress::{ProgressTracker, Stage};
pub use search::SearchService;
pub use source::{Extractor, MediaInfo, YtDlpExtractor};
pub use temp::ScopedTempDir;
