pub mod models;
pub mod options;
pub mod traits;
pub mod ytdlp;

pub use models::{DownloadResult, EngineFormat, EngineInfo, MediaInfo};
pub use options::{AudioCodec, Bitrate, DownloadOptions, MediaType, Quality, VideoCodec};
pub use traits::Extractor;
pub use ytdlp::YtDlpExtractor;
