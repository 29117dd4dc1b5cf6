//! Download options and their yt-dlp argument mapping

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Video,
    Audio,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoCodec {
    #[default]
    Mp4,
    Webm,
}

impl VideoCodec {
    pub fn extension(&self) -> &'static str {
        match self {
            VideoCodec::Mp4 => "mp4",
            VideoCodec::Webm => "webm",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCodec {
    #[default]
    Mp3,
    M4a,
    Opus,
    Wav,
}

impl AudioCodec {
    pub fn extension(&self) -> &'static str {
        match self {
            AudioCodec::Mp3 => "mp3",
            AudioCodec::M4a => "m4a",
            AudioCodec::Opus => "opus",
            AudioCodec::Wav => "wav",
        }
    }
}

/// JSON clients send enumerated numbers either quoted or bare.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumberOrString {
    Number(u64),
    String(String),
}

impl NumberOrString {
    fn as_u32(&self) -> Option<u32> {
        match self {
            NumberOrString::Number(n) => u32::try_from(*n).ok(),
            NumberOrString::String(s) => s.trim().parse().ok(),
        }
    }
}

/// Maximum video height
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "NumberOrString", into = "u32")]
pub enum Quality {
    #[default]
    P1080,
    P720,
    P480,
    P360,
}

impl Quality {
    pub fn height(&self) -> u32 {
        match self {
            Quality::P1080 => 1080,
            Quality::P720 => 720,
            Quality::P480 => 480,
            Quality::P360 => 360,
        }
    }
}

impl TryFrom<NumberOrString> for Quality {
    type Error = String;

    fn try_from(value: NumberOrString) -> Result<Self, Self::Error> {
        match value.as_u32() {
            Some(1080) => Ok(Quality::P1080),
            Some(720) => Ok(Quality::P720),
            Some(480) => Ok(Quality::P480),
            Some(360) => Ok(Quality::P360),
            _ => Err("quality must be one of 1080, 720, 480, 360".to_string()),
        }
    }
}

impl From<Quality> for u32 {
    fn from(quality: Quality) -> Self {
        quality.height()
    }
}

/// Audio bitrate in kbps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "NumberOrString", into = "u32")]
pub enum Bitrate {
    K320,
    #[default]
    K256,
    K128,
}

impl Bitrate {
    pub fn kbps(&self) -> u32 {
        match self {
            Bitrate::K320 => 320,
            Bitrate::K256 => 256,
            Bitrate::K128 => 128,
        }
    }
}

impl TryFrom<NumberOrString> for Bitrate {
    type Error = String;

    fn try_from(value: NumberOrString) -> Result<Self, Self::Error> {
        match value.as_u32() {
            Some(320) => Ok(Bitrate::K320),
            Some(256) => Ok(Bitrate::K256),
            Some(128) => Ok(Bitrate::K128),
            _ => Err("bitrate must be one of 320, 256, 128".to_string()),
        }
    }
}

impl From<Bitrate> for u32 {
    fn from(bitrate: Bitrate) -> Self {
        bitrate.kbps()
    }
}

/// What to fetch and how to transcode it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadOptions {
    pub media_type: MediaType,
    pub video_codec: VideoCodec,
    pub quality: Quality,
    pub audio_codec: AudioCodec,
    pub bitrate: Bitrate,
}

impl DownloadOptions {
    /// Extension of the file yt-dlp leaves behind after post-processing
    pub fn target_extension(&self) -> &'static str {
        match self.media_type {
            MediaType::Audio => self.audio_codec.extension(),
            MediaType::Video => self.video_codec.extension(),
        }
    }

    /// yt-dlp format selector
    pub fn format_selector(&self) -> String {
        match (self.media_type, self.video_codec) {
            (MediaType::Audio, _) => "bestaudio/best".to_string(),
            (MediaType::Video, VideoCodec::Mp4) => format!(
                "bestvideo[height<={}][ext=mp4][vcodec^=avc1]+bestaudio[ext=m4a]/best[ext=mp4]/best",
                self.quality.height()
            ),
            (MediaType::Video, VideoCodec::Webm) => format!(
                "bestvideo[height<={}]+bestaudio/best",
                self.quality.height()
            ),
        }
    }

    /// Selector plus post-processing arguments
    pub fn engine_args(&self) -> Vec<String> {
        let mut args = vec!["-f".to_string(), self.format_selector()];

        match self.media_type {
            MediaType::Audio => {
                args.push("--extract-audio".to_string());
                args.push("--audio-format".to_string());
                args.push(self.audio_codec.extension().to_string());
                args.push("--audio-quality".to_string());
                args.push(format!("{}K", self.bitrate.kbps()));
            }
            MediaType::Video => {
                args.push("--merge-output-format".to_string());
                args.push(self.video_codec.extension().to_string());
            }
        }

        args
    }
}

impl fmt::Display for DownloadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.media_type {
            MediaType::Audio => write!(
                f,
                "audio {} @ {}kbps",
                self.audio_codec.extension(),
                self.bitrate.kbps()
            ),
            MediaType::Video => write!(
                f,
                "video {} <= {}p",
                self.video_codec.extension(),
                self.quality.height()
            ),
        }
    }
}
