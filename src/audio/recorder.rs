use anyhow::Result;
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

/// Requested encoder quality. The recorder negotiates down from here when
/// the hardware refuses, see [`negotiate_quality`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordingQuality {
    /// 64 kbps, 16 kHz; the guaranteed-safe floor
    Low,
    /// 96 kbps, 32 kHz
    #[default]
    Medium,
    /// 128 kbps, 44.1 kHz
    High,
    /// 256 kbps, 48 kHz
    VeryHigh,
}

impl RecordingQuality {
    pub fn bit_rate(self) -> u32 {
        match self {
            RecordingQuality::Low => 64_000,
            RecordingQuality::Medium => 96_000,
            RecordingQuality::High => 128_000,
            RecordingQuality::VeryHigh => 256_000,
        }
    }

    pub fn sample_rate(self) -> u32 {
        match self {
            RecordingQuality::Low => 16_000,
            RecordingQuality::Medium => 32_000,
            RecordingQuality::High => 44_100,
            RecordingQuality::VeryHigh => 48_000,
        }
    }

    pub fn settings(self, channels: u16) -> EncoderSettings {
        EncoderSettings {
            bit_rate: self.bit_rate(),
            sample_rate: self.sample_rate(),
            channels,
        }
    }
}

/// Concrete parameters handed to the platform encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderSettings {
    pub bit_rate: u32,
    pub sample_rate: u32,
    /// 1 = mono, 2 = stereo
    pub channels: u16,
}

/// Platform capture primitive.
///
/// Implementations wrap the OS recorder; the recording tracker is the only
/// caller and owns the instance exclusively.
pub trait AudioRecorder: Send {
    /// Apply encoder parameters for the next `start`. May reject settings the
    /// hardware cannot honour.
    fn configure(&mut self, settings: &EncoderSettings) -> Result<()>;

    /// Begin writing to `output`.
    fn start(&mut self, output: &Path) -> Result<()>;

    fn pause(&mut self) -> Result<()>;

    fn resume(&mut self) -> Result<()>;

    /// Finish the file and release OS resources.
    fn stop(&mut self) -> Result<()>;

    /// Name for logging
    fn name(&self) -> &str;
}

/// Three-tier quality fallback: requested quality in stereo, then mono, then
/// mono at [`RecordingQuality::Low`]. Returns the settings that were accepted,
/// or `None` when the recorder refused all of them and will run on platform
/// defaults. Never fails.
pub fn negotiate_quality(
    recorder: &mut dyn AudioRecorder,
    desired: RecordingQuality,
) -> Option<EncoderSettings> {
    let attempts = [
        desired.settings(2),
        desired.settings(1),
        RecordingQuality::Low.settings(1),
    ];

    for settings in attempts {
        match recorder.configure(&settings) {
            Ok(()) => {
                info!(
                    "{} configured: {} bps, {} Hz, {} ch",
                    recorder.name(),
                    settings.bit_rate,
                    settings.sample_rate,
                    settings.channels
                );
                return Some(settings);
            }
            Err(e) => {
                warn!(
                    "{} rejected {} bps, {} Hz, {} ch: {}",
                    recorder.name(),
                    settings.bit_rate,
                    settings.sample_rate,
                    settings.channels,
                    e
                );
            }
        }
    }

    warn!("{} accepted no quality tier; using platform defaults", recorder.name());
    None
}
