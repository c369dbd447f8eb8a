use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;
use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

/// Reads the playable length of an audio file.
pub trait DurationProbe: Send + Sync {
    /// Duration in milliseconds, or `None` when the file can't be read.
    fn duration_ms(&self, path: &Path) -> Option<u64>;
}

/// WAV headers through `hound`, every other container through `symphonia`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileDurationProbe;

impl DurationProbe for FileDurationProbe {
    fn duration_ms(&self, path: &Path) -> Option<u64> {
        if !path.exists() {
            warn!("Cannot probe duration, file missing: {}", path.display());
            return None;
        }

        let is_wav = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));

        let result = if is_wav {
            wav_duration_ms(path)
        } else {
            container_duration_ms(path)
        };

        match result {
            Ok(ms) => {
                debug!("Probed {}: {} ms", path.display(), ms);
                Some(ms)
            }
            Err(e) => {
                warn!("Failed to probe duration of {}: {:#}", path.display(), e);
                None
            }
        }
    }
}

fn wav_duration_ms(path: &Path) -> Result<u64> {
    let reader = hound::WavReader::open(path).context("Failed to open WAV file")?;
    let spec = reader.spec();
    anyhow::ensure!(spec.sample_rate > 0, "WAV header reports 0 Hz");

    // `duration()` counts frames (samples per channel)
    Ok(reader.duration() as u64 * 1000 / spec.sample_rate as u64)
}

fn container_duration_ms(path: &Path) -> Result<u64> {
    let file = File::open(path).context("Failed to open audio file")?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .context("Unrecognised audio container")?;

    let track = probed
        .format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .context("No audio track found")?;

    let params = &track.codec_params;
    let frames = params.n_frames.context("Container does not report a frame count")?;

    if let Some(time_base) = params.time_base {
        let time = time_base.calc_time(frames);
        return Ok(time.seconds * 1000 + (time.frac * 1000.0) as u64);
    }

    let rate = params.sample_rate.context("Container reports neither time base nor sample rate")?;
    Ok(frames * 1000 / rate as u64)
}
