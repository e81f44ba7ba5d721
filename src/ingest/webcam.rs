use anyhow::Result;

use crate::config::WebcamSettings;
use crate::ingest::{FrameSource, RawFrame};

/// Configuration for a webcam source.
#[derive(Clone, Debug)]
pub struct WebcamConfig {
    /// Device URL. `stub://` URLs select the synthetic generator.
    pub url: String,
    /// Target frame rate (frames per second).
    pub target_fps: u32,
    pub width: u32,
    pub height: u32,
}

impl Default for WebcamConfig {
    fn default() -> Self {
        Self {
            url: "stub://webcam".to_string(),
            target_fps: 30,
            width: 640,
            height: 480,
        }
    }
}

impl From<&WebcamSettings> for WebcamConfig {
    fn from(settings: &WebcamSettings) -> Self {
        Self {
            url: settings.url.clone(),
            target_fps: settings.target_fps,
            width: settings.width,
            height: settings.height,
        }
    }
}

/// Webcam frame source.
///
/// Only the synthetic `stub://` backend is built in; real device capture
/// is an external integration.
pub struct WebcamSource {
    backend: WebcamBackend,
}

enum WebcamBackend {
    Synthetic(SyntheticWebcamSource),
}

impl WebcamSource {
    pub fn new(config: WebcamConfig) -> Result<Self> {
        if config.url.starts_with("stub://") {
            Ok(Self {
                backend: WebcamBackend::Synthetic(SyntheticWebcamSource::new(config)),
            })
        } else {
            anyhow::bail!("unsupported webcam url {:?}: only stub:// is built in", config.url)
        }
    }

    /// Get frame statistics.
    pub fn stats(&self) -> WebcamStats {
        match &self.backend {
            WebcamBackend::Synthetic(source) => source.stats(),
        }
    }
}

impl FrameSource for WebcamSource {
    fn connect(&mut self) -> Result<()> {
        match &mut self.backend {
            WebcamBackend::Synthetic(source) => source.connect(),
        }
    }

    fn next_frame(&mut self) -> Result<RawFrame> {
        match &mut self.backend {
            WebcamBackend::Synthetic(source) => source.next_frame(),
        }
    }

    fn is_healthy(&self) -> bool {
        match &self.backend {
            WebcamBackend::Synthetic(_) => true,
        }
    }
}

/// Statistics for a webcam source.
#[derive(Clone, Debug)]
pub struct WebcamStats {
    pub frames_captured: u64,
    pub url: String,
}

// ----------------------------------------------------------------------------
// Synthetic source (stub://) for tests and the demo daemon
// ----------------------------------------------------------------------------

struct SyntheticWebcamSource {
    config: WebcamConfig,
    frame_count: u64,
}

impl SyntheticWebcamSource {
    fn new(config: WebcamConfig) -> Self {
        Self {
            config,
            frame_count: 0,
        }
    }

    /// Synthetic sources are always "connected".
    fn connect(&mut self) -> Result<()> {
        log::info!("WebcamSource: connected to {} (synthetic)", self.config.url);
        Ok(())
    }

    fn next_frame(&mut self) -> Result<RawFrame> {
        self.frame_count += 1;
        Ok(RawFrame {
            pixels: self.generate_synthetic_pixels(),
            width: self.config.width,
            height: self.config.height,
            frame_index: self.frame_count,
        })
    }

    /// Fill the frame with a pattern that varies slowly over time, so
    /// downstream consumers see changing pixel data.
    fn generate_synthetic_pixels(&self) -> Vec<u8> {
        let pixel_count = (self.config.width * self.config.height * 3) as usize; // RGB
        let shade = (self.frame_count % 251) as u8;
        vec![shade; pixel_count]
    }

    fn stats(&self) -> WebcamStats {
        WebcamStats {
            frames_captured: self.frame_count,
            url: self.config.url.clone(),
        }
    }
}
