use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use crate::catalog::BanknoteCatalog;
use crate::validate_label;

const DEFAULT_THRESHOLD: f32 = 0.95;
const DEFAULT_VALIDATE_MS: u64 = 2000;
const DEFAULT_SCAN_WAIT_MS: u64 = 5000;
const DEFAULT_SUM_RESET_MS: u64 = 20_000;
const DEFAULT_EMPTY_LABEL: &str = "empty";
const DEFAULT_WEBCAM_URL: &str = "stub://webcam";
const DEFAULT_WEBCAM_FPS: u32 = 30;
const DEFAULT_WEBCAM_WIDTH: u32 = 640;
const DEFAULT_WEBCAM_HEIGHT: u32 = 480;

#[derive(Debug, Deserialize, Default)]
struct ScannerConfigFile {
    threshold: Option<f32>,
    empty_label: Option<String>,
    timers: Option<TimerConfigFile>,
    webcam: Option<WebcamConfigFile>,
    catalog: Option<BTreeMap<String, u64>>,
}

#[derive(Debug, Deserialize, Default)]
struct TimerConfigFile {
    validate_ms: Option<u64>,
    scan_wait_ms: Option<u64>,
    sum_reset_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct WebcamConfigFile {
    url: Option<String>,
    target_fps: Option<u32>,
    width: Option<u32>,
    height: Option<u32>,
}

/// Runtime configuration for the scan kernel.
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Confidence a prediction must exceed (strictly) to start validation.
    pub threshold: f32,
    /// Label of the empty/background class.
    pub empty_label: String,
    /// Stability duration required before confirming a scan.
    pub validate_time: Duration,
    /// Post-confirmation dead time preventing duplicate counting.
    pub scan_wait_time: Duration,
    /// Inactivity duration after which the sum is announced and cleared.
    pub sum_reset_time: Duration,
    pub webcam: WebcamSettings,
    pub catalog: BanknoteCatalog,
}

#[derive(Debug, Clone)]
pub struct WebcamSettings {
    pub url: String,
    pub target_fps: u32,
    pub width: u32,
    pub height: u32,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self::from_file(ScannerConfigFile::default())
            .expect("default scanner config must be valid")
    }
}

impl ScannerConfig {
    /// Load configuration from the file named by `CASHSCAN_CONFIG` (when
    /// set), apply `CASHSCAN_*` env overrides, then validate.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("CASHSCAN_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default())?;
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: ScannerConfigFile) -> Result<Self> {
        let threshold = file.threshold.unwrap_or(DEFAULT_THRESHOLD);
        let empty_label = file
            .empty_label
            .unwrap_or_else(|| DEFAULT_EMPTY_LABEL.to_string());
        let timers = file.timers.unwrap_or_default();
        let webcam = WebcamSettings {
            url: file
                .webcam
                .as_ref()
                .and_then(|webcam| webcam.url.clone())
                .unwrap_or_else(|| DEFAULT_WEBCAM_URL.to_string()),
            target_fps: file
                .webcam
                .as_ref()
                .and_then(|webcam| webcam.target_fps)
                .unwrap_or(DEFAULT_WEBCAM_FPS),
            width: file
                .webcam
                .as_ref()
                .and_then(|webcam| webcam.width)
                .unwrap_or(DEFAULT_WEBCAM_WIDTH),
            height: file
                .webcam
                .and_then(|webcam| webcam.height)
                .unwrap_or(DEFAULT_WEBCAM_HEIGHT),
        };
        let catalog = match file.catalog {
            Some(values) => BanknoteCatalog::from_values(values)?,
            None => BanknoteCatalog::default(),
        };
        Ok(Self {
            threshold,
            empty_label,
            validate_time: Duration::from_millis(
                timers.validate_ms.unwrap_or(DEFAULT_VALIDATE_MS),
            ),
            scan_wait_time: Duration::from_millis(
                timers.scan_wait_ms.unwrap_or(DEFAULT_SCAN_WAIT_MS),
            ),
            sum_reset_time: Duration::from_millis(
                timers.sum_reset_ms.unwrap_or(DEFAULT_SUM_RESET_MS),
            ),
            webcam,
            catalog,
        })
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(threshold) = std::env::var("CASHSCAN_THRESHOLD") {
            self.threshold = threshold
                .parse()
                .map_err(|_| anyhow!("CASHSCAN_THRESHOLD must be a number in (0, 1)"))?;
        }
        if let Ok(label) = std::env::var("CASHSCAN_EMPTY_LABEL") {
            if !label.trim().is_empty() {
                self.empty_label = label;
            }
        }
        if let Ok(url) = std::env::var("CASHSCAN_WEBCAM_URL") {
            if !url.trim().is_empty() {
                self.webcam.url = url;
            }
        }
        if let Ok(ms) = std::env::var("CASHSCAN_VALIDATE_MS") {
            self.validate_time = Duration::from_millis(parse_ms("CASHSCAN_VALIDATE_MS", &ms)?);
        }
        if let Ok(ms) = std::env::var("CASHSCAN_SCAN_WAIT_MS") {
            self.scan_wait_time = Duration::from_millis(parse_ms("CASHSCAN_SCAN_WAIT_MS", &ms)?);
        }
        if let Ok(ms) = std::env::var("CASHSCAN_SUM_RESET_MS") {
            self.sum_reset_time = Duration::from_millis(parse_ms("CASHSCAN_SUM_RESET_MS", &ms)?);
        }
        Ok(())
    }

    fn validate(&mut self) -> Result<()> {
        if !(0.0..1.0).contains(&self.threshold) || self.threshold == 0.0 {
            return Err(anyhow!("threshold must be in (0, 1)"));
        }
        validate_label(&self.empty_label)?;
        if self.catalog.contains(&self.empty_label) {
            return Err(anyhow!(
                "empty label {:?} must not appear in the catalog",
                self.empty_label
            ));
        }
        for duration in [
            self.validate_time,
            self.scan_wait_time,
            self.sum_reset_time,
        ] {
            if duration.is_zero() {
                return Err(anyhow!("timer durations must be greater than zero"));
            }
        }
        if self.webcam.target_fps == 0 {
            return Err(anyhow!("webcam target_fps must be >= 1"));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<ScannerConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}

fn parse_ms(key: &str, value: &str) -> Result<u64> {
    value
        .parse()
        .map_err(|_| anyhow!("{} must be an integer number of milliseconds", key))
}
