//! scand - end-to-end synthetic run for the Banknote Scan Kernel
//!
//! Drives a scripted stub classifier through the scan state machine at
//! the configured frame rate and prints a summary, standing in for the
//! browser loop (webcam -> model -> state machine -> speech).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use clap::Parser;

use cashscan::{
    BackendRegistry, FrameSource, LogAnnouncer, ScanEvent, ScanSession, ScannerConfig,
    StubClassifier, WebcamConfig, WebcamSource,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Duration of the synthetic run in seconds.
    #[arg(long, default_value_t = 20)]
    seconds: u64,
    /// Frames per second; overrides the configured webcam rate.
    #[arg(long)]
    fps: Option<u32>,
    /// Banknote labels to script through the scanner, in order.
    #[arg(long = "note", value_name = "LABEL")]
    notes: Vec<String>,
    /// Confidence used for scripted note frames.
    #[arg(long, default_value_t = 0.97)]
    confidence: f32,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let cfg = ScannerConfig::load()?;
    let fps = args.fps.unwrap_or(cfg.webcam.target_fps);
    if fps == 0 {
        return Err(anyhow!("fps must be >= 1"));
    }

    let notes = if args.notes.is_empty() {
        vec!["oneDollar".to_string(), "tenDollar".to_string()]
    } else {
        args.notes.clone()
    };

    let mut source = WebcamSource::new(WebcamConfig::from(&cfg.webcam))?;
    source.connect()?;

    let mut registry = BackendRegistry::new();
    registry.register(build_scripted_classifier(&cfg, &notes, args.confidence, fps)?);

    let mut session = ScanSession::new(&cfg, Box::new(LogAnnouncer));

    let running = Arc::new(AtomicBool::new(true));
    let running_flag = running.clone();
    ctrlc::set_handler(move || {
        running_flag.store(false, Ordering::SeqCst);
    })?;

    stage("scan loop");
    let frame_interval = Duration::from_secs(1) / fps;
    let deadline = Instant::now() + Duration::from_secs(args.seconds);
    let mut frames = 0u64;
    let mut notes_confirmed = 0u64;
    let mut sums_announced = 0u64;

    while running.load(Ordering::SeqCst) && Instant::now() < deadline {
        let frame = source.next_frame()?;
        let predictions = registry.classify(&frame.pixels, frame.width, frame.height)?;
        frames += 1;

        for event in session.process_frame(&predictions, Instant::now()) {
            match event {
                ScanEvent::NoteConfirmed { label, value, sum } => {
                    notes_confirmed += 1;
                    log::info!("scanned {} worth {} (running sum {})", label, value, sum);
                }
                ScanEvent::SumReset { total } => {
                    sums_announced += 1;
                    log::info!("sum of {} announced and cleared", total);
                }
            }
        }

        std::thread::sleep(frame_interval);
    }

    println!("scand summary:");
    println!("  frames processed: {}", frames);
    println!("  notes confirmed: {}", notes_confirmed);
    println!("  sum announcements: {}", sums_announced);
    println!("  final sum: {}", session.sum());
    println!("  final state: {:?}", session.state());
    println!("  source: {}", source.stats().url);

    Ok(())
}

fn stage(msg: &str) {
    eprintln!("scand: {}", msg);
}

/// Script each requested note for slightly longer than the validation
/// window, separated by enough empty frames to clear the cooldown.
fn build_scripted_classifier(
    cfg: &ScannerConfig,
    notes: &[String],
    confidence: f32,
    fps: u32,
) -> Result<StubClassifier> {
    let mut labels: Vec<String> = vec![cfg.empty_label.clone()];
    labels.extend(cfg.catalog.labels().map(str::to_string));

    let mut stub = StubClassifier::new(labels, cfg.empty_label.clone())?;

    let frames_for = |duration: Duration| -> usize {
        (duration.as_secs_f64() * f64::from(fps)).ceil() as usize + 1
    };
    let note_frames = frames_for(cfg.validate_time);
    let gap_frames = frames_for(cfg.scan_wait_time);

    for note in notes {
        if !cfg.catalog.contains(note) {
            return Err(anyhow!("--note {:?} is not in the catalog", note));
        }
        stub.push_frames(note, confidence, note_frames)?;
        stub.push_empty_frames(gap_frames)?;
    }
    Ok(stub)
}
