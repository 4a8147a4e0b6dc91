//! CameraView demo CLI
//!
//! Runs the camera against the in-process mock driver, simulating the
//! focus and exposure metadata a real sensor would report, and writes each
//! captured JPEG payload to disk.

use cameraview::{
    driver::{AeState, AfState, CaptureResult},
    metrics::{MetricsRegistry, MetricsSnapshot},
    AspectRatio, Camera, CameraCallback, Facing, FileConfig, Flash, MockDriver, MockPreview,
};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{info, warn};

/// Take still pictures through a simulated camera pipeline.
#[derive(Parser, Debug)]
#[command(name = "cameraview-demo", version, about)]
struct Args {
    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Camera to open (back or front).
    #[arg(long)]
    facing: Option<Facing>,

    /// Aspect ratio as X:Y.
    #[arg(long)]
    aspect_ratio: Option<AspectRatio>,

    /// Flash mode (off, on, torch, auto, red-eye).
    #[arg(long)]
    flash: Option<Flash>,

    /// Disable continuous auto focus.
    #[arg(long)]
    no_auto_focus: bool,

    /// Number of pictures to take.
    #[arg(long)]
    pictures: Option<u32>,

    /// Directory the pictures are written to.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Keep taking pictures until interrupted.
    #[arg(long)]
    continuous: bool,
}

/// Forwards captured stills to the main thread.
struct PictureSink {
    tx: Mutex<Sender<Vec<u8>>>,
}

impl CameraCallback for PictureSink {
    fn on_camera_opened(&self) {
        info!("Camera opened");
    }

    fn on_camera_closed(&self) {
        info!("Camera closed");
    }

    fn on_picture_taken(&self, data: &[u8]) {
        let tx = self.tx.lock().unwrap_or_else(|p| p.into_inner());
        if tx.send(data.to_vec()).is_err() {
            warn!("Picture dropped: receiver gone");
        }
    }
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    info!("CameraView demo v{}", cameraview::VERSION);

    let mut config = match &args.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config: {e}");
                std::process::exit(1);
            }
        },
        None => FileConfig::default(),
    };
    if let Some(facing) = args.facing {
        config.camera.facing = facing;
    }
    if let Some(ratio) = args.aspect_ratio {
        config.camera.aspect_ratio = ratio;
    }
    if let Some(flash) = args.flash {
        config.camera.flash = flash;
    }
    if args.no_auto_focus {
        config.camera.auto_focus = false;
    }
    if let Some(pictures) = args.pictures {
        config.demo.pictures = pictures;
    }
    if let Some(dir) = args.output_dir {
        config.demo.output_dir = dir;
    }

    if let Err(e) = std::fs::create_dir_all(&config.demo.output_dir) {
        eprintln!("Failed to create {}: {e}", config.demo.output_dir.display());
        std::process::exit(1);
    }

    let driver = MockDriver::with_default_cameras();
    let preview = MockPreview::pending();
    let camera = match Camera::with_config(
        Box::new(driver.clone()),
        Box::new(preview.clone()),
        &config.camera,
    ) {
        Ok(camera) => camera,
        Err(e) => {
            eprintln!("Invalid camera config: {e}");
            std::process::exit(1);
        }
    };

    let (tx, rx) = mpsc::channel();
    camera.add_callback(Arc::new(PictureSink { tx: Mutex::new(tx) }));

    let running = Arc::new(AtomicBool::new(true));
    if args.continuous {
        let running = Arc::clone(&running);
        if let Err(e) = ctrlc::set_handler(move || running.store(false, Ordering::SeqCst)) {
            warn!("Failed to install Ctrl-C handler: {e}");
        }
    }

    match camera.start() {
        Ok(true) => {}
        Ok(false) => {
            eprintln!("No usable camera");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Failed to start camera: {e}");
            std::process::exit(1);
        }
    }
    driver.dispatch();

    // The surface comes up after the device; this configures the session.
    preview.resize(config.demo.surface_width, config.demo.surface_height);
    driver.dispatch();

    info!(
        camera_id = %camera.camera_id().unwrap_or_default(),
        facing = %camera.facing(),
        aspect_ratio = %camera.aspect_ratio(),
        supported = ?camera.supported_aspect_ratios(),
        "Preview running"
    );

    let mut taken = 0u32;
    while running.load(Ordering::SeqCst) && (args.continuous || taken < config.demo.pictures) {
        match capture_one(&camera, &driver, &rx, taken) {
            Some(data) => {
                taken += 1;
                let path = picture_path(&config.demo.output_dir, taken);
                match std::fs::write(&path, &data) {
                    Ok(()) => info!(path = %path.display(), bytes = data.len(), "Saved picture"),
                    Err(e) => warn!(path = %path.display(), "Failed to save picture: {e}"),
                }
            }
            None => {
                warn!("No picture delivered");
                break;
            }
        }
    }

    camera.stop();
    driver.dispatch();

    let stats = camera.stats();
    info!(
        "Took {} pictures ({} bytes, {} failures)",
        stats.pictures_taken, stats.picture_bytes, stats.still_capture_failures
    );

    match MetricsRegistry::new() {
        Ok(registry) => serve_metrics(registry, &camera.metrics_snapshot(), config.metrics.port),
        Err(e) => warn!("Failed to create metrics registry: {e}"),
    }
}

/// Takes one picture, feeding the metadata sequence a sensor would report.
///
/// Every other picture simulates unconverged exposure, which runs the
/// precapture sequence.
fn capture_one(
    camera: &Camera,
    driver: &MockDriver,
    rx: &Receiver<Vec<u8>>,
    index: u32,
) -> Option<Vec<u8>> {
    if !camera.take_picture() {
        return None;
    }

    let locked = Some(AfState::FocusedLocked);
    let mut frames = vec![(Some(AfState::ActiveScan), Some(AeState::Searching))];
    if index % 2 == 0 {
        frames.push((locked, Some(AeState::Converged)));
    } else {
        frames.push((locked, Some(AeState::Searching)));
        frames.push((locked, Some(AeState::Precapture)));
        frames.push((locked, Some(AeState::Converged)));
    }
    for (af, ae) in frames {
        driver.emit_frame(CaptureResult::new(af, ae));
    }
    driver.complete_captures(CaptureResult::new(locked, Some(AeState::Converged)));

    rx.recv_timeout(Duration::from_secs(1)).ok()
}

fn picture_path(dir: &Path, index: u32) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    dir.join(format!("IMG_{stamp}_{index}.jpg"))
}

#[cfg(feature = "metrics")]
fn serve_metrics(registry: MetricsRegistry, snapshot: &MetricsSnapshot, port: u16) {
    use cameraview::metrics::{MetricsServer, MetricsServerConfig};

    if port == 0 {
        registry.update(snapshot);
        print_metrics(&registry);
        return;
    }
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            warn!("Failed to start async runtime: {e}");
            return;
        }
    };
    info!(port, "Serving metrics until interrupted");
    let server =
        MetricsServer::with_snapshot(MetricsServerConfig::with_port(port), registry, snapshot);
    if let Err(e) = runtime.block_on(server.run()) {
        warn!("Metrics server failed: {e}");
    }
}

#[cfg(not(feature = "metrics"))]
fn serve_metrics(registry: MetricsRegistry, snapshot: &MetricsSnapshot, _port: u16) {
    registry.update(snapshot);
    print_metrics(&registry);
}

fn print_metrics(registry: &MetricsRegistry) {
    match registry.encode() {
        Ok(text) => println!("{text}"),
        Err(e) => warn!("Failed to encode metrics: {e}"),
    }
}
