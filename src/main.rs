use std::sync::Arc;
use std::time::{Duration, Instant};

use cam_acquire::camera::{CameraHandler, SETTINGS_KEY, sim};
use cam_acquire::image_pipeline::{IdleBackoff, PairNotifier, PipelineConfig, SensorKind};
use cam_acquire::logger;
use cam_acquire::settings::{DEFAULT_WATCH_INTERVAL, SettingsStore};

use serde_json::json;
use tracing::{debug, info, warn};

const DEFAULT_SETTINGS_PATH: &str = "settings.json";
const RUN_TIME: Duration = Duration::from_secs(5);

fn main() -> anyhow::Result<()> {
    logger::init();

    info!("Starting cam_acquire...");

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SETTINGS_PATH.to_string());
    let settings = SettingsStore::load(&path)?;
    if settings.get(SETTINGS_KEY).is_none() {
        warn!("No camera settings in {}, writing defaults", path);
        settings.set(SETTINGS_KEY, json!({ "exposureTime_us": 10000 }));
        settings.save()?;
    }
    settings.start_watch(DEFAULT_WATCH_INTERVAL)?;

    let sdk = sim::single_camera(SensorKind::Bayer, 640, 480, 12, 30);
    let (tx, rx) = crossbeam_channel::bounded::<bool>(4);
    let notifier: Arc<dyn PairNotifier> = Arc::new(tx);
    let config = PipelineConfig::builder()
        .idle_backoff(IdleBackoff::Sleep(Duration::from_micros(200)))
        .build();

    let mut handler = CameraHandler::new(sdk, &settings, None, Some(notifier), config)?;
    let queue = handler.get_output_queue();
    handler.activate_camera_instance()?;

    let started = Instant::now();
    let mut displayed = 0u64;
    while started.elapsed() < RUN_TIME {
        if settings.take_update() {
            info!("Settings changed on disk, reinitializing camera");
            handler.reinitialize(&settings)?;
        }

        if rx.recv_timeout(Duration::from_millis(100)).is_ok() {
            while let Some(image) = queue.try_pop() {
                displayed += 1;
                debug!(
                    frame = image.frame_count,
                    width = image.width,
                    height = image.height,
                    "Displaying image"
                );
            }
        }

        if !handler.is_acquiring() {
            warn!("Image acquisition stopped unexpectedly");
            break;
        }
    }

    if let Some(stats) = handler.stats() {
        stats.log_summary();
    }
    info!(displayed, "Images displayed");

    handler.dispose()?;
    settings.stop_watch()?;
    settings.join_watch()?;

    Ok(())
}
