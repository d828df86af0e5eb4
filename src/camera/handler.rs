use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::camera::error::{CameraError, Result};
use crate::camera::parameters::CameraParameters;
use crate::camera::sdk::{CameraSdk, CameraSession};
use crate::image_pipeline::{AcquisitionPipeline, ImageQueue, PairNotifier, PipelineConfig, StatsSnapshot};
use crate::settings::SettingsStore;

/// Opens the first available camera and configures it from the settings.
///
/// The returned session is armed with `arm_frame_count` buffers.
#[instrument(skip_all)]
pub fn open_camera<K: CameraSdk>(sdk: &mut K, settings: &SettingsStore) -> Result<K::Session> {
    let available = sdk.discover_available_cameras()?;
    let camera_id = available
        .first()
        .ok_or_else(|| CameraError::DeviceNotFound("Unable to access the camera.".to_string()))?;

    let parameters = CameraParameters::from_settings(settings)?;
    let mut session = sdk.open_camera(camera_id)?;

    let configured = parameters
        .apply(&mut session)
        .and_then(|()| session.arm(parameters.arm_frame_count));
    if let Err(e) = configured {
        session.dispose();
        return Err(e);
    }

    info!(
        camera = %camera_id,
        exposure_us = parameters.exposure_time_us,
        mode = ?parameters.operation_mode,
        polarity = ?parameters.trigger_polarity,
        buffers = parameters.arm_frame_count,
        "Camera opened and armed"
    );
    Ok(session)
}

/// Owns the SDK, the open camera and the acquisition pipeline feeding the
/// shared image queue.
pub struct CameraHandler<K: CameraSdk> {
    sdk: K,
    queue: ImageQueue,
    notifier: Option<Arc<dyn PairNotifier>>,
    config: PipelineConfig,
    pipeline: Option<AcquisitionPipeline<K::Session>>,
    is_alive: bool,
    disposed: bool,
}

impl<K: CameraSdk> CameraHandler<K> {
    /// Opens the camera and prepares (but does not start) image acquisition.
    ///
    /// `shared_queue` lets another component own the queue; otherwise one of
    /// `config.queue_capacity` is created.
    pub fn new(
        mut sdk: K,
        settings: &SettingsStore,
        shared_queue: Option<ImageQueue>,
        notifier: Option<Arc<dyn PairNotifier>>,
        config: PipelineConfig,
    ) -> Result<Self> {
        let session = match open_camera(&mut sdk, settings) {
            Ok(session) => session,
            Err(e) => {
                sdk.dispose();
                return Err(e);
            }
        };
        let queue = shared_queue.unwrap_or_else(|| ImageQueue::new(config.queue_capacity));
        let pipeline = AcquisitionPipeline::new(session, Some(queue.clone()), notifier.clone(), config.clone());

        Ok(Self {
            sdk,
            queue,
            notifier,
            config,
            pipeline: Some(pipeline),
            is_alive: false,
            disposed: false,
        })
    }

    /// Starts the image acquisition thread.
    pub fn activate_camera_instance(&mut self) -> Result<()> {
        let pipeline = self.pipeline.as_mut().ok_or(CameraError::Disposed)?;
        info!("Starting image acquisition thread...");
        pipeline.start()?;
        self.is_alive = true;
        info!("Image thread alive: {}", pipeline.is_alive());
        Ok(())
    }

    /// True while the camera is active and can be triggered.
    pub fn camera_state(&self) -> bool {
        self.is_alive
    }

    pub fn is_connected(&self) -> bool {
        self.pipeline.is_some()
    }

    /// Liveness of the acquisition thread itself; false after a fail-stop.
    pub fn is_acquiring(&self) -> bool {
        self.pipeline.as_ref().is_some_and(|p| p.is_alive())
    }

    pub fn get_output_queue(&self) -> ImageQueue {
        self.queue.clone()
    }

    pub fn stats(&self) -> Option<StatsSnapshot> {
        self.pipeline.as_ref().map(|p| p.stats())
    }

    pub fn sdk(&self) -> &K {
        &self.sdk
    }

    /// Reopens the camera with fresh settings: disposes the current camera,
    /// empties the queue, opens and arms again, then restarts acquisition.
    #[instrument(skip_all)]
    pub fn reinitialize(&mut self, settings: &SettingsStore) -> Result<()> {
        if self.disposed || self.pipeline.is_none() {
            return Err(CameraError::Disposed);
        }
        self.dispose_camera_instance()?;

        let discarded = self.queue.clear();
        info!(discarded, "Image queue cleared");

        let session = open_camera(&mut self.sdk, settings)?;
        self.pipeline = Some(AcquisitionPipeline::new(
            session,
            Some(self.queue.clone()),
            self.notifier.clone(),
            self.config.clone(),
        ));
        self.activate_camera_instance()
    }

    /// Stops acquisition if running, then disarms and disposes the camera.
    pub fn dispose_camera_instance(&mut self) -> Result<()> {
        let Some(mut pipeline) = self.pipeline.take() else {
            return Ok(());
        };
        let mut session = pipeline.shutdown()?;
        if self.is_alive {
            self.is_alive = false;
            info!("Image thread alive: {}", pipeline.is_alive());
            if let Some(exit) = pipeline.exit_status() {
                info!(?exit, "Image acquisition thread joined");
            }
        }

        let disarmed = session.disarm();
        session.dispose();
        disarmed
    }

    /// Releases the camera and the SDK. Further calls are no-ops.
    pub fn dispose(&mut self) -> Result<()> {
        if self.disposed {
            return Ok(());
        }
        self.disposed = true;
        let result = self.dispose_camera_instance();
        self.sdk.dispose();
        result
    }
}

impl<K: CameraSdk> Drop for CameraHandler<K> {
    fn drop(&mut self) {
        if let Err(e) = self.dispose() {
            warn!("Failed to dispose camera: {}", e);
        }
    }
}
