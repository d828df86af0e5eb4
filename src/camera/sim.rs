//! In-process camera SDK producing synthetic frames
//!
//! Used by the binary when no vendor SDK is linked, and by tests. Hardware
//! triggered sessions behave as if the trigger line pulsed once per frame
//! interval.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::camera::error::{CameraError, Result};
use crate::camera::sdk::{CameraSdk, CameraSession, OperationMode, TriggerPolarity};
use crate::image_pipeline::{self, Frame, FrameSource, SensorInfo, SensorKind};

/// Description of one simulated camera
#[derive(Debug, Clone)]
pub struct SimulatedCameraSpec {
    pub id: String,
    pub sensor: SensorInfo,
    /// Time between two frames while armed; zero yields a frame on every poll
    pub frame_interval: Duration,
}

impl SimulatedCameraSpec {
    pub fn new(id: impl Into<String>, sensor: SensorInfo, frame_interval: Duration) -> Self {
        Self {
            id: id.into(),
            sensor,
            frame_interval,
        }
    }
}

/// Settings applied to a simulated camera, observable from outside the session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulatedCameraState {
    pub exposure_time_us: u64,
    pub frames_per_trigger: u32,
    pub operation_mode: OperationMode,
    pub trigger_polarity: TriggerPolarity,
    /// Buffer count of the current arm, `None` while disarmed
    pub armed_buffers: Option<u32>,
    pub disposed: bool,
    pub frames_produced: u64,
}

#[derive(Default)]
pub struct SimulatedSdk {
    cameras: Vec<SimulatedCameraSpec>,
    states: Vec<(String, Arc<Mutex<SimulatedCameraState>>)>,
    disposed: bool,
}

impl SimulatedSdk {
    pub fn new(cameras: Vec<SimulatedCameraSpec>) -> Self {
        Self {
            cameras,
            states: Vec::new(),
            disposed: false,
        }
    }

    /// State of the most recently opened session of `camera_id`.
    pub fn camera_state(&self, camera_id: &str) -> Option<SimulatedCameraState> {
        self.states
            .iter()
            .rev()
            .find(|(id, _)| id == camera_id)
            .map(|(_, state)| state.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    pub fn open_count(&self) -> usize {
        self.states.len()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl CameraSdk for SimulatedSdk {
    type Session = SimulatedCamera;

    fn discover_available_cameras(&mut self) -> Result<Vec<String>> {
        if self.disposed {
            return Err(CameraError::Sdk("SDK was disposed".to_string()));
        }
        Ok(self.cameras.iter().map(|c| c.id.clone()).collect())
    }

    fn open_camera(&mut self, camera_id: &str) -> Result<SimulatedCamera> {
        let spec = self
            .cameras
            .iter()
            .find(|c| c.id == camera_id)
            .cloned()
            .ok_or_else(|| CameraError::DeviceNotFound(camera_id.to_string()))?;

        let state = Arc::new(Mutex::new(SimulatedCameraState::default()));
        self.states.push((camera_id.to_string(), Arc::clone(&state)));
        debug!(camera = camera_id, "Simulated camera opened");

        Ok(SimulatedCamera {
            spec,
            state,
            armed_at: None,
            next_frame: 0,
        })
    }

    fn dispose(&mut self) {
        self.disposed = true;
    }
}

pub struct SimulatedCamera {
    spec: SimulatedCameraSpec,
    state: Arc<Mutex<SimulatedCameraState>>,
    armed_at: Option<Instant>,
    next_frame: u64,
}

impl SimulatedCamera {
    fn with_state<T>(&self, f: impl FnOnce(&mut SimulatedCameraState) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut *state)
    }

    fn synthesize(&self, frame_count: u64, timestamp: Duration) -> Frame {
        let sensor = &self.spec.sensor;
        let max_value = (1u32 << sensor.bit_depth.clamp(1, 16)) - 1;
        let span = (sensor.width + sensor.height).max(1) as u32;
        let data = (0..sensor.height)
            .flat_map(|y| (0..sensor.width).map(move |x| (x + y) as u32))
            .map(|v| (((v + frame_count as u32) % span) * max_value / span) as u16)
            .collect();

        Frame {
            width: sensor.width,
            height: sensor.height,
            bit_depth: sensor.bit_depth,
            data,
            sensor_kind: sensor.kind,
            frame_count,
            timestamp,
        }
    }
}

impl FrameSource for SimulatedCamera {
    fn poll_frame(&mut self) -> image_pipeline::Result<Option<Frame>> {
        let Some(armed_at) = self.armed_at else {
            return Ok(None);
        };
        let elapsed = armed_at.elapsed();
        let due = self.spec.frame_interval.saturating_mul(self.next_frame as u32);
        if elapsed < due {
            return Ok(None);
        }

        self.next_frame += 1;
        let frame_count = self.next_frame;
        self.with_state(|state| state.frames_produced = frame_count);
        Ok(Some(self.synthesize(frame_count, elapsed)))
    }

    fn sensor_info(&self) -> SensorInfo {
        self.spec.sensor.clone()
    }
}

impl CameraSession for SimulatedCamera {
    fn set_exposure_time_us(&mut self, exposure_time_us: u64) -> Result<()> {
        self.with_state(|state| state.exposure_time_us = exposure_time_us);
        Ok(())
    }

    fn set_frames_per_trigger(&mut self, frames: u32) -> Result<()> {
        self.with_state(|state| state.frames_per_trigger = frames);
        Ok(())
    }

    fn set_operation_mode(&mut self, mode: OperationMode) -> Result<()> {
        self.with_state(|state| state.operation_mode = mode);
        Ok(())
    }

    fn set_trigger_polarity(&mut self, polarity: TriggerPolarity) -> Result<()> {
        self.with_state(|state| state.trigger_polarity = polarity);
        Ok(())
    }

    fn arm(&mut self, frames_to_buffer: u32) -> Result<()> {
        if frames_to_buffer == 0 {
            return Err(CameraError::Sdk("frames_to_buffer must be at least 1".to_string()));
        }
        self.with_state(|state| state.armed_buffers = Some(frames_to_buffer));
        self.armed_at = Some(Instant::now());
        self.next_frame = 0;
        Ok(())
    }

    fn disarm(&mut self) -> Result<()> {
        self.with_state(|state| state.armed_buffers = None);
        self.armed_at = None;
        Ok(())
    }

    fn dispose(&mut self) {
        self.with_state(|state| state.disposed = true);
    }
}

/// A single monochrome or Bayer camera producing `fps` frames per second.
pub fn single_camera(kind: SensorKind, width: usize, height: usize, bit_depth: u32, fps: u32) -> SimulatedSdk {
    let sensor = match kind {
        SensorKind::Monochrome => SensorInfo::monochrome(width, height, bit_depth),
        SensorKind::Bayer => SensorInfo::bayer(width, height, bit_depth),
    };
    let interval = if fps == 0 {
        Duration::ZERO
    } else {
        Duration::from_secs(1) / fps
    };
    SimulatedSdk::new(vec![SimulatedCameraSpec::new("SIM-0001", sensor, interval)])
}
