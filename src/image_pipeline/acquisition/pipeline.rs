use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use tracing::{debug, error, info, instrument, trace};

use crate::image_pipeline::{
    AcquisitionError, Result,
    acquisition::{
        AcquisitionStats, IdleBackoff, ImageQueue, LoopExit, PairCounter, PairNotifier,
        PipelineConfig, StatsSnapshot, Timer,
    },
    debayer::{ColorConverter, ConverterLease, CpuDebayer, DisplayImage, DisplayPixels},
    source::{Frame, FrameSource, SensorKind},
};

const THREAD_NAME: &str = "image_acquisition";

/// Background loop that drains a frame source into a bounded image queue.
///
/// The loop never blocks on the consumer: when the queue is full the new image
/// is dropped. Every `pair_size` successful enqueues the notifier (if any)
/// receives `true`.
pub struct AcquisitionPipeline<S: FrameSource + 'static, C: ColorConverter + 'static = CpuDebayer> {
    source: Option<S>,
    converter: Option<C>,
    queue: ImageQueue,
    notifier: Option<Arc<dyn PairNotifier>>,
    config: PipelineConfig,
    stop: Arc<AtomicBool>,
    stats: Arc<AcquisitionStats>,
    handle: Option<JoinHandle<(S, LoopExit)>>,
    exit: Option<LoopExit>,
}

impl<S: FrameSource + 'static> AcquisitionPipeline<S, CpuDebayer> {
    /// Creates a pipeline with a CPU color processor when the source has a Bayer sensor.
    ///
    /// When `queue` is `None` a queue of `config.queue_capacity` is created.
    pub fn new(
        source: S,
        queue: Option<ImageQueue>,
        notifier: Option<Arc<dyn PairNotifier>>,
        config: PipelineConfig,
    ) -> Self {
        let sensor = source.sensor_info();
        let converter = match sensor.kind {
            SensorKind::Bayer => Some(CpuDebayer::for_sensor(&sensor)),
            SensorKind::Monochrome => None,
        };
        Self::with_converter(source, converter, queue, notifier, config)
    }
}

impl<S: FrameSource + 'static, C: ColorConverter + 'static> AcquisitionPipeline<S, C> {
    pub fn with_converter(
        source: S,
        converter: Option<C>,
        queue: Option<ImageQueue>,
        notifier: Option<Arc<dyn PairNotifier>>,
        config: PipelineConfig,
    ) -> Self {
        let queue = queue.unwrap_or_else(|| ImageQueue::new(config.queue_capacity));
        Self {
            source: Some(source),
            converter,
            queue,
            notifier,
            config,
            stop: Arc::new(AtomicBool::new(false)),
            stats: Arc::new(AcquisitionStats::new()),
            handle: None,
            exit: None,
        }
    }

    /// Spawns the acquisition thread. A pipeline can only be started once.
    #[instrument(skip(self), fields(capacity = self.queue.capacity()))]
    pub fn start(&mut self) -> Result<()> {
        let source = self.source.take().ok_or(AcquisitionError::AlreadyStarted)?;
        let sensor = source.sensor_info();

        let mut worker = AcquisitionLoop {
            source,
            converter: ConverterLease::new(self.converter.take()),
            queue: self.queue.clone(),
            notifier: self.notifier.clone(),
            pairs: PairCounter::new(self.config.pair_size),
            stats: Arc::clone(&self.stats),
            image_width: sensor.width,
            image_height: sensor.height,
        };
        let stop = Arc::clone(&self.stop);
        let backoff = self.config.idle_backoff;

        let handle = std::thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || {
                let exit = worker.run(&stop, backoff);
                let source = worker.into_source();
                info!("Image acquisition has stopped");
                (source, exit)
            })?;

        info!(
            sensor = ?sensor.kind,
            width = sensor.width,
            height = sensor.height,
            "Image acquisition thread started"
        );
        self.handle = Some(handle);
        Ok(())
    }

    /// Requests loop termination without waiting for it.
    pub fn stop(&self) {
        debug!("Stop requested for image acquisition");
        self.stop.store(true, Ordering::Release);
    }

    /// Waits for the loop to exit and returns the frame source to the caller.
    pub fn join(&mut self) -> Result<S> {
        let handle = self.handle.take().ok_or(AcquisitionError::NotStarted)?;
        let (source, exit) = handle.join().map_err(|_| {
            self.exit = Some(LoopExit::Failed("acquisition thread panicked".to_string()));
            AcquisitionError::WorkerPanicked
        })?;
        self.exit = Some(exit);
        Ok(source)
    }

    /// Stops and joins a running loop, or hands back the source of a pipeline
    /// that was never started.
    pub fn shutdown(&mut self) -> Result<S> {
        if self.handle.is_some() {
            self.stop();
            return self.join();
        }
        drop(ConverterLease::new(self.converter.take()));
        self.source.take().ok_or(AcquisitionError::NotStarted)
    }

    pub fn is_alive(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    pub fn get_output_queue(&self) -> ImageQueue {
        self.queue.clone()
    }

    /// How the loop ended; `None` until `join` has returned.
    pub fn exit_status(&self) -> Option<&LoopExit> {
        self.exit.as_ref()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

impl<S: FrameSource + 'static, C: ColorConverter + 'static> Drop for AcquisitionPipeline<S, C> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.stop.store(true, Ordering::Release);
            let _ = handle.join();
        }
    }
}

/// Outcome of a single loop iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    Idle,
    Enqueued { pair_ready: bool },
    Dropped,
}

pub(crate) struct AcquisitionLoop<S: FrameSource, C: ColorConverter> {
    pub(crate) source: S,
    pub(crate) converter: ConverterLease<C>,
    pub(crate) queue: ImageQueue,
    pub(crate) notifier: Option<Arc<dyn PairNotifier>>,
    pub(crate) pairs: PairCounter,
    pub(crate) stats: Arc<AcquisitionStats>,
    pub(crate) image_width: usize,
    pub(crate) image_height: usize,
}

impl<S: FrameSource, C: ColorConverter> AcquisitionLoop<S, C> {
    pub(crate) fn run(&mut self, stop: &AtomicBool, backoff: IdleBackoff) -> LoopExit {
        while !stop.load(Ordering::Acquire) {
            match self.step() {
                Ok(Step::Idle) => backoff.idle(),
                Ok(_) => {}
                Err(e) => {
                    error!("Encountered error: {}, image acquisition will stop.", e);
                    return LoopExit::Failed(e.to_string());
                }
            }
        }
        LoopExit::Stopped
    }

    pub(crate) fn step(&mut self) -> Result<Step> {
        let Some(frame) = self.source.poll_frame()? else {
            return Ok(Step::Idle);
        };
        self.stats.record_polled();

        let image = self.convert(frame)?;
        let frame_count = image.frame_count;

        match self.queue.try_push(image) {
            Ok(()) => {
                self.stats.record_enqueued();
                let pair_ready = self.pairs.record();
                if pair_ready {
                    if let Some(notifier) = &self.notifier {
                        notifier.notify(true);
                    }
                    self.stats.record_pair();
                }
                Ok(Step::Enqueued { pair_ready })
            }
            Err(_dropped) => {
                self.pairs.reset();
                self.stats.record_dropped();
                trace!(frame_count, "Image queue full, frame dropped");
                Ok(Step::Dropped)
            }
        }
    }

    fn convert(&mut self, frame: Frame) -> Result<DisplayImage> {
        frame.validate()?;

        let Frame {
            width,
            height,
            bit_depth,
            data,
            sensor_kind,
            frame_count,
            timestamp,
        } = frame;

        if width != self.image_width || height != self.image_height {
            info!(
                "Image dimension change detected ({}x{} -> {}x{}), image acquisition thread was updated",
                self.image_width, self.image_height, width, height
            );
            self.image_width = width;
            self.image_height = height;
            self.stats.record_dimension_change();
        }

        let timer = Timer::start("convert");
        let pixels = match sensor_kind {
            SensorKind::Bayer => {
                let converter = self
                    .converter
                    .get_mut()
                    .ok_or(AcquisitionError::ConverterUnavailable)?;
                DisplayPixels::Rgb24(converter.transform_to_24(&data, width, height)?)
            }
            SensorKind::Monochrome if bit_depth <= 8 => {
                DisplayPixels::Gray8(data.iter().map(|&v| v.min(u8::MAX as u16) as u8).collect())
            }
            SensorKind::Monochrome => DisplayPixels::Gray16(data),
        };
        let (name, duration) = timer.stop();
        self.stats.add_conversion_time(duration);
        trace!(frame_count, "{}: {:.3}ms", name, duration.as_secs_f64() * 1000.0);

        Ok(DisplayImage {
            width,
            height,
            frame_count,
            timestamp,
            pixels,
        })
    }

    /// Consumes the loop, disposing the color converter.
    pub(crate) fn into_source(self) -> S {
        let AcquisitionLoop { source, converter, .. } = self;
        drop(converter);
        source
    }
}
