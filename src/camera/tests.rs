#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;

    use crate::camera::sim::single_camera;
    use crate::camera::{
        CameraError, CameraHandler, CameraParameters, OperationMode, SimulatedSdk, TriggerPolarity,
        open_camera,
    };
    use crate::image_pipeline::{DisplayPixels, ImageQueue, PairNotifier, PipelineConfig, SensorKind};
    use crate::settings::SettingsStore;

    const CAMERA_ID: &str = "SIM-0001";

    fn settings_with(value: serde_json::Value) -> (tempfile::TempDir, SettingsStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::load(dir.path().join("config.json")).unwrap();
        store.set("settings", value);
        (dir, store)
    }

    #[test]
    fn test_no_camera_is_device_not_found() {
        let (_dir, settings) = settings_with(json!({"exposureTime_us": 1000}));
        let mut sdk = SimulatedSdk::new(Vec::new());

        let result = open_camera(&mut sdk, &settings);
        assert!(matches!(result, Err(CameraError::DeviceNotFound(_))));

        let result = CameraHandler::new(sdk, &settings, None, None, PipelineConfig::default());
        assert!(matches!(result, Err(CameraError::DeviceNotFound(_))));
    }

    #[test]
    fn test_missing_camera_settings() {
        let dir = tempfile::tempdir().unwrap();
        let settings = SettingsStore::load(dir.path().join("config.json")).unwrap();
        let mut sdk = single_camera(SensorKind::Monochrome, 8, 8, 8, 0);

        let result = open_camera(&mut sdk, &settings);
        assert!(matches!(result, Err(CameraError::MissingSettings)));
        assert_eq!(sdk.open_count(), 0);
    }

    #[test]
    fn test_invalid_camera_settings() {
        let (_dir, settings) = settings_with(json!({"exposureTime_us": "long"}));
        let mut sdk = single_camera(SensorKind::Monochrome, 8, 8, 8, 0);

        let result = open_camera(&mut sdk, &settings);
        assert!(matches!(result, Err(CameraError::InvalidSettings(_))));
    }

    #[test]
    fn test_default_parameters_applied() {
        let (_dir, settings) = settings_with(json!({"exposureTime_us": 1000}));
        let mut sdk = single_camera(SensorKind::Monochrome, 8, 8, 8, 0);

        let _session = open_camera(&mut sdk, &settings).unwrap();

        let state = sdk.camera_state(CAMERA_ID).unwrap();
        assert_eq!(state.exposure_time_us, 1000);
        assert_eq!(state.frames_per_trigger, 1);
        assert_eq!(state.operation_mode, OperationMode::HardwareTriggered);
        assert_eq!(state.trigger_polarity, TriggerPolarity::ActiveLow);
        assert_eq!(state.armed_buffers, Some(2));
    }

    #[test]
    fn test_parameters_from_settings() {
        let (_dir, settings) = settings_with(json!({
            "exposureTime_us": 250,
            "framesPerTrigger": 0,
            "operationMode": "softwareTriggered",
            "triggerPolarity": "activeHigh",
            "armFrameCount": 4
        }));

        let parameters = CameraParameters::from_settings(&settings).unwrap();

        assert_eq!(
            parameters,
            CameraParameters {
                exposure_time_us: 250,
                frames_per_trigger: 0,
                operation_mode: OperationMode::SoftwareTriggered,
                trigger_polarity: TriggerPolarity::ActiveHigh,
                arm_frame_count: 4,
            }
        );
    }

    #[test]
    fn test_handler_lifecycle() {
        let (_dir, settings) = settings_with(json!({"exposureTime_us": 1000}));
        let sdk = single_camera(SensorKind::Monochrome, 8, 8, 8, 0);
        let (tx, rx) = crossbeam_channel::bounded::<bool>(16);
        let notifier: Arc<dyn PairNotifier> = Arc::new(tx);
        let shared = ImageQueue::new(2);

        let mut handler =
            CameraHandler::new(sdk, &settings, Some(shared.clone()), Some(notifier), PipelineConfig::default())
                .unwrap();
        assert!(handler.is_connected());
        assert!(!handler.camera_state());

        handler.activate_camera_instance().unwrap();
        assert!(handler.camera_state());

        assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok(true));
        assert!(shared.len() <= 2);
        let image = shared.pop_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(&image.pixels, DisplayPixels::Gray8(data) if data.len() == 64));

        handler.dispose().unwrap();
        assert!(!handler.camera_state());
        assert!(!handler.is_connected());
        assert!(handler.sdk().is_disposed());
        let state = handler.sdk().camera_state(CAMERA_ID).unwrap();
        assert_eq!(state.armed_buffers, None);
        assert!(state.disposed);
        assert!(state.frames_produced >= 2);
    }

    #[test]
    fn test_reinitialize_applies_new_settings() {
        let (_dir, settings) = settings_with(json!({"exposureTime_us": 1000}));
        let sdk = single_camera(SensorKind::Bayer, 6, 4, 12, 1000);

        let mut handler = CameraHandler::new(sdk, &settings, None, None, PipelineConfig::default()).unwrap();
        handler.activate_camera_instance().unwrap();

        settings.set("settings", json!({"exposureTime_us": 2000}));
        handler.reinitialize(&settings).unwrap();

        assert!(handler.camera_state());
        assert_eq!(handler.sdk().open_count(), 2);
        let state = handler.sdk().camera_state(CAMERA_ID).unwrap();
        assert_eq!(state.exposure_time_us, 2000);
        assert_eq!(state.armed_buffers, Some(2));

        let image = handler
            .get_output_queue()
            .pop_timeout(Duration::from_secs(5))
            .unwrap();
        assert!(image.is_color());
        assert_eq!(image.sample_count(), 6 * 4 * 3);

        handler.dispose().unwrap();
        assert!(matches!(handler.reinitialize(&settings), Err(CameraError::Disposed)));
    }

    #[test]
    fn test_dispose_without_activation() {
        let (_dir, settings) = settings_with(json!({"exposureTime_us": 1000}));
        let sdk = single_camera(SensorKind::Monochrome, 8, 8, 8, 0);

        let mut handler = CameraHandler::new(sdk, &settings, None, None, PipelineConfig::default()).unwrap();
        handler.dispose().unwrap();

        let state = handler.sdk().camera_state(CAMERA_ID).unwrap();
        assert!(state.disposed);
        assert_eq!(state.frames_produced, 0);
        assert!(handler.dispose().is_ok());
    }
}
