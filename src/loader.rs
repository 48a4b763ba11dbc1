use crate::config::ParseLimits;
use crate::error::ConfigError;
use crate::types::{CalibrationRecord, LoadReport};
use crate::{document, pose, scale, walker, Result};

// -- Status codes returned across the C boundary --
pub const STATUS_OK: i32 = 0;
pub const STATUS_EMPTY_INPUT: i32 = -1;
pub const STATUS_PARSE_FAILED: i32 = -2;
pub const STATUS_NOT_AN_OBJECT: i32 = -3;
pub const STATUS_FIELD_ERROR: i32 = -4;
pub const STATUS_INVALID_ARGUMENT: i32 = -5;

/// Load a tracker JSON configuration blob into `record` with default limits.
pub fn load_htc_config(record: &mut CalibrationRecord, config: &[u8]) -> Result<LoadReport> {
    load_htc_config_with_limits(record, config, &ParseLimits::default())
}

/// Load a tracker JSON configuration blob into `record`.
///
/// 1. Parses the document within `limits` and requires an object at the root
/// 2. Walks it, storing recognized fields and collecting the IMU axes
/// 3. Fits `imu_to_trackref` from the IMU axes when they are usable
/// 4. Moves sensor geometry and the head pose into IMU space
/// 5. Applies the device family's unit conversions
///
/// On error `record` is left exactly as it was.
pub fn load_htc_config_with_limits(
    record: &mut CalibrationRecord,
    config: &[u8],
    limits: &ParseLimits,
) -> Result<LoadReport> {
    if config.is_empty() {
        return Err(ConfigError::EmptyInput);
    }

    let document = document::parse_document(config, limits).map_err(|e| {
        log::info!("Failed to parse JSON in {} configuration: {}", record.codename(), e);
        ConfigError::from(e)
    })?;
    if !document.root().is_object() {
        log::info!("Object expected in {} configuration", record.codename());
        return Err(ConfigError::NotAnObject);
    }

    let mut working = record.clone();
    let (hint, fields) = walker::walk_document(&document, limits, &mut working)?;

    let imu_solved = pose::solve_imu_pose(&mut working.imu_to_trackref, &hint);
    if !imu_solved {
        log::debug!("No usable IMU axes in {} configuration", record.codename());
    }
    pose::normalize_to_imu(&mut working);
    scale::apply_device_scaling(&mut working);

    *record = working;

    log::info!(
        "Loaded {} configuration: {} sensors, fields={:?}, imu_solved={}",
        record.codename(),
        record.sensor_count,
        fields,
        imu_solved
    );

    Ok(LoadReport { fields, imu_solved })
}

/// Status code for a load result.
pub fn status_of<T>(result: &Result<T>) -> i32 {
    match result {
        Ok(_) => STATUS_OK,
        Err(e) => e.status(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DocumentError, FieldError};
    use crate::types::{LoadedFields, Pose, DEFAULT_IMU_HZ};
    use nalgebra::{Point3, Vector3};

    const VIVE_TRACKER: &str = r#"{
        "device_class": "generic_tracker",
        "device_serial_number": "LHR-0DC8D2A3",
        "imu": {
            "acc_bias": [0.01, -0.02, 0.005],
            "acc_scale": [8192, 8192, 8192],
            "gyro_bias": [0.1, 0.2, 0.3],
            "gyro_scale": [1, 1, 1],
            "plus_x": [0, 1, 0],
            "plus_z": [0, 0, 1],
            "position": [0.01, 0.02, 0.03]
        },
        "lighthouse_config": {
            "channelMap": [0, 1, 2],
            "modelNormals": [[0, 1, 0], [1, 0, 0], [0, 0, 1]],
            "modelPoints": [[0.01, 0.02, 0.03], [0.0, 0.1, 0.0], [0.5, -0.5, 1.0]]
        },
        "head": {"plus_x": [1, 0, 0], "plus_z": [0, 0, 1], "position": [0, 0, 0]},
        "trackref_from_head": [1, 0, 0, 0, 0, 0, 0.1]
    }"#;

    #[test]
    fn test_load_points_and_imu() {
        let config = r#"{"modelPoints":[[0,0,0],[1,0,0]],"imu":{"plus_x":[1,0,0],"plus_z":[0,0,1],"position":[0,0,0]}}"#;
        let mut record = CalibrationRecord::hmd("usb");
        let report = load_htc_config(&mut record, config.as_bytes()).unwrap();

        assert!(report.imu_solved);
        assert_eq!(status_of(&Ok::<_, ConfigError>(report)), STATUS_OK);
        assert_eq!(record.sensor_count, 2);
        assert_eq!(record.sensor_locations.as_ref().map(Vec::len), Some(6));
        assert!(record.imu_to_trackref.rotation.angle() < 1e-9);
        assert_eq!(record.imu_sample_rate_hz, 1000.0);
        let second = record.sensor_location(1).unwrap();
        assert!((second - Point3::new(1.0, 0.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn test_load_empty_object() {
        let mut record = CalibrationRecord::tr0("usb");
        let report = load_htc_config(&mut record, b"{}").unwrap();

        assert!(report.fields.is_empty());
        assert!(!report.imu_solved);
        assert!(record.sensor_locations.is_none());
        assert!(record.sensor_normals.is_none());
        assert!(record.accel_bias.is_none());
        assert!(record.gyro_scale.is_none());
        assert_eq!(record.imu_to_trackref, Pose::identity());
        assert_eq!(record.head_to_trackref, Pose::identity());
        assert_eq!(record.head_to_imu, Pose::identity());
    }

    #[test]
    fn test_empty_buffer() {
        let mut record = CalibrationRecord::hmd("usb");
        let before = record.clone();
        let result = load_htc_config(&mut record, b"");
        assert_eq!(status_of(&result), STATUS_EMPTY_INPUT);
        assert_eq!(record, before);
    }

    #[test]
    fn test_controller_accel_scale() {
        let mut record = CalibrationRecord::wm0("usb");
        load_htc_config(&mut record, br#"{"acc_scale": [8192, 8192, 8192]}"#).unwrap();
        assert_eq!(record.accel_scale, Some(Vector3::new(2.0, 2.0, 2.0)));
        assert_eq!(record.imu_sample_rate_hz, DEFAULT_IMU_HZ);
    }

    #[test]
    fn test_root_must_be_object() {
        let mut record = CalibrationRecord::hmd("usb");
        let result = load_htc_config(&mut record, b"[1, 2, 3]");
        assert!(matches!(result, Err(ConfigError::NotAnObject)));
        assert_eq!(status_of(&result), STATUS_NOT_AN_OBJECT);
    }

    #[test]
    fn test_malformed_json() {
        let mut record = CalibrationRecord::hmd("usb");
        let result = load_htc_config(&mut record, br#"{"modelPoints": [[0, 0, 0]"#);
        assert!(matches!(
            result,
            Err(ConfigError::Parse(DocumentError::Syntax(_)))
        ));
        assert_eq!(status_of(&result), STATUS_PARSE_FAILED);
    }

    #[test]
    fn test_node_limit_is_structural() {
        let limits = ParseLimits {
            max_nodes: 8,
            ..ParseLimits::default()
        };
        let mut record = CalibrationRecord::hmd("usb");
        let result = load_htc_config_with_limits(
            &mut record,
            br#"{"acc_scale": [1, 2, 3], "gyro_scale": [1, 2, 3]}"#,
            &limits,
        );
        assert!(matches!(
            result,
            Err(ConfigError::Parse(DocumentError::TooManyNodes { limit: 8 }))
        ));
    }

    #[test]
    fn test_field_error_leaves_record_untouched() {
        let mut record = CalibrationRecord::hmd("usb");
        let before = record.clone();
        let config = br#"{"acc_bias": [1, 2, 3], "modelPoints": [[0, 0, 0], [1, "x", 0]]}"#;
        let result = load_htc_config(&mut record, config);

        match &result {
            Err(ConfigError::Field { key, source }) => {
                assert_eq!(key, "modelPoints");
                assert_eq!(*source, FieldError::NotNumeric { index: 1 });
            }
            other => panic!("expected field error, got {:?}", other),
        }
        assert_eq!(status_of(&result), STATUS_FIELD_ERROR);
        assert_eq!(record, before);
    }

    #[test]
    fn test_depth_limit_leaves_record_untouched() {
        let limits = ParseLimits {
            max_depth: 4,
            ..ParseLimits::default()
        };
        let mut record = CalibrationRecord::hmd("usb");
        let before = record.clone();
        let config = br#"{"acc_bias": [1, 2, 3], "x": [[[[1]]]]}"#;
        let result = load_htc_config_with_limits(&mut record, config, &limits);

        assert!(matches!(
            result,
            Err(ConfigError::Parse(DocumentError::TooDeep { limit: 4 }))
        ));
        assert_eq!(status_of(&result), STATUS_PARSE_FAILED);
        assert_eq!(record, before);
    }

    #[test]
    fn test_long_literal_leaves_record_untouched() {
        let mut record = CalibrationRecord::wm0("usb");
        let before = record.clone();
        // 128 bytes: one over the literal limit.
        let literal = format!("0.{}", "1".repeat(126));
        let config = format!(r#"{{"acc_scale": [1, 1, 1], "acc_bias": [{}, 0, 0]}}"#, literal);
        let result = load_htc_config(&mut record, config.as_bytes());

        match &result {
            Err(ConfigError::Field { key, source }) => {
                assert_eq!(key, "acc_bias");
                assert_eq!(*source, FieldError::LiteralTooLong { len: 128, limit: 127 });
            }
            other => panic!("expected field error, got {:?}", other),
        }
        assert_eq!(status_of(&result), STATUS_FIELD_ERROR);
        assert_eq!(record, before);
    }

    #[test]
    fn test_bad_imu_axis_leaves_record_untouched() {
        let mut record = CalibrationRecord::hmd("usb");
        let before = record.clone();
        let result = load_htc_config(&mut record, br#"{"imu": {"plus_x": [1, "x", 0]}}"#);

        match &result {
            Err(ConfigError::Field { key, source }) => {
                assert_eq!(key, "plus_x");
                assert_eq!(*source, FieldError::NotNumeric { index: 1 });
            }
            other => panic!("expected field error, got {:?}", other),
        }
        assert_eq!(status_of(&result), STATUS_FIELD_ERROR);
        assert_eq!(record, before);
    }

    #[test]
    fn test_bad_sensor_triple_is_tolerated() {
        let mut record = CalibrationRecord::hmd("usb");
        let config = br#"{"modelPoints": [[0, 0, 0], [1, 0]], "acc_scale": [8192, 8192, 8192]}"#;
        let result = load_htc_config(&mut record, config);

        assert_eq!(status_of(&result), STATUS_OK);
        let report = result.unwrap();
        assert_eq!(report.fields, LoadedFields::ACC_SCALE);
        assert!(record.sensor_locations.is_none());
        assert_eq!(record.sensor_count, 0);
        let scale = record.accel_scale.unwrap();
        assert!((scale - Vector3::new(1.0, 1.0, 1.0)).norm() < 1e-12);
    }

    #[test]
    fn test_mismatched_sensor_arrays_use_shorter_count() {
        let mut record = CalibrationRecord::tr1("usb");
        let config = br#"{"modelPoints": [[0, 0, 0], [1, 0, 0]], "modelNormals": [[0, 0, 1]]}"#;
        load_htc_config(&mut record, config).unwrap();
        assert_eq!(record.sensor_count, 1);
        assert!(record.sensor_location(record.sensor_count - 1).is_some());
        assert!(record.sensor_normal(record.sensor_count - 1).is_some());
    }

    #[test]
    fn test_wrong_arity_poses_keep_prior_value() {
        let mut record = CalibrationRecord::tr0("usb");
        let config = br#"{"trackref_from_imu": [1, 0, 0, 0, 1, 2], "trackref_from_head": [1, 0, 0, 0, 1, 2, 3, 4]}"#;
        let report = load_htc_config(&mut record, config).unwrap();
        assert!(report.fields.is_empty());
        assert_eq!(record.imu_to_trackref, Pose::identity());
        assert_eq!(record.head_to_trackref, Pose::identity());
    }

    #[test]
    fn test_degenerate_axes_keep_identity() {
        let mut record = CalibrationRecord::hmd("usb");
        let config = br#"{"imu": {"plus_x": [0, 0, 0], "plus_z": [0, 0, 1], "position": [1, 2, 3]}}"#;
        let report = load_htc_config(&mut record, config).unwrap();
        assert!(!report.imu_solved);
        assert_eq!(record.imu_to_trackref, Pose::identity());
    }

    #[test]
    fn test_unknown_keys_do_not_matter() {
        let plain = br#"{"acc_scale": [8192, 8192, 8192]}"#;
        let noisy = br#"{"x": {"y": [1, [2]], "z": "w"}, "acc_scale": [8192, 8192, 8192], "q": [true, null]}"#;

        let mut a = CalibrationRecord::wm1("usb");
        let mut b = CalibrationRecord::wm1("usb");
        load_htc_config(&mut a, plain).unwrap();
        load_htc_config(&mut b, noisy).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_full_tracker_config() {
        let mut record = CalibrationRecord::tr0("usb");
        let report = load_htc_config(&mut record, VIVE_TRACKER.as_bytes()).unwrap();

        assert!(report.imu_solved);
        assert!(report.fields.contains(
            LoadedFields::MODEL_POINTS
                | LoadedFields::MODEL_NORMALS
                | LoadedFields::ACC_SCALE
                | LoadedFields::TRACKREF_FROM_HEAD
                | LoadedFields::IMU_PLUS_X
        ));
        assert_eq!(record.sensor_count, 3);
        assert_eq!(record.sensor_locations.as_ref().map(Vec::len), Some(9));
        assert_eq!(record.sensor_normals.as_ref().map(Vec::len), Some(9));

        // IMU x axis points along trackref +y: a 90 degree yaw.
        let imu_x = record.imu_to_trackref * Vector3::x();
        assert!((imu_x - Vector3::y()).norm() < 1e-9);
        assert_eq!(
            record.imu_to_trackref.translation.vector,
            Vector3::new(0.01, 0.02, 0.03)
        );

        // Sensor 0 sits exactly at the IMU origin.
        let first = record.sensor_location(0).unwrap();
        assert!(first.coords.norm() < 1e-9);
        // Normal (0, 1, 0) in trackref is the IMU x axis.
        let normal = record.sensor_normal(0).unwrap();
        assert!((normal - Vector3::x()).norm() < 1e-9);

        let expected_head = record.imu_to_trackref.inverse() * record.head_to_trackref;
        assert!((record.head_to_imu.translation.vector - expected_head.translation.vector).norm() < 1e-12);

        assert_eq!(record.accel_scale, Some(Vector3::new(2.0, 2.0, 2.0)));
        let bias = record.accel_bias.unwrap();
        assert!((bias.x - 10.0).abs() < 1e-9);
        assert_eq!(record.gyro_bias, Some(Vector3::new(0.1, 0.2, 0.3)));
        assert_eq!(record.imu_sample_rate_hz, DEFAULT_IMU_HZ);
    }

    #[test]
    fn test_sensor_arrays_match_count() {
        let mut record = CalibrationRecord::hmd("usb");
        load_htc_config(&mut record, VIVE_TRACKER.as_bytes()).unwrap();
        let n = record.sensor_count * 3;
        assert_eq!(record.sensor_locations.as_ref().unwrap().len(), n);
        assert_eq!(record.sensor_normals.as_ref().unwrap().len(), n);
    }
}
