//! Conversion of raw IMU calibration constants into physical units.
//!
//! The configuration stores accelerometer and gyroscope coefficients in the
//! sensor's fixed-point units. Full-scale ranges differ per device family.

use crate::types::{CalibrationRecord, DeviceClass, HMD_IMU_HZ};
use std::f64::consts::PI;

/// Accelerometer counts per g at the ±4 g range.
const ACCEL_COUNTS_PER_G: f64 = 8192.0;

/// Full-scale value of a signed 16-bit gyroscope sample.
const GYRO_FULL_SCALE: f64 = (1 << 15) as f64;

/// Unit conversion factors for one device family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactors {
    pub accel_scale: f64,
    pub accel_bias: f64,
    pub gyro_scale: f64,
    /// IMU sample rate, when the family fixes one.
    pub imu_rate_hz: Option<f64>,
}

fn gyro_factor(deg_per_sec: f64) -> f64 {
    deg_per_sec / GYRO_FULL_SCALE * PI / 180.0
}

impl DeviceClass {
    pub fn scale_factors(self) -> ScaleFactors {
        match self {
            DeviceClass::Hmd => ScaleFactors {
                accel_scale: 1.0 / ACCEL_COUNTS_PER_G,
                accel_bias: 1000.0,
                gyro_scale: gyro_factor(500.0),
                imu_rate_hz: Some(HMD_IMU_HZ),
            },
            // MPU6500 at ±2000 deg/s; accel reported in units of 0.5 g.
            DeviceClass::Controller | DeviceClass::Other => ScaleFactors {
                accel_scale: 2.0 / ACCEL_COUNTS_PER_G,
                accel_bias: 1000.0,
                gyro_scale: gyro_factor(2000.0),
                imu_rate_hz: None,
            },
        }
    }
}

/// Apply the device family's unit conversions in place.
///
/// Missing coefficients are skipped. The gyroscope bias is kept as loaded.
pub fn apply_device_scaling(record: &mut CalibrationRecord) {
    let factors = record.device_class().scale_factors();

    if let Some(scale) = record.accel_scale.as_mut() {
        *scale *= factors.accel_scale;
    }
    if let Some(bias) = record.accel_bias.as_mut() {
        *bias *= factors.accel_bias;
    }
    if let Some(scale) = record.gyro_scale.as_mut() {
        *scale *= factors.gyro_scale;
    }
    if let Some(rate) = factors.imu_rate_hz {
        record.imu_sample_rate_hz = rate;
    }

    log::debug!(
        "Applied {:?} scaling to {} (IMU at {} Hz)",
        record.device_class(),
        record.codename(),
        record.imu_sample_rate_hz
    );
}
