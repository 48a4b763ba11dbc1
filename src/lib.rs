//! # lighthouse_config - Tracker configuration loader for Lighthouse devices
//!
//! Turns the JSON configuration blob stored on a headset, controller or
//! tracker into a resolved calibration:
//! - Sensor locations and normals, expressed in IMU space
//! - Accelerometer and gyroscope bias/scale in physical units
//! - IMU, head and tracking-reference frame alignment
//! - C FFI for integration with C/C++ drivers
//!
//! ## Quick Start
//! ```no_run
//! use lighthouse_config::{load_htc_config, CalibrationRecord};
//!
//! let blob = std::fs::read("config.json").unwrap();
//! let mut record = CalibrationRecord::hmd("usb");
//! let report = load_htc_config(&mut record, &blob).unwrap();
//! println!("{} sensors, IMU solved: {}", record.sensor_count, report.imu_solved);
//! ```

pub mod error;
pub mod types;
pub mod config;
pub mod document;
pub mod fields;
pub mod walker;
pub mod pose;
pub mod scale;
pub mod loader;
pub mod dump;
pub mod ffi;

pub use error::{ConfigError, DocumentError, FieldError};
pub use types::*;
pub use config::ParseLimits;
pub use loader::{load_htc_config, load_htc_config_with_limits};

/// Result type alias for configuration loading.
pub type Result<T> = std::result::Result<T, ConfigError>;
