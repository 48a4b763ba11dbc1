//! Load a tracker JSON configuration and print the resolved calibration.
//!
//! Usage: cargo run --example load_config -- <config.json> [CODENAME]
//!
//! CODENAME defaults to HMD. Limits can be overridden with
//! LH_CONFIG_MAX_TOKENS, LH_CONFIG_MAX_LITERAL and LH_CONFIG_MAX_DEPTH.

use lighthouse_config::{load_htc_config_with_limits, CalibrationRecord, ParseLimits};

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let path = match args.next() {
        Some(p) => p,
        None => {
            eprintln!("Usage: load_config <config.json> [CODENAME]");
            std::process::exit(2);
        }
    };
    let codename = args.next().unwrap_or_else(|| "HMD".to_string());

    let blob = match std::fs::read(&path) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Failed to read {}: {}", path, e);
            std::process::exit(1);
        }
    };

    let mut record = CalibrationRecord::new("file", &codename);
    let report = match load_htc_config_with_limits(&mut record, &blob, &ParseLimits::from_env()) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error ({}): {}", e.status(), e);
            std::process::exit(1);
        }
    };

    println!("Device:       {} ({:?})", record.codename(), record.device_class());
    println!("Fields:       {:?}", report.fields);
    println!("Sensors:      {}", record.sensor_count);
    println!("IMU solved:   {}", report.imu_solved);
    println!("IMU rate:     {} Hz", record.imu_sample_rate_hz);
    println!("acc_bias:     {:?}", record.accel_bias.map(|v| [v.x, v.y, v.z]));
    println!("acc_scale:    {:?}", record.accel_scale.map(|v| [v.x, v.y, v.z]));
    println!("gyro_bias:    {:?}", record.gyro_bias.map(|v| [v.x, v.y, v.z]));
    println!("gyro_scale:   {:?}", record.gyro_scale.map(|v| [v.x, v.y, v.z]));
    println!("imu2trackref: {}", record.imu_to_trackref);
    println!("head2imu:     {}", record.head_to_imu);

    for i in 0..record.sensor_count {
        if let Some(p) = record.sensor_location(i) {
            println!("  [{:2}] pos=({:.4}, {:.4}, {:.4})", i, p.x, p.y, p.z);
        }
    }
}
