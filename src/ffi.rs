//! C FFI layer for lighthouse_config.
//!
//! Provides an opaque record handle for C/C++ consumers.
//! The generated C header is written to `include/lighthouse_config.h` by cbindgen.

use crate::error::LastError;
use crate::loader::{self, STATUS_INVALID_ARGUMENT, STATUS_OK};
use crate::types::{CalibrationRecord, DeviceClass, Pose};
use nalgebra::Vector3;
use std::ffi::{c_char, c_int, CStr};

/// Last error message for C consumers.
static LAST_ERROR: LastError = LastError::new();

/// Opaque calibration record handle for C consumers.
pub struct LhRecord(CalibrationRecord);

/// Pose in C-compatible layout.
#[repr(C)]
pub struct LhPose {
    /// Quaternion [w, x, y, z].
    pub rotation: [f64; 4],
    /// Position [x, y, z].
    pub position: [f64; 3],
}

/// The three poses of a record.
#[repr(C)]
pub struct LhPoses {
    pub imu_to_trackref: LhPose,
    pub head_to_trackref: LhPose,
    pub head_to_imu: LhPose,
}

/// IMU calibration in C-compatible layout. Vectors that were not present in
/// the configuration are zero and their `has_*` flag is false.
#[repr(C)]
pub struct LhImuCalibration {
    pub accel_bias: [f64; 3],
    pub accel_scale: [f64; 3],
    pub gyro_bias: [f64; 3],
    pub gyro_scale: [f64; 3],
    pub has_accel_bias: bool,
    pub has_accel_scale: bool,
    pub has_gyro_bias: bool,
    pub has_gyro_scale: bool,
    pub imu_sample_rate_hz: f64,
}

fn to_c_pose(pose: &Pose) -> LhPose {
    let q = pose.rotation.quaternion();
    let t = pose.translation.vector;
    LhPose {
        rotation: [q.w, q.i, q.j, q.k],
        position: [t.x, t.y, t.z],
    }
}

fn to_c_vector(v: Option<Vector3<f64>>) -> ([f64; 3], bool) {
    match v {
        Some(v) => ([v.x, v.y, v.z], true),
        None => ([0.0; 3], false),
    }
}

fn invalid_argument(message: &str) -> c_int {
    LAST_ERROR.set(&message);
    STATUS_INVALID_ARGUMENT
}

/// Create an empty record for a device.
/// Returns NULL if either string is null or not UTF-8.
///
/// # Safety
/// `driver_name` and `codename` must be null-terminated strings, or null.
#[no_mangle]
pub unsafe extern "C" fn lh_record_new(
    driver_name: *const c_char,
    codename: *const c_char,
) -> *mut LhRecord {
    if driver_name.is_null() || codename.is_null() {
        LAST_ERROR.set(&"driver name and codename are required");
        return std::ptr::null_mut();
    }
    match (CStr::from_ptr(driver_name).to_str(), CStr::from_ptr(codename).to_str()) {
        (Ok(driver), Ok(code)) => Box::into_raw(Box::new(LhRecord(CalibrationRecord::new(driver, code)))),
        _ => {
            LAST_ERROR.set(&"driver name and codename must be UTF-8");
            std::ptr::null_mut()
        }
    }
}

/// Free a record.
///
/// # Safety
/// `rec` must be a pointer returned by `lh_record_new`, or null.
#[no_mangle]
pub unsafe extern "C" fn lh_record_free(rec: *mut LhRecord) {
    if !rec.is_null() {
        drop(Box::from_raw(rec));
    }
}

/// Load a JSON configuration blob into a record.
///
/// Returns 0 on success, -1 for empty input, -2 for malformed JSON or a
/// document over the node or depth limit, -3 if the root is not an object, -4 for a malformed numeric field,
/// -5 for a null argument. On failure the record is unchanged.
///
/// # Safety
/// `rec` must be a valid record pointer, or null. `buf` must point to `len`
/// readable bytes, or be null.
#[no_mangle]
pub unsafe extern "C" fn lh_load_htc_config(rec: *mut LhRecord, buf: *const u8, len: usize) -> c_int {
    if rec.is_null() {
        return invalid_argument("record is null");
    }
    let rec = &mut *rec;
    let config: &[u8] = if len == 0 {
        &[]
    } else if buf.is_null() {
        return invalid_argument("configuration buffer is null");
    } else {
        std::slice::from_raw_parts(buf, len)
    };

    match loader::load_htc_config(&mut rec.0, config) {
        Ok(_) => {
            LAST_ERROR.clear();
            STATUS_OK
        }
        Err(e) => {
            LAST_ERROR.set(&e);
            e.status()
        }
    }
}

/// Device family of a record.
///
/// # Safety
/// `rec` must be a valid record pointer, or null.
#[no_mangle]
pub unsafe extern "C" fn lh_record_device_class(rec: *const LhRecord) -> DeviceClass {
    if rec.is_null() {
        return DeviceClass::Other;
    }
    (*rec).0.device_class()
}

/// Number of sensors loaded.
///
/// # Safety
/// `rec` must be a valid record pointer, or null.
#[no_mangle]
pub unsafe extern "C" fn lh_record_sensor_count(rec: *const LhRecord) -> usize {
    if rec.is_null() {
        return 0;
    }
    (*rec).0.sensor_count
}

/// Flat `[x, y, z, ...]` sensor locations in IMU space, or NULL if none were
/// loaded. Valid until the record is reloaded or freed.
///
/// # Safety
/// `rec` must be a valid record pointer, or null.
#[no_mangle]
pub unsafe extern "C" fn lh_record_sensor_locations(rec: *const LhRecord) -> *const f64 {
    if rec.is_null() {
        return std::ptr::null();
    }
    (*rec)
        .0
        .sensor_locations
        .as_ref()
        .map_or(std::ptr::null(), |v| v.as_ptr())
}

/// Flat `[x, y, z, ...]` sensor normals in IMU space, or NULL if none were
/// loaded. Valid until the record is reloaded or freed.
///
/// # Safety
/// `rec` must be a valid record pointer, or null.
#[no_mangle]
pub unsafe extern "C" fn lh_record_sensor_normals(rec: *const LhRecord) -> *const f64 {
    if rec.is_null() {
        return std::ptr::null();
    }
    (*rec)
        .0
        .sensor_normals
        .as_ref()
        .map_or(std::ptr::null(), |v| v.as_ptr())
}

/// Copy the IMU calibration of a record into `out`.
/// Returns 0 on success, -5 on a null argument.
///
/// # Safety
/// `rec` and `out` must be valid pointers, or null.
#[no_mangle]
pub unsafe extern "C" fn lh_record_imu_calibration(
    rec: *const LhRecord,
    out: *mut LhImuCalibration,
) -> c_int {
    if rec.is_null() || out.is_null() {
        return invalid_argument("record and output are required");
    }
    let record = &(*rec).0;
    let (accel_bias, has_accel_bias) = to_c_vector(record.accel_bias);
    let (accel_scale, has_accel_scale) = to_c_vector(record.accel_scale);
    let (gyro_bias, has_gyro_bias) = to_c_vector(record.gyro_bias);
    let (gyro_scale, has_gyro_scale) = to_c_vector(record.gyro_scale);
    out.write(LhImuCalibration {
        accel_bias,
        accel_scale,
        gyro_bias,
        gyro_scale,
        has_accel_bias,
        has_accel_scale,
        has_gyro_bias,
        has_gyro_scale,
        imu_sample_rate_hz: record.imu_sample_rate_hz,
    });
    STATUS_OK
}

/// Copy the poses of a record into `out`.
/// Returns 0 on success, -5 on a null argument.
///
/// # Safety
/// `rec` and `out` must be valid pointers, or null.
#[no_mangle]
pub unsafe extern "C" fn lh_record_poses(rec: *const LhRecord, out: *mut LhPoses) -> c_int {
    if rec.is_null() || out.is_null() {
        return invalid_argument("record and output are required");
    }
    let record = &(*rec).0;
    out.write(LhPoses {
        imu_to_trackref: to_c_pose(&record.imu_to_trackref),
        head_to_trackref: to_c_pose(&record.head_to_trackref),
        head_to_imu: to_c_pose(&record.head_to_imu),
    });
    STATUS_OK
}

/// Write `<codename>_points.csv` and `<codename>_normals.csv` into `dir`.
/// Returns 0 on success, -1 on an I/O error, -5 on a bad argument.
///
/// # Safety
/// `rec` must be a valid record pointer, or null. `dir` must be a
/// null-terminated string, or null.
#[no_mangle]
pub unsafe extern "C" fn lh_record_write_calinfo(rec: *const LhRecord, dir: *const c_char) -> c_int {
    if rec.is_null() || dir.is_null() {
        return invalid_argument("record and directory are required");
    }
    let Ok(dir) = CStr::from_ptr(dir).to_str() else {
        return invalid_argument("directory must be UTF-8");
    };
    match crate::dump::write_calinfo(std::path::Path::new(dir), &(*rec).0) {
        Ok(_) => STATUS_OK,
        Err(e) => {
            LAST_ERROR.set(&e);
            -1
        }
    }
}

/// Get the last error message. Returns NULL if no error.
/// The message is shared by all threads: the returned pointer is valid only
/// until the next lighthouse_config call on any thread.
#[no_mangle]
pub extern "C" fn lh_last_error() -> *const c_char {
    LAST_ERROR.as_ptr()
}
