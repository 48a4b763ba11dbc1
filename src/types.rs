use nalgebra::{Isometry3, Point3, Vector3};

/// Rigid pose: unit quaternion rotation plus translation.
pub type Pose = Isometry3<f64>;

/// Timebase of the Lighthouse receivers on every supported device.
pub const DEFAULT_TIMEBASE_HZ: u32 = 48_000_000;

/// IMU rate assumed for any device until its class says otherwise.
pub const DEFAULT_IMU_HZ: f64 = 250.0;

/// IMU rate of the headset.
pub const HMD_IMU_HZ: f64 = 1000.0;

/// Device family, resolved once from the codename.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    /// Headset (`HMD`).
    Hmd = 0,
    /// Wireless controllers (`WM0`, `WM1`, ...).
    Controller = 1,
    /// Trackers, wired watchmen and anything unrecognized.
    Other = 2,
}

impl DeviceClass {
    pub fn from_tag(tag: &str) -> DeviceClass {
        if tag == "HMD" {
            DeviceClass::Hmd
        } else if tag.starts_with("WM") {
            DeviceClass::Controller
        } else {
            DeviceClass::Other
        }
    }
}

/// Calibration of one tracked object, filled in from its configuration blob.
///
/// Sensor arrays are flat `[x, y, z, x, y, z, ...]` in sensor index order.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationRecord {
    codename: String,
    driver_name: String,
    class: DeviceClass,
    pub timebase_hz: u32,
    pub imu_sample_rate_hz: f64,
    pub sensor_count: usize,
    pub sensor_locations: Option<Vec<f64>>,
    pub sensor_normals: Option<Vec<f64>>,
    pub accel_bias: Option<Vector3<f64>>,
    pub accel_scale: Option<Vector3<f64>>,
    pub gyro_bias: Option<Vector3<f64>>,
    pub gyro_scale: Option<Vector3<f64>>,
    pub imu_to_trackref: Pose,
    pub head_to_trackref: Pose,
    pub head_to_imu: Pose,
}

impl CalibrationRecord {
    /// Create an empty record for a device with the given driver and codename.
    pub fn new(driver_name: &str, codename: &str) -> Self {
        Self {
            codename: codename.to_string(),
            driver_name: driver_name.to_string(),
            class: DeviceClass::from_tag(codename),
            timebase_hz: DEFAULT_TIMEBASE_HZ,
            imu_sample_rate_hz: DEFAULT_IMU_HZ,
            sensor_count: 0,
            sensor_locations: None,
            sensor_normals: None,
            accel_bias: None,
            accel_scale: None,
            gyro_bias: None,
            gyro_scale: None,
            imu_to_trackref: Pose::identity(),
            head_to_trackref: Pose::identity(),
            head_to_imu: Pose::identity(),
        }
    }

    pub fn hmd(driver_name: &str) -> Self {
        Self::new(driver_name, "HMD")
    }

    pub fn wm0(driver_name: &str) -> Self {
        Self::new(driver_name, "WM0")
    }

    pub fn wm1(driver_name: &str) -> Self {
        Self::new(driver_name, "WM1")
    }

    pub fn tr0(driver_name: &str) -> Self {
        Self::new(driver_name, "TR0")
    }

    pub fn tr1(driver_name: &str) -> Self {
        Self::new(driver_name, "TR1")
    }

    pub fn ww0(driver_name: &str) -> Self {
        Self::new(driver_name, "WW0")
    }

    /// Device codename, e.g. `HMD` or `WM0`.
    pub fn codename(&self) -> &str {
        &self.codename
    }

    pub fn driver_name(&self) -> &str {
        &self.driver_name
    }

    pub fn device_class(&self) -> DeviceClass {
        self.class
    }

    /// Location of sensor `index` in IMU space, if locations were loaded.
    pub fn sensor_location(&self, index: usize) -> Option<Point3<f64>> {
        triple_at(self.sensor_locations.as_deref(), index).map(Point3::from)
    }

    /// Normal of sensor `index` in IMU space, if normals were loaded.
    pub fn sensor_normal(&self, index: usize) -> Option<Vector3<f64>> {
        triple_at(self.sensor_normals.as_deref(), index)
    }
}

fn triple_at(values: Option<&[f64]>, index: usize) -> Option<Vector3<f64>> {
    let chunk = values?.chunks_exact(3).nth(index)?;
    Some(Vector3::new(chunk[0], chunk[1], chunk[2]))
}

/// Axis measurements found under the `imu` object, consumed by the pose solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImuAxisHint {
    pub position: Vector3<f64>,
    pub plus_x: Vector3<f64>,
    pub plus_z: Vector3<f64>,
}

impl Default for ImuAxisHint {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            plus_x: Vector3::zeros(),
            plus_z: Vector3::zeros(),
        }
    }
}

bitflags::bitflags! {
    /// Recognized fields that were present and stored during a load.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    #[repr(C)]
    pub struct LoadedFields: u32 {
        const MODEL_POINTS       = 1 << 0;
        const MODEL_NORMALS      = 1 << 1;
        const ACC_BIAS           = 1 << 2;
        const ACC_SCALE          = 1 << 3;
        const GYRO_BIAS          = 1 << 4;
        const GYRO_SCALE         = 1 << 5;
        const TRACKREF_FROM_IMU  = 1 << 6;
        const TRACKREF_FROM_HEAD = 1 << 7;
        const IMU_PLUS_X         = 1 << 8;
        const IMU_PLUS_Z         = 1 << 9;
        const IMU_POSITION       = 1 << 10;
    }
}

/// Outcome of a successful load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub fields: LoadedFields,
    /// Whether the IMU axes were usable and `imu_to_trackref` was fitted from them.
    pub imu_solved: bool,
}
