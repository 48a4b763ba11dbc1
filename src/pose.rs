//! IMU axis fitting and re-expression of sensor geometry in IMU space.

use crate::types::{CalibrationRecord, ImuAxisHint, Pose};
use nalgebra::{Matrix3, Point3, Quaternion, Rotation3, Translation3, UnitQuaternion, Vector3};

/// Build a pose from `[w, x, y, z, px, py, pz]`.
///
/// Returns `None` for a zero-length quaternion or a slice of the wrong length.
pub fn pose_from_components(values: &[f64]) -> Option<Pose> {
    let [w, x, y, z, px, py, pz] = <[f64; 7]>::try_from(values).ok()?;
    let rotation = UnitQuaternion::try_new(Quaternion::new(w, x, y, z), f64::EPSILON)?;
    Some(Pose::from_parts(Translation3::new(px, py, pz), rotation))
}

/// Least-squares rotation taking each `canonical[i]` onto `measured[i]`.
///
/// Vectors are used as given (no centering, no normalization). Returns `None`
/// when the inputs are empty, of different lengths, or the SVD fails.
pub fn axis_fit(canonical: &[Vector3<f64>], measured: &[Vector3<f64>]) -> Option<UnitQuaternion<f64>> {
    if canonical.is_empty() || canonical.len() != measured.len() {
        return None;
    }

    let mut h = Matrix3::zeros();
    for (a, b) in canonical.iter().zip(measured.iter()) {
        h += b * a.transpose();
    }

    let svd = h.svd(true, true);
    let u = svd.u?;
    let v_t = svd.v_t?;
    let mut r = u * v_t;
    if r.determinant() < 0.0 {
        let mut u_fix = u;
        u_fix.column_mut(2).neg_mut();
        r = u_fix * v_t;
    }

    Some(UnitQuaternion::from_rotation_matrix(
        &Rotation3::from_matrix_unchecked(r),
    ))
}

/// Fit the IMU-to-tracking-reference pose from the measured IMU axes.
///
/// Leaves `pose` untouched and returns `false` if either axis is exactly zero.
pub fn solve_imu_pose(pose: &mut Pose, hint: &ImuAxisHint) -> bool {
    if hint.plus_x == Vector3::zeros() || hint.plus_z == Vector3::zeros() {
        return false;
    }

    let canonical = [Vector3::x(), Vector3::z()];
    let measured = [hint.plus_x, hint.plus_z];
    let Some(rotation) = axis_fit(&canonical, &measured) else {
        log::warn!("IMU axis fit failed for plus_x={:?} plus_z={:?}", hint.plus_x, hint.plus_z);
        return false;
    };

    // Position is taken as measured, not rotated into the fitted frame.
    *pose = Pose::from_parts(Translation3::from(hint.position), rotation);
    true
}

/// Move sensor geometry and the head pose from tracking-reference space into
/// IMU space, using the inverse of `imu_to_trackref`.
///
/// Locations get the full rigid transform, normals only the rotation.
pub fn normalize_to_imu(record: &mut CalibrationRecord) {
    let trackref_to_imu = record.imu_to_trackref.inverse();

    if let Some(locations) = record.sensor_locations.as_mut() {
        for p in locations.chunks_exact_mut(3) {
            let moved = trackref_to_imu.transform_point(&Point3::new(p[0], p[1], p[2]));
            p.copy_from_slice(moved.coords.as_slice());
        }
    }

    if let Some(normals) = record.sensor_normals.as_mut() {
        for n in normals.chunks_exact_mut(3) {
            let turned = trackref_to_imu.transform_vector(&Vector3::new(n[0], n[1], n[2]));
            n.copy_from_slice(turned.as_slice());
        }
    }

    record.head_to_imu = trackref_to_imu * record.head_to_trackref;
}
