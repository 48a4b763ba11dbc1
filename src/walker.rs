//! Context-sensitive walk over the parsed document.
//!
//! The walker visits every node once, in document order. Each array that is
//! the direct value of a recognized field name is handed to the dispatcher,
//! which decodes it into the calibration record or into the IMU axis scratch
//! space.

use crate::config::ParseLimits;
use crate::document::Document;
use crate::error::{ConfigError, FieldError};
use crate::fields;
use crate::pose;
use crate::types::{CalibrationRecord, ImuAxisHint, LoadedFields};
use crate::Result;
use nalgebra::Vector3;
use serde_json::Value;

/// One level of object nesting: the key whose value is currently walked.
///
/// Frames live on the call stack and only point at their parent.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    key: &'a str,
    previous: Option<&'a Frame<'a>>,
}

impl<'a> Frame<'a> {
    pub fn new(key: &'a str, previous: Option<&'a Frame<'a>>) -> Self {
        Self { key, previous }
    }

    pub fn key(&self) -> &'a str {
        self.key
    }

    /// Whether the enclosing object's key is `name`. Only looks one level up.
    pub fn parent_key_is(&self, name: &str) -> bool {
        self.previous.is_some_and(|parent| parent.key == name)
    }
}

/// Fields recognized wherever they appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    ModelPoints,
    ModelNormals,
    AccBias,
    AccScale,
    GyroBias,
    GyroScale,
    TrackrefFromImu,
    TrackrefFromHead,
}

/// Fields recognized only directly inside the `imu` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImuField {
    PlusX,
    PlusZ,
    Position,
}

const FIELDS: [(&str, Field); 8] = [
    ("modelPoints", Field::ModelPoints),
    ("modelNormals", Field::ModelNormals),
    ("acc_bias", Field::AccBias),
    ("acc_scale", Field::AccScale),
    ("gyro_bias", Field::GyroBias),
    ("gyro_scale", Field::GyroScale),
    ("trackref_from_imu", Field::TrackrefFromImu),
    ("trackref_from_head", Field::TrackrefFromHead),
];

const IMU_FIELDS: [(&str, ImuField); 3] = [
    ("plus_x", ImuField::PlusX),
    ("plus_z", ImuField::PlusZ),
    ("position", ImuField::Position),
];

const IMU_KEY: &str = "imu";

fn lookup<T: Copy>(table: &[(&str, T)], key: &str) -> Option<T> {
    table
        .iter()
        .find(|(name, _)| *name == key)
        .map(|&(_, field)| field)
}

/// Walk a parsed document and decode every recognized field into `record`.
///
/// Returns the IMU axis measurements and the set of fields that were stored.
pub fn walk_document(
    document: &Document,
    limits: &ParseLimits,
    record: &mut CalibrationRecord,
) -> Result<(ImuAxisHint, LoadedFields)> {
    let mut walker = Walker {
        limits,
        record,
        hint: ImuAxisHint::default(),
        fields: LoadedFields::empty(),
    };
    walker.walk(document.root(), None, false, document.nodes())?;
    Ok((walker.hint, walker.fields))
}

struct Walker<'a> {
    limits: &'a ParseLimits,
    record: &'a mut CalibrationRecord,
    hint: ImuAxisHint,
    fields: LoadedFields,
}

impl Walker<'_> {
    /// Visit `value` and return how many nodes it spans, object keys included.
    ///
    /// `direct` is set when `value` is the value of the innermost key in
    /// `stack`. `budget` is the number of nodes left from `value` onward; the
    /// walk never visits more than that.
    fn walk(
        &mut self,
        value: &Value,
        stack: Option<&Frame<'_>>,
        direct: bool,
        budget: usize,
    ) -> Result<usize> {
        if budget == 0 {
            return Ok(0);
        }

        match value {
            Value::Object(map) => {
                let mut consumed = 0;
                for (key, child) in map {
                    if remaining(budget, consumed) == 0 {
                        break;
                    }
                    // The key itself.
                    consumed += 1;
                    let frame = Frame::new(key, stack);
                    consumed += self.walk(child, Some(&frame), true, remaining(budget, consumed))?;
                }
                Ok(consumed + 1)
            }
            Value::Array(items) => {
                if let Some(frame) = stack.filter(|_| direct) {
                    self.dispatch(items, frame)?;
                }
                let mut consumed = 0;
                for item in items {
                    consumed += self.walk(item, stack, false, remaining(budget, consumed))?;
                }
                Ok(consumed + 1)
            }
            _ => Ok(1),
        }
    }

    /// Decode `items` if the key they belong to names a recognized field.
    fn dispatch(&mut self, items: &[Value], frame: &Frame<'_>) -> Result<()> {
        let key = frame.key();
        if let Some(field) = lookup(&FIELDS, key) {
            self.apply_field(field, items)
                .map_err(|source| field_error(key, source))
        } else if frame.parent_key_is(IMU_KEY) {
            match lookup(&IMU_FIELDS, key) {
                Some(field) => self
                    .apply_imu_field(field, items)
                    .map_err(|source| field_error(key, source)),
                None => Ok(()),
            }
        } else {
            log::trace!("Ignoring array field '{}'", key);
            Ok(())
        }
    }

    fn apply_field(&mut self, field: Field, items: &[Value]) -> std::result::Result<(), FieldError> {
        match field {
            Field::ModelPoints | Field::ModelNormals => {
                let points = match fields::parse_points(items, self.limits) {
                    Err(FieldError::BadSensorTriple { index }) => {
                        log::warn!("Ignoring {:?}: sensor {} is not an [x, y, z] triple", field, index);
                        return Ok(());
                    }
                    other => other?,
                };
                let count = items.len();
                if field == Field::ModelPoints {
                    self.record.sensor_locations = Some(points);
                    self.fields |= LoadedFields::MODEL_POINTS;
                } else {
                    self.record.sensor_normals = Some(points);
                    self.fields |= LoadedFields::MODEL_NORMALS;
                }
                self.update_sensor_count();
                log::debug!("Loaded {:?} for {} sensors", field, count);
            }
            Field::AccBias | Field::AccScale | Field::GyroBias | Field::GyroScale => {
                if items.len() != 3 {
                    log::warn!("Ignoring {:?} with {} components (expected 3)", field, items.len());
                    return Ok(());
                }
                let values = fields::parse_float_array(items, 3, self.limits)?;
                let vector = Some(Vector3::from_column_slice(&values));
                match field {
                    Field::AccBias => {
                        self.record.accel_bias = vector;
                        self.fields |= LoadedFields::ACC_BIAS;
                    }
                    Field::AccScale => {
                        self.record.accel_scale = vector;
                        self.fields |= LoadedFields::ACC_SCALE;
                    }
                    Field::GyroBias => {
                        self.record.gyro_bias = vector;
                        self.fields |= LoadedFields::GYRO_BIAS;
                    }
                    _ => {
                        self.record.gyro_scale = vector;
                        self.fields |= LoadedFields::GYRO_SCALE;
                    }
                }
            }
            Field::TrackrefFromImu | Field::TrackrefFromHead => {
                if items.len() != 7 {
                    log::warn!("Ignoring {:?} with {} components (expected 7)", field, items.len());
                    return Ok(());
                }
                let values = fields::parse_float_array(items, 7, self.limits)?;
                let Some(parsed) = pose::pose_from_components(&values) else {
                    log::warn!("Ignoring {:?} with a zero-length quaternion", field);
                    return Ok(());
                };
                if field == Field::TrackrefFromImu {
                    self.record.imu_to_trackref = parsed;
                    self.fields |= LoadedFields::TRACKREF_FROM_IMU;
                } else {
                    self.record.head_to_trackref = parsed;
                    self.fields |= LoadedFields::TRACKREF_FROM_HEAD;
                }
            }
        }
        Ok(())
    }

    /// Keep `sensor_count` a valid index bound for every loaded sensor array.
    fn update_sensor_count(&mut self) {
        let locations = self.record.sensor_locations.as_ref().map(|v| v.len() / 3);
        let normals = self.record.sensor_normals.as_ref().map(|v| v.len() / 3);
        self.record.sensor_count = match (locations, normals) {
            (Some(l), Some(n)) => {
                if l != n {
                    log::warn!(
                        "Sensor count mismatch: {} locations, {} normals; using {}",
                        l,
                        n,
                        l.min(n)
                    );
                }
                l.min(n)
            }
            (Some(count), None) | (None, Some(count)) => count,
            (None, None) => 0,
        };
    }

    fn apply_imu_field(
        &mut self,
        field: ImuField,
        items: &[Value],
    ) -> std::result::Result<(), FieldError> {
        if items.len() != 3 {
            log::warn!("Ignoring imu {:?} with {} components (expected 3)", field, items.len());
            return Ok(());
        }
        let (target, flag) = match field {
            ImuField::PlusX => (&mut self.hint.plus_x, LoadedFields::IMU_PLUS_X),
            ImuField::PlusZ => (&mut self.hint.plus_z, LoadedFields::IMU_PLUS_Z),
            ImuField::Position => (&mut self.hint.position, LoadedFields::IMU_POSITION),
        };
        fields::parse_float_array_in_place(items, target.as_mut_slice(), self.limits)?;
        self.fields |= flag;
        Ok(())
    }
}

fn remaining(budget: usize, consumed: usize) -> usize {
    budget.saturating_sub(1 + consumed)
}

fn field_error(key: &str, source: FieldError) -> ConfigError {
    ConfigError::Field {
        key: key.to_string(),
        source,
    }
}
