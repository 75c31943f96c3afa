//! Value types returned by the typed API.

use serde::Serialize;

/// A three-axis quantity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Components in wire order.
    pub const fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self { x, y, z }
    }
}

impl From<Vec3> for [f32; 3] {
    fn from(v: Vec3) -> Self {
        v.to_array()
    }
}

/// Roll, pitch and yaw in radians.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rpy {
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
}

impl From<[f32; 3]> for Rpy {
    fn from([roll, pitch, yaw]: [f32; 3]) -> Self {
        Self { roll, pitch, yaw }
    }
}

/// Orientation quaternion, scalar first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Quaternion {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<[f32; 4]> for Quaternion {
    fn from([w, x, y, z]: [f32; 4]) -> Self {
        Self { w, x, y, z }
    }
}

/// Quaternion and Euler angles sampled together.
///
/// The reply carries eight floats; the last one is not interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct QuatRpy {
    pub quat: Quaternion,
    pub rpy: Rpy,
}

impl From<[f32; 8]> for QuatRpy {
    fn from(v: [f32; 8]) -> Self {
        Self {
            quat: Quaternion::from([v[0], v[1], v[2], v[3]]),
            rpy: Rpy::from([v[4], v[5], v[6]]),
        }
    }
}

/// Filtered acceleration and angular rate sampled together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AccelGyro {
    pub accel: Vec3,
    pub gyro: Vec3,
}

impl From<[f32; 6]> for AccelGyro {
    fn from(v: [f32; 6]) -> Self {
        Self {
            accel: Vec3::new(v[0], v[1], v[2]),
            gyro: Vec3::new(v[3], v[4], v[5]),
        }
    }
}

/// Orientation, acceleration and angular rate in one sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ImuData {
    pub rpy: Rpy,
    pub accel: Vec3,
    pub gyro: Vec3,
}

impl From<[f32; 9]> for ImuData {
    fn from(v: [f32; 9]) -> Self {
        Self {
            rpy: Rpy::from([v[0], v[1], v[2]]),
            accel: Vec3::new(v[3], v[4], v[5]),
            gyro: Vec3::new(v[6], v[7], v[8]),
        }
    }
}

/// Row selector for the 3x3 magnetometer soft-iron and accelerometer scale
/// matrices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatrixRow {
    R0,
    R1,
    R2,
}

impl MatrixRow {
    pub const ALL: [MatrixRow; 3] = [MatrixRow::R0, MatrixRow::R1, MatrixRow::R2];

    pub const fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<usize> for MatrixRow {
    type Error = crate::error::SessionError;

    fn try_from(row: usize) -> Result<Self, Self::Error> {
        MatrixRow::ALL.get(row).copied().ok_or_else(|| {
            crate::error::SessionError::InvalidArgument(format!("matrix row {row} out of range 0..=2"))
        })
    }
}
