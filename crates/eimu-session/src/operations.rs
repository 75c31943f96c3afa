//! Table of every named device operation.
//!
//! Maps a stable operation name onto its command and the transform applied to
//! the decoded reply. The command-line tool dispatches through this table; the
//! typed methods on [`Session`](crate::Session) use the same command constants.

use eimu_frame::command::*;
use eimu_frame::{Access, Command, RequestShape};

use crate::reading::{is_ack, round_to, truncate_id, MOTION_DECIMALS, TUNING_DECIMALS};

/// Post-decode normalization for one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Round to six decimals.
    Motion,
    /// Round to three decimals.
    Tuning,
    /// Truncate to an integer id.
    Identifier,
    /// 1.0 for an acknowledgement, 0.0 otherwise.
    Ack,
    /// Leave values untouched.
    Raw,
}

impl Transform {
    pub fn apply(self, value: f32) -> f32 {
        match self {
            Transform::Motion => round_to(value, MOTION_DECIMALS),
            Transform::Tuning => round_to(value, TUNING_DECIMALS),
            Transform::Identifier => truncate_id(value) as f32,
            Transform::Ack => {
                if is_ack(value) {
                    1.0
                } else {
                    0.0
                }
            }
            Transform::Raw => value,
        }
    }
}

/// One named operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Operation {
    /// Name used on the command line. Unique per [`Access`] kind.
    pub name: &'static str,
    pub command: Command,
    pub transform: Transform,
    /// Labels for the reply values, one per float.
    pub fields: &'static [&'static str],
}

impl Operation {
    const fn new(
        name: &'static str,
        command: Command,
        transform: Transform,
        fields: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            command,
            transform,
            fields,
        }
    }

    /// What kind of request this is.
    pub fn kind(&self) -> OperationKind {
        match (self.command.access, self.command.shape) {
            (Access::Read, RequestShape::Empty) => OperationKind::Read,
            (Access::Read, _) => OperationKind::Get,
            (Access::Write, RequestShape::Vector) => OperationKind::WriteVector,
            (Access::Write, _) => OperationKind::Set,
            (Access::Action, _) => OperationKind::Action,
        }
    }
}

/// How an operation is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Empty request, float reply.
    Read,
    /// Indexed request, one-float reply.
    Get,
    /// Indexed request carrying a value, acknowledged.
    Set,
    /// Indexed request, acknowledged, no argument.
    Action,
    /// Three-float request, no reply.
    WriteVector,
}

const XYZ: &[&str] = &["x", "y", "z"];
const RPY: &[&str] = &["roll", "pitch", "yaw"];
const ACK: &[&str] = &["ack"];

use Transform::{Ack, Identifier, Motion, Raw, Tuning};

/// Every operation the device supports.
pub const OPERATIONS: &[Operation] = &[
    // Reads
    Operation::new("quat", READ_QUAT, Motion, &["w", "x", "y", "z"]),
    Operation::new("rpy", READ_RPY, Motion, RPY),
    Operation::new("rpy-var", READ_RPY_VAR, Motion, RPY),
    Operation::new("acc", READ_ACC, Motion, XYZ),
    Operation::new("acc-raw", READ_ACC_RAW, Motion, XYZ),
    Operation::new("acc-off", READ_ACC_OFF, Motion, XYZ),
    Operation::new("acc-var", READ_ACC_VAR, Motion, XYZ),
    Operation::new("gyro", READ_GYRO, Motion, XYZ),
    Operation::new("gyro-raw", READ_GYRO_RAW, Motion, XYZ),
    Operation::new("gyro-off", READ_GYRO_OFF, Motion, XYZ),
    Operation::new("gyro-var", READ_GYRO_VAR, Motion, XYZ),
    Operation::new("mag", READ_MAG, Motion, XYZ),
    Operation::new("mag-raw", READ_MAG_RAW, Motion, XYZ),
    Operation::new("mag-hoff", READ_MAG_H_OFF, Motion, XYZ),
    Operation::new("mag-soff0", READ_MAG_S_OFF0, Motion, XYZ),
    Operation::new("mag-soff1", READ_MAG_S_OFF1, Motion, XYZ),
    Operation::new("mag-soff2", READ_MAG_S_OFF2, Motion, XYZ),
    Operation::new(
        "quat-rpy",
        READ_QUAT_RPY,
        Motion,
        &["w", "x", "y", "z", "roll", "pitch", "yaw", "reserved"],
    ),
    Operation::new(
        "acc-gyro",
        READ_ACC_GYRO,
        Motion,
        &["ax", "ay", "az", "gx", "gy", "gz"],
    ),
    Operation::new(
        "imu-data",
        READ_IMU_DATA,
        Motion,
        &["roll", "pitch", "yaw", "ax", "ay", "az", "gx", "gy", "gz"],
    ),
    Operation::new("lin-acc-raw", READ_LIN_ACC_RAW, Motion, XYZ),
    Operation::new("lin-acc", READ_LIN_ACC, Motion, XYZ),
    Operation::new("acc-bias", READ_ACC_BIAS_VECT, Motion, XYZ),
    Operation::new("acc-scale0", READ_ACC_SCALE_MAT0, Motion, XYZ),
    Operation::new("acc-scale1", READ_ACC_SCALE_MAT1, Motion, XYZ),
    Operation::new("acc-scale2", READ_ACC_SCALE_MAT2, Motion, XYZ),
    // Indexed parameters
    Operation::new("filter-gain", GET_FILTER_GAIN, Tuning, &["filter_gain"]),
    Operation::new("filter-gain", SET_FILTER_GAIN, Ack, ACK),
    Operation::new("acc-cutoff", GET_ACC_LPF_CUT_FREQ, Tuning, &["cutoff_hz"]),
    Operation::new("acc-cutoff", SET_ACC_LPF_CUT_FREQ, Ack, ACK),
    Operation::new("frame-id", GET_FRAME_ID, Identifier, &["frame_id"]),
    Operation::new("frame-id", SET_FRAME_ID, Ack, ACK),
    Operation::new("i2c-address", GET_I2C_ADDR, Identifier, &["i2c_address"]),
    Operation::new("i2c-address", SET_I2C_ADDR, Ack, ACK),
    // Actions
    Operation::new("clear", CLEAR_DATA_BUFFER, Ack, ACK),
    Operation::new("reset", RESET_PARAMS, Ack, ACK),
    // Vector writes
    Operation::new("rpy-var", WRITE_RPY_VAR, Raw, &[]),
    Operation::new("acc-off", WRITE_ACC_OFF, Raw, &[]),
    Operation::new("acc-var", WRITE_ACC_VAR, Raw, &[]),
    Operation::new("gyro-off", WRITE_GYRO_OFF, Raw, &[]),
    Operation::new("gyro-var", WRITE_GYRO_VAR, Raw, &[]),
    Operation::new("mag-hoff", WRITE_MAG_H_OFF, Raw, &[]),
    Operation::new("mag-soff0", WRITE_MAG_S_OFF0, Raw, &[]),
    Operation::new("mag-soff1", WRITE_MAG_S_OFF1, Raw, &[]),
    Operation::new("mag-soff2", WRITE_MAG_S_OFF2, Raw, &[]),
    Operation::new("acc-bias", WRITE_ACC_BIAS_VECT, Raw, &[]),
    Operation::new("acc-scale0", WRITE_ACC_SCALE_MAT0, Raw, &[]),
    Operation::new("acc-scale1", WRITE_ACC_SCALE_MAT1, Raw, &[]),
    Operation::new("acc-scale2", WRITE_ACC_SCALE_MAT2, Raw, &[]),
];

/// Look up an operation by name and kind.
pub fn find(name: &str, kind: OperationKind) -> Option<&'static Operation> {
    OPERATIONS
        .iter()
        .find(|op| op.kind() == kind && op.name.eq_ignore_ascii_case(name))
}

/// Names of every operation of `kind`, in table order.
pub fn names(kind: OperationKind) -> impl Iterator<Item = &'static str> {
    OPERATIONS
        .iter()
        .filter(move |op| op.kind() == kind)
        .map(|op| op.name)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn covers_every_command_once() {
        let opcodes: Vec<u8> = OPERATIONS.iter().map(|op| op.command.opcode).collect();
        let unique: HashSet<u8> = opcodes.iter().copied().collect();
        assert_eq!(opcodes.len(), unique.len());
        for command in ALL {
            assert!(
                unique.contains(&command.opcode),
                "{command} has no operation"
            );
        }
    }

    #[test]
    fn labels_match_reply_arity() {
        for op in OPERATIONS {
            assert_eq!(
                op.fields.len(),
                op.command.reply_arity,
                "{} ({})",
                op.name,
                op.command
            );
        }
    }

    #[test]
    fn names_unique_per_kind() {
        let mut seen = HashSet::new();
        for op in OPERATIONS {
            assert!(seen.insert((op.name, op.kind())), "duplicate {}", op.name);
        }
    }

    #[test]
    fn transforms_follow_kind() {
        for op in OPERATIONS {
            match op.kind() {
                OperationKind::Read => assert_eq!(op.transform, Transform::Motion),
                OperationKind::Get => {
                    assert!(matches!(op.transform, Transform::Tuning | Transform::Identifier))
                }
                OperationKind::Set | OperationKind::Action => {
                    assert_eq!(op.transform, Transform::Ack)
                }
                OperationKind::WriteVector => assert_eq!(op.transform, Transform::Raw),
            }
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let op = find("RPY", OperationKind::Read).unwrap();
        assert_eq!(op.command, READ_RPY);
        let op = find("filter-gain", OperationKind::Set).unwrap();
        assert_eq!(op.command, SET_FILTER_GAIN);
        assert!(find("rpy", OperationKind::Get).is_none());
    }

    #[test]
    fn transform_application() {
        assert_eq!(Transform::Identifier.apply(4.8), 4.0);
        assert_eq!(Transform::Ack.apply(0.9), 1.0);
        assert_eq!(Transform::Ack.apply(0.05), 0.0);
        assert_eq!(Transform::Raw.apply(0.1234567), 0.1234567);
    }

    #[test]
    fn parameter_names() {
        let gets: Vec<_> = names(OperationKind::Get).collect();
        assert_eq!(gets, ["filter-gain", "acc-cutoff", "frame-id", "i2c-address"]);
    }
}
