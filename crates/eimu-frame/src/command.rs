//! Device command registry.
//!
//! Every opcode the EIMU firmware understands, together with the request
//! shape it expects and the number of floats it answers with. The table is
//! fixed at compile time; nothing mutates it.

/// What a request carries after the three header bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestShape {
    /// No payload (`len = 0`).
    Empty,
    /// A position byte followed by one float (`len = 5`).
    Indexed,
    /// Three floats (`len = 12`).
    Vector,
}

impl RequestShape {
    /// Payload size in bytes for this shape.
    pub const fn payload_len(self) -> usize {
        match self {
            RequestShape::Empty => 0,
            RequestShape::Indexed => 5,
            RequestShape::Vector => 12,
        }
    }
}

/// Whether a command reads state, stores a new value, or triggers an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    Read,
    Write,
    Action,
}

/// One device operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Command {
    /// Opcode byte placed in the frame.
    pub opcode: u8,
    /// Stable upper-case name.
    pub name: &'static str,
    /// Topic used by the text-line protocol.
    pub topic: &'static str,
    /// Request payload shape.
    pub shape: RequestShape,
    /// Read, write or action.
    pub access: Access,
    /// Number of little-endian floats in the reply.
    pub reply_arity: usize,
}

impl Command {
    const fn read(opcode: u8, name: &'static str, topic: &'static str, arity: usize) -> Self {
        Self {
            opcode,
            name,
            topic,
            shape: RequestShape::Empty,
            access: Access::Read,
            reply_arity: arity,
        }
    }

    const fn write_vector(opcode: u8, name: &'static str, topic: &'static str) -> Self {
        Self {
            opcode,
            name,
            topic,
            shape: RequestShape::Vector,
            access: Access::Write,
            reply_arity: 0,
        }
    }

    const fn indexed(opcode: u8, name: &'static str, topic: &'static str, access: Access) -> Self {
        Self {
            opcode,
            name,
            topic,
            shape: RequestShape::Indexed,
            access,
            reply_arity: 1,
        }
    }

    /// Reply size in bytes on the binary wire.
    pub const fn reply_len(&self) -> usize {
        self.reply_arity * crate::payload::FLOAT_SIZE
    }

    /// True when the device answers this command.
    pub const fn expects_reply(&self) -> bool {
        self.reply_arity > 0
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (0x{:02X})", self.name, self.opcode)
    }
}

pub const READ_QUAT: Command = Command::read(0x01, "READ_QUAT", "/quat", 4);
pub const READ_RPY: Command = Command::read(0x02, "READ_RPY", "/rpy", 3);
pub const READ_RPY_VAR: Command = Command::read(0x03, "READ_RPY_VAR", "/rpy-var", 3);
pub const WRITE_RPY_VAR: Command = Command::write_vector(0x04, "WRITE_RPY_VAR", "/rpy-var");

pub const READ_ACC: Command = Command::read(0x05, "READ_ACC", "/acc", 3);
pub const READ_ACC_RAW: Command = Command::read(0x06, "READ_ACC_RAW", "/acc-raw", 3);
pub const READ_ACC_OFF: Command = Command::read(0x07, "READ_ACC_OFF", "/acc-off", 3);
pub const WRITE_ACC_OFF: Command = Command::write_vector(0x08, "WRITE_ACC_OFF", "/acc-off");
pub const READ_ACC_VAR: Command = Command::read(0x09, "READ_ACC_VAR", "/acc-var", 3);
pub const WRITE_ACC_VAR: Command = Command::write_vector(0x0A, "WRITE_ACC_VAR", "/acc-var");

pub const READ_GYRO: Command = Command::read(0x0B, "READ_GYRO", "/gyro-cal", 3);
pub const READ_GYRO_RAW: Command = Command::read(0x0C, "READ_GYRO_RAW", "/gyro-raw", 3);
pub const READ_GYRO_OFF: Command = Command::read(0x0D, "READ_GYRO_OFF", "/gyro-off", 3);
pub const WRITE_GYRO_OFF: Command = Command::write_vector(0x0E, "WRITE_GYRO_OFF", "/gyro-off");
pub const READ_GYRO_VAR: Command = Command::read(0x0F, "READ_GYRO_VAR", "/gyro-var", 3);
pub const WRITE_GYRO_VAR: Command = Command::write_vector(0x10, "WRITE_GYRO_VAR", "/gyro-var");

pub const READ_MAG: Command = Command::read(0x11, "READ_MAG", "/mag-cal", 3);
pub const READ_MAG_RAW: Command = Command::read(0x12, "READ_MAG_RAW", "/mag-raw", 3);
pub const READ_MAG_H_OFF: Command = Command::read(0x13, "READ_MAG_H_OFF", "/bvect", 3);
pub const WRITE_MAG_H_OFF: Command = Command::write_vector(0x14, "WRITE_MAG_H_OFF", "/bvect");
pub const READ_MAG_S_OFF0: Command = Command::read(0x15, "READ_MAG_S_OFF0", "/amatR0", 3);
pub const WRITE_MAG_S_OFF0: Command =
    Command::write_vector(0x16, "WRITE_MAG_S_OFF0", "/amatR0");
pub const READ_MAG_S_OFF1: Command = Command::read(0x17, "READ_MAG_S_OFF1", "/amatR1", 3);
pub const WRITE_MAG_S_OFF1: Command =
    Command::write_vector(0x18, "WRITE_MAG_S_OFF1", "/amatR1");
pub const READ_MAG_S_OFF2: Command = Command::read(0x19, "READ_MAG_S_OFF2", "/amatR2", 3);
pub const WRITE_MAG_S_OFF2: Command =
    Command::write_vector(0x1A, "WRITE_MAG_S_OFF2", "/amatR2");

pub const SET_I2C_ADDR: Command = Command::indexed(0x1B, "SET_I2C_ADDR", "/i2c", Access::Write);
pub const GET_I2C_ADDR: Command = Command::indexed(0x1C, "GET_I2C_ADDR", "/i2c", Access::Read);
pub const SET_FILTER_GAIN: Command =
    Command::indexed(0x1D, "SET_FILTER_GAIN", "/gain", Access::Write);
pub const GET_FILTER_GAIN: Command =
    Command::indexed(0x1E, "GET_FILTER_GAIN", "/gain", Access::Read);
pub const SET_FRAME_ID: Command =
    Command::indexed(0x1F, "SET_FRAME_ID", "/frame-id", Access::Write);
pub const GET_FRAME_ID: Command =
    Command::indexed(0x20, "GET_FRAME_ID", "/frame-id", Access::Read);
pub const RESET_PARAMS: Command =
    Command::indexed(0x21, "RESET_PARAMS", "/reset", Access::Action);

pub const READ_QUAT_RPY: Command = Command::read(0x22, "READ_QUAT_RPY", "/quat-rpy", 8);
pub const READ_ACC_GYRO: Command = Command::read(0x23, "READ_ACC_GYRO", "/acc-gyro", 6);

pub const CLEAR_DATA_BUFFER: Command =
    Command::indexed(0x27, "CLEAR_DATA_BUFFER", "/clear", Access::Action);
pub const READ_IMU_DATA: Command = Command::read(0x28, "READ_IMU_DATA", "/imu", 9);
pub const SET_ACC_LPF_CUT_FREQ: Command =
    Command::indexed(0x29, "SET_ACC_LPF_CUT_FREQ", "/acc-cf", Access::Write);
pub const GET_ACC_LPF_CUT_FREQ: Command =
    Command::indexed(0x2A, "GET_ACC_LPF_CUT_FREQ", "/acc-cf", Access::Read);
pub const READ_LIN_ACC_RAW: Command = Command::read(0x2B, "READ_LIN_ACC_RAW", "/acc-cal-raw", 3);
pub const READ_LIN_ACC: Command = Command::read(0x2C, "READ_LIN_ACC", "/acc-cal", 3);

pub const READ_ACC_BIAS_VECT: Command =
    Command::read(0x2D, "READ_ACC_BIAS_VECT", "/acc-bvect", 3);
pub const WRITE_ACC_BIAS_VECT: Command =
    Command::write_vector(0x2E, "WRITE_ACC_BIAS_VECT", "/acc-bvect");
pub const READ_ACC_SCALE_MAT0: Command =
    Command::read(0x2F, "READ_ACC_SCALE_MAT0", "/acc-amatR0", 3);
pub const WRITE_ACC_SCALE_MAT0: Command =
    Command::write_vector(0x30, "WRITE_ACC_SCALE_MAT0", "/acc-amatR0");
pub const READ_ACC_SCALE_MAT1: Command =
    Command::read(0x31, "READ_ACC_SCALE_MAT1", "/acc-amatR1", 3);
pub const WRITE_ACC_SCALE_MAT1: Command =
    Command::write_vector(0x32, "WRITE_ACC_SCALE_MAT1", "/acc-amatR1");
pub const READ_ACC_SCALE_MAT2: Command =
    Command::read(0x33, "READ_ACC_SCALE_MAT2", "/acc-amatR2", 3);
pub const WRITE_ACC_SCALE_MAT2: Command =
    Command::write_vector(0x34, "WRITE_ACC_SCALE_MAT2", "/acc-amatR2");

/// Every command, in opcode order.
pub const ALL: &[Command] = &[
    READ_QUAT,
    READ_RPY,
    READ_RPY_VAR,
    WRITE_RPY_VAR,
    READ_ACC,
    READ_ACC_RAW,
    READ_ACC_OFF,
    WRITE_ACC_OFF,
    READ_ACC_VAR,
    WRITE_ACC_VAR,
    READ_GYRO,
    READ_GYRO_RAW,
    READ_GYRO_OFF,
    WRITE_GYRO_OFF,
    READ_GYRO_VAR,
    WRITE_GYRO_VAR,
    READ_MAG,
    READ_MAG_RAW,
    READ_MAG_H_OFF,
    WRITE_MAG_H_OFF,
    READ_MAG_S_OFF0,
    WRITE_MAG_S_OFF0,
    READ_MAG_S_OFF1,
    WRITE_MAG_S_OFF1,
    READ_MAG_S_OFF2,
    WRITE_MAG_S_OFF2,
    SET_I2C_ADDR,
    GET_I2C_ADDR,
    SET_FILTER_GAIN,
    GET_FILTER_GAIN,
    SET_FRAME_ID,
    GET_FRAME_ID,
    RESET_PARAMS,
    READ_QUAT_RPY,
    READ_ACC_GYRO,
    CLEAR_DATA_BUFFER,
    READ_IMU_DATA,
    SET_ACC_LPF_CUT_FREQ,
    GET_ACC_LPF_CUT_FREQ,
    READ_LIN_ACC_RAW,
    READ_LIN_ACC,
    READ_ACC_BIAS_VECT,
    WRITE_ACC_BIAS_VECT,
    READ_ACC_SCALE_MAT0,
    WRITE_ACC_SCALE_MAT0,
    READ_ACC_SCALE_MAT1,
    WRITE_ACC_SCALE_MAT1,
    READ_ACC_SCALE_MAT2,
    WRITE_ACC_SCALE_MAT2,
];

/// Look up a command by opcode.
pub fn by_opcode(opcode: u8) -> Option<&'static Command> {
    ALL.iter().find(|cmd| cmd.opcode == opcode)
}

/// Look up a command by name (case-insensitive).
pub fn by_name(name: &str) -> Option<&'static Command> {
    ALL.iter().find(|cmd| cmd.name.eq_ignore_ascii_case(name))
}
