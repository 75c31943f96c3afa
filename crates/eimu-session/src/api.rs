//! Typed operations on an open session.
//!
//! Each method performs exactly one exchange and returns a [`Reading`]: on any
//! failure the value is zero-filled and the error is kept alongside it.

use eimu_frame::command::*;
use eimu_frame::{Access, Command, Payload, RequestShape};

use crate::error::{Result, SessionError};
use crate::operations::{Operation, Transform};
use crate::reading::{is_ack, round_to, truncate_id, Reading, MOTION_DECIMALS, TUNING_DECIMALS};
use crate::session::Session;
use crate::types::{AccelGyro, ImuData, MatrixRow, QuatRpy, Quaternion, Rpy, Vec3};

const MAG_SOFT_READ: [Command; 3] = [READ_MAG_S_OFF0, READ_MAG_S_OFF1, READ_MAG_S_OFF2];
const MAG_SOFT_WRITE: [Command; 3] = [WRITE_MAG_S_OFF0, WRITE_MAG_S_OFF1, WRITE_MAG_S_OFF2];
const ACC_SCALE_READ: [Command; 3] = [READ_ACC_SCALE_MAT0, READ_ACC_SCALE_MAT1, READ_ACC_SCALE_MAT2];
const ACC_SCALE_WRITE: [Command; 3] = [
    WRITE_ACC_SCALE_MAT0,
    WRITE_ACC_SCALE_MAT1,
    WRITE_ACC_SCALE_MAT2,
];

impl Session {
    fn read_motion<T, const N: usize>(&mut self, command: &Command) -> Reading<T>
    where
        T: Default + From<[f32; N]>,
    {
        let result = self
            .request_array::<N>(command, &Payload::Empty)
            .map(|values| T::from(values.map(|v| round_to(v, MOTION_DECIMALS))));
        Reading::from_result(result)
    }

    fn get_indexed(&mut self, command: &Command) -> Result<f32> {
        let payload = self.indexed_payload(0.0);
        let [value] = self.request_array::<1>(command, &payload)?;
        Ok(value)
    }

    fn set_indexed(&mut self, command: &Command, value: f32) -> Reading<()> {
        let payload = self.indexed_payload(value);
        let result = self
            .request_array::<1>(command, &payload)
            .and_then(|[ack]| check_ack(command, ack));
        Reading::from_result(result)
    }

    fn write_vector(&mut self, command: &Command, value: Vec3) -> Reading<()> {
        Reading::from_result(self.write_only(command, &Payload::Vector(value.to_array())))
    }

    /// Latest orientation quaternion.
    pub fn read_quat(&mut self) -> Reading<Quaternion> {
        self.read_motion::<_, 4>(&READ_QUAT)
    }

    /// Latest roll, pitch and yaw.
    pub fn read_rpy(&mut self) -> Reading<Rpy> {
        self.read_motion::<_, 3>(&READ_RPY)
    }

    pub fn read_rpy_variance(&mut self) -> Reading<Rpy> {
        self.read_motion::<_, 3>(&READ_RPY_VAR)
    }

    /// Filtered acceleration.
    pub fn read_acc(&mut self) -> Reading<Vec3> {
        self.read_motion::<_, 3>(&READ_ACC)
    }

    pub fn read_acc_raw(&mut self) -> Reading<Vec3> {
        self.read_motion::<_, 3>(&READ_ACC_RAW)
    }

    pub fn read_acc_offset(&mut self) -> Reading<Vec3> {
        self.read_motion::<_, 3>(&READ_ACC_OFF)
    }

    pub fn read_acc_variance(&mut self) -> Reading<Vec3> {
        self.read_motion::<_, 3>(&READ_ACC_VAR)
    }

    /// Filtered angular rate.
    pub fn read_gyro(&mut self) -> Reading<Vec3> {
        self.read_motion::<_, 3>(&READ_GYRO)
    }

    pub fn read_gyro_raw(&mut self) -> Reading<Vec3> {
        self.read_motion::<_, 3>(&READ_GYRO_RAW)
    }

    pub fn read_gyro_offset(&mut self) -> Reading<Vec3> {
        self.read_motion::<_, 3>(&READ_GYRO_OFF)
    }

    pub fn read_gyro_variance(&mut self) -> Reading<Vec3> {
        self.read_motion::<_, 3>(&READ_GYRO_VAR)
    }

    /// Calibrated magnetic field.
    pub fn read_mag(&mut self) -> Reading<Vec3> {
        self.read_motion::<_, 3>(&READ_MAG)
    }

    pub fn read_mag_raw(&mut self) -> Reading<Vec3> {
        self.read_motion::<_, 3>(&READ_MAG_RAW)
    }

    pub fn read_mag_hard_offset(&mut self) -> Reading<Vec3> {
        self.read_motion::<_, 3>(&READ_MAG_H_OFF)
    }

    /// One row of the soft-iron correction matrix.
    pub fn read_mag_soft_offset(&mut self, row: MatrixRow) -> Reading<Vec3> {
        self.read_motion::<_, 3>(&MAG_SOFT_READ[row.index()])
    }

    /// Gravity-compensated acceleration.
    pub fn read_linear_acc(&mut self) -> Reading<Vec3> {
        self.read_motion::<_, 3>(&READ_LIN_ACC)
    }

    pub fn read_linear_acc_raw(&mut self) -> Reading<Vec3> {
        self.read_motion::<_, 3>(&READ_LIN_ACC_RAW)
    }

    pub fn read_acc_bias(&mut self) -> Reading<Vec3> {
        self.read_motion::<_, 3>(&READ_ACC_BIAS_VECT)
    }

    /// One row of the accelerometer scale matrix.
    pub fn read_acc_scale_row(&mut self, row: MatrixRow) -> Reading<Vec3> {
        self.read_motion::<_, 3>(&ACC_SCALE_READ[row.index()])
    }

    pub fn read_quat_rpy(&mut self) -> Reading<QuatRpy> {
        self.read_motion::<_, 8>(&READ_QUAT_RPY)
    }

    pub fn read_acc_gyro(&mut self) -> Reading<AccelGyro> {
        self.read_motion::<_, 6>(&READ_ACC_GYRO)
    }

    /// Orientation, acceleration and angular rate from a single sample.
    pub fn read_imu_data(&mut self) -> Reading<ImuData> {
        self.read_motion::<_, 9>(&READ_IMU_DATA)
    }

    /// Complementary filter gain.
    pub fn get_filter_gain(&mut self) -> Reading<f32> {
        let result = self.get_indexed(&GET_FILTER_GAIN);
        Reading::from_result(result.map(|v| round_to(v, TUNING_DECIMALS)))
    }

    /// Accelerometer low-pass cutoff in Hz.
    pub fn get_acc_filter_cutoff(&mut self) -> Reading<f32> {
        let result = self.get_indexed(&GET_ACC_LPF_CUT_FREQ);
        Reading::from_result(result.map(|v| round_to(v, TUNING_DECIMALS)))
    }

    /// Reference frame the orientation is reported in.
    pub fn get_world_frame_id(&mut self) -> Reading<u8> {
        let result = self.get_indexed(&GET_FRAME_ID);
        Reading::from_result(result.map(truncate_id))
    }

    pub fn get_i2c_address(&mut self) -> Reading<u8> {
        let result = self.get_indexed(&GET_I2C_ADDR);
        Reading::from_result(result.map(truncate_id))
    }

    pub fn set_filter_gain(&mut self, gain: f32) -> Reading<()> {
        self.set_indexed(&SET_FILTER_GAIN, gain)
    }

    pub fn set_acc_filter_cutoff(&mut self, cutoff_hz: f32) -> Reading<()> {
        self.set_indexed(&SET_ACC_LPF_CUT_FREQ, cutoff_hz)
    }

    pub fn set_world_frame_id(&mut self, frame_id: u8) -> Reading<()> {
        self.set_indexed(&SET_FRAME_ID, f32::from(frame_id))
    }

    /// Takes effect after the device restarts.
    pub fn set_i2c_address(&mut self, address: u8) -> Reading<()> {
        self.set_indexed(&SET_I2C_ADDR, f32::from(address))
    }

    /// Discard the device's filter history.
    pub fn clear_data_buffer(&mut self) -> Reading<()> {
        self.set_indexed(&CLEAR_DATA_BUFFER, 0.0)
    }

    /// Restore factory parameters in device storage.
    pub fn reset_params(&mut self) -> Reading<()> {
        self.set_indexed(&RESET_PARAMS, 0.0)
    }

    pub fn write_rpy_variance(&mut self, value: Vec3) -> Reading<()> {
        self.write_vector(&WRITE_RPY_VAR, value)
    }

    pub fn write_acc_offset(&mut self, value: Vec3) -> Reading<()> {
        self.write_vector(&WRITE_ACC_OFF, value)
    }

    pub fn write_acc_variance(&mut self, value: Vec3) -> Reading<()> {
        self.write_vector(&WRITE_ACC_VAR, value)
    }

    pub fn write_gyro_offset(&mut self, value: Vec3) -> Reading<()> {
        self.write_vector(&WRITE_GYRO_OFF, value)
    }

    pub fn write_gyro_variance(&mut self, value: Vec3) -> Reading<()> {
        self.write_vector(&WRITE_GYRO_VAR, value)
    }

    pub fn write_mag_hard_offset(&mut self, value: Vec3) -> Reading<()> {
        self.write_vector(&WRITE_MAG_H_OFF, value)
    }

    pub fn write_mag_soft_offset(&mut self, row: MatrixRow, value: Vec3) -> Reading<()> {
        self.write_vector(&MAG_SOFT_WRITE[row.index()], value)
    }

    pub fn write_acc_bias(&mut self, value: Vec3) -> Reading<()> {
        self.write_vector(&WRITE_ACC_BIAS_VECT, value)
    }

    pub fn write_acc_scale_row(&mut self, row: MatrixRow, value: Vec3) -> Reading<()> {
        self.write_vector(&ACC_SCALE_WRITE[row.index()], value)
    }

    /// Run any table operation with loose arguments.
    ///
    /// `args` must hold one value for set operations and three for vector
    /// writes; reads and actions take none. The reply is normalized by the
    /// operation's transform. A rejected acknowledgement is reported as
    /// [`SessionError::Rejected`].
    pub fn execute(&mut self, op: &Operation, args: &[f32]) -> Reading<Vec<f32>> {
        let arity = op.command.reply_arity;
        Reading::from_result(self.execute_inner(op, args)).map(|values| {
            if values.len() == arity {
                values
            } else {
                vec![0.0; arity]
            }
        })
    }

    fn execute_inner(&mut self, op: &Operation, args: &[f32]) -> Result<Vec<f32>> {
        let command = &op.command;
        let payload = match command.shape {
            RequestShape::Empty => Payload::Empty,
            RequestShape::Indexed => {
                let value = match (command.access, args) {
                    (Access::Write, [value]) => *value,
                    (Access::Write, _) => {
                        return Err(SessionError::InvalidArgument(format!(
                            "{} takes exactly one value",
                            op.name
                        )))
                    }
                    _ => 0.0,
                };
                self.indexed_payload(value)
            }
            RequestShape::Vector => match args {
                [x, y, z] => Payload::Vector([*x, *y, *z]),
                _ => {
                    return Err(SessionError::InvalidArgument(format!(
                        "{} takes exactly three values",
                        op.name
                    )))
                }
            },
        };

        if !command.expects_reply() {
            self.write_only(command, &payload)?;
            return Ok(Vec::new());
        }

        let values = self.request_response(command, &payload, command.reply_arity)?;
        if let (Transform::Ack, [ack]) = (op.transform, &values[..]) {
            check_ack(command, *ack)?;
        }
        Ok(values.into_iter().map(|v| op.transform.apply(v)).collect())
    }
}

fn check_ack(command: &Command, ack: f32) -> Result<()> {
    if is_ack(ack) {
        Ok(())
    } else {
        Err(SessionError::Rejected {
            command: command.name,
            ack,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use eimu_frame::{encode_floats, FLOAT_SIZE};
    use eimu_transport::{MockHandle, MockTransport};

    use super::*;
    use crate::config::{ProbeConfig, SessionConfig, WireFormat};
    use crate::operations::{find, OperationKind, OPERATIONS};

    fn config(wire: WireFormat) -> SessionConfig {
        SessionConfig {
            wire,
            probe: ProbeConfig {
                enabled: false,
                ..ProbeConfig::default()
            },
            settle_delay: Duration::ZERO,
            ..SessionConfig::default()
        }
    }

    fn open() -> (Session, MockHandle) {
        let (transport, handle) = MockTransport::pair();
        let session = Session::from_transport(Box::new(transport), &config(WireFormat::Binary))
            .unwrap();
        (session, handle)
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn read_rpy_rounds_to_six_places() {
        let (mut session, handle) = open();
        handle.push_floats(&[1.0000004, -0.9999996, 0.1234567]);
        let reading = session.read_rpy();
        assert!(reading.success());
        let rpy = *reading.value();
        assert!(close(rpy.roll, 1.0));
        assert!(close(rpy.pitch, -1.0));
        assert!(close(rpy.yaw, 0.123457));
    }

    #[test]
    fn set_filter_gain_acknowledged() {
        let (mut session, handle) = open();
        handle.push_floats(&[1.0]);
        assert!(session.set_filter_gain(0.05).success());

        let request = handle.last_request().unwrap();
        assert_eq!(&request[..4], &[0xBB, 0x1D, 0x05, 0x00]);
        assert_eq!(&request[4..8], &0.05f32.to_le_bytes());
        let sum = request[..8].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
        assert_eq!(request[8], sum);
    }

    #[test]
    fn set_rejected_when_ack_is_not_one() {
        let (mut session, handle) = open();
        handle.push_floats(&[0.0]);
        let reading = session.set_world_frame_id(2);
        assert!(!reading.success());
        assert!(matches!(
            reading.error(),
            Some(SessionError::Rejected {
                command: "SET_FRAME_ID",
                ..
            })
        ));
    }

    #[test]
    fn short_reply_zero_fills_and_resyncs() {
        let (mut session, handle) = open();
        handle.push_reply(vec![0x11u8; 7]);
        let reading = session.read_imu_data();
        assert!(!reading.success());
        assert_eq!(*reading.value(), ImuData::default());
        assert_eq!(handle.pending_input(), 0);
        assert!(matches!(
            reading.error(),
            Some(SessionError::Timeout {
                arity: 9,
                received: 7
            })
        ));
    }

    #[test]
    fn batch_reads_consume_exact_reply_sizes() {
        let (mut session, handle) = open();
        // Four extra bytes after each reply must be left unread.
        let trailing = [0xAAu8; FLOAT_SIZE];
        for n in [4usize, 9] {
            let mut reply = encode_floats(&vec![0.5; n]);
            reply.extend_from_slice(&trailing);
            handle.push_reply(reply);
        }
        assert!(session.read_quat().success());
        assert_eq!(handle.pending_input(), FLOAT_SIZE);
        assert!(session.read_imu_data().success());
        assert_eq!(handle.pending_input(), FLOAT_SIZE);
    }

    #[test]
    fn every_operation_reads_its_declared_arity() {
        let (mut session, handle) = open();
        for op in OPERATIONS {
            let args: &[f32] = match op.kind() {
                OperationKind::Set => &[1.0],
                OperationKind::WriteVector => &[0.1, 0.2, 0.3],
                _ => &[],
            };
            let mut reply = encode_floats(&vec![1.0; op.command.reply_arity]);
            reply.extend_from_slice(&[0u8; FLOAT_SIZE]);
            handle.push_reply(reply);

            let reading = session.execute(op, args);
            assert!(reading.success(), "{} failed: {:?}", op.name, reading.error());
            assert_eq!(reading.value().len(), op.command.reply_arity);
            assert_eq!(
                handle.pending_input(),
                FLOAT_SIZE,
                "{} consumed the wrong number of bytes",
                op.name
            );
            let request = handle.last_request().unwrap();
            assert_eq!(request[1], op.command.opcode);
            assert_eq!(request[2] as usize, op.command.shape.payload_len());
        }
    }

    #[test]
    fn getters_apply_transforms() {
        let (mut session, handle) = open();
        handle.push_floats(&[0.123456]);
        handle.push_floats(&[104.7]);
        assert!(close(*session.get_filter_gain().value(), 0.123));
        assert_eq!(*session.get_i2c_address().value(), 104);
    }

    #[test]
    fn indexed_requests_carry_position_byte() {
        let (transport, handle) = MockTransport::pair();
        let cfg = SessionConfig {
            position: 100,
            ..config(WireFormat::Binary)
        };
        let mut session = Session::from_transport(Box::new(transport), &cfg).unwrap();
        handle.push_floats(&[1.0]);
        assert!(session.clear_data_buffer().success());
        assert_eq!(handle.last_request().unwrap()[3], 100);
    }

    #[test]
    fn vector_writes_are_unacknowledged() {
        let (mut session, handle) = open();
        let reading = session.write_acc_scale_row(MatrixRow::R2, Vec3::new(1.0, 0.0, 0.0));
        assert!(reading.success());
        let request = handle.last_request().unwrap();
        assert_eq!(request[1], 0x34);
        assert_eq!(request.len(), 16);
        assert_eq!(handle.pending_input(), 0);
    }

    #[test]
    fn execute_validates_arguments() {
        let (mut session, handle) = open();
        let op = find("acc-off", OperationKind::WriteVector).unwrap();
        let reading = session.execute(op, &[1.0]);
        assert!(matches!(reading.error(), Some(SessionError::InvalidArgument(_))));
        assert!(handle.requests().is_empty());
    }

    #[test]
    fn execute_reports_rejection() {
        let (mut session, handle) = open();
        handle.push_floats(&[0.0]);
        let op = find("reset", OperationKind::Action).unwrap();
        let reading = session.execute(op, &[]);
        assert!(matches!(reading.error(), Some(SessionError::Rejected { .. })));
        assert_eq!(reading.value(), &vec![0.0]);
    }

    #[test]
    fn disconnected_session_zero_fills() {
        let (mut session, _handle) = open();
        session.disconnect();
        let reading = session.read_acc();
        assert_eq!(*reading.value(), Vec3::default());
        assert!(matches!(reading.error(), Some(SessionError::NotConnected)));
    }

    #[test]
    fn text_wire_round_trip() {
        let (transport, handle) = MockTransport::pair();
        let mut session =
            Session::from_transport(Box::new(transport), &config(WireFormat::Text)).unwrap();
        handle.push_reply(b"0.1 0.2 0.3\r\n".to_vec());
        handle.push_reply(b"1\r\n".to_vec());

        let rpy = session.read_rpy().into_result().unwrap();
        assert!(close(rpy.yaw, 0.3));
        assert!(session.set_filter_gain(0.9).success());
        let requests = handle.requests();
        assert_eq!(requests[0], b"/rpy\r\n".to_vec());
        assert_eq!(requests[1], b"/gain 0.9\r\n".to_vec());
    }

    #[test]
    fn text_wire_vector_write_then_read_back() {
        let (transport, handle) = MockTransport::pair();
        let mut session =
            Session::from_transport(Box::new(transport), &config(WireFormat::Text)).unwrap();
        handle.push_reply(b"1\r\n".to_vec());
        handle.push_reply(b"0.25 0.5 -0.75\r\n".to_vec());

        assert!(session
            .write_mag_hard_offset(Vec3::new(0.25, 0.5, -0.75))
            .success());
        let back = session.read_mag_hard_offset().into_result().unwrap();
        assert_eq!(back, Vec3::new(0.25, 0.5, -0.75));
        assert_eq!(handle.requests()[1], b"/bvect\r\n".to_vec());
    }
}
