//! A lightweight Modbus RTU protocol codec for master and slave roles.
//!
//! This crate handles request/response framing at the byte level: CRC-16
//! calculation, endian conversion, range and length validation, exception
//! mapping, and broadcast handling for function codes 1, 2, 3, 4, 5, 6, 15,
//! 16, and 22. Transport (serial UART, timing, polling loops) is out of
//! scope for the codec itself; an optional blocking transport convenience
//! layer is provided behind the `serial` feature.
//!
//! The master side builds request frames and parses the matching response
//! (or exception) via [`MasterSession`]. The slave side parses an incoming
//! request, validates and mutates its data banks, and builds the response
//! (including exception frames) via [`slave::SlaveSession`].

pub mod bits;
pub mod crc;

mod common;
pub use common::Baudrate;

mod exception;
pub use exception::Exception;

mod function_kind;
pub use function_kind::FunctionKind;

pub mod error;

mod master;
pub use master::{DataKind, DataRecord, MasterSession, Payload};

pub mod slave;
pub use slave::{SlaveOutcome, SlaveSession};

#[cfg(feature = "serial")]
pub mod transport;

/// End-to-end round trips exercising both the master and slave sides of the
/// codec together, the way a real exchange over a wire would.
#[cfg(test)]
mod tests {
    use crate::slave::{Banks, Masks, SlaveOutcome, SlaveSession};
    use crate::{DataKind, Exception, MasterSession};

    #[test]
    fn read_holding_registers_round_trips_through_a_real_slave() {
        let mut holding = [0xAE41u16, 0x5652, 0x4340];
        let mut input = [];
        let mut coils = [];
        let mut discrete = [];
        let register_mask = [0u8];
        let coil_mask = [];
        let mut slave = SlaveSession::new(
            0x11,
            Banks { holding_registers: &mut holding, input_registers: &mut input, coils: &mut coils, discrete_inputs: &mut discrete },
            Masks { register_mask: &register_mask, coil_mask: &coil_mask },
        )
        .unwrap();

        let mut master = MasterSession::new();
        master.build_request_3(0x11, 0x006B, 3).unwrap();

        *slave.request_mut() = master.request().to_vec();
        assert_eq!(slave.parse_request().unwrap(), SlaveOutcome::Response);

        *master.response_mut() = slave.response().to_vec();
        master.parse_response().unwrap();

        let data = master.data().unwrap();
        assert_eq!(data.kind, DataKind::HoldingRegister);
        assert_eq!(data.payload.as_words().unwrap(), &[0xAE41, 0x5652, 0x4340]);
    }

    #[test]
    fn write_single_coil_round_trips_and_applies_to_the_bank() {
        let mut holding = [];
        let mut input = [];
        let mut coils = [false; 4];
        let mut discrete = [];
        let register_mask = [];
        let coil_mask = [0u8];
        let mut slave = SlaveSession::new(
            0x11,
            Banks { holding_registers: &mut holding, input_registers: &mut input, coils: &mut coils, discrete_inputs: &mut discrete },
            Masks { register_mask: &register_mask, coil_mask: &coil_mask },
        )
        .unwrap();

        let mut master = MasterSession::new();
        master.build_request_5(0x11, 0x0002, 1).unwrap();

        *slave.request_mut() = master.request().to_vec();
        assert_eq!(slave.parse_request().unwrap(), SlaveOutcome::Response);
        assert!(coils[2]);

        *master.response_mut() = slave.response().to_vec();
        master.parse_response().unwrap();
        assert_eq!(master.data().unwrap().payload.as_bits().unwrap(), &[true]);
    }

    #[test]
    fn range_exception_round_trips_back_to_the_master() {
        let mut holding = [0u16; 2];
        let mut input = [];
        let mut coils = [];
        let mut discrete = [];
        let register_mask = [0u8];
        let coil_mask = [];
        let mut slave = SlaveSession::new(
            0x11,
            Banks { holding_registers: &mut holding, input_registers: &mut input, coils: &mut coils, discrete_inputs: &mut discrete },
            Masks { register_mask: &register_mask, coil_mask: &coil_mask },
        )
        .unwrap();

        let mut master = MasterSession::new();
        master.build_request_3(0x11, 5, 1).unwrap();

        *slave.request_mut() = master.request().to_vec();
        assert_eq!(slave.parse_request().unwrap(), SlaveOutcome::Exception);

        *master.response_mut() = slave.response().to_vec();
        let err = master.parse_response().unwrap_err();
        assert!(matches!(err, crate::error::MasterError::Exception(_)));
        assert_eq!(master.exception().unwrap().code, Exception::IllegalDataAddress);
    }

    #[test]
    fn broadcast_write_reaches_no_response_but_still_applies() {
        let mut holding = [0u16; 1];
        let mut input = [];
        let mut coils = [];
        let mut discrete = [];
        let register_mask = [0u8];
        let coil_mask = [];
        let mut slave = SlaveSession::new(
            0x11,
            Banks { holding_registers: &mut holding, input_registers: &mut input, coils: &mut coils, discrete_inputs: &mut discrete },
            Masks { register_mask: &register_mask, coil_mask: &coil_mask },
        )
        .unwrap();

        let mut master = MasterSession::new();
        master.build_request_6(0x00, 0x0000, 0x1234).unwrap();
        assert_eq!(master.predicted_response_length(), 0);

        *slave.request_mut() = master.request().to_vec();
        assert_eq!(slave.parse_request().unwrap(), SlaveOutcome::NoResponse);
        assert!(slave.response().is_empty());
        assert_eq!(holding[0], 0x1234);
    }
}
