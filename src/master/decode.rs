//! Response parsing, dispatched by function code and cross-checked against
//! the request the session built it for.

use super::{DataKind, DataRecord, MasterSession, Payload};
use crate::crc;
use crate::error::{ExceptionRecord, MasterError};
use crate::{Exception, FunctionKind};

pub fn parse_response(session: &mut MasterSession) -> Result<(), MasterError> {
    if session.request.len() < 4 || session.response.len() < 4 {
        return Err(MasterError::Other);
    }
    if !crc::verify(&session.request) || !crc::verify(&session.response) {
        return Err(MasterError::Crc);
    }

    session.data = None;
    session.exception = None;

    let response = &session.response;
    let function = response[1];

    if function & 0x80 != 0 && response.len() == 5 {
        let record = ExceptionRecord {
            address: response[0],
            function,
            code: Exception::from_code(response[2]),
        };
        #[cfg(feature = "log")]
        log::trace!("master recorded exception {} from device {}", record.code, record.address);
        session.exception = Some(record);
        return Err(MasterError::Exception(record));
    }

    match FunctionKind::from_code(function) {
        Some(FunctionKind::ReadCoils) => parse_bits(session, DataKind::Coil),
        Some(FunctionKind::ReadDiscreteInputs) => parse_bits(session, DataKind::DiscreteInput),
        Some(FunctionKind::ReadHoldingRegisters) => parse_words(session, DataKind::HoldingRegister),
        Some(FunctionKind::ReadInputRegisters) => parse_words(session, DataKind::InputRegister),
        Some(FunctionKind::WriteSingleCoil) => parse_write_single(session, DataKind::Coil),
        Some(FunctionKind::WriteSingleRegister) => parse_write_single(session, DataKind::HoldingRegister),
        Some(FunctionKind::WriteMultipleCoils) => parse_write_multiple_coils(session),
        Some(FunctionKind::WriteMultipleRegisters) => parse_write_multiple_registers(session),
        Some(FunctionKind::MaskWriteRegister) => parse_mask_write(session),
        None => Err(MasterError::Parse),
    }
}

fn parse_bits(session: &mut MasterSession, kind: DataKind) -> Result<(), MasterError> {
    let request = &session.request;
    let response = &session.response;
    if request.len() != 8 || response.len() < 5 {
        return Err(MasterError::Frame);
    }
    if response[0] != request[0] || response[0] == 0 || response[1] != request[1] {
        return Err(MasterError::Frame);
    }
    let byte_count = response[2] as usize;
    if response.len() != 5 + byte_count || byte_count == 0 || byte_count > 250 {
        return Err(MasterError::Frame);
    }
    let index = u16::from_be_bytes([request[2], request[3]]);
    let count = u16::from_be_bytes([request[4], request[5]]);
    let bits = crate::bits::unpack(&response[3..3 + byte_count], count);
    session.data = Some(DataRecord {
        slave_address: response[0],
        index,
        count,
        function: response[1],
        kind,
        payload: Payload::Bits(bits),
    });
    Ok(())
}

fn parse_words(session: &mut MasterSession, kind: DataKind) -> Result<(), MasterError> {
    let request = &session.request;
    let response = &session.response;
    if request.len() != 8 || response.len() < 5 {
        return Err(MasterError::Frame);
    }
    if response[0] != request[0] || response[0] == 0 || response[1] != request[1] {
        return Err(MasterError::Frame);
    }
    let byte_count = response[2] as usize;
    let count = u16::from_be_bytes([request[4], request[5]]);
    if response.len() != 5 + byte_count || byte_count == 0 || byte_count > 250 || byte_count != count as usize * 2 {
        return Err(MasterError::Frame);
    }
    let index = u16::from_be_bytes([request[2], request[3]]);
    let words = response[3..3 + byte_count]
        .chunks_exact(2)
        .map(|c| u16::from_be_bytes([c[0], c[1]]))
        .collect();
    session.data = Some(DataRecord {
        slave_address: response[0],
        index,
        count,
        function: response[1],
        kind,
        payload: Payload::Words(words),
    });
    Ok(())
}

fn parse_write_single(session: &mut MasterSession, kind: DataKind) -> Result<(), MasterError> {
    let request = &session.request;
    let response = &session.response;
    if request.len() != 8 || response.len() != 8 {
        return Err(MasterError::Frame);
    }
    if response != request {
        return Err(MasterError::Frame);
    }
    let index = u16::from_be_bytes([request[2], request[3]]);
    let value = u16::from_be_bytes([request[4], request[5]]);
    let payload = match kind {
        DataKind::Coil => Payload::Bits(vec![value != 0]),
        _ => Payload::Words(vec![value]),
    };
    session.data = Some(DataRecord {
        slave_address: response[0],
        index,
        count: 1,
        function: response[1],
        kind,
        payload,
    });
    Ok(())
}

fn parse_write_multiple_coils(session: &mut MasterSession) -> Result<(), MasterError> {
    let request = &session.request;
    let response = &session.response;
    if response.len() != 8 || request.len() < 7 {
        return Err(MasterError::Frame);
    }
    let byte_count = request[6] as usize;
    if request.len() != 9 + byte_count {
        return Err(MasterError::Frame);
    }
    if response[0] != request[0] || response[1] != request[1] || response[2..6] != request[2..6] {
        return Err(MasterError::Frame);
    }
    let index = u16::from_be_bytes([request[2], request[3]]);
    let count = u16::from_be_bytes([request[4], request[5]]);
    session.data = Some(DataRecord {
        slave_address: response[0],
        index,
        count,
        function: response[1],
        kind: DataKind::Coil,
        payload: Payload::Bits(Vec::new()),
    });
    Ok(())
}

fn parse_write_multiple_registers(session: &mut MasterSession) -> Result<(), MasterError> {
    let request = &session.request;
    let response = &session.response;
    if response.len() != 8 || request.len() < 7 {
        return Err(MasterError::Frame);
    }
    let byte_count = request[6] as usize;
    if request.len() != 9 + byte_count {
        return Err(MasterError::Frame);
    }
    let count = u16::from_be_bytes([request[4], request[5]]);
    if count as usize * 2 != byte_count || count > 123 {
        return Err(MasterError::Frame);
    }
    if response[0] != request[0] || response[1] != request[1] || response[2..6] != request[2..6] {
        return Err(MasterError::Frame);
    }
    let index = u16::from_be_bytes([request[2], request[3]]);
    session.data = Some(DataRecord {
        slave_address: response[0],
        index,
        count,
        function: response[1],
        kind: DataKind::HoldingRegister,
        payload: Payload::Words(Vec::new()),
    });
    Ok(())
}

fn parse_mask_write(session: &mut MasterSession) -> Result<(), MasterError> {
    let request = &session.request;
    let response = &session.response;
    if request.len() != 10 || response.len() != 10 {
        return Err(MasterError::Frame);
    }
    if response != request {
        return Err(MasterError::Frame);
    }
    let index = u16::from_be_bytes([request[2], request[3]]);
    session.data = Some(DataRecord {
        slave_address: response[0],
        index,
        count: 1,
        function: response[1],
        kind: DataKind::HoldingRegister,
        payload: Payload::Words(Vec::new()),
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MasterSession;

    #[test]
    fn read_holding_registers_round_trip() {
        let mut session = MasterSession::new();
        session.build_request_3(0x11, 0x006B, 3).unwrap();
        *session.response_mut() = vec![0x11, 0x03, 0x06, 0xAE, 0x41, 0x56, 0x52, 0x43, 0x40, 0x49, 0xAD];
        session.parse_response().unwrap();
        let data = session.data().unwrap();
        assert_eq!(data.kind, DataKind::HoldingRegister);
        assert_eq!(data.count, 3);
        assert_eq!(data.payload.as_words().unwrap(), &[0xAE41, 0x5652, 0x4340]);
    }

    #[test]
    fn write_single_coil_echo() {
        let mut session = MasterSession::new();
        session.build_request_5(0x11, 0x00AC, 1).unwrap();
        *session.response_mut() = session.request().to_vec();
        session.parse_response().unwrap();
        assert_eq!(session.data().unwrap().payload.as_bits().unwrap(), &[true]);
    }

    #[test]
    fn exception_response_is_recorded() {
        let mut session = MasterSession::new();
        session.build_request_3(0x11, 5, 1).unwrap();
        *session.response_mut() = vec![0x11, 0x83, 0x02, 0xC0, 0xF1];
        let err = session.parse_response().unwrap_err();
        assert!(matches!(err, MasterError::Exception(_)));
        let exc = session.exception().unwrap();
        assert_eq!(exc.address, 0x11);
        assert_eq!(exc.code, Exception::IllegalDataAddress);
    }

    #[test]
    fn crc_mismatch_is_detected() {
        let mut session = MasterSession::new();
        session.build_request_3(0x11, 0x006B, 3).unwrap();
        let mut response = vec![0x11, 0x03, 0x06, 0xAE, 0x41, 0x56, 0x52, 0x43, 0x40, 0x49, 0xAD];
        let last = response.len() - 1;
        response[last] ^= 0xFF;
        *session.response_mut() = response;
        assert!(matches!(session.parse_response().unwrap_err(), MasterError::Crc));
    }
}
