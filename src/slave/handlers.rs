//! Per-function-code request validation, bank mutation, and response/exception
//! frame building.

use super::{BitBank, RegisterBank, SlaveSession};
use crate::crc;
use crate::Exception;

pub(crate) enum HandlerOutcome {
    NoResponse,
    Response(Vec<u8>),
    Exception(Exception),
}

/// Builds a 5-byte exception frame: `address | function|0x80 | code | crc`.
pub(crate) fn build_exception(address: u8, function: u8, code: Exception) -> Vec<u8> {
    let mut frame = vec![address, function | 0x80, code.as_code()];
    crc::append(&mut frame);
    frame
}

fn response_frame(address: u8, body: impl FnOnce(&mut Vec<u8>)) -> Vec<u8> {
    let mut frame = vec![address];
    body(&mut frame);
    crc::append(&mut frame);
    frame
}

/// Validates `[index, index + count)` against `bank_len`, in 32-bit width so
/// `index + count` cannot wrap a 16-bit accumulator.
fn in_range(index: u16, count: u16, bank_len: usize) -> bool {
    let end = index as u32 + count as u32;
    (index as usize) < bank_len && end <= bank_len as u32
}

pub(crate) fn read_bits(session: &mut SlaveSession, broadcast: bool, bank: BitBank) -> HandlerOutcome {
    let request = &session.request;
    if request.len() != 8 {
        return if broadcast { HandlerOutcome::NoResponse } else { HandlerOutcome::Exception(Exception::IllegalDataValue) };
    }
    let index = u16::from_be_bytes([request[2], request[3]]);
    let count = u16::from_be_bytes([request[4], request[5]]);
    let function = request[1];

    if count == 0 || count > 2000 {
        return if broadcast { HandlerOutcome::NoResponse } else { HandlerOutcome::Exception(Exception::IllegalDataValue) };
    }

    let values = match bank {
        BitBank::Coils => &*session.banks.coils,
        BitBank::DiscreteInputs => &*session.banks.discrete_inputs,
    };
    if !in_range(index, count, values.len()) {
        return if broadcast { HandlerOutcome::NoResponse } else { HandlerOutcome::Exception(Exception::IllegalDataAddress) };
    }

    let bits = &values[index as usize..index as usize + count as usize];
    let packed = crate::bits::pack(bits);

    if broadcast {
        return HandlerOutcome::NoResponse;
    }
    let address = session.address;
    HandlerOutcome::Response(response_frame(address, |frame| {
        frame.push(function);
        frame.push(packed.len() as u8);
        frame.extend_from_slice(&packed);
    }))
}

pub(crate) fn read_registers(session: &mut SlaveSession, broadcast: bool, bank: RegisterBank) -> HandlerOutcome {
    let request = &session.request;
    if request.len() != 8 {
        return if broadcast { HandlerOutcome::NoResponse } else { HandlerOutcome::Exception(Exception::IllegalDataValue) };
    }
    let index = u16::from_be_bytes([request[2], request[3]]);
    let count = u16::from_be_bytes([request[4], request[5]]);
    let function = request[1];

    if count == 0 || count > 125 {
        return if broadcast { HandlerOutcome::NoResponse } else { HandlerOutcome::Exception(Exception::IllegalDataValue) };
    }

    let values = match bank {
        RegisterBank::Holding => &*session.banks.holding_registers,
        RegisterBank::Input => &*session.banks.input_registers,
    };
    if !in_range(index, count, values.len()) {
        return if broadcast { HandlerOutcome::NoResponse } else { HandlerOutcome::Exception(Exception::IllegalDataAddress) };
    }

    let words = values[index as usize..index as usize + count as usize].to_vec();

    if broadcast {
        return HandlerOutcome::NoResponse;
    }
    let address = session.address;
    HandlerOutcome::Response(response_frame(address, |frame| {
        frame.push(function);
        frame.push((words.len() * 2) as u8);
        for word in words {
            frame.extend_from_slice(&word.to_be_bytes());
        }
    }))
}

pub(crate) fn write_single_coil(session: &mut SlaveSession, broadcast: bool) -> HandlerOutcome {
    let request = &session.request;
    if request.len() != 8 {
        return if broadcast { HandlerOutcome::NoResponse } else { HandlerOutcome::Exception(Exception::IllegalDataValue) };
    }
    let index = u16::from_be_bytes([request[2], request[3]]);
    let value = u16::from_be_bytes([request[4], request[5]]);

    if value != 0x0000 && value != 0xFF00 {
        return if broadcast { HandlerOutcome::NoResponse } else { HandlerOutcome::Exception(Exception::IllegalDataValue) };
    }
    if index as usize >= session.banks.coils.len() {
        return if broadcast { HandlerOutcome::NoResponse } else { HandlerOutcome::Exception(Exception::IllegalDataAddress) };
    }
    if session.masks.coil_protected(index) {
        return if broadcast { HandlerOutcome::NoResponse } else { HandlerOutcome::Exception(Exception::SlaveDeviceFailure) };
    }

    session.banks.coils[index as usize] = value == 0xFF00;

    if broadcast {
        return HandlerOutcome::NoResponse;
    }
    HandlerOutcome::Response(session.request.clone())
}

pub(crate) fn write_single_register(session: &mut SlaveSession, broadcast: bool) -> HandlerOutcome {
    let request = &session.request;
    if request.len() != 8 {
        return if broadcast { HandlerOutcome::NoResponse } else { HandlerOutcome::Exception(Exception::IllegalDataValue) };
    }
    let index = u16::from_be_bytes([request[2], request[3]]);
    let value = u16::from_be_bytes([request[4], request[5]]);

    if index as usize >= session.banks.holding_registers.len() {
        return if broadcast { HandlerOutcome::NoResponse } else { HandlerOutcome::Exception(Exception::IllegalDataAddress) };
    }
    if session.masks.register_protected(index) {
        return if broadcast { HandlerOutcome::NoResponse } else { HandlerOutcome::Exception(Exception::SlaveDeviceFailure) };
    }

    session.banks.holding_registers[index as usize] = value;

    if broadcast {
        return HandlerOutcome::NoResponse;
    }
    HandlerOutcome::Response(session.request.clone())
}

/// Implements function 15 (Write Multiple Coils), including the explicit
/// `length >= 7` guard before the byte-count field (offset 6) is read.
pub(crate) fn write_multiple_coils(session: &mut SlaveSession, broadcast: bool) -> HandlerOutcome {
    let request = &session.request;
    if request.len() < 7 {
        return if broadcast { HandlerOutcome::NoResponse } else { HandlerOutcome::Exception(Exception::IllegalDataValue) };
    }
    let byte_count = request[6] as usize;
    if request.len() != 9 + byte_count {
        return if broadcast { HandlerOutcome::NoResponse } else { HandlerOutcome::Exception(Exception::IllegalDataValue) };
    }

    let index = u16::from_be_bytes([request[2], request[3]]);
    let count = u16::from_be_bytes([request[4], request[5]]);

    if count == 0 || count > 1968 || crate::bits::byte_count(count) as usize != byte_count {
        return if broadcast { HandlerOutcome::NoResponse } else { HandlerOutcome::Exception(Exception::IllegalDataValue) };
    }
    if !in_range(index, count, session.banks.coils.len()) {
        return if broadcast { HandlerOutcome::NoResponse } else { HandlerOutcome::Exception(Exception::IllegalDataAddress) };
    }
    for i in 0..count {
        if session.masks.coil_protected(index + i) {
            return if broadcast { HandlerOutcome::NoResponse } else { HandlerOutcome::Exception(Exception::SlaveDeviceFailure) };
        }
    }

    let values = crate::bits::unpack(&request[7..7 + byte_count], count);
    for (i, value) in values.into_iter().enumerate() {
        session.banks.coils[index as usize + i] = value;
    }

    if broadcast {
        return HandlerOutcome::NoResponse;
    }
    let address = session.address;
    HandlerOutcome::Response(response_frame(address, |frame| {
        frame.push(0x0F);
        frame.extend_from_slice(&index.to_be_bytes());
        frame.extend_from_slice(&count.to_be_bytes());
    }))
}

/// Implements function 16 (Write Multiple Registers).
///
/// The length-mismatch branch below builds an exception frame regardless of
/// whether this request is a broadcast, unlike every other validation branch
/// in this function (and unlike the equivalent branch in function 15). This
/// mirrors a deliberately preserved quirk of the reference implementation.
pub(crate) fn write_multiple_registers(session: &mut SlaveSession, broadcast: bool) -> HandlerOutcome {
    let request = &session.request;
    if request.len() < 7 {
        return if broadcast { HandlerOutcome::NoResponse } else { HandlerOutcome::Exception(Exception::IllegalDataValue) };
    }
    let byte_count = request[6] as usize;
    if request.len() != 9 + byte_count {
        return HandlerOutcome::Exception(Exception::IllegalDataValue);
    }

    let index = u16::from_be_bytes([request[2], request[3]]);
    let count = u16::from_be_bytes([request[4], request[5]]);

    if count == 0 || count > 123 || byte_count != count as usize * 2 {
        return if broadcast { HandlerOutcome::NoResponse } else { HandlerOutcome::Exception(Exception::IllegalDataValue) };
    }
    if !in_range(index, count, session.banks.holding_registers.len()) {
        return if broadcast { HandlerOutcome::NoResponse } else { HandlerOutcome::Exception(Exception::IllegalDataAddress) };
    }
    for i in 0..count {
        if session.masks.register_protected(index + i) {
            return if broadcast { HandlerOutcome::NoResponse } else { HandlerOutcome::Exception(Exception::SlaveDeviceFailure) };
        }
    }

    for (i, chunk) in request[7..7 + byte_count].chunks_exact(2).enumerate() {
        session.banks.holding_registers[index as usize + i] = u16::from_be_bytes([chunk[0], chunk[1]]);
    }

    if broadcast {
        return HandlerOutcome::NoResponse;
    }
    let address = session.address;
    HandlerOutcome::Response(response_frame(address, |frame| {
        frame.push(0x10);
        frame.extend_from_slice(&index.to_be_bytes());
        frame.extend_from_slice(&count.to_be_bytes());
    }))
}

pub(crate) fn mask_write_register(session: &mut SlaveSession, broadcast: bool) -> HandlerOutcome {
    let request = &session.request;
    if request.len() != 10 {
        return if broadcast { HandlerOutcome::NoResponse } else { HandlerOutcome::Exception(Exception::IllegalDataValue) };
    }
    let index = u16::from_be_bytes([request[2], request[3]]);
    let and_mask = u16::from_be_bytes([request[4], request[5]]);
    let or_mask = u16::from_be_bytes([request[6], request[7]]);

    if index as usize >= session.banks.holding_registers.len() {
        return if broadcast { HandlerOutcome::NoResponse } else { HandlerOutcome::Exception(Exception::IllegalDataAddress) };
    }
    if session.masks.register_protected(index) {
        return if broadcast { HandlerOutcome::NoResponse } else { HandlerOutcome::Exception(Exception::SlaveDeviceFailure) };
    }

    let current = session.banks.holding_registers[index as usize];
    session.banks.holding_registers[index as usize] = (current & and_mask) | (or_mask & !and_mask);

    if broadcast {
        return HandlerOutcome::NoResponse;
    }
    HandlerOutcome::Response(session.request.clone())
}

#[cfg(test)]
mod tests {
    use super::super::{Banks, Masks, SlaveSession};
    use super::*;

    fn session<'a>(
        holding: &'a mut [u16],
        input: &'a mut [u16],
        coils: &'a mut [bool],
        discrete: &'a mut [bool],
        register_mask: &'a [u8],
        coil_mask: &'a [u8],
    ) -> SlaveSession<'a> {
        SlaveSession::new(
            0x11,
            Banks { holding_registers: holding, input_registers: input, coils, discrete_inputs: discrete },
            Masks { register_mask, coil_mask },
        )
        .unwrap()
    }

    #[test]
    fn read_holding_registers_builds_known_response() {
        let mut holding = [0xAE41u16, 0x5652, 0x4340];
        let mut input = [];
        let mut coils = [];
        let mut discrete = [];
        let register_mask = [0u8];
        let coil_mask = [];
        let mut s = session(&mut holding, &mut input, &mut coils, &mut discrete, &register_mask, &coil_mask);
        *s.request_mut() = vec![0x11, 0x03, 0x00, 0x00, 0x00, 0x03, 0x05, 0xCB];
        let outcome = s.parse_request().unwrap();
        assert_eq!(outcome, super::super::SlaveOutcome::Response);
        assert_eq!(s.response(), &[0x11, 0x03, 0x06, 0xAE, 0x41, 0x56, 0x52, 0x43, 0x40, 0x49, 0xAD]);
    }

    #[test]
    fn out_of_range_read_raises_illegal_address() {
        let mut holding = [0u16; 2];
        let mut input = [];
        let mut coils = [];
        let mut discrete = [];
        let register_mask = [0u8];
        let coil_mask = [];
        let mut s = session(&mut holding, &mut input, &mut coils, &mut discrete, &register_mask, &coil_mask);
        let mut frame = vec![0x11u8, 0x03, 0x00, 0x05, 0x00, 0x01];
        crc::append(&mut frame);
        *s.request_mut() = frame;
        let outcome = s.parse_request().unwrap();
        assert_eq!(outcome, super::super::SlaveOutcome::Exception);
        assert_eq!(s.response()[1], 0x83);
        assert_eq!(s.response()[2], Exception::IllegalDataAddress.as_code());
    }

    #[test]
    fn write_protected_register_raises_slave_failure() {
        let mut holding = [0u16; 1];
        let mut input = [];
        let mut coils = [];
        let mut discrete = [];
        let register_mask = [0b0000_0001u8];
        let coil_mask = [];
        let mut s = session(&mut holding, &mut input, &mut coils, &mut discrete, &register_mask, &coil_mask);
        let mut frame = vec![0x11u8, 0x06, 0x00, 0x00, 0x00, 0x2A];
        crc::append(&mut frame);
        *s.request_mut() = frame;
        s.parse_request().unwrap();
        assert_eq!(s.response()[2], Exception::SlaveDeviceFailure.as_code());
        assert_eq!(holding[0], 0);
    }

    #[test]
    fn broadcast_write_applies_without_response() {
        let mut holding = [0u16; 1];
        let mut input = [];
        let mut coils = [];
        let mut discrete = [];
        let register_mask = [0u8];
        let coil_mask = [];
        let mut s = session(&mut holding, &mut input, &mut coils, &mut discrete, &register_mask, &coil_mask);
        let mut frame = vec![0x00u8, 0x06, 0x00, 0x00, 0x12, 0x34];
        crc::append(&mut frame);
        *s.request_mut() = frame;
        let outcome = s.parse_request().unwrap();
        assert_eq!(outcome, super::super::SlaveOutcome::NoResponse);
        assert!(s.response().is_empty());
        assert_eq!(holding[0], 0x1234);
    }

    #[test]
    fn mask_write_register_combines_masks() {
        let mut holding = [0b0000_1111_0000_1111u16];
        let mut input = [];
        let mut coils = [];
        let mut discrete = [];
        let register_mask = [0u8];
        let coil_mask = [];
        let mut s = session(&mut holding, &mut input, &mut coils, &mut discrete, &register_mask, &coil_mask);
        let mut frame = vec![0x11u8, 0x16, 0x00, 0x00, 0x00, 0xF2, 0x00, 0x25];
        crc::append(&mut frame);
        *s.request_mut() = frame;
        s.parse_request().unwrap();
        assert_eq!(holding[0], (0b0000_1111_0000_1111 & 0x00F2) | (0x0025 & !0x00F2));
    }

    #[test]
    fn broadcast_f16_length_mismatch_still_yields_exception() {
        let mut holding = [0u16; 4];
        let mut input = [];
        let mut coils = [];
        let mut discrete = [];
        let register_mask = [0u8];
        let coil_mask = [];
        let mut s = session(&mut holding, &mut input, &mut coils, &mut discrete, &register_mask, &coil_mask);
        // Broadcast, function 16, claims 2 registers (byte_count=4) but only supplies 2 payload bytes.
        let mut frame = vec![0x00u8, 0x10, 0x00, 0x00, 0x00, 0x02, 0x04, 0x00, 0x01];
        crc::append(&mut frame);
        *s.request_mut() = frame;
        let outcome = s.parse_request().unwrap();
        assert_eq!(outcome, super::super::SlaveOutcome::Exception);
    }
}
