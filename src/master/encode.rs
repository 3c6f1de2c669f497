//! Frame construction shared by the `build_request_*` entry points.

use crate::crc;
use crate::error::MasterError;

pub const MAX_READ_COILS: u16 = 2000;
pub const MAX_READ_REGISTERS: u16 = 125;
pub const MAX_WRITE_COILS: u16 = 1968;
pub const MAX_WRITE_REGISTERS: u16 = 123;

fn try_frame(capacity: usize) -> Result<Vec<u8>, MasterError> {
    let mut frame = Vec::new();
    frame.try_reserve_exact(capacity).map_err(|_| MasterError::Alloc)?;
    Ok(frame)
}

/// Builds the request frame shared by functions 1/2/3/4: `address | function
/// | index | count | crc`.
pub fn build_read(function: u8, address: u8, index: u16, count: u16) -> Result<Vec<u8>, MasterError> {
    let mut frame = try_frame(8)?;
    frame.push(address);
    frame.push(function);
    frame.extend_from_slice(&index.to_be_bytes());
    frame.extend_from_slice(&count.to_be_bytes());
    crc::append(&mut frame);
    Ok(frame)
}

/// Builds the request frame shared by functions 5/6: `address | function |
/// index | value | crc`.
pub fn build_write_single(function: u8, address: u8, index: u16, value: u16) -> Result<Vec<u8>, MasterError> {
    let mut frame = try_frame(8)?;
    frame.push(address);
    frame.push(function);
    frame.extend_from_slice(&index.to_be_bytes());
    frame.extend_from_slice(&value.to_be_bytes());
    crc::append(&mut frame);
    Ok(frame)
}

/// Builds a Write Multiple Coils (`0x0F`) request.
pub fn build_write_multiple_coils(address: u8, index: u16, count: u16, values: &[bool]) -> Result<Vec<u8>, MasterError> {
    let packed = crate::bits::pack(values);
    let byte_count = packed.len() as u8;
    let mut frame = try_frame(9 + packed.len())?;
    frame.push(address);
    frame.push(0x0F);
    frame.extend_from_slice(&index.to_be_bytes());
    frame.extend_from_slice(&count.to_be_bytes());
    frame.push(byte_count);
    frame.extend_from_slice(&packed);
    crc::append(&mut frame);
    Ok(frame)
}

/// Builds a Write Multiple Registers (`0x10`) request.
pub fn build_write_multiple_registers(address: u8, index: u16, count: u16, values: &[u16]) -> Result<Vec<u8>, MasterError> {
    let byte_count = (values.len() * 2) as u8;
    let mut frame = try_frame(9 + values.len() * 2)?;
    frame.push(address);
    frame.push(0x10);
    frame.extend_from_slice(&index.to_be_bytes());
    frame.extend_from_slice(&count.to_be_bytes());
    frame.push(byte_count);
    for value in values {
        frame.extend_from_slice(&value.to_be_bytes());
    }
    crc::append(&mut frame);
    Ok(frame)
}

/// Builds a Mask Write Register (`0x16`) request.
pub fn build_mask_write(address: u8, index: u16, and_mask: u16, or_mask: u16) -> Result<Vec<u8>, MasterError> {
    let mut frame = try_frame(10)?;
    frame.push(address);
    frame.push(0x16);
    frame.extend_from_slice(&index.to_be_bytes());
    frame.extend_from_slice(&and_mask.to_be_bytes());
    frame.extend_from_slice(&or_mask.to_be_bytes());
    crc::append(&mut frame);
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_holding_registers_matches_known_frame() {
        let frame = build_read(0x03, 0x11, 0x006B, 0x0003).unwrap();
        assert_eq!(frame, vec![0x11, 0x03, 0x00, 0x6B, 0x00, 0x03, 0x76, 0x87]);
    }

    #[test]
    fn write_single_coil_matches_known_frame() {
        let frame = build_write_single(0x05, 0x11, 0x00AC, 0xFF00).unwrap();
        assert_eq!(frame, vec![0x11, 0x05, 0x00, 0xAC, 0xFF, 0x00, 0x4E, 0x8B]);
    }

    #[test]
    fn write_single_register_matches_known_frame() {
        let frame = build_write_single(0x06, 0x11, 0x0001, 0x0003).unwrap();
        assert_eq!(frame, vec![0x11, 0x06, 0x00, 0x01, 0x00, 0x03, 0x9A, 0x9B]);
    }
}
