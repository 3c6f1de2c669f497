use super::*;

#[test]
fn checksum_normal() {
    let bytes: [u8; 6] = [0x01, 0x06, 0x12, 0x34, 0x56, 0x78];
    assert_eq!(checksum(&bytes), 0xFEF2);
}

#[test]
fn checksum_empty() {
    assert_eq!(checksum(&[]), 0xFFFF);
}

#[test]
fn verify_ok() {
    let bytes: [u8; 8] = [0x01, 0x06, 0x12, 0x34, 0x56, 0x78, 0xF2, 0xFE];
    assert!(verify(&bytes));
}

#[test]
fn verify_mismatch() {
    let bytes: [u8; 8] = [0x01, 0x06, 0x12, 0x34, 0x56, 0x78, 0xF7, 0x2D];
    assert!(!verify(&bytes));
}

#[test]
fn verify_too_short() {
    assert!(!verify(&[0x01]));
}

#[test]
fn append_matches_f3_scenario() {
    // 11 03 006B 0003 -> crc lo=76 hi=87
    let mut frame = vec![0x11, 0x03, 0x00, 0x6B, 0x00, 0x03];
    append(&mut frame);
    assert_eq!(&frame[6..], &[0x76, 0x87]);
}
