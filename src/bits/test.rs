use super::*;

#[test]
fn byte_count_boundaries() {
    assert_eq!(byte_count(0), 0);
    assert_eq!(byte_count(1), 1);
    assert_eq!(byte_count(8), 1);
    assert_eq!(byte_count(9), 2);
    assert_eq!(byte_count(2000), 250);
}

#[test]
fn read_write_roundtrip() {
    let mut buf = [0u8; 2];
    assert!(write(&mut buf, 2, 5, true));
    assert_eq!(read(&buf, 2, 5), Some(true));
    assert_eq!(read(&buf, 2, 4), Some(false));
    assert!(write(&mut buf, 2, 5, false));
    assert_eq!(read(&buf, 2, 5), Some(false));
}

#[test]
fn read_write_out_of_range() {
    let mut buf = [0u8; 1];
    assert_eq!(read(&buf, 1, 8), None);
    assert!(!write(&mut buf, 1, 8, true));
}

#[test]
fn pack_unpack_roundtrip() {
    let values = vec![true, false, true, true, false, false, false, false, true];
    let packed = pack(&values);
    assert_eq!(packed, vec![0b0000_1101, 0b0000_0001]);
    assert_eq!(unpack(&packed, values.len() as u16), values);
}
