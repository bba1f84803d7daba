use super::*;

#[test]
fn fnv_byte_writes_compose() {
    let mut a = Fnv1a64::new_default();
    a.write_bytes(b"replay");
    let mut b = Fnv1a64::new_default();
    b.write_u8(b'r');
    b.write_bytes(b"eplay");
    assert_eq!(a.finish(), b.finish());
}

#[test]
fn fnv_str_terminator_separates_splits() {
    let mut a = Fnv1a64::new_default();
    a.write_str("ab");
    a.write_str("c");
    let mut b = Fnv1a64::new_default();
    b.write_str("a");
    b.write_str("bc");
    assert_ne!(a.finish(), b.finish());
}

#[test]
fn mul_div255_variants_align() {
    for x in [0u16, 1, 127, 255] {
        for y in [0u16, 1, 127, 255] {
            assert_eq!(u16::from(mul_div255_u8(x, y)), mul_div255_u16(x, y));
        }
    }
}

#[test]
fn premultiply_keeps_opaque_and_scales_translucent() {
    let mut px = vec![200u8, 100, 50, 255, 200, 100, 50, 0, 255, 255, 255, 128];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[0..4], &[200, 100, 50, 255]);
    assert_eq!(&px[4..8], &[0, 0, 0, 0]);
    assert_eq!(&px[8..12], &[128, 128, 128, 128]);
}
