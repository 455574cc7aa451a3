use super::*;

#[test]
fn png_roundtrip_preserves_straight_alpha() {
    let px = vec![
        Bgra8888::new(255, 0, 0, 255),
        Bgra8888::new(0, 255, 0, 128),
        Bgra8888::new(0, 0, 255, 0),
        Bgra8888::new(10, 20, 30, 40),
    ];
    let bmp = Bitmap::from_vec(2, 2, px).unwrap();
    let bytes = encode_png(&bmp).unwrap();
    let back = decode_bitmap(&bytes).unwrap();
    assert_eq!(back, bmp);
}

#[test]
fn rgba_image_channel_order() {
    let bmp = Bitmap::filled(1, 1, Bgra8888::new(1, 2, 3, 4)).unwrap();
    let img = to_rgba_image(&bmp).unwrap();
    assert_eq!(img.as_raw(), &vec![1, 2, 3, 4]);
}

#[test]
fn garbage_bytes_fail_to_decode() {
    let err = decode_bitmap(b"not an image").unwrap_err();
    assert!(err.is_recoverable());
}
