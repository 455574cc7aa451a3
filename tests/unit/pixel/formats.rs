use super::*;
use crate::pixel::convert_pixel;

fn sample_colors() -> Vec<Color> {
    let mut out = Vec::new();
    let mut s = 0x2545_f491_u32;
    for _ in 0..512 {
        s ^= s << 13;
        s ^= s >> 17;
        s ^= s << 5;
        let [a, r, g, b] = s.to_be_bytes();
        out.push(Color::from_argb(a, r, g, b));
    }
    out
}

#[test]
fn bgra_layout_matches_channel_order() {
    assert_eq!(std::mem::size_of::<Bgra8888>(), 4);
    let px = Bgra8888::new(1, 2, 3, 4);
    assert_eq!([px.b, px.g, px.r, px.a], [3, 2, 1, 4]);
    assert_eq!(std::mem::size_of::<Bgr565>(), 2);
    assert_eq!(std::mem::size_of::<Bgr888>(), 3);
}

#[test]
fn lossless_formats_roundtrip_exactly() {
    for c in sample_colors() {
        assert_eq!(Bgra8888::from_color(c).to_color(), c);
        assert_eq!(Rgba8888::from_color(c).to_color(), c);
        let rgb: Bgra8888 = convert_pixel(Bgr888::from_color(c));
        assert_eq!(rgb, Bgra8888::new(c.r, c.g, c.b, 255));
    }
}

#[test]
fn bgr565_roundtrip_loses_only_low_bits() {
    for c in sample_colors() {
        let back = Bgr565::from_color(c).to_color();
        assert_eq!(back.r >> 3, c.r >> 3);
        assert_eq!(back.g >> 2, c.g >> 2);
        assert_eq!(back.b >> 3, c.b >> 3);
        assert!(back.r.abs_diff(c.r) <= 7);
        assert!(back.g.abs_diff(c.g) <= 3);
        assert!(back.b.abs_diff(c.b) <= 7);
    }
}

#[test]
fn narrow_formats_are_stable_after_one_roundtrip() {
    for v in 0..=u16::MAX {
        let p = Bgr565(v);
        assert_eq!(Bgr565::from_color(p.to_color()), p);
    }
    for v in 0..=255u8 {
        let p = Grayscale8(v);
        assert_eq!(Grayscale8::from_color(p.to_color()), p);
    }
}

#[test]
fn grayscale_uses_luma_weights() {
    assert_eq!(Grayscale8::from_color(Color::WHITE).0, 255);
    assert_eq!(Grayscale8::from_color(Color::BLACK).0, 0);
    assert!(Grayscale8::from_color(Color::GREEN).0 > Grayscale8::from_color(Color::RED).0);
    assert_eq!(Grayscale16::from_color(Color::WHITE).0, u16::MAX);
    assert_eq!(Grayscale16(u16::MAX).to_color(), Color::WHITE);
}

#[test]
fn parse_hex_accepts_rgb_and_argb() {
    assert_eq!(Color::parse_hex("#ff0000").unwrap(), Color::RED);
    assert_eq!(
        Color::parse_hex("80112233").unwrap(),
        Color::from_argb(0x80, 0x11, 0x22, 0x33)
    );
    assert!(Color::parse_hex("#12").is_err());
    assert!(Color::parse_hex("#gg0000").is_err());
}

#[test]
fn format_sizes_match_layout() {
    assert_eq!(Bgra8888::FORMAT.bytes_per_pixel(), std::mem::size_of::<Bgra8888>());
    assert_eq!(Bgr565::FORMAT.bytes_per_pixel(), std::mem::size_of::<Bgr565>());
    assert_eq!(Grayscale8::FORMAT.bytes_per_pixel(), 1);
}
