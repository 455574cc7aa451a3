use super::*;
use crate::effects::FilterChain;

fn opaque(w: u32, h: u32, px: Bgra8888, origin: PixelPoint) -> FilterTarget {
    FilterTarget::new(Bitmap::filled(w, h, px).unwrap(), origin)
}

const RED: Bgra8888 = Bgra8888 { b: 0, g: 0, r: 255, a: 255 };
const WHITE: Bgra8888 = Bgra8888 { b: 255, g: 255, r: 255, a: 255 };

#[test]
fn clipping_past_the_size_leaves_one_transparent_pixel() {
    let f = Clipping::new(250, 250, 250, 250);
    let out = f.apply(opaque(200, 200, RED, PixelPoint::ZERO)).unwrap();
    assert_eq!((out.bitmap.width(), out.bitmap.height()), (1, 1));
    assert_eq!(out.bitmap.get(0, 0).unwrap(), Bgra8888::TRANSPARENT);
    assert_eq!(
        f.transform_bounds(PixelRect::new(0, 0, 200, 200)),
        PixelRect::new(0, 0, 1, 1)
    );
}

#[test]
fn clipping_crops_and_moves_origin() {
    let mut t = opaque(100, 100, RED, PixelPoint::new(5, 5));
    t.bitmap.set(10, 20, WHITE).unwrap();
    let f = Clipping::new(10, 20, 30, 40);
    let expect = f.transform_bounds(t.bounds());
    let out = f.apply(t).unwrap();
    assert_eq!(out.bounds(), PixelRect::new(15, 25, 60, 40));
    assert_eq!(out.bounds(), expect);
    assert_eq!(out.bitmap.get(0, 0).unwrap(), WHITE);
    assert_eq!(out.bitmap.get(1, 0).unwrap(), RED);
}

#[test]
fn negative_insets_count_as_zero() {
    let f = Clipping::new(-5, 0, 0, -5);
    let out = f.apply(opaque(4, 4, RED, PixelPoint::ZERO)).unwrap();
    assert_eq!(out.bounds(), PixelRect::new(0, 0, 4, 4));
}

#[test]
fn blur_grows_bounds_by_radius() {
    let f = Blur::new(3);
    let t = opaque(10, 8, RED, PixelPoint::new(2, 2));
    let expect = f.transform_bounds(t.bounds());
    let out = f.apply(t).unwrap();
    assert_eq!(out.bounds(), PixelRect::new(-1, -1, 16, 14));
    assert_eq!(out.bounds(), expect);
    // soft edge, solid core
    assert!(out.bitmap.get(0, 0).unwrap().a < 64);
    assert_eq!(out.bitmap.get(8, 7).unwrap(), RED);
}

#[test]
fn blur_radius_zero_is_noop() {
    let out = Blur::new(0).apply(opaque(3, 3, RED, PixelPoint::new(1, 1))).unwrap();
    assert_eq!(out.bounds(), PixelRect::new(1, 1, 3, 3));
}

fn shadow(shadow_only: bool) -> DropShadow {
    DropShadow {
        offset_x: 3,
        offset_y: 0,
        radius: 1,
        sigma: None,
        color: Color::BLACK,
        shadow_only,
    }
}

#[test]
fn drop_shadow_covers_union_of_shadow_and_source() {
    let f = shadow(false);
    let t = opaque(4, 4, RED, PixelPoint::ZERO);
    let expect = f.transform_bounds(t.bounds());
    let out = f.apply(t).unwrap();
    assert_eq!(out.bounds(), PixelRect::new(0, -1, 8, 6));
    assert_eq!(out.bounds(), expect);
    // source stays on top
    assert_eq!(out.bitmap.get(1, 2).unwrap(), RED);
    // shadow visible to the right of the source
    let s = out.bitmap.get(5, 2).unwrap();
    assert_eq!((s.r, s.g, s.b), (0, 0, 0));
    assert!(s.a > 200);
}

#[test]
fn drop_shadow_only_omits_source() {
    let f = shadow(true);
    let out = f.apply(opaque(4, 4, RED, PixelPoint::ZERO)).unwrap();
    assert_eq!(out.bounds(), PixelRect::new(2, -1, 6, 6));
    assert!(out.bitmap.pixels().unwrap().iter().all(|p| p.r == 0));
}

#[test]
fn inner_shadow_darkens_the_leading_edge_only() {
    let f = InnerShadow {
        offset_x: 2,
        offset_y: 2,
        radius: 1,
        sigma: None,
        color: Color::BLACK,
    };
    let t = opaque(6, 6, RED, PixelPoint::new(7, 7));
    let out = f.apply(t).unwrap();
    assert_eq!(out.bounds(), PixelRect::new(7, 7, 6, 6));
    assert!(out.bitmap.pixels().unwrap().iter().all(|p| p.a == 255));
    assert!(out.bitmap.get(0, 0).unwrap().r < 64);
    assert_eq!(out.bitmap.get(5, 5).unwrap(), RED);
}

#[test]
fn inner_shadow_keeps_transparent_pixels_transparent() {
    let mut bmp = Bitmap::<Bgra8888>::new(6, 6).unwrap();
    bmp.set(3, 3, RED).unwrap();
    let f = InnerShadow {
        offset_x: 1,
        offset_y: 1,
        radius: 1,
        sigma: None,
        color: Color::BLACK,
    };
    let out = f.apply(FilterTarget::new(bmp, PixelPoint::ZERO)).unwrap();
    assert_eq!(out.bitmap.get(0, 0).unwrap().a, 0);
    assert_eq!(out.bitmap.get(3, 3).unwrap().a, 255);
}

#[test]
fn border_rings_the_shape() {
    let f = Border {
        thickness: 1,
        color: Color::RED,
    };
    let t = opaque(2, 2, WHITE, PixelPoint::ZERO);
    let expect = f.transform_bounds(t.bounds());
    let out = f.apply(t).unwrap();
    assert_eq!(out.bounds(), PixelRect::new(-1, -1, 4, 4));
    assert_eq!(out.bounds(), expect);
    assert_eq!(out.bitmap.get(0, 0).unwrap(), RED);
    assert_eq!(out.bitmap.get(3, 2).unwrap(), RED);
    assert_eq!(out.bitmap.get(1, 1).unwrap(), WHITE);
}

#[test]
fn color_filters() {
    let px = Bgra8888::new(10, 100, 200, 77);
    let mut chain = FilterChain::new();
    chain.attach(Box::new(Invert {}));
    chain.attach(Box::new(Invert {}));
    chain.attach(Box::new(Gamma { gamma: 1.0 }));
    let out = chain.apply(opaque(2, 2, px, PixelPoint::ZERO)).unwrap();
    assert_eq!(out.bitmap.get(1, 1).unwrap(), px);

    let out = Brightness { amount: -1.0 }
        .apply(opaque(1, 1, px, PixelPoint::ZERO))
        .unwrap();
    assert_eq!(out.bitmap.get(0, 0).unwrap(), Bgra8888::new(0, 0, 0, 77));
}

#[test]
fn lut_filter_params_follow_table() {
    let a = LutFilter {
        lut: Lut::gamma(2.0),
        strength: 1.0,
    };
    let b = LutFilter {
        lut: Lut::identity(),
        strength: 1.0,
    };
    assert_ne!(a.params(), b.params());
    let out = b.apply(opaque(1, 1, RED, PixelPoint::ZERO)).unwrap();
    assert_eq!(out.bitmap.get(0, 0).unwrap(), RED);
}

#[test]
fn oversized_shadow_radii_fail_instead_of_overflowing() {
    let inner = InnerShadow {
        offset_x: 0,
        offset_y: 0,
        radius: u32::MAX,
        sigma: None,
        color: Color::BLACK,
    };
    let err = inner.apply(opaque(4, 4, RED, PixelPoint::ZERO)).unwrap_err();
    assert!(matches!(err, EngineError::Allocation(_)), "{err}");

    let wide = InnerShadow {
        offset_x: i32::MIN,
        radius: u32::MAX / 2,
        ..inner
    };
    assert!(wide.apply(opaque(4, 4, RED, PixelPoint::ZERO)).is_err());

    let drop = DropShadow {
        offset_x: 0,
        offset_y: 0,
        radius: u32::MAX,
        sigma: None,
        color: Color::BLACK,
        shadow_only: false,
    };
    let err = drop.apply(opaque(4, 4, RED, PixelPoint::ZERO)).unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)), "{err}");
    assert!(Blur::new(u32::MAX).apply(opaque(4, 4, RED, PixelPoint::ZERO)).is_err());
    assert!(Border { thickness: u32::MAX, color: Color::RED }.apply(opaque(4, 4, RED, PixelPoint::ZERO)).is_err());
}

#[test]
fn extreme_offsets_and_radii_saturate_bounds() {
    let shadow = DropShadow {
        offset_x: i32::MIN,
        offset_y: i32::MAX,
        radius: 1,
        sigma: None,
        color: Color::BLACK,
        shadow_only: true,
    };
    let out = shadow.apply(opaque(2, 2, RED, PixelPoint::ZERO)).unwrap();
    assert_eq!(out.origin, PixelPoint::new(i32::MIN, i32::MAX - 1));

    let grown = Blur::new(u32::MAX).transform_bounds(PixelRect::new(0, 0, 4, 4));
    assert_eq!(grown.x, -i32::MAX);
    assert_eq!(grown.width, u32::MAX);
    let shadow = DropShadow { radius: u32::MAX, shadow_only: false, ..shadow };
    assert!(!shadow.transform_bounds(PixelRect::new(0, 0, 4, 4)).is_empty());
}
