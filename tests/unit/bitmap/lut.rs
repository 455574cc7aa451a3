use super::*;

#[test]
fn identity_and_unit_gamma_are_noops() {
    let px = Bgra8888::new(12, 130, 250, 77);
    assert_eq!(Lut::identity().map(px), px);
    assert_eq!(Lut::gamma(1.0).map(px), px);
    assert_eq!(Lut::default(), Lut::identity());
}

#[test]
fn gamma_brightens_midtones_and_keeps_endpoints() {
    let lut = Lut::gamma(2.2);
    let mid = lut.map(Bgra8888::new(128, 128, 128, 255));
    assert!(mid.r > 128);
    assert_eq!(lut.map(Bgra8888::new(0, 255, 0, 9)), Bgra8888::new(0, 255, 0, 9));
}

#[test]
fn negaposi_inverts_and_never_touches_alpha() {
    let lut = Lut::negaposi(255, 255, 255);
    assert_eq!(lut.map(Bgra8888::new(0, 100, 255, 50)), Bgra8888::new(255, 155, 0, 50));
    let partial = Lut::negaposi(100, 255, 255);
    assert_eq!(partial.map(Bgra8888::new(150, 0, 0, 255)).r, 0);
}

#[test]
fn solarisation_follows_sine_curve() {
    let lut = Lut::solarisation(2);
    assert_eq!(lut.map(Bgra8888::new(0, 0, 0, 255)).r, 128);
    assert!(lut.map(Bgra8888::new(64, 0, 0, 255)).r >= 254);
    // sin(2 * PI) at the top end returns to mid gray
    assert!(lut.map(Bgra8888::new(255, 255, 255, 255)).r.abs_diff(128) <= 1);
}

#[test]
fn contrast_zero_is_identity_and_max_is_threshold() {
    let px = Bgra8888::new(40, 128, 220, 255);
    assert_eq!(Lut::contrast(0).map(px), px);
    let hard = Lut::contrast(255).map(px);
    assert_eq!((hard.r, hard.b), (0, 255));
}

#[test]
fn cube_1d_parses_and_resamples() {
    let text = "TITLE \"inv\"\n# comment\nLUT_1D_SIZE 2\nDOMAIN_MIN 0 0 0\n1.0 1.0 0.0\n0.0 0.0 1.0\n";
    let lut = Lut::from_cube_1d(text).unwrap();
    assert_eq!(lut.map(Bgra8888::new(0, 0, 0, 255)), Bgra8888::new(255, 255, 0, 255));
    assert_eq!(lut.map(Bgra8888::new(255, 255, 255, 255)), Bgra8888::new(0, 0, 255, 255));
}

#[test]
fn cube_rejects_bad_input() {
    assert!(Lut::from_cube_1d("LUT_3D_SIZE 33\n").is_err());
    assert!(Lut::from_cube_1d("LUT_1D_SIZE 3\n0 0 0\n1 1 1\n").is_err());
    assert!(Lut::from_cube_1d("0 0 0\n").is_err());
    assert!(Lut::from_cube_1d("LUT_1D_SIZE 2\n0 0\n1 1 1\n").is_err());
}

#[test]
fn apply_with_strength_mixes() {
    let mut bmp = Bitmap::filled(2, 2, Bgra8888::new(0, 0, 0, 255)).unwrap();
    Lut::negaposi(255, 255, 255).apply_with_strength(&mut bmp, 0.5).unwrap();
    assert!(bmp.pixels().unwrap().iter().all(|p| p.r == 128 && p.a == 255));
    let mut none = Bitmap::filled(1, 1, Bgra8888::new(9, 9, 9, 255)).unwrap();
    Lut::negaposi(255, 255, 255).apply_with_strength(&mut none, 0.0).unwrap();
    assert_eq!(none.get(0, 0).unwrap().r, 9);
}
