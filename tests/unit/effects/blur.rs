use super::*;

#[test]
fn kernel_sums_to_one_in_q16() {
    for (r, s) in [(1, 0.5), (3, 2.0), (8, 4.0), (20, 1.0)] {
        let k = gaussian_kernel_q16(r, s).unwrap();
        assert_eq!(k.len(), (2 * r + 1) as usize);
        assert_eq!(k.iter().sum::<u32>(), 1 << 16);
        assert_eq!(k.first(), k.last());
    }
    assert!(gaussian_kernel_q16(2, 0.0).is_err());
    assert!(gaussian_kernel_q16(2, f32::NAN).is_err());
}

#[test]
fn radius_zero_is_identity() {
    let src = Bitmap::filled(3, 2, Bgra8888::new(1, 2, 3, 4)).unwrap();
    assert_eq!(blur_bitmap(&src, 0, 1.0).unwrap(), src);
}

#[test]
fn constant_opaque_image_is_unchanged() {
    let src = Bitmap::filled(6, 5, Bgra8888::new(10, 20, 30, 255)).unwrap();
    assert_eq!(blur_bitmap(&src, 3, 2.0).unwrap(), src);
}

#[test]
fn single_pixel_energy_spreads_and_is_preserved() {
    let mut src = Bitmap::<Bgra8888>::new(9, 9).unwrap();
    src.set(4, 4, Bgra8888::new(255, 255, 255, 255)).unwrap();
    let out = blur_bitmap(&src, 2, 1.2).unwrap();
    let px = out.pixels().unwrap();
    assert!(px.iter().filter(|p| p.a != 0).count() > 1);
    let sum_a: i32 = px.iter().map(|p| i32::from(p.a)).sum();
    assert!((sum_a - 255).abs() <= 16, "{sum_a}");
    // straight color of every touched pixel stays white
    assert!(px.iter().filter(|p| p.a > 8).all(|p| p.r >= 250));
}

#[test]
fn transparent_neighbours_do_not_darken_color() {
    let mut src = Bitmap::<Bgra8888>::new(5, 1).unwrap();
    src.set(2, 0, Bgra8888::new(255, 0, 0, 255)).unwrap();
    let out = blur_bitmap(&src, 1, 1.0).unwrap();
    let edge = out.get(1, 0).unwrap();
    assert!(edge.a > 0);
    assert_eq!((edge.r, edge.g, edge.b), (255, 0, 0));
}

#[test]
fn dilate_grows_square() {
    let mut alpha = vec![0u8; 25];
    alpha[12] = 200;
    let out = dilate_alpha(&alpha, 5, 5, 1);
    let lit = out.iter().filter(|a| **a == 200).count();
    assert_eq!(lit, 9);
    assert_eq!(out[0], 0);
    assert_eq!(dilate_alpha(&alpha, 5, 5, 0), alpha);
}
