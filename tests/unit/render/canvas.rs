use super::*;
use crate::foundation::error::EngineError;

const RED: Bgra8888 = Bgra8888::new(255, 0, 0, 255);

fn quad() -> Bitmap<Bgra8888> {
    Bitmap::from_vec(
        2,
        2,
        vec![
            Bgra8888::new(255, 0, 0, 255),
            Bgra8888::new(0, 255, 0, 255),
            Bgra8888::new(0, 0, 255, 255),
            Bgra8888::new(255, 255, 255, 255),
        ],
    )
    .unwrap()
}

#[test]
fn transforms_concatenate_and_restore() {
    let mut c = Canvas::new(8, 8).unwrap();
    c.push_transform(Affine::translate((2.0, 0.0)));
    c.push_transform(Affine::scale(2.0));
    assert_eq!(c.transform() * Point::new(1.0, 1.0), Point::new(4.0, 2.0));
    c.pop_transform();
    assert_eq!(c.transform(), Affine::translate((2.0, 0.0)));
    c.pop_transform();
    c.pop_transform();
    assert_eq!(c.transform(), Affine::IDENTITY);
}

#[test]
fn with_transform_restores_after_error() {
    let mut c = Canvas::new(4, 4).unwrap();
    let out: EngineResult<()> = c.with_transform(Affine::translate((1.0, 1.0)), |_| {
        Err(EngineError::render("boom"))
    });
    assert!(out.is_err());
    assert_eq!(c.transform(), Affine::IDENTITY);
}

#[test]
fn integer_translation_blits_exactly() {
    let mut c = Canvas::new(6, 4).unwrap();
    c.with_transform(Affine::translate((3.0, 1.0)), |c| c.draw_bitmap(&quad(), 1.0))
        .unwrap();
    let t = c.target();
    assert_eq!(t.get(3, 1).unwrap(), RED);
    assert_eq!(t.get(4, 2).unwrap(), Bgra8888::new(255, 255, 255, 255));
    assert_eq!(t.get(2, 1).unwrap().a, 0);
    assert_eq!(t.get(5, 1).unwrap().a, 0);
}

#[test]
fn scaled_bitmap_samples_nearest_source_pixel() {
    let mut c = Canvas::new(4, 4).unwrap();
    c.with_transform(Affine::scale(2.0), |c| c.draw_bitmap(&quad(), 1.0))
        .unwrap();
    let t = c.target();
    assert_eq!(t.get(0, 0).unwrap(), RED);
    assert_eq!(t.get(1, 1).unwrap(), RED);
    assert_eq!(t.get(2, 0).unwrap(), Bgra8888::new(0, 255, 0, 255));
    assert_eq!(t.get(0, 3).unwrap(), Bgra8888::new(0, 0, 255, 255));
    assert_eq!(t.get(3, 3).unwrap(), Bgra8888::new(255, 255, 255, 255));
}

#[test]
fn singular_transform_draws_nothing() {
    let mut c = Canvas::new(4, 4).unwrap();
    c.with_transform(Affine::scale(0.0), |c| c.draw_bitmap(&quad(), 1.0))
        .unwrap();
    assert!(c.target().pixels().unwrap().iter().all(|p| p.a == 0));
}

#[test]
fn fill_shape_applies_opacity_and_clips_to_target() {
    let mut c = Canvas::new(4, 4).unwrap();
    c.with_transform(Affine::translate((2.0, 2.0)), |c| {
        c.fill_shape(&Shape::rect(10.0, 10.0), Color::RED, 0.5)
    })
    .unwrap();
    let t = c.target();
    assert_eq!(t.get(1, 1).unwrap().a, 0);
    let p = t.get(3, 3).unwrap();
    assert!((127..=128).contains(&p.a), "{p:?}");
    assert_eq!((p.r, p.g, p.b), (255, 0, 0));
}

#[test]
fn fill_shape_outside_target_is_a_no_op() {
    let mut c = Canvas::new(4, 4).unwrap();
    c.with_transform(Affine::translate((50.0, 50.0)), |c| {
        c.fill_shape(&Shape::rect(10.0, 10.0), Color::RED, 1.0)
    })
    .unwrap();
    assert!(c.target().pixels().unwrap().iter().all(|p| p.a == 0));
}

#[test]
fn device_bounds_round_outwards() {
    let mut c = Canvas::new(8, 8).unwrap();
    c.push_transform(Affine::translate((1.5, 0.0)));
    assert_eq!(
        c.device_bounds(Rect::new(0.0, 0.0, 2.0, 2.0)),
        PixelRect::new(1, 0, 3, 2)
    );
}

#[test]
fn clear_fills_every_pixel() {
    let mut c = Canvas::new(3, 2).unwrap();
    c.clear(Color::from_argb(255, 1, 2, 3)).unwrap();
    assert!(c
        .target()
        .pixels()
        .unwrap()
        .iter()
        .all(|p| *p == Bgra8888::new(1, 2, 3, 255)));
    assert_eq!(c.size(), PixelSize::new(3, 2));
}
