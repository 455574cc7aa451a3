use super::*;

#[test]
fn every_named_ease_hits_endpoints_exactly() {
    for e in Ease::named() {
        assert_eq!(e.apply(0.0), 0.0, "{e:?}");
        assert_eq!(e.apply(1.0), 1.0, "{e:?}");
        assert_eq!(e.apply(-3.0), 0.0, "{e:?}");
        assert_eq!(e.apply(7.0), 1.0, "{e:?}");
        assert_eq!(e.apply(f32::NAN), 0.0, "{e:?}");
    }
}

#[test]
fn non_overshooting_eases_stay_in_unit_range() {
    for e in Ease::named() {
        if matches!(
            e,
            Ease::InBack | Ease::OutBack | Ease::InOutBack | Ease::InElastic | Ease::OutElastic
                | Ease::InOutElastic
        ) {
            continue;
        }
        for i in 0..=100 {
            let v = e.apply(i as f32 / 100.0);
            assert!((-1e-4..=1.0 + 1e-4).contains(&v), "{e:?} at {i}: {v}");
        }
    }
}

#[test]
fn back_overshoots_below_zero() {
    assert!(Ease::InBack.apply(0.2) < 0.0);
    assert!(Ease::OutBack.apply(0.8) > 1.0);
}

#[test]
fn in_out_eases_are_symmetric_at_midpoint() {
    for e in [Ease::InOutQuad, Ease::InOutCubic, Ease::InOutSine, Ease::InOutCirc] {
        assert!((e.apply(0.5) - 0.5).abs() < 1e-5, "{e:?}");
    }
}

#[test]
fn linear_spline_is_identity() {
    let s = Spline::new(0.25, 0.25, 0.75, 0.75);
    for i in 0..=20 {
        let t = i as f32 / 20.0;
        assert!((Ease::Spline(s).apply(t) - t).abs() < 1e-4);
    }
}

#[test]
fn spline_control_x_is_clamped() {
    let s = Spline::new(-1.0, 0.0, 2.0, 1.0);
    assert_eq!((s.x1, s.x2), (0.0, 1.0));
}

#[test]
fn spline_split_traces_original_curve() {
    let s = Spline::new(0.42, 0.0, 0.58, 1.0);
    let split = 0.3;
    let (left, right) = s.split_at(split);
    let ys = s.sample(split);
    for i in 1..10 {
        let u = i as f32 / 10.0;
        let via_left = left.sample(u) * ys;
        assert!((via_left - s.sample(u * split)).abs() < 1e-3, "left {u}");
        let via_right = ys + right.sample(u) * (1.0 - ys);
        let x = split + u * (1.0 - split);
        assert!((via_right - s.sample(x)).abs() < 1e-3, "right {u}");
    }
}
