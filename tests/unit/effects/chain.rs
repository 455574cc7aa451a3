use super::*;
use crate::effects::builtin::{Brightness, Invert};

fn target(px: Bgra8888) -> FilterTarget {
    FilterTarget::new(Bitmap::filled(2, 2, px).unwrap(), PixelPoint::new(3, 4))
}

fn first_pixel(t: &FilterTarget) -> Bgra8888 {
    t.bitmap.get(0, 0).unwrap()
}

#[test]
fn empty_chain_passes_through() {
    let chain = FilterChain::new();
    assert!(chain.is_empty());
    let out = chain.apply(target(Bgra8888::new(9, 8, 7, 255))).unwrap();
    assert_eq!(first_pixel(&out), Bgra8888::new(9, 8, 7, 255));
    assert_eq!(out.origin, PixelPoint::new(3, 4));
}

#[test]
fn attach_order_decides_result() {
    let black = Bgra8888::new(0, 0, 0, 255);

    let mut a_then_b = FilterChain::new();
    a_then_b.attach(Box::new(Invert {}));
    a_then_b.attach(Box::new(Brightness { amount: 0.2 }));

    let mut b_then_a = FilterChain::new();
    b_then_a.attach(Box::new(Brightness { amount: 0.2 }));
    b_then_a.attach(Box::new(Invert {}));

    let x = first_pixel(&a_then_b.apply(target(black)).unwrap());
    let y = first_pixel(&b_then_a.apply(target(black)).unwrap());
    assert_eq!(x.r, 255);
    assert_eq!(y.r, 204);
    assert_ne!(x, y);
}

#[test]
fn detach_splices_without_reordering() {
    let mut chain = FilterChain::new();
    let a = chain.attach(Box::new(Brightness { amount: 0.1 }));
    let b = chain.attach(Box::new(Invert {}));
    let c = chain.attach(Box::new(Brightness { amount: -0.5 }));
    assert_eq!(chain.len(), 3);

    let removed = chain.detach(b).unwrap();
    assert_eq!(removed.kind(), "invert");
    assert_eq!(chain.ids().collect::<Vec<_>>(), vec![a, c]);
    assert!(chain.detach(b).is_none());

    let kinds: Vec<_> = chain.iter().map(|f| f.describe()).collect();
    assert_eq!(kinds[0].params["amount"], serde_json::json!(0.1f32));
    assert_eq!(kinds[1].params["amount"], serde_json::json!(-0.5f32));

    // ids stay unique after removal
    let d = chain.attach(Box::new(Invert {}));
    assert!(d != a && d != b && d != c);
}

#[test]
fn chain_bounds_fold_in_order() {
    let mut chain = FilterChain::new();
    chain.attach(Box::new(crate::effects::Blur::new(2)));
    chain.attach(Box::new(crate::effects::Clipping::new(1, 1, 1, 1)));
    let b = chain.transform_bounds(PixelRect::new(0, 0, 10, 10));
    assert_eq!(b, PixelRect::new(-1, -1, 12, 12));
}

#[test]
fn hash_tracks_parameters() {
    let fp = |amount: f32| {
        let mut chain = FilterChain::new();
        chain.attach(Box::new(Brightness { amount }));
        let mut h = StableHasher::new();
        chain.hash_into(&mut h);
        h.finish()
    };
    assert_eq!(fp(0.5), fp(0.5));
    assert_ne!(fp(0.5), fp(0.25));
}
