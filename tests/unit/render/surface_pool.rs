use super::*;
use crate::foundation::core::PixelSize;

#[test]
fn released_surfaces_are_reused_and_cleared() {
    let mut pool = SurfacePool::new(SurfacePoolOpts::default());
    let mut b = pool.acquire(4, 3).unwrap();
    b.fill(Bgra8888::new(1, 2, 3, 4)).unwrap();
    pool.release(b);
    assert_eq!(pool.stats().retained_surfaces, 1);
    assert_eq!(pool.stats().retained_bytes, 4 * 3 * 4);

    let again = pool.acquire(4, 3).unwrap();
    assert!(again.pixels().unwrap().iter().all(|p| *p == Bgra8888::TRANSPARENT));
    let s = pool.stats();
    assert_eq!((s.alloc_surfaces, s.reused_surfaces), (1, 1));
    assert_eq!((s.retained_surfaces, s.retained_bytes), (0, 0));
}

#[test]
fn sizes_do_not_mix() {
    let mut pool = SurfacePool::new(SurfacePoolOpts::default());
    let b = pool.acquire(2, 2).unwrap();
    pool.release(b);
    let other = pool.acquire(2, 3).unwrap();
    assert_eq!(other.size(), PixelSize::new(2, 3));
    assert_eq!(pool.stats().alloc_surfaces, 2);
    assert_eq!(pool.stats().retained_surfaces, 1);
}

#[test]
fn limits_drop_surfaces_on_release() {
    let mut pool = SurfacePool::new(SurfacePoolOpts {
        max_pool_bytes: 64,
        max_surfaces_per_bucket: 1,
    });
    let a = pool.acquire(2, 2).unwrap();
    let b = pool.acquire(2, 2).unwrap();
    let big = pool.acquire(8, 8).unwrap();
    pool.release(a);
    pool.release(b);
    pool.release(big);
    let s = pool.stats();
    assert_eq!(s.retained_surfaces, 1);
    assert_eq!(s.dropped_on_release, 2);

    let mut gone = Bitmap::new(2, 2).unwrap();
    gone.dispose();
    pool.release(gone);
    assert_eq!(pool.stats().dropped_on_release, 3);
}

#[test]
fn trim_empties_the_pool() {
    let mut pool = SurfacePool::new(SurfacePoolOpts::default());
    let b = pool.acquire(3, 3).unwrap();
    pool.release(b);
    pool.trim();
    assert_eq!(pool.stats().retained_surfaces, 0);
    assert_eq!(pool.stats().retained_bytes, 0);
    pool.acquire(3, 3).unwrap();
    assert_eq!(pool.stats().alloc_surfaces, 2);
}
