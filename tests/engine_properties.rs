// Property tests for the colour-key and erase engines.

use proptest::prelude::*;
use transpalentor::ops::{
    BrushDiameter, TargetColor, TargetColorSet, Threshold, brush_disk, erase_at_coordinates,
    make_transparent, matched_mask,
};
use transpalentor::RasterImage;

fn raster_strategy() -> impl Strategy<Value = RasterImage> {
    (1u32..12, 1u32..12).prop_flat_map(|(w, h)| {
        proptest::collection::vec(any::<u8>(), (w * h * 4) as usize)
            .prop_map(move |px| RasterImage::from_rgba(w, h, px).unwrap())
    })
}

fn color_strategy() -> impl Strategy<Value = TargetColor> {
    any::<(u8, u8, u8)>().prop_map(TargetColor::from)
}

fn set_strategy() -> impl Strategy<Value = TargetColorSet> {
    proptest::collection::vec(color_strategy(), 1..=3).prop_map(|v| TargetColorSet::new(v).unwrap())
}

fn rgb_unchanged(a: &RasterImage, b: &RasterImage) -> bool {
    a.as_raw()
        .chunks_exact(4)
        .zip(b.as_raw().chunks_exact(4))
        .all(|(p, q)| p[..3] == q[..3])
}

proptest! {
    #[test]
    fn key_is_idempotent(img in raster_strategy(), set in set_strategy(), t in any::<u8>()) {
        let once = make_transparent(&img, &set, Threshold(t));
        let twice = make_transparent(&once, &set, Threshold(t));
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn key_preserves_rgb(img in raster_strategy(), set in set_strategy(), t in any::<u8>()) {
        let out = make_transparent(&img, &set, Threshold(t));
        prop_assert!(rgb_unchanged(&img, &out));
    }

    #[test]
    fn key_alpha_is_zero_or_original(img in raster_strategy(), set in set_strategy(), t in any::<u8>()) {
        let out = make_transparent(&img, &set, Threshold(t));
        let mask = matched_mask(&img, &set, Threshold(t));
        for ((p, q), hit) in img.as_raw().chunks_exact(4).zip(out.as_raw().chunks_exact(4)).zip(mask) {
            prop_assert_eq!(q[3], if hit { 0 } else { p[3] });
        }
    }

    #[test]
    fn key_is_union_of_targets(img in raster_strategy(), a in color_strategy(), b in color_strategy(), t in any::<u8>()) {
        let both = matched_mask(&img, &TargetColorSet::new(vec![a, b]).unwrap(), Threshold(t));
        let only_a = matched_mask(&img, &TargetColorSet::single(a), Threshold(t));
        let only_b = matched_mask(&img, &TargetColorSet::single(b), Threshold(t));
        for i in 0..both.len() {
            prop_assert_eq!(both[i], only_a[i] || only_b[i]);
        }
        // order does not matter
        let flipped = matched_mask(&img, &TargetColorSet::new(vec![b, a]).unwrap(), Threshold(t));
        prop_assert_eq!(both, flipped);
    }

    #[test]
    fn key_threshold_is_monotonic(img in raster_strategy(), set in set_strategy(), t1 in any::<u8>(), t2 in any::<u8>()) {
        let (lo, hi) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
        let small = matched_mask(&img, &set, Threshold(lo));
        let large = matched_mask(&img, &set, Threshold(hi));
        for (s, l) in small.iter().zip(&large) {
            prop_assert!(!s || *l);
        }
    }

    #[test]
    fn key_matches_float_distance(img in raster_strategy(), c in color_strategy(), t in any::<u8>()) {
        let mask = matched_mask(&img, &TargetColorSet::single(c), Threshold(t));
        for (p, hit) in img.as_raw().chunks_exact(4).zip(mask) {
            let dr = p[0] as f64 - c.r as f64;
            let dg = p[1] as f64 - c.g as f64;
            let db = p[2] as f64 - c.b as f64;
            let d = (dr * dr + dg * dg + db * db).sqrt();
            prop_assert_eq!(hit, d <= t as f64);
        }
    }

    #[test]
    fn erase_preserves_rgb(img in raster_strategy(), cx in -5i64..20, cy in -5i64..20, d in 1i64..12) {
        let out = erase_at_coordinates(&img, &[[cx, cy]], BrushDiameter::new(d).unwrap());
        prop_assert!(rgb_unchanged(&img, &out));
    }

    #[test]
    fn erase_hits_exactly_the_disk(img in raster_strategy(), cx in -5i64..20, cy in -5i64..20, d in 1i64..12) {
        let brush = BrushDiameter::new(d).unwrap();
        let r = brush.radius();
        let out = erase_at_coordinates(&img, &[[cx, cy]], brush);
        for y in 0..img.height() {
            for x in 0..img.width() {
                let dx = x as i64 - cx;
                let dy = y as i64 - cy;
                let expected = if dx * dx + dy * dy <= r * r { 0 } else { img.alpha(x, y).unwrap() };
                prop_assert_eq!(out.alpha(x, y), Some(expected));
            }
        }
    }

    #[test]
    fn erase_order_does_not_matter(img in raster_strategy(), pts in proptest::collection::vec((-3i64..15, -3i64..15), 0..6), d in 1i64..8) {
        let brush = BrushDiameter::new(d).unwrap();
        let forward: Vec<[i64; 2]> = pts.iter().map(|&(x, y)| [x, y]).collect();
        let mut backward = forward.clone();
        backward.reverse();
        prop_assert_eq!(
            erase_at_coordinates(&img, &forward, brush),
            erase_at_coordinates(&img, &backward, brush)
        );
    }

    #[test]
    fn disk_is_symmetric_and_sized(r in 0i64..40) {
        let disk = brush_disk(r);
        prop_assert!(disk.contains(&(0, 0)));
        prop_assert!(disk.contains(&(r, 0)) && disk.contains(&(0, -r)));
        for &(dx, dy) in &disk {
            prop_assert!(dx * dx + dy * dy <= r * r);
            prop_assert!(disk.contains(&(-dx, dy)) && disk.contains(&(dy, dx)));
        }
    }
}
