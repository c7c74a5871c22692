// End-to-end checks of both engines on a 100x100 solid red raster.

use image::{DynamicImage, Rgb, RgbImage};
use transpalentor::ops::{BrushDiameter, Stroke, TargetColor, TargetColorSet, Threshold};
use transpalentor::{RasterImage, erase_at_coordinates, make_transparent, normalize};

fn red_rgb() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 100, Rgb([255, 0, 0])))
}

fn alphas(r: &RasterImage) -> Vec<u8> {
    r.as_raw().chunks_exact(4).map(|p| p[3]).collect()
}

#[test]
fn key_exact_color_clears_everything() {
    let img = normalize(&red_rgb());
    let out = make_transparent(&img, &TargetColorSet::single(TargetColor::new(255, 0, 0)), Threshold(0));
    assert!(out.as_raw().chunks_exact(4).all(|p| p == [255, 0, 0, 0]));
}

#[test]
fn key_other_color_leaves_everything() {
    let img = normalize(&red_rgb());
    let out = make_transparent(&img, &TargetColorSet::single(TargetColor::new(0, 0, 255)), Threshold(0));
    assert!(alphas(&out).iter().all(|&a| a == 255));
}

#[test]
fn erase_single_stroke() {
    let img = normalize(&red_rgb());
    let out = erase_at_coordinates(&img, &[[50i64, 50]], BrushDiameter::new(10).unwrap());
    assert_eq!(out.alpha(50, 50), Some(0));
    assert_eq!(out.alpha(90, 90), Some(255));
}

#[test]
fn erase_ignores_malformed_stroke() {
    let img = normalize(&red_rgb());
    let strokes: Vec<Stroke> = vec![vec![50, 50], vec![25]];
    let out = erase_at_coordinates(&img, &strokes, BrushDiameter::new(10).unwrap());
    assert_eq!(out.alpha(50, 50), Some(0));
    assert_eq!((out.width(), out.height()), (100, 100));
    assert_eq!(out.as_raw().len(), 100 * 100 * 4);
}

#[test]
fn erase_nothing_is_a_normalized_copy() {
    let img = normalize(&red_rgb());
    let none: [Stroke; 0] = [];
    let out = erase_at_coordinates(&img, &none, BrushDiameter::new(10).unwrap());
    assert!(alphas(&out).iter().all(|&a| a == 255));
    assert_eq!(out, img);
}

#[test]
fn erase_disk_count_for_diameter_ten() {
    // radius 5: lattice points with dx²+dy² <= 25
    let img = RasterImage::new(20, 20, [0, 0, 0, 255]).unwrap();
    let out = erase_at_coordinates(&img, &[[10i64, 10]], BrushDiameter::new(10).unwrap());
    let cleared = alphas(&out).iter().filter(|&&a| a == 0).count();
    assert_eq!(cleared, 81);
    // axis tips are inside, the diagonal corner is not
    assert_eq!(out.alpha(15, 10), Some(0));
    assert_eq!(out.alpha(14, 14), Some(255));
    assert_eq!(out.alpha(13, 14), Some(0));
}

#[test]
fn concurrent_calls_share_one_source() {
    let img = normalize(&red_rgb());
    let set = TargetColorSet::single(TargetColor::new(255, 0, 0));
    let brush = BrushDiameter::new(6).unwrap();

    let (keyed, erased) = std::thread::scope(|s| {
        let k = s.spawn(|| make_transparent(&img, &set, Threshold(0)));
        let e = s.spawn(|| erase_at_coordinates(&img, &[[0i64, 0]], brush));
        (k.join().unwrap(), e.join().unwrap())
    });

    assert!(alphas(&keyed).iter().all(|&a| a == 0));
    assert_eq!(erased.alpha(0, 0), Some(0));
    assert_eq!(erased.alpha(50, 50), Some(255));
    assert!(alphas(&img).iter().all(|&a| a == 255));
}
