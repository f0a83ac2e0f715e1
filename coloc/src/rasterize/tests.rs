//! Tests for polygon rasterization.

use super::*;

const UNIT_THRESHOLD: f64 = 100.0;

fn polygon(points: &[(f64, f64)]) -> Region {
    Region::new(points.iter().map(|&(x, y)| DVec2::new(x, y)).collect())
}

fn rows(mask: &BitBuffer2) -> Vec<String> {
    (0..mask.height())
        .map(|y| {
            (0..mask.width())
                .map(|x| if mask.get_xy(x, y) { '#' } else { '.' })
                .collect()
        })
        .collect()
}

#[test]
fn test_degenerate_region_is_empty() {
    let region = polygon(&[(1.0, 1.0), (5.0, 5.0)]);
    let mask = rasterize_region(&region, 10, 10, None, UNIT_THRESHOLD).unwrap();
    assert!(mask.none());

    let empty = polygon(&[]);
    let mask = rasterize_region(&empty, 10, 10, None, UNIT_THRESHOLD).unwrap();
    assert!(mask.none());
}

#[test]
fn test_collinear_points_rasterize_to_their_outline() {
    // Zero area, but the outline is part of the region, so the segment stays.
    let flat = polygon(&[(2.0, 3.0), (5.0, 3.0), (8.0, 3.0)]).with_unit(CoordinateUnit::Pixel);
    let mask = rasterize_region(&flat, 10, 6, None, UNIT_THRESHOLD).unwrap();
    assert_eq!(
        rows(&mask),
        vec![
            "..........", //
            "..........",
            "..........",
            "..#######.",
            "..........",
            "..........",
        ]
    );

    let diagonal = polygon(&[(1.0, 1.0), (3.0, 3.0), (5.0, 5.0)]).with_unit(CoordinateUnit::Pixel);
    let mask = rasterize_region(&diagonal, 8, 8, None, UNIT_THRESHOLD).unwrap();
    assert_eq!(mask.count_ones(), 5);
    assert!(mask.iter_ones().all(|(x, y)| x == y && (1..=5).contains(&x)));
}

#[test]
fn test_pixel_units_cover_full_grid() {
    let region = polygon(&[(0.0, 0.0), (200.0, 0.0), (200.0, 200.0), (0.0, 200.0)]);
    let mask = rasterize_region(&region, 10, 10, None, UNIT_THRESHOLD).unwrap();
    assert_eq!(mask.count_ones(), 100);
}

#[test]
fn test_physical_units_match_pixel_units() {
    let pixel = polygon(&[(0.0, 0.0), (200.0, 0.0), (200.0, 200.0), (0.0, 200.0)]);
    let physical = polygon(&[(0.0, 0.0), (4.5, 0.0), (4.5, 4.5), (0.0, 4.5)]);
    let cal = PixelCalibration::new(0.5, 0.5);

    let from_pixel = rasterize_region(&pixel, 10, 10, None, UNIT_THRESHOLD).unwrap();
    let from_physical = rasterize_region(&physical, 10, 10, Some(&cal), UNIT_THRESHOLD).unwrap();
    assert_eq!(from_pixel, from_physical);
}

#[test]
fn test_physical_without_calibration_fails() {
    let region = polygon(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0)]);
    let err = rasterize_region(&region, 10, 10, None, UNIT_THRESHOLD).unwrap_err();
    assert_eq!(err, RasterizeError::MissingCalibration);

    let bad = PixelCalibration::new(0.0, 0.5);
    let err = rasterize_region(&region, 10, 10, Some(&bad), UNIT_THRESHOLD).unwrap_err();
    assert!(matches!(err, RasterizeError::InvalidCalibration { .. }));
}

#[test]
fn test_explicit_pixel_tag_skips_heuristic() {
    let region = polygon(&[(2.0, 2.0), (5.0, 2.0), (5.0, 5.0), (2.0, 5.0)])
        .with_unit(CoordinateUnit::Pixel);
    let mask = rasterize_region(&region, 8, 8, None, UNIT_THRESHOLD).unwrap();
    assert_eq!(mask.count_ones(), 16);
    assert!(mask.get_xy(2, 2));
    assert!(mask.get_xy(5, 5));
    assert!(!mask.get_xy(6, 5));
}

#[test]
fn test_triangle_shape() {
    let region = polygon(&[(0.0, 0.0), (4.0, 0.0), (0.0, 4.0)]).with_unit(CoordinateUnit::Pixel);
    let mask = rasterize_region(&region, 6, 5, None, UNIT_THRESHOLD).unwrap();
    assert_eq!(
        rows(&mask),
        vec!["#####.", "####..", "###...", "##....", "#....."]
    );
}

#[test]
fn test_out_of_frame_region_is_clipped() {
    let region = polygon(&[(-50.0, -50.0), (3.0, -50.0), (3.0, 3.0), (-50.0, 3.0)])
        .with_unit(CoordinateUnit::Pixel);
    let mask = rasterize_region(&region, 6, 6, None, UNIT_THRESHOLD).unwrap();
    assert_eq!(mask.count_ones(), 16);
    assert!(mask.get_xy(0, 0));
    assert!(mask.get_xy(3, 3));
    assert!(!mask.get_xy(4, 0));
}

#[test]
fn test_concave_polygon_even_odd() {
    // U shape: the notch between the arms stays outside.
    let region = polygon(&[
        (0.0, 0.0),
        (2.0, 0.0),
        (2.0, 3.0),
        (4.0, 3.0),
        (4.0, 0.0),
        (6.0, 0.0),
        (6.0, 5.0),
        (0.0, 5.0),
    ])
    .with_unit(CoordinateUnit::Pixel);
    let mask = rasterize_region(&region, 7, 6, None, UNIT_THRESHOLD).unwrap();
    assert!(!mask.get_xy(3, 1));
    assert!(!mask.get_xy(3, 2));
    assert!(mask.get_xy(3, 3));
    assert!(mask.get_xy(1, 1));
    assert!(mask.get_xy(5, 1));
    assert!(mask.get_xy(3, 4));
}

#[test]
fn test_zero_sized_grid() {
    let region = polygon(&[(0.0, 0.0), (200.0, 0.0), (200.0, 200.0)]);
    let mask = rasterize_region(&region, 0, 0, None, UNIT_THRESHOLD).unwrap();
    assert!(mask.is_empty());
}
