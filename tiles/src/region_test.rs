use geometry::Coordinate;

use super::*;

fn farm() -> Coordinate {
    Coordinate::new(35.0, -97.0)
}

#[test]
fn quality_presets() {
    assert_eq!(DownloadQuality::Low.zoom_levels(), vec![13, 14, 15]);
    assert_eq!(DownloadQuality::Standard.zoom_levels(), vec![14, 15, 16, 17]);
    assert_eq!(DownloadQuality::High.zoom_levels(), vec![15, 16, 17, 18]);
    assert_eq!(DownloadQuality::Maximum.zoom_levels(), vec![15, 16, 17, 18, 19, 20]);
}

#[test]
fn quality_parses_case_insensitively() {
    assert_eq!("HIGH".parse::<DownloadQuality>(), Ok(DownloadQuality::High));
    assert_eq!("max".parse::<DownloadQuality>(), Ok(DownloadQuality::Maximum));
    assert!("ultra".parse::<DownloadQuality>().is_err());
}

#[test]
fn validate_accepts_presets() {
    let region = DownloadRegion::with_quality(farm(), 500.0, DownloadQuality::Maximum);
    assert_eq!(region.validate(), Ok(()));
}

#[test]
fn validate_rejects_bad_regions() {
    let cases = [
        DownloadRegion::new(Coordinate::new(91.0, 0.0), 100.0, vec![10]),
        DownloadRegion::new(Coordinate::new(f64::NAN, 0.0), 100.0, vec![10]),
        DownloadRegion::new(farm(), 0.0, vec![10]),
        DownloadRegion::new(farm(), -5.0, vec![10]),
        DownloadRegion::new(farm(), f64::INFINITY, vec![10]),
        DownloadRegion::new(farm(), 100.0, vec![]),
        DownloadRegion::new(farm(), 100.0, vec![12, 23]),
        DownloadRegion::new(farm(), 50_001.0, vec![10]),
    ];
    for region in cases {
        assert!(region.validate().is_err(), "{region:?}");
    }
}

#[test]
fn bounds_are_symmetric_around_center() {
    let region = DownloadRegion::new(Coordinate::new(0.0, 0.0), 111_320.0, vec![5]);
    let (sw, ne) = region.bounds();
    assert!((sw.latitude + 1.0).abs() < 1e-9);
    assert!((ne.latitude - 1.0).abs() < 1e-9);
    assert!((sw.longitude + 1.0).abs() < 1e-9);
    assert!((ne.longitude - 1.0).abs() < 1e-9);
}

#[test]
fn bounds_clamp_near_the_pole() {
    let region = DownloadRegion::new(Coordinate::new(85.0, 0.0), 50_000.0, vec![3]);
    let (_, ne) = region.bounds();
    assert!(ne.latitude <= 85.051_128_78);
}

#[test]
fn tiles_cover_center_at_every_zoom() {
    let region = DownloadRegion::with_quality(farm(), 300.0, DownloadQuality::Low);
    let tiles = region.tiles();
    for z in [13, 14, 15] {
        assert!(tiles.contains(&TileKey::containing(farm(), z)), "missing center tile at z{z}");
    }
    assert!(tiles.iter().all(TileKey::is_valid));
}

#[test]
fn tile_count_grows_with_zoom() {
    let region = DownloadRegion::new(farm(), 1_000.0, vec![12]);
    let deeper = DownloadRegion::new(farm(), 1_000.0, vec![16]);
    assert!(deeper.estimate_tile_count() > region.estimate_tile_count());
}

#[test]
fn estimate_matches_enumeration() {
    let region = DownloadRegion::with_quality(farm(), 800.0, DownloadQuality::Standard);
    assert_eq!(region.estimate_tile_count(), region.tiles().len());
    assert_eq!(region.estimate_bytes(), region.tiles().len() as u64 * 51_200);
}

#[test]
fn duplicate_zooms_enumerate_once() {
    let once = DownloadRegion::new(farm(), 400.0, vec![15]);
    let twice = DownloadRegion::new(farm(), 400.0, vec![15, 15]);
    assert_eq!(once.tiles(), twice.tiles());
}

#[test]
fn zero_zoom_is_single_tile() {
    let region = DownloadRegion::new(farm(), 10.0, vec![0]);
    assert_eq!(region.tiles(), vec![TileKey::new(0, 0, 0)]);
}

#[test]
fn validate_rejects_oversized_regions() {
    let planet = DownloadRegion::new(Coordinate::new(0.0, 0.0), 20_000_000.0, vec![22]);
    assert!(planet.validate().is_err());

    let deep = DownloadRegion::new(farm(), MAX_RADIUS_METERS, vec![20]);
    assert!(deep.estimate_tile_count() > MAX_REGION_TILES);
    let err = deep.validate().unwrap_err();
    assert!(err.contains("tiles"), "{err}");

    let shallow = DownloadRegion::new(farm(), MAX_RADIUS_METERS, vec![12]);
    assert_eq!(shallow.validate(), Ok(()));
}
