//! End-to-end checks: scramble with the host's scheme, then rebuild.

use image::{ColorType, DynamicImage, Rgba, RgbaImage};
use ndarray::s;
use proptest::prelude::*;
use rand::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use sha2::{Digest, Sha256};
use tile_unscramble::page::PageData;
use tile_unscramble::{
    derive_seed, descramble_tile, host_transform, scramble_tile, Error, RasterImage, Seed,
    DEFAULT_SLICE_SIZE,
};

/// Deterministic noise image, keyed by `label`.
fn noise(label: &str, width: u32, height: u32, color: ColorType) -> RasterImage {
    let mut hasher = Sha256::new();
    hasher.update(label);
    let mut random = Xoshiro256StarStar::from_seed(hasher.finalize().into());

    let len = width as usize * height as usize * color.bytes_per_pixel() as usize;
    let mut bytes = vec![0u8; len];
    random.fill_bytes(&mut bytes);
    RasterImage::from_raw(width, height, color, bytes).unwrap()
}

#[test]
fn rebuilds_scrambled_images() {
    let seed = Seed::from("`526fcgc7d44c62a6bd3d3360a3d29ee");
    for (w, h) in [(105, 105), (800, 1200), (100, 150), (49, 51), (1, 1), (3, 640)] {
        let original = noise(&format!("{w}x{h}"), w, h, ColorType::Rgb8);
        let scrambled = scramble_tile(original.clone(), DEFAULT_SLICE_SIZE, &seed).unwrap();
        let rebuilt = descramble_tile(scrambled, DEFAULT_SLICE_SIZE, &seed).unwrap();
        assert_eq!(rebuilt, original, "{w}x{h}");
    }
}

#[test]
fn scrambling_moves_tiles() {
    let original = noise("moves", 400, 300, ColorType::Rgba8);
    let seed = Seed::from("abc");
    let scrambled = scramble_tile(original.clone(), DEFAULT_SLICE_SIZE, &seed).unwrap();

    assert_ne!(scrambled, original);
    assert_eq!(scrambled.width(), 400);
    assert_eq!(scrambled.height(), 300);
    assert_eq!(scrambled.color(), ColorType::Rgba8);
}

#[test]
fn wrong_seed_does_not_rebuild() {
    let original = noise("wrong seed", 300, 300, ColorType::L8);
    let scrambled = scramble_tile(original.clone(), DEFAULT_SLICE_SIZE, &Seed::from("right")).unwrap();
    let rebuilt = descramble_tile(scrambled, DEFAULT_SLICE_SIZE, &Seed::from("wrong")).unwrap();
    assert_ne!(rebuilt, original);
}

#[test]
fn single_pixel_is_unchanged() {
    let original = noise("1x1", 1, 1, ColorType::Rgba8);
    let rebuilt = descramble_tile(original.clone(), DEFAULT_SLICE_SIZE, &Seed::from("x")).unwrap();
    assert_eq!(rebuilt, original);
}

#[test]
fn rebuilds_from_page_metadata() {
    let page = PageData::from_json(
        r#"{"title":"t","img":[
            {"path":"//cdn.example.com/a/3a7bd3e2360a3d29eea436fcfb7e44c7/1.jpg?expires=1700000123"},
            {"path":"//cdn.example.com/a/0f1e2d3c4b5a69788796a5b4c3d2e1f0/2.jpg?expires=1699999999"}
        ]}"#,
    )
    .unwrap();

    for (i, entry) in page.img.iter().enumerate() {
        let seed = entry.seed(host_transform()).unwrap();
        let original = noise(&format!("page {i}"), 237, 311, ColorType::Rgb8);
        let scrambled = scramble_tile(original.clone(), DEFAULT_SLICE_SIZE, &seed).unwrap();
        assert_eq!(descramble_tile(scrambled, DEFAULT_SLICE_SIZE, &seed).unwrap(), original);
    }
}

#[test]
fn matches_host_reader() {
    // 5x3 image cut into 2px tiles; values are the row-major pixel index.
    let im = RgbaImage::from_fn(5, 3, |x, y| Rgba([(y * 5 + x) as u8, 0, 0, 255]));
    let raster = RasterImage::from_dynamic(DynamicImage::ImageRgba8(im)).unwrap();
    let rebuilt = descramble_tile(raster, 2, &Seed::from("tile")).unwrap();

    let red: Vec<u8> = rebuilt.pixels().slice(s![.., .., 0]).iter().copied().collect();
    assert_eq!(red, [2, 3, 0, 1, 4, 7, 8, 5, 6, 9, 12, 13, 10, 11, 14]);
}

#[test]
fn missing_expiry_emits_nothing() {
    let err = derive_seed("//cdn.example.com/a/abcdef/1.jpg?token=1", host_transform()).unwrap_err();
    assert!(matches!(err, Error::MissingExpiry(_)));
}

#[test]
fn zero_slice_size_is_rejected() {
    let original = noise("zero", 10, 10, ColorType::L8);
    assert!(matches!(
        descramble_tile(original, 0, &Seed::from("x")),
        Err(Error::InvalidSliceSize)
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn round_trip_any_shape(
        w in 1u32..120,
        h in 1u32..120,
        slice in 1usize..40,
        seed in "[0-9a-z`]{1,32}",
    ) {
        let seed = Seed::from(seed);
        let original = noise(&format!("{w}x{h}/{slice}"), w, h, ColorType::La8);
        let scrambled = scramble_tile(original.clone(), slice, &seed).unwrap();
        let rebuilt = descramble_tile(scrambled, slice, &seed).unwrap();
        prop_assert_eq!(rebuilt, original);
    }
}
