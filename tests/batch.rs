//! End-to-end batch run on real image files.
//!
//! Writes a manifest and a handful of synthetic sources into a temp directory,
//! runs the batch with the production backend, and checks the cards on disk.

use cardcrop::imaging::ImageSize;
use cardcrop::manifest::{load_manifest, manifest_base};
use cardcrop::process::process;
use image::{ColorType, ExtendedColorType, ImageEncoder, Rgb, RgbImage, Rgba, RgbaImage};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;
use tempfile::TempDir;

const MANIFEST: &str = r##"
source_dir = "src-images"
output_dir = "cards"
background = "#102030"

[[cards]]
source = "wide.jpg"
output = "twitter-wide.png"
target = "twitter"

[[cards]]
source = "square.png"
output = "og-square.png"
target = "og"

[[cards]]
source = "missing.png"
output = "twitter-missing.png"
target = "twitter"

[[cards]]
source = "sliver.png"
output = "twitter-sliver.png"
target = "twitter"

[[cards]]
source = "palette.gif"
output = "twitter-palette.png"
target = "twitter"

[[cards]]
source = "exact.png"
output = "twitter-exact.png"
target = "twitter"
"##;

fn write_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 90])
    });
    let writer = BufWriter::new(File::create(path).unwrap());
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
}

fn setup() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("src-images");
    fs::create_dir_all(&src).unwrap();
    fs::write(tmp.path().join("cards.toml"), MANIFEST).unwrap();

    write_jpeg(&src.join("wide.jpg"), 800, 320);

    // Fully transparent square: the card must come out as the background color
    RgbaImage::from_pixel(200, 200, Rgba([255, 255, 255, 0]))
        .save(src.join("square.png"))
        .unwrap();

    RgbImage::from_pixel(1, 400, Rgb([0, 0, 0]))
        .save(src.join("sliver.png"))
        .unwrap();

    let palette = RgbaImage::from_fn(90, 120, |x, _| {
        if x < 45 {
            Rgba([255, 0, 0, 255])
        } else {
            Rgba([0, 0, 255, 0])
        }
    });
    image::codecs::gif::GifEncoder::new(File::create(src.join("palette.gif")).unwrap())
        .encode(palette.as_raw(), 90, 120, ExtendedColorType::Rgba8)
        .unwrap();

    RgbImage::from_fn(1200, 628, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 7]))
        .save(src.join("exact.png"))
        .unwrap();

    tmp
}

#[test]
fn batch_generates_exact_size_opaque_cards() {
    let tmp = setup();
    let manifest_path = tmp.path().join("cards.toml");
    let manifest = load_manifest(&manifest_path).unwrap();
    let items = manifest.items(&manifest_base(&manifest_path));
    let config = manifest.card_config();

    let report = process(&items, &config, None);

    assert_eq!(report.total, 6);
    assert_eq!(report.processed, 4);
    let failed: Vec<(&str, &str)> = report
        .failures
        .iter()
        .map(|f| (f.item.as_str(), f.kind))
        .collect();
    assert_eq!(
        failed,
        [
            ("missing.png", "source_not_found"),
            ("sliver.png", "invalid_geometry")
        ]
    );

    let cards = tmp.path().join("cards");
    for (name, size) in [
        ("twitter-wide.png", ImageSize::new(1200, 628)),
        ("og-square.png", ImageSize::new(1200, 630)),
        ("twitter-palette.png", ImageSize::new(1200, 628)),
        ("twitter-exact.png", ImageSize::new(1200, 628)),
    ] {
        let card = image::open(cards.join(name)).unwrap();
        assert_eq!((card.width(), card.height()), (size.width, size.height), "{name}");
        assert_eq!(card.color(), ColorType::Rgb8, "{name}");
    }
    assert!(!cards.join("twitter-missing.png").exists());
    assert!(!cards.join("twitter-sliver.png").exists());
}

#[test]
fn transparent_source_is_flattened_onto_background() {
    let tmp = setup();
    let manifest_path = tmp.path().join("cards.toml");
    let manifest = load_manifest(&manifest_path).unwrap();
    let items = manifest.items(&manifest_base(&manifest_path));
    process(&items, &manifest.card_config(), None);

    let card = image::open(tmp.path().join("cards/og-square.png"))
        .unwrap()
        .into_rgb8();
    // Uniform input stays uniform through Lanczos; allow rounding by one
    let samples = [(0, 0), (600, 315), (1199, 629)];
    for pixel in samples.map(|(x, y)| card.get_pixel(x, y)) {
        for (got, want) in pixel.0.iter().zip([16u8, 32, 48]) {
            assert!(got.abs_diff(want) <= 1, "{:?}", pixel.0);
        }
    }
}

#[test]
fn exact_size_source_is_copied_pixel_for_pixel() {
    let tmp = setup();
    let manifest_path = tmp.path().join("cards.toml");
    let manifest = load_manifest(&manifest_path).unwrap();
    let items = manifest.items(&manifest_base(&manifest_path));
    process(&items, &manifest.card_config(), None);

    let source = image::open(tmp.path().join("src-images/exact.png"))
        .unwrap()
        .into_rgb8();
    let card = image::open(tmp.path().join("cards/twitter-exact.png"))
        .unwrap()
        .into_rgb8();
    assert_eq!(source, card);
}

#[test]
fn rerun_is_deterministic() {
    let tmp = setup();
    let manifest_path = tmp.path().join("cards.toml");
    let manifest = load_manifest(&manifest_path).unwrap();
    let items = manifest.items(&manifest_base(&manifest_path));
    let config = manifest.card_config();

    let first = process(&items, &config, None);
    let bytes = fs::read(tmp.path().join("cards/twitter-wide.png")).unwrap();
    let second = process(&items, &config, None);

    assert_eq!(first, second);
    assert_eq!(bytes, fs::read(tmp.path().join("cards/twitter-wide.png")).unwrap());
}
