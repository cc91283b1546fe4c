//! End-to-end checks: ZIP archive in, deck on disk, deck read back.

use image::{DynamicImage, ImageFormat, RgbImage};
use imgdeck::driver::{generate, GenerateRequest};
use imgdeck::{
    build_deck, extract_images, CropMargins, DeckOptions, DeckSummary, Emu, Error,
    HorizontalAlignment, ImageOutcome, SlideSize, VerticalAlignment,
};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

fn encoded(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let mut img = DynamicImage::ImageRgb8(RgbImage::new(width, height));
    if format == ImageFormat::Gif {
        img = DynamicImage::ImageRgba8(img.to_rgba8());
    }
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format).unwrap();
    out.into_inner()
}

fn png(width: u32, height: u32) -> Vec<u8> {
    encoded(width, height, ImageFormat::Png)
}

fn zip_of(entries: Vec<(&str, Vec<u8>)>) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        zip.start_file(name, SimpleFileOptions::default()).unwrap();
        zip.write_all(&data).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

fn extract(dir: &Path, entries: Vec<(&str, Vec<u8>)>) -> Vec<PathBuf> {
    extract_images(Cursor::new(zip_of(entries)), dir.join("images")).unwrap()
}

#[test]
fn extraction_keeps_only_qualifying_images() {
    let tmp = TempDir::new().unwrap();
    let images = extract(
        tmp.path(),
        vec![
            ("a.png", png(4, 4)),
            ("nested/b.JPG", encoded(4, 4, ImageFormat::Jpeg)),
            ("c.bmp", encoded(4, 4, ImageFormat::Bmp)),
            ("d.gif", encoded(4, 4, ImageFormat::Gif)),
            ("__MACOSX/nested/._b.JPG", b"fork".to_vec()),
            ("notes.txt", b"text".to_vec()),
            ("e.tiff", b"tiff".to_vec()),
        ],
    );

    assert_eq!(images.len(), 4);
    for path in &images {
        assert!(path.is_absolute());
        assert!(path.exists());
        let ext = path.extension().unwrap().to_string_lossy().to_lowercase();
        assert!(["jpg", "jpeg", "png", "bmp", "gif"].contains(&ext.as_str()));
        assert!(!path.file_name().unwrap().to_string_lossy().starts_with("._"));
    }
    assert!(images[1].ends_with("nested/b.JPG"));
}

#[test]
fn one_slide_per_image_on_widescreen_canvas() {
    let tmp = TempDir::new().unwrap();
    let images = extract(
        tmp.path(),
        vec![
            ("1.png", png(300, 200)),
            ("2.png", png(200, 300)),
            ("3.jpg", encoded(150, 150, ImageFormat::Jpeg)),
        ],
    );
    let output = tmp.path().join("deck.pptx");

    let report = build_deck(&output, &images, &DeckOptions::default()).unwrap();
    assert_eq!(report.added(), 3);

    let summary = DeckSummary::open(&output).unwrap();
    assert_eq!(summary.slide_size, Some(SlideSize::WIDESCREEN));
    assert_eq!(summary.slide_count(), 3);
    for slide in &summary.slides {
        assert_eq!(slide.pictures.len(), 1);
    }
}

#[test]
fn pictures_keep_cropped_aspect_at_target_height() {
    let tmp = TempDir::new().unwrap();
    let images = extract(tmp.path(), vec![("shot.png", png(1000, 700))]);
    let output = tmp.path().join("deck.pptx");
    let options = DeckOptions::new()
        .with_crop(CropMargins::new(250, 0, 0, 42))
        .with_height(4.5);

    build_deck(&output, &images, &options).unwrap();

    let summary = DeckSummary::open(&output).unwrap();
    let frame = summary.pictures().next().unwrap().frame;
    assert_eq!(frame.height, Emu::from_inches(4.5));

    let expected = 750.0 / 658.0;
    assert!((frame.aspect_ratio() - expected).abs() < 1e-5);
}

#[test]
fn alignment_positions() {
    let canvas = SlideSize::WIDESCREEN;
    let cases = [
        (HorizontalAlignment::Right, VerticalAlignment::Bottom),
        (HorizontalAlignment::Left, VerticalAlignment::Top),
        (HorizontalAlignment::Center, VerticalAlignment::Middle),
    ];

    for (horizontal, vertical) in cases {
        let tmp = TempDir::new().unwrap();
        let images = extract(tmp.path(), vec![("a.png", png(333, 250))]);
        let output = tmp.path().join("deck.pptx");
        let options = DeckOptions::new().with_alignment(horizontal, vertical);

        build_deck(&output, &images, &options).unwrap();
        let f = DeckSummary::open(&output).unwrap().pictures().next().unwrap().frame;

        let (x, y) = match (horizontal, vertical) {
            (HorizontalAlignment::Right, VerticalAlignment::Bottom) => {
                (canvas.width.0 - f.width.0, canvas.height.0 - f.height.0)
            }
            (HorizontalAlignment::Left, VerticalAlignment::Top) => (0, 0),
            _ => (
                (canvas.width.0 - f.width.0) / 2,
                (canvas.height.0 - f.height.0) / 2,
            ),
        };
        assert_eq!((f.x.0, f.y.0), (x, y), "{} / {}", horizontal, vertical);
    }
}

#[test]
fn oversized_crop_skips_only_that_image() {
    let tmp = TempDir::new().unwrap();
    let images = extract(
        tmp.path(),
        vec![
            ("narrow.png", png(100, 400)),
            ("wide.png", png(800, 400)),
            ("short.png", png(800, 40)),
        ],
    );
    let output = tmp.path().join("deck.pptx");
    let options = DeckOptions::new().with_crop(CropMargins::new(60, 40, 20, 20));

    let report = build_deck(&output, &images, &options).unwrap();

    assert_eq!(report.added(), 1);
    let reasons: Vec<_> = report
        .skipped_images()
        .map(|(image, reason)| (image.file_name().unwrap().to_owned(), reason.to_owned()))
        .collect();
    assert_eq!(reasons.len(), 2);
    assert_eq!(reasons[0].0, "narrow.png");
    assert_eq!(reasons[1].0, "short.png");
    assert!(reasons.iter().all(|(_, r)| r.contains("Crop margins")));

    assert_eq!(DeckSummary::open(&output).unwrap().slide_count(), 1);
}

#[test]
fn archive_without_images_offers_no_output() {
    let request = GenerateRequest {
        archive: Some(zip_of(vec![("readme.md", b"# hi".to_vec())])),
        ..Default::default()
    };
    let err = generate(request).unwrap_err();
    assert!(matches!(err, Error::NoImages));
    assert_eq!(err.to_string(), "No valid images found in the uploaded ZIP file.");
}

#[test]
fn template_slides_come_first() {
    let tmp = TempDir::new().unwrap();

    let seed = extract(tmp.path(), vec![("cover.png", png(64, 48))]);
    let template = tmp.path().join("template.pptx");
    build_deck(&template, &seed, &DeckOptions::default()).unwrap();

    let request = GenerateRequest {
        archive: Some(zip_of(vec![("a.png", png(640, 480)), ("b.png", png(640, 480))])),
        template: Some(std::fs::read(&template).unwrap()),
        options: DeckOptions::new(),
        ..Default::default()
    };
    let download = generate(request).unwrap();

    let slides: Vec<_> = download
        .report
        .outcomes
        .iter()
        .filter_map(|o| match o {
            ImageOutcome::Added { slide, .. } => Some(*slide),
            ImageOutcome::Skipped { .. } => None,
        })
        .collect();
    assert_eq!(slides, vec![2, 3]);

    let summary = DeckSummary::from_bytes(download.data).unwrap();
    assert_eq!(summary.slide_count(), 3);
    let parts: Vec<_> = summary.slides.iter().map(|s| s.part.as_str()).collect();
    assert_eq!(
        parts,
        vec!["ppt/slides/slide1.xml", "ppt/slides/slide2.xml", "ppt/slides/slide3.xml"]
    );

    let media: Vec<_> = summary.pictures().filter_map(|p| p.target.clone()).collect();
    assert_eq!(media.len(), 3);
    assert_eq!(media.iter().collect::<std::collections::HashSet<_>>().len(), 3);
}

#[test]
fn unreadable_template_is_fatal() {
    let request = GenerateRequest {
        archive: Some(zip_of(vec![("a.png", png(640, 480))])),
        template: Some(b"definitely not a presentation".to_vec()),
        ..Default::default()
    };
    assert!(generate(request).is_err());
}
