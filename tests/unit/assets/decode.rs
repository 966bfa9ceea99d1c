use std::io::Cursor;

use super::*;

fn png_bytes(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(w, h, image::Rgba(px));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn fit_dimensions_preserves_aspect() {
    assert_eq!(fit_dimensions(1000, 500, 600, 600), (600, 300));
    assert_eq!(fit_dimensions(500, 1000, 600, 600), (300, 600));
    assert_eq!(fit_dimensions(100, 100, 608, 1080), (608, 608));
    assert_eq!(fit_dimensions(0, 10, 600, 600), (0, 0));
}

#[test]
fn thumbnail_never_enlarges() {
    assert_eq!(thumbnail_dimensions(100, 50, 600, 600), (100, 50));
    assert_eq!(thumbnail_dimensions(1200, 600, 600, 600), (600, 300));
}

#[test]
fn decode_garbage_is_composition_error() {
    let err = decode_rgba(b"not an image", "overlay image").unwrap_err();
    assert!(matches!(err, ShortsError::Composition(_)));
}

#[test]
fn contain_backdrop_centers_over_fill() {
    let canvas = Canvas {
        width: 10,
        height: 20,
    };
    let bytes = png_bytes(10, 10, [255, 0, 0, 255]);
    let img = prepare_backdrop(&bytes, canvas, BackgroundFit::Contain, Rgba8::BLACK).unwrap();
    assert_eq!((img.width, img.height), (10, 20));

    let px = |x: usize, y: usize| {
        let i = (y * 10 + x) * 4;
        img.rgba8_premul[i..i + 4].to_vec()
    };
    assert_eq!(px(5, 0), vec![0, 0, 0, 255]);
    assert_eq!(px(5, 10), vec![255, 0, 0, 255]);
    assert_eq!(px(5, 19), vec![0, 0, 0, 255]);
}

#[test]
fn fill_backdrop_covers_canvas_and_is_opaque() {
    let canvas = Canvas {
        width: 8,
        height: 16,
    };
    let bytes = png_bytes(3, 3, [0, 0, 255, 128]);
    let img = prepare_backdrop(&bytes, canvas, BackgroundFit::Fill, Rgba8::WHITE).unwrap();
    assert_eq!(img.rgba8_premul.len(), canvas.rgba_len());
    assert!(img.rgba8_premul.chunks_exact(4).all(|px| px[3] == 255));
}

#[test]
fn translucent_background_is_flattened_onto_the_fill() {
    let canvas = Canvas {
        width: 10,
        height: 20,
    };
    let bytes = png_bytes(10, 10, [0, 0, 255, 128]);
    for fit in [BackgroundFit::Contain, BackgroundFit::Fill] {
        let img = prepare_backdrop(&bytes, canvas, fit, Rgba8::WHITE).unwrap();
        assert_eq!(img.rgba8_premul.len(), canvas.rgba_len());
        assert!(img.rgba8_premul.chunks_exact(4).all(|px| px[3] == 255), "{fit:?}");
    }

    // Half-transparent blue over white, in the middle of the contained image.
    let img = prepare_backdrop(&bytes, canvas, BackgroundFit::Contain, Rgba8::WHITE).unwrap();
    let i = (10 * 10 + 5) * 4;
    let px = &img.rgba8_premul[i..i + 4];
    assert!((i32::from(px[0]) - 127).abs() <= 1);
    assert!((i32::from(px[1]) - 127).abs() <= 1);
    assert_eq!(px[2], 255);
    assert_eq!(px[3], 255);
    // Fill bands above and below stay white.
    assert_eq!(&img.rgba8_premul[0..4], &[255, 255, 255, 255]);
}

#[test]
fn overlay_thumbnail_is_bounded_and_premultiplied() {
    let bytes = png_bytes(40, 20, [200, 100, 0, 128]);
    let img = prepare_overlay(&bytes, 10).unwrap();
    assert_eq!((img.width, img.height), (10, 5));
    let px = &img.rgba8_premul[0..4];
    assert_eq!(px[3], 128);
    assert!((i32::from(px[0]) - 100).abs() <= 1);
}

#[test]
fn background_fit_parses() {
    assert_eq!("contain".parse::<BackgroundFit>().unwrap(), BackgroundFit::Contain);
    assert_eq!("FILL".parse::<BackgroundFit>().unwrap(), BackgroundFit::Fill);
    assert!("crop".parse::<BackgroundFit>().is_err());
}
