//! Binarization regression test
//!
//! Gray conversion, Otsu threshold selection and two-level mapping on
//! rendered digit glyphs.

use digitcount_color::{
    compute_otsu_threshold, otsu_threshold_from_histogram, pix_convert_to_gray, threshold_otsu,
    threshold_to_binary, threshold_to_levels,
};
use digitcount_test::{RegParams, render_digit, render_digit_rgba, solid_gray};

#[test]
fn binarize_reg() {
    let mut rp = RegParams::new("binarize");

    // --- Test 1: Otsu on a two-valued glyph ---
    eprintln!("=== Otsu on glyphs ===");
    for digit in 0..10u8 {
        let glyph = render_digit(digit, 2).expect("render digit");
        let t = compute_otsu_threshold(&glyph).expect("compute_otsu");
        // Background 0 and ink 255: the lowest separating candidate is 0
        rp.compare_values(0.0, t as f64, 0.0);

        let bin = threshold_otsu(&glyph).expect("threshold_otsu");
        rp.compare_pix(&glyph, &bin);
    }

    // --- Test 2: Color glyphs reduce to the same binary image ---
    eprintln!("=== Color glyphs ===");
    let reference = render_digit(5, 1).expect("render 5");
    for ink in [(255, 255, 255), (200, 40, 40), (20, 220, 90)] {
        let rgba = render_digit_rgba(5, 1, ink).expect("render rgba");
        let gray = pix_convert_to_gray(&rgba).expect("to gray");
        rp.compare_values(8.0, gray.depth().bits() as f64, 0.0);
        let bin = threshold_otsu(&rgba).expect("threshold_otsu rgba");
        eprintln!("  ink {:?}: threshold {}", ink, compute_otsu_threshold(&rgba).unwrap());
        rp.compare_pix(&reference, &bin);
    }

    // --- Test 3: Uniform images fall back to the default threshold ---
    eprintln!("=== Uniform images ===");
    for val in [0u8, 90, 255] {
        let pix = solid_gray(2, 2, val).expect("solid");
        let t = compute_otsu_threshold(&pix).expect("compute_otsu uniform");
        rp.compare_values(127.0, t as f64, 0.0);
        let expected = if val > 127 { 16.0 } else { 0.0 };
        let levels = threshold_to_levels(&pix.gray_samples().unwrap(), t, 16);
        let actual: Vec<f64> = levels.iter().map(|&v| v as f64).collect();
        rp.compare_vectors(&[expected; 4], &actual, 0.0);
    }

    // --- Test 4: Bimodal histograms land between the modes ---
    eprintln!("=== Bimodal histograms ===");
    for (a, b) in [(10usize, 240usize), (100, 101), (0, 255), (60, 70)] {
        let mut hist = [0u32; 256];
        hist[a] = 50;
        hist[b] = 30;
        let t = otsu_threshold_from_histogram(&hist) as usize;
        let ok = a <= t && t < b;
        rp.compare_values(1.0, if ok { 1.0 } else { 0.0 }, 0.0);
        let levels = threshold_to_levels(&[a as u8, b as u8], t as u8, 16);
        rp.compare_vectors(&[0.0, 16.0], &[levels[0] as f64, levels[1] as f64], 0.0);
    }

    // --- Test 5: Fixed thresholds are monotonic ---
    eprintln!("=== Monotonicity ===");
    let ramp: Vec<u8> = (0..=255).collect();
    for t in [0u8, 64, 127, 200, 255] {
        let levels = threshold_to_levels(&ramp, t, 16);
        let monotonic = levels.windows(2).all(|w| w[0] <= w[1]);
        rp.compare_values(1.0, if monotonic { 1.0 } else { 0.0 }, 0.0);
        let on = levels.iter().filter(|&&v| v == 16).count();
        rp.compare_values((255 - t as usize) as f64, on as f64, 0.0);
    }

    let glyph = render_digit(8, 1).expect("render 8");
    let all_on = threshold_to_binary(&glyph, 0).expect("threshold 0");
    let none_on = threshold_to_binary(&glyph, 255).expect("threshold 255");
    let on_count = |p: &digitcount_color::digitcount_core::Pix| {
        p.gray_samples().unwrap().iter().filter(|&&v| v == 255).count() as f64
    };
    rp.compare_values(on_count(&glyph), on_count(&all_on), 0.0);
    rp.compare_values(0.0, on_count(&none_on), 0.0);

    assert!(rp.cleanup(), "binarize regression test failed");
}
