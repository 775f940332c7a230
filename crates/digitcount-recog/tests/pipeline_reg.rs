//! Batch pipeline regression test
//!
//! A reference set built from unit glyphs classifies larger renderings of
//! the same digits, read from files and from memory. Corrupt images are
//! skipped and counted as failures without stopping the batch.

use std::path::PathBuf;

use digitcount_recog::{
    DigitLabel, FeatureExtractor, ImageSource, Pipeline, PipelineOptions, RecogError,
    ReferenceSet,
};
use digitcount_test::{CORRUPT_PNG, RegParams, encode_png, render_digit, write_fixture};

/// One unit-scale glyph per digit.
fn glyph_reference() -> ReferenceSet {
    let extractor = FeatureExtractor::default();
    let mut rows = Vec::new();
    let mut labels = Vec::new();
    for digit in 0..10u8 {
        let pix = render_digit(digit, 1).expect("render reference glyph");
        rows.push(extractor.extract_pix(&pix).expect("extract reference glyph"));
        labels.push(DigitLabel::new(digit).expect("label"));
    }
    ReferenceSet::new(rows, labels).expect("reference set")
}

fn glyph_png(digit: u8, scale: u32) -> Vec<u8> {
    encode_png(&render_digit(digit, scale).expect("render")).expect("encode png")
}

/// A BMP whose header claims `i32::MAX` squared at 32 bpp over one row of data.
fn oversized_bmp() -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&118u32.to_le_bytes());
    out.extend_from_slice(&[0; 4]);
    out.extend_from_slice(&54u32.to_le_bytes());
    out.extend_from_slice(&40u32.to_le_bytes());
    out.extend_from_slice(&i32::MAX.to_le_bytes());
    out.extend_from_slice(&i32::MAX.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&32u16.to_le_bytes());
    out.extend_from_slice(&[0; 24]);
    out.extend_from_slice(&[0; 64]);
    out
}

#[test]
fn pipeline_reg() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut rp = RegParams::new("pipeline");

    let reference = glyph_reference();
    let pipeline = Pipeline::prepare(&reference, PipelineOptions::default()).expect("prepare");
    rp.compare_values(784.0, pipeline.stats().dim() as f64, 0.0);

    // --- Test 1: one corrupt file among nine good ones ---
    eprintln!("=== Corrupt file in a directory ===");
    let mut paths: Vec<PathBuf> = Vec::new();
    for digit in (0..9u8).rev() {
        let name = format!("d{}.png", digit);
        paths.push(write_fixture("pipeline", &name, &glyph_png(digit, 2)).expect("write"));
    }
    paths.push(write_fixture("pipeline", "d4_corrupt.png", CORRUPT_PNG).expect("write corrupt"));

    let report = pipeline.classify_paths(paths.clone()).expect("classify paths");
    eprintln!("  counts: {}", report.counts);
    rp.compare_values(9.0, report.processed() as f64, 0.0);
    rp.compare_values(1.0, report.failed() as f64, 0.0);
    let expected: Vec<f64> = (0..10).map(|d| if d < 9 { 1.0 } else { 0.0 }).collect();
    let actual: Vec<f64> = report.counts.as_array().iter().map(|&c| c as f64).collect();
    rp.compare_vectors(&expected, &actual, 0.0);
    let failure_named = report.failures[0].id.ends_with("d4_corrupt.png");
    rp.compare_values(1.0, if failure_named { 1.0 } else { 0.0 }, 0.0);
    eprintln!("  failure: {}", report.failures[0]);

    // Previews follow sorted path order and carry the predicted label
    let preview_ok = report
        .previews
        .iter()
        .enumerate()
        .all(|(i, (id, label))| id.ends_with(&format!("d{}.png", i)) && label.index() == i);
    rp.compare_values(1.0, if preview_ok { 1.0 } else { 0.0 }, 0.0);
    rp.compare_values(9.0, report.previews.len() as f64, 0.0);

    // CSV rendering of the count table
    let csv = report.counts.to_csv();
    rp.compare_values(
        1.0,
        if csv == "0,1,2,3,4,5,6,7,8,9\n1,1,1,1,1,1,1,1,1,0\n" { 1.0 } else { 0.0 },
        0.0,
    );

    // --- Test 2: sequential run matches the parallel run ---
    eprintln!("=== Sequential vs parallel ===");
    let sequential = Pipeline::prepare(
        &reference,
        PipelineOptions::default()
            .with_parallel(false)
            .with_preview_limit(3),
    )
    .expect("prepare sequential");
    let seq_report = sequential.classify_paths(paths).expect("classify sequential");
    rp.compare_values(
        1.0,
        if seq_report.counts == report.counts { 1.0 } else { 0.0 },
        0.0,
    );
    rp.compare_values(3.0, seq_report.previews.len() as f64, 0.0);
    rp.compare_values(1.0, seq_report.failed() as f64, 0.0);

    // --- Test 3: in-memory sources ---
    eprintln!("=== Memory sources ===");
    let sources: Vec<ImageSource> = [7u8, 7, 2, 0]
        .iter()
        .enumerate()
        .map(|(i, &d)| ImageSource::from_memory(format!("mem{}", i), glyph_png(d, 3)))
        .collect();
    let mem_report = pipeline.classify_batch(&sources).expect("classify memory");
    eprintln!("  counts: {}", mem_report.counts);
    rp.compare_values(2.0, mem_report.counts.get(DigitLabel::new(7).unwrap()) as f64, 0.0);
    rp.compare_values(1.0, mem_report.counts.get(DigitLabel::new(2).unwrap()) as f64, 0.0);
    rp.compare_values(1.0, mem_report.counts.get(DigitLabel::new(0).unwrap()) as f64, 0.0);
    rp.compare_values(0.0, mem_report.failed() as f64, 0.0);

    let single = pipeline
        .classify_image(&ImageSource::from_memory("single", glyph_png(5, 2)))
        .expect("classify single");
    rp.compare_values(5.0, single.label.value() as f64, 0.0);
    let best = single.votes.iter().cloned().fold(f64::MIN, f64::max);
    rp.compare_values(best, single.score(), 0.0);

    // --- Test 4: headers declaring huge rasters, and a long thin strip ---
    eprintln!("=== Oversized headers ===");
    let strip = digitcount_recog::digitcount_core::Pix::from_gray_samples(16000, 1, &[255; 16000])
        .expect("strip");
    let hostile = vec![
        ImageSource::from_memory("seven", glyph_png(7, 2)),
        ImageSource::from_memory("huge.bmp", oversized_bmp()),
        ImageSource::from_memory("huge.ppm", b"P6\n4000000000 4000000000\n255\n\0\0\0".to_vec()),
        ImageSource::from_memory("huge.pgm", b"P5\n4000000000 4000000000\n65535\n\0\0".to_vec()),
        ImageSource::from_memory("strip.png", encode_png(&strip).expect("encode strip")),
    ];
    let hostile_report = pipeline.classify_batch(&hostile).expect("classify hostile batch");
    eprintln!("  counts: {}", hostile_report.counts);
    rp.compare_values(2.0, hostile_report.processed() as f64, 0.0);
    rp.compare_values(3.0, hostile_report.failed() as f64, 0.0);
    rp.compare_values(1.0, hostile_report.counts.get(DigitLabel::new(7).unwrap()) as f64, 0.0);
    let failed_ids: Vec<&str> = hostile_report.failures.iter().map(|f| f.id.as_str()).collect();
    rp.compare_values(
        1.0,
        if failed_ids == ["huge.bmp", "huge.ppm", "huge.pgm"] { 1.0 } else { 0.0 },
        0.0,
    );

    // --- Test 5: a reference given on a unit scale ---
    eprintln!("=== Unit-scale reference ===");
    let rows: Vec<Vec<f64>> = reference
        .vectors()
        .iter()
        .map(|v| v.as_slice().iter().map(|x| x / 16.0).collect())
        .collect();
    let labels: Vec<u8> = reference.labels().iter().map(|l| l.value()).collect();
    let unit = ReferenceSet::from_unit_scale(rows, &labels).expect("unit-scale reference");
    rp.compare_values(1.0, if unit == reference { 1.0 } else { 0.0 }, 0.0);

    // --- Test 6: nothing classifiable ---
    eprintln!("=== All images fail ===");
    let bad = vec![
        ImageSource::from_memory("bad0", CORRUPT_PNG.to_vec()),
        ImageSource::from_memory("bad1", b"GIF89a".to_vec()),
    ];
    let result = pipeline.classify_batch(&bad);
    rp.compare_values(
        1.0,
        if matches!(result, Err(RecogError::NoImagesProcessed { failed: 2 })) { 1.0 } else { 0.0 },
        0.0,
    );
    let empty = pipeline.classify_batch(&[]);
    rp.compare_values(
        1.0,
        if matches!(empty, Err(RecogError::NoImagesProcessed { failed: 0 })) { 1.0 } else { 0.0 },
        0.0,
    );

    // --- Test 7: preparation errors are fatal ---
    eprintln!("=== Preparation errors ===");
    let wrong_dim = ReferenceSet::from_raw(vec![vec![0.0; 10]], &[1]).expect("small reference");
    let err = Pipeline::prepare(&wrong_dim, PipelineOptions::default()).unwrap_err();
    rp.compare_values(
        1.0,
        if matches!(err, RecogError::DimensionMismatch { .. }) { 1.0 } else { 0.0 },
        0.0,
    );
    let bad_k = Pipeline::prepare(&reference, PipelineOptions::default().with_k(0));
    rp.compare_values(1.0, if bad_k.is_err() { 1.0 } else { 0.0 }, 0.0);

    assert!(rp.cleanup(), "pipeline regression test failed");
}
