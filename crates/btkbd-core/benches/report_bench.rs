//! Criterion benchmarks for character translation and report encoding.
//!
//! Each character costs two reports and 20 ms of mandated delay on the wire,
//! so these numbers only need to stay far below that; the benchmark guards
//! against accidental regressions in the table lookup.
//!
//! Run with:
//! ```bash
//! cargo bench --package btkbd-core --bench report_bench
//! ```

use btkbd_core::{char_to_keycode, decode_report, encode_press, encode_release, KeyStroke};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const SAMPLE_LINE: &str = "The quick brown fox jumps over the lazy dog! 0123456789 {}[]<>?";

fn bench_char_to_keycode(c: &mut Criterion) {
    let mut group = c.benchmark_group("keymap");

    group.bench_function("char_to_keycode_single", |b| {
        b.iter(|| char_to_keycode(black_box('Q')))
    });

    group.bench_function("char_to_keycode_line", |b| {
        b.iter(|| {
            SAMPLE_LINE
                .chars()
                .map(|ch| char_to_keycode(black_box(ch)))
                .filter(Option::is_some)
                .count()
        })
    });

    group.finish();
}

fn bench_report_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("report");

    group.bench_function("encode_pair", |b| {
        b.iter(|| {
            let press = encode_press(black_box(0x0B), black_box(true));
            let release = encode_release();
            (press, release)
        })
    });

    group.bench_function("encode_line", |b| {
        b.iter(|| {
            SAMPLE_LINE
                .chars()
                .chain(std::iter::once('\n'))
                .map(|ch| {
                    let stroke = char_to_keycode(ch).unwrap_or(KeyStroke::NONE);
                    encode_press(stroke.key.as_u8(), stroke.shift)
                })
                .count()
        })
    });

    let press = encode_press(0x0B, true);
    group.bench_function("decode_press", |b| b.iter(|| decode_report(black_box(&press))));

    group.finish();
}

criterion_group!(benches, bench_char_to_keycode, bench_report_encoding);
criterion_main!(benches);
