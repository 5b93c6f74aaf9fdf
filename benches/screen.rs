//! Session benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use termpty::Termpty;

fn bench_session_print(c: &mut Criterion) {
    let mut group = c.benchmark_group("session");

    let text = "Hello, World! ".repeat(100);
    group.throughput(Throughput::Bytes(text.len() as u64));

    group.bench_function("print_chars", |b| {
        b.iter(|| {
            let mut t = Termpty::new(80, 24, 1000).unwrap();
            t.feed(black_box(text.as_bytes()));
            black_box(t)
        })
    });

    group.finish();
}

fn bench_session_scroll(c: &mut Criterion) {
    let mut group = c.benchmark_group("session");

    // Enough lines to wrap the backlog ring several times
    let mut input = String::new();
    for i in 0..5000 {
        input.push_str(&format!("Line {}: Some text content here\r\n", i));
    }
    group.throughput(Throughput::Bytes(input.len() as u64));

    group.bench_function("scroll_into_backlog", |b| {
        b.iter(|| {
            let mut t = Termpty::new(80, 24, 1000).unwrap();
            t.feed(black_box(input.as_bytes()));
            black_box(t)
        })
    });

    group.finish();
}

fn bench_session_csi(c: &mut Criterion) {
    let mut group = c.benchmark_group("session");

    let input = "\x1b[H\x1b[2J\x1b[1;31mHello\x1b[0m\x1b[5;5r\x1b[3L\x1b[r".repeat(100);
    group.throughput(Throughput::Bytes(input.len() as u64));

    group.bench_function("csi_apply", |b| {
        b.iter(|| {
            let mut t = Termpty::new(80, 24, 1000).unwrap();
            t.feed(black_box(input.as_bytes()));
            black_box(t)
        })
    });

    group.finish();
}

fn bench_session_resize(c: &mut Criterion) {
    let mut group = c.benchmark_group("session");

    let fill = "Hello, World!\r\n".repeat(60);

    group.bench_function("resize", |b| {
        b.iter(|| {
            let mut t = Termpty::new(80, 24, 1000).unwrap();
            t.feed(fill.as_bytes());
            t.resize(120, 40).unwrap();
            t.resize(80, 24).unwrap();
            t.resize(132, 50).unwrap();
            black_box(t)
        })
    });

    group.finish();
}

fn bench_session_full_redraw(c: &mut Criterion) {
    let mut group = c.benchmark_group("session");

    // Full-screen redraw on the alternate screen, the way an editor starts up
    let mut input = String::from("\x1b[?1049h");
    for row in 1..=24 {
        input.push_str(&format!("\x1b[{};1H", row));
        input.push_str(&"X".repeat(80));
    }
    input.push_str("\x1b[?1049l");
    group.throughput(Throughput::Bytes(input.len() as u64));

    group.bench_function("full_redraw", |b| {
        b.iter(|| {
            let mut t = Termpty::new(80, 24, 1000).unwrap();
            t.feed(black_box(input.as_bytes()));
            black_box(t)
        })
    });

    group.finish();
}

fn bench_session_checksum(c: &mut Criterion) {
    let mut group = c.benchmark_group("session");

    let mut t = Termpty::new(80, 24, 1000).unwrap();
    t.feed("\x1b[1;32mcolour\x1b[0m text 世界\r\n".repeat(200).as_bytes());

    group.bench_function("checksum", |b| b.iter(|| black_box(t.checksum())));

    group.finish();
}

criterion_group!(
    benches,
    bench_session_print,
    bench_session_scroll,
    bench_session_csi,
    bench_session_resize,
    bench_session_full_redraw,
    bench_session_checksum
);

criterion_main!(benches);
