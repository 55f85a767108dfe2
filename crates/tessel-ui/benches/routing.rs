//! Benchmarks for hit-testing, event routing and the layout pass.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use tessel_core::math::Vec2;
use tessel_input::{DeviceType, EventKind};
use tessel_ui::style::FlexDirection;
use tessel_ui::{ControlMode, RootSheet, Style, StyleTable, UiEvent, WidgetId, WidgetParams};

/// A grid of `rows` rows with `cols` fixed-size cells each.
fn build_grid(rows: usize, cols: usize) -> (RootSheet, Vec<WidgetId>) {
    let mut styles = StyleTable::new();
    let column = styles.register(Style::new("Column").flex_direction(FlexDirection::Column));
    let row = styles.register(Style::new("Row").height(20.0));
    let cell = styles.register(Style::new("Cell").width(20.0).height(20.0));

    let mut sheet = RootSheet::new(styles, Vec2::new(1920.0, 1080.0));
    let root = sheet.root();
    sheet.set_style(root, column, true).unwrap();

    let mut cells = Vec::with_capacity(rows * cols);
    for _ in 0..rows {
        let line = sheet
            .create(WidgetParams::new().parent(root).style(row.clone()))
            .unwrap();
        for _ in 0..cols {
            cells.push(
                sheet
                    .create(WidgetParams::new().parent(line).style(cell.clone()))
                    .unwrap(),
            );
        }
    }
    sheet.layout(Vec2::new(1920.0, 1080.0)).unwrap();
    (sheet, cells)
}

fn bench_pinpoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("pinpoint");

    for size in [10, 30, 50] {
        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let (sheet, _) = build_grid(size, size);
            let root = sheet.root();
            let last = (size as f32) * 20.0 - 5.0;
            b.iter(|| black_box(sheet.pinpoint(root, Vec2::new(last, last))));
        });
    }

    group.finish();
}

fn bench_route_mouse_move(c: &mut Criterion) {
    let mut group = c.benchmark_group("route_mouse_move");

    for size in [10, 30, 50] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let (mut sheet, _) = build_grid(size, size);
            let pos = Vec2::splat((size as f32) * 10.0);
            b.iter(|| {
                let mut event = UiEvent::mouse_moved(pos, Vec2::ONE);
                black_box(sheet.route(&mut event))
            });
        });
    }

    group.finish();
}

fn bench_route_captured(c: &mut Criterion) {
    c.bench_function("route_captured", |b| {
        let (mut sheet, cells) = build_grid(30, 30);
        sheet
            .take_control(cells[0], ControlMode::Control, DeviceType::Mouse)
            .unwrap();
        b.iter(|| {
            let mut event = UiEvent::hover(EventKind::MouseMoved, Vec2::new(500.0, 500.0));
            black_box(sheet.route(&mut event))
        });
    });
}

fn bench_relayout(c: &mut Criterion) {
    let mut group = c.benchmark_group("relayout");

    for size in [10, 30] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let (mut sheet, cells) = build_grid(size, size);
            b.iter(|| {
                sheet.hide(cells[0]).unwrap();
                sheet.layout(Vec2::new(1920.0, 1080.0)).unwrap();
                sheet.show(cells[0]).unwrap();
                sheet.layout(Vec2::new(1920.0, 1080.0)).unwrap();
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_pinpoint,
    bench_route_mouse_move,
    bench_route_captured,
    bench_relayout
);
criterion_main!(benches);
