use cameraview::camera::choose_optimal_size;
use cameraview::{AspectRatio, Size, SizeMap};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn sensor_sizes() -> Vec<Size> {
    let mut sizes = Vec::new();
    for width in (320..=4096).step_by(32) {
        sizes.push(Size::new(width, width * 3 / 4));
        sizes.push(Size::new(width, width * 9 / 16));
    }
    sizes
}

fn bench_size_map_build(c: &mut Criterion) {
    let sizes = sensor_sizes();
    c.bench_function("size_map_build", |b| {
        b.iter(|| {
            let mut map = SizeMap::new();
            for size in &sizes {
                map.add(black_box(*size));
            }
            map
        })
    });
}

fn bench_choose_optimal_size(c: &mut Criterion) {
    let mut map = SizeMap::new();
    for size in sensor_sizes() {
        map.add(size);
    }
    let ratio = AspectRatio::of(4, 3).expect("valid ratio");
    let Some(candidates) = map.sizes(&ratio) else {
        return;
    };

    c.bench_function("choose_optimal_size", |b| {
        b.iter(|| choose_optimal_size(black_box(1080), black_box(1920), candidates))
    });
}

criterion_group!(benches, bench_size_map_build, bench_choose_optimal_size);
criterion_main!(benches);
