//! Benchmark for voxel grid access and buffer growth.
//!
//! Run with: cargo bench --package voxkit_core --bench grid_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use voxkit_core::{GrowableBuffer, VoxelGrid};

fn benchmark_grid_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_fill");

    // 128x128x128 = 2M voxel writes, every chunk allocated
    group.throughput(Throughput::Elements(128 * 128 * 128));
    group.sample_size(10);
    group.bench_function("dense_128", |b| {
        b.iter(|| {
            let mut grid = VoxelGrid::allocate(128, 128, 128).unwrap();
            for x in 0..128 {
                for z in 0..128 {
                    for y in 0..128 {
                        grid.set(x, y, z, 1).unwrap();
                    }
                }
            }
            black_box(grid.chunks_allocated())
        });
    });

    group.finish();
}

fn benchmark_grid_reads(c: &mut Criterion) {
    let mut grid = VoxelGrid::allocate(256, 256, 256).unwrap();
    // Sparse shell: only one plane is populated
    for x in 0..256 {
        for z in 0..256 {
            grid.set(x, 0, z, 3).unwrap();
        }
    }

    c.bench_function("sparse_reads_with_neighbours", |b| {
        b.iter(|| {
            let mut solid = 0u32;
            for x in 0..256 {
                for z in 0..256 {
                    for (dx, dy, dz) in [(-1, 0, 0), (1, 0, 0), (0, 1, 0), (0, -1, 0)] {
                        solid += u32::from(grid.is_solid(x + dx, dy, z + dz));
                    }
                }
            }
            black_box(solid)
        });
    });
}

fn benchmark_buffer_growth(c: &mut Criterion) {
    c.bench_function("buffer_push_1m", |b| {
        b.iter(|| {
            let mut buffer: GrowableBuffer<[f32; 3]> = GrowableBuffer::with_capacity(3 * 1024).unwrap();
            for i in 0..1_000_000u32 {
                #[allow(clippy::cast_precision_loss)]
                let f = i as f32;
                buffer.push([f, f, f]).unwrap();
            }
            black_box(buffer.len())
        });
    });
}

criterion_group!(benches, benchmark_grid_fill, benchmark_grid_reads, benchmark_buffer_growth);
criterion_main!(benches);
