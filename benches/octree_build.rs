use criterion::{criterion_group, criterion_main, Criterion, black_box};

use sparsevox::voxel::predicate::{Sphere, TiledSpheres};
use sparsevox::voxel::svo::{OctreeBuilder, flatten};

use glam::IVec3;

fn bench_octree_build_32(c: &mut Criterion) {
    let sphere = Sphere::reference();

    c.bench_function("octree_build_32", |b| {
        b.iter(|| {
            let builder = OctreeBuilder::new(black_box(32));
            builder.build_world(black_box(&sphere))
        });
    });
}

fn bench_octree_build_128(c: &mut Criterion) {
    let sphere = Sphere::new(IVec3::splat(63), 56);

    c.bench_function("octree_build_128", |b| {
        b.iter(|| {
            let builder = OctreeBuilder::new(black_box(128));
            builder.build_world(black_box(&sphere))
        });
    });
}

fn bench_octree_build_128_sequential(c: &mut Criterion) {
    let sphere = Sphere::new(IVec3::splat(63), 56);

    c.bench_function("octree_build_128_sequential", |b| {
        b.iter(|| {
            let builder = OctreeBuilder::new(black_box(128)).with_parallel_depth(0);
            builder.build_world(black_box(&sphere))
        });
    });
}

fn bench_flatten_tiled_128(c: &mut Criterion) {
    let tiled = TiledSpheres::new(16, 7);
    let root = OctreeBuilder::new(128).build_world(&tiled);

    c.bench_function("flatten_tiled_128", |b| {
        b.iter(|| flatten(black_box(root.as_ref())));
    });
}

criterion_group!(
    benches,
    bench_octree_build_32,
    bench_octree_build_128,
    bench_octree_build_128_sequential,
    bench_flatten_tiled_128,
);
criterion_main!(benches);
