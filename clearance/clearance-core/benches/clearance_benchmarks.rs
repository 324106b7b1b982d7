//! Benchmarks for clearance queries.
//!
//! Run with: cargo bench -p clearance-core

#![allow(
    missing_docs,
    clippy::wildcard_imports,
    clippy::cast_precision_loss,
    clippy::cast_lossless,
    clippy::unwrap_used
)]

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use nalgebra::{Isometry3, Point3, Vector3};

use clearance_core::bvh::bvh_from_triangle_mesh;
use clearance_core::gjk_epa::penetration_depth;
use clearance_core::triangle::triangle_distance;
use clearance_core::{
    ClearanceCalculator, ClearanceConfig, ConvexAdapter, Face, GeometryModel, PenetrationStrategy, SplitMethod, State,
};

/// Unit cube centered at the origin, each triangle split into four per level.
/// Level 0 = 12 triangles, level 1 = 48, level 2 = 192, ...
fn generate_cube_mesh(subdivisions: u32) -> (Vec<Point3<f64>>, Vec<Face>) {
    let (mut vertices, mut faces) = clearance_core::geometry::box_mesh(
        Point3::new(-0.5, -0.5, -0.5),
        Point3::new(0.5, 0.5, 0.5),
    );

    for _ in 0..subdivisions {
        let mut next = Vec::with_capacity(faces.len() * 4);
        for [i0, i1, i2] in faces {
            let (v0, v1, v2) = (vertices[i0], vertices[i1], vertices[i2]);
            let i01 = vertices.len();
            let (i12, i20) = (i01 + 1, i01 + 2);
            vertices.push(nalgebra::center(&v0, &v1));
            vertices.push(nalgebra::center(&v1, &v2));
            vertices.push(nalgebra::center(&v2, &v0));

            next.push([i0, i01, i20]);
            next.push([i01, i1, i12]);
            next.push([i20, i12, i2]);
            next.push([i01, i12, i20]);
        }
        faces = next;
    }

    (vertices, faces)
}

fn cube_model(subdivisions: u32) -> GeometryModel {
    let (vertices, faces) = generate_cube_mesh(subdivisions);
    GeometryModel::new(vertices, faces, Point3::origin()).unwrap()
}

// =============================================================================
// BVH
// =============================================================================

fn bench_bvh_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("bvh_construction");

    for subdivisions in [1, 2, 3, 4] {
        let (vertices, faces) = generate_cube_mesh(subdivisions);
        group.throughput(Throughput::Elements(faces.len() as u64));

        for split in [SplitMethod::Median, SplitMethod::Mean, SplitMethod::BoundsCenter] {
            group.bench_with_input(
                BenchmarkId::new(split.to_string(), format!("{}_tri", faces.len())),
                &(&vertices, &faces),
                |b, (vertices, faces)| {
                    b.iter(|| black_box(bvh_from_triangle_mesh(vertices, faces, split)));
                },
            );
        }
    }

    group.finish();
}

fn bench_bvh_min_distance(c: &mut Criterion) {
    let mut group = c.benchmark_group("bvh_min_distance");

    for subdivisions in [1, 2, 3] {
        let (vertices, faces) = generate_cube_mesh(subdivisions);
        let bvh = bvh_from_triangle_mesh(&vertices, &faces, SplitMethod::Median);
        let tri = |i: usize| faces[i].map(|v| vertices[v]);

        for gap in [0.1, 2.0] {
            let transform = Isometry3::translation(1.0 + gap, 0.2, -0.1);
            group.bench_function(BenchmarkId::new(format!("gap_{gap}"), format!("{}_tri", faces.len())), |b| {
                b.iter(|| {
                    black_box(bvh.min_distance(&bvh, &transform, |i, j| {
                        triangle_distance(&tri(i), &tri(j).map(|p| transform * p))
                    }))
                });
            });
        }
    }

    group.finish();
}

// =============================================================================
// GJK/EPA
// =============================================================================

fn bench_gjk_epa(c: &mut Criterion) {
    let mut group = c.benchmark_group("gjk_epa");

    let (vertices, faces) = generate_cube_mesh(2);
    let hull = ConvexAdapter::adapt(&vertices, &faces);
    let identity = Isometry3::identity();

    for (name, offset) in [("separated", 2.0), ("shallow", 0.9), ("deep", 0.2)] {
        let pose = Isometry3::new(Vector3::new(offset, 0.1, 0.0), Vector3::new(0.0, 0.0, 0.3));
        group.bench_function(name, |b| {
            b.iter(|| black_box(penetration_depth(&hull, &pose, &hull, &identity)));
        });
    }

    group.finish();
}

// =============================================================================
// Certified cubes
// =============================================================================

fn bench_certain_cube(c: &mut Criterion) {
    let mut group = c.benchmark_group("certain_cube");

    for strategy in [PenetrationStrategy::PiecewiseGjk, PenetrationStrategy::PieceBvh] {
        let config = ClearanceConfig::default().penetration_strategy(strategy);
        let calc = ClearanceCalculator::new(cube_model(2), cube_model(2), config).unwrap();

        for (name, state) in [
            ("free", State::new(3.0, 0.5, 0.0, 0.1, 0.2, 0.3)),
            ("colliding", State::new(0.4, 0.1, 0.0, 0.1, 0.2, 0.3)),
        ] {
            group.bench_function(BenchmarkId::new(strategy.to_string(), name), |b| {
                b.iter(|| black_box(calc.certain_cube(&state)));
            });
        }
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_bvh_construction,
    bench_bvh_min_distance,
    bench_gjk_epa,
    bench_certain_cube,
);
criterion_main!(benches);
