// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Factory throughput
//!
//! ```bash
//! cargo bench --bench factory
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ifc_lite_export::{to_step_string, ElementArgs, ExportSession, RootArgs, SpatialArgs, StepHeader};
use ifc_lite_schema::SchemaVersion;

fn walls(session: &mut ExportSession, count: usize) {
    let storey = session
        .create_building_storey(&SpatialArgs::new(RootArgs::generated()), Some(0.0))
        .unwrap();
    let mut elements = Vec::with_capacity(count);
    for i in 0..count {
        let args = ElementArgs::new(RootArgs::generated().with_name(format!("Wall {}", i)));
        elements.push(session.create_wall(&args, Some("STANDARD")).unwrap());
    }
    session
        .create_rel_contained_in_spatial_structure(&RootArgs::generated(), &elements, storey)
        .unwrap();
}

fn bench_create_walls(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_walls");
    for count in [100usize, 1_000] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                let mut session = ExportSession::for_version(SchemaVersion::Ifc4).unwrap();
                walls(&mut session, count);
                black_box(session.len())
            })
        });
    }
    group.finish();
}

fn bench_subtype_checks(c: &mut Criterion) {
    let mut session = ExportSession::for_version(SchemaVersion::Ifc4).unwrap();
    let wall = session
        .create_wall(&ElementArgs::new(RootArgs::generated()), None)
        .unwrap();

    c.bench_function("validate_subtype_of_cached", |b| {
        b.iter(|| {
            session
                .validate_subtype_of(black_box(wall), false, &["IfcProduct", "IfcTypeObject"])
                .unwrap()
        })
    });
}

fn bench_step_writer(c: &mut Criterion) {
    let mut session = ExportSession::for_version(SchemaVersion::Ifc4).unwrap();
    walls(&mut session, 1_000);
    let header = StepHeader::new("bench.ifc");

    let mut group = c.benchmark_group("write_step");
    group.throughput(Throughput::Elements(session.len() as u64));
    group.bench_function("1000_walls", |b| {
        b.iter(|| black_box(to_step_string(&session, &header).unwrap().len()))
    });
    group.finish();
}

criterion_group!(benches, bench_create_walls, bench_subtype_checks, bench_step_writer);
criterion_main!(benches);
