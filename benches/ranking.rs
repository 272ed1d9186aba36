use std::hint::black_box;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use fotosearch::ImageRecord;
use fotosearch::ranking::{cosine, match_text, normalize, score_semantic};
use rand::prelude::*;

const DIMENSION: usize = 512;
const RECORDS: usize = 10_000;

fn random_vec(rng: &mut impl Rng) -> Vec<f32> {
    (0..DIMENSION).map(|_| rng.random_range(-1.0..1.0)).collect()
}

fn records(rng: &mut impl Rng) -> Vec<ImageRecord> {
    const BARRIOS: [&str; 4] = ["Alberdi", "Centro", "Güemes", "Nueva Córdoba"];
    (0..RECORDS)
        .map(|i| ImageRecord {
            id: i as i64,
            filename: format!("{i:08}.jpg"),
            original_path: format!("/fotos/{i}.jpg"),
            barrio: BARRIOS[i % BARRIOS.len()].to_string(),
            localidad: "Córdoba Capital".to_string(),
            categoria: "Calles".to_string(),
            descripcion: format!("Calle empedrada número {i}"),
            embedding: random_vec(rng),
        })
        .collect()
}

fn bench_cosine(c: &mut Criterion) {
    let mut group = c.benchmark_group("Similarity");
    let mut rng = rand::rng();
    let query = random_vec(&mut rng);
    let records = records(&mut rng);
    let candidates = records.iter().collect::<Vec<_>>();

    group.throughput(Throughput::Elements(1));
    group.bench_function("cosine_512", |b| {
        b.iter(|| cosine(black_box(&query), black_box(&records[0].embedding)))
    });

    group.throughput(Throughput::Elements(RECORDS as u64));
    group.bench_function("score_semantic", |b| {
        b.iter(|| score_semantic(black_box(&candidates), black_box(&query)).len())
    });
}

fn bench_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("Text");
    let mut rng = rand::rng();
    let records = records(&mut rng);
    let candidates = records.iter().collect::<Vec<_>>();

    group.throughput(Throughput::Elements(RECORDS as u64));
    group.bench_function("match_text", |b| {
        let needle = normalize("nueva córdoba");
        b.iter(|| match_text(black_box(&candidates), black_box(&needle)).len())
    });
}

criterion_group!(benches, bench_cosine, bench_text);
criterion_main!(benches);
