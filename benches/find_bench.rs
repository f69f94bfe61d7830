//! Loaded vs lazy lookup throughput over the same archive.
//!
//! The loaded index pays unmarshalling up front and answers from
//! memory; the lazy index answers straight off the byte buffer, one
//! seek per probe. Run with `cargo bench`.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use jot::tsar::{match_equal, EntryList, Index};

const INDEX_SIZE: usize = 50_000;

fn build_archive() -> (Vec<String>, Vec<u8>) {
    let mut list = EntryList::new();
    let mut keys = Vec::with_capacity(INDEX_SIZE);
    for i in 0..INDEX_SIZE {
        // spread keys over the alphabet without a rand dependency
        let key = format!("{:x}{:05}", (i * 2_654_435_761usize) % 16, i);
        let pointers: Vec<u32> = (0..(i % 37 + 1) as u32).collect();
        list.set(&key, pointers).unwrap();
        keys.push(key);
    }
    (keys, list.to_index().to_bytes())
}

fn bench_find(c: &mut Criterion) {
    let (keys, bytes) = build_archive();

    let mut loaded = Index::unmarshal(&bytes).unwrap();
    let mut i = 0usize;
    c.bench_function("find_loaded", |b| {
        b.iter(|| {
            let key = &keys[i % keys.len()];
            i = i.wrapping_add(7919);
            black_box(loaded.find(key, match_equal).unwrap())
        })
    });

    let mut lazy = Index::unmarshal_lazy(bytes.clone()).unwrap();
    let mut i = 0usize;
    c.bench_function("find_lazy", |b| {
        b.iter(|| {
            let key = &keys[i % keys.len()];
            i = i.wrapping_add(7919);
            black_box(lazy.find(key, match_equal).unwrap())
        })
    });

    let mut i = 0usize;
    c.bench_function("unmarshal_lazy_then_find", |b| {
        b.iter(|| {
            let key = &keys[i % keys.len()];
            i = i.wrapping_add(7919);
            let mut index = Index::unmarshal_lazy(bytes.clone()).unwrap();
            black_box(index.find(key, match_equal).unwrap())
        })
    });
}

criterion_group!(benches, bench_find);
criterion_main!(benches);
