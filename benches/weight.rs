use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use mcfi_kernels::{BitDepth, CapabilityFlags, CpuTier, KernelTable};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro128StarStar;

pub fn bench_has_invalid(c: &mut Criterion) {
    let mut group = c.benchmark_group("weight has_invalid");
    let mut rng = Xoshiro128StarStar::from_seed(*b"deadbeeflolcakes");
    // a 1080p luma plane of valid weights, so every batch is inspected
    let weights: Vec<u32> = (0..1920 * 1080).map(|_| rng.random_range(1..1024)).collect();

    for tier in CpuTier::ALL {
        if !CapabilityFlags::host().contains(tier.flags()) {
            continue;
        }
        let checker = KernelTable::<u8>::build(tier.flags(), BitDepth::EIGHT)
            .unwrap()
            .weight_checker();
        group.bench_function(format!("1920x1080 {tier}"), |b| {
            b.iter(|| checker.has_invalid(black_box(&weights)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_has_invalid);
criterion_main!(benches);
