use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use sim_core::{Brand, SimConfig};

fn bench_week(c: &mut Criterion) {
    let cfg = SimConfig::default();
    let world = sim_runtime::new_world(42, Brand::Raw, &cfg);
    c.bench_function("both brands, one week", |b| {
        b.iter_batched(
            || world.clone(),
            |mut w| {
                let card = sim_ai::ai_booking(&w, Brand::Raw, &cfg, &mut sim_runtime::week_dice(&w, Brand::Raw));
                let _ = black_box(sim_runtime::run_week(&mut w, &card, &cfg));
                let _ = black_box(sim_runtime::run_rival_week(&mut w, &cfg));
                sim_runtime::advance_week(&mut w);
                w
            },
            BatchSize::SmallInput,
        )
    });

    c.bench_function("ten week season", |b| {
        b.iter_batched(
            || world.clone(),
            |mut w| {
                for _ in 0..10 {
                    let card = sim_ai::ai_booking(&w, Brand::Raw, &cfg, &mut sim_runtime::week_dice(&w, Brand::Raw));
                    let _ = sim_runtime::run_week(&mut w, &card, &cfg);
                    let _ = sim_runtime::run_rival_week(&mut w, &cfg);
                    sim_runtime::advance_week(&mut w);
                }
                black_box(w)
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_week);
criterion_main!(benches);
