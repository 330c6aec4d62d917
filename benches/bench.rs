use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{Rng as _, SeedableRng as _};
use rand_xoshiro::Xoshiro256PlusPlus;

use kyokumen::*;

criterion_group!(benches, bench_do_undo, bench_verify);
criterion_main!(benches);

/// ランダムな指し手列を作る。
fn random_line(seed: u64, len: usize) -> Vec<Move> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut pos = Position::startpos();
    let mut line = Vec::with_capacity(len);

    for _ in 0..len {
        let mvs = generate_pseudo_moves(&pos);
        if mvs.is_empty() {
            break;
        }
        let mv = mvs[rng.random_range(0..mvs.len())];
        pos.do_move(mv);
        line.push(mv);
    }

    line
}

pub fn bench_do_undo(c: &mut Criterion) {
    zobrist::init();

    let line = random_line(1, 100);
    let mut pos = Position::startpos();

    c.bench_function("do_undo", |b| {
        b.iter(|| {
            for &mv in &line {
                pos.do_move(black_box(mv));
            }
            for _ in 0..line.len() {
                pos.undo_move();
            }
        })
    });
}

pub fn bench_verify(c: &mut Criterion) {
    zobrist::init();

    let mut pos = Position::startpos();
    for mv in random_line(2, 60) {
        pos.do_move(mv);
    }

    c.bench_function("verify", |b| b.iter(|| black_box(&pos).verify()));
}
