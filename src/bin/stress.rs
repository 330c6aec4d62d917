//! 平手初期局面からランダムに指し手を進めたり戻したりし、毎回局面の整合性を検査する。
//! 最後に全ての手を戻し、初期局面に戻ることを確認する。

use anyhow::ensure;
use log::{debug, info};
use rand::{Rng as _, SeedableRng as _};
use rand_xoshiro::Xoshiro256PlusPlus;
use structopt::StructOpt;

use kyokumen::*;

#[derive(Debug, StructOpt)]
struct Opt {
    #[structopt(long, default_value = "1")]
    seed: u64,

    #[structopt(long, default_value = "100")]
    games: u32,

    /// 1 局あたりの操作 (着手または手戻し) 回数。
    #[structopt(long, default_value = "300")]
    plies: u32,

    /// 各操作が手戻しになる確率。
    #[structopt(long, default_value = "0.2")]
    undo_rate: f64,

    #[structopt(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let opt = Opt::from_args();

    let level = if opt.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    fern::Dispatch::new()
        .format(|out, message, _record| out.finish(format_args!("{}", message)))
        .level(level)
        .chain(std::io::stderr())
        .apply()?;

    ensure!(
        (0.0..=1.0).contains(&opt.undo_rate),
        "undo-rate must be in [0, 1]: {}",
        opt.undo_rate
    );

    zobrist::init();

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(opt.seed);

    for game in 0..opt.games {
        stress_game(&mut rng, &opt, game)?;
    }

    info!("{} games: OK", opt.games);

    Ok(())
}

fn stress_game(rng: &mut Xoshiro256PlusPlus, opt: &Opt, game: u32) -> anyhow::Result<()> {
    let instrumentation = Instrumentation {
        arena_checks: true,
        verify_each_move: false,
    };
    let mut pos =
        Position::with_instrumentation(instrumentation, BLACK, &Board::startpos(), &Hands::default());
    let initial = pos.clone();

    let mut max_len = 0;

    for step in 0..opt.plies {
        if !pos.history().is_empty() && rng.random_bool(opt.undo_rate) {
            let entry = pos.undo_move();
            debug!("game {} step {}: undo {}", game, step, entry.mv());
        } else {
            let mvs = generate_pseudo_moves(&pos);
            if mvs.is_empty() {
                debug!("game {} step {}: no moves", game, step);
                break;
            }
            let mv = mvs[rng.random_range(0..mvs.len())];
            pos.do_move(mv);
            debug!("game {} step {}: {}", game, step, mv);

            let repetition = pos.repetition();
            if repetition != Repetition::NotRepeated {
                debug!("game {} step {}: {:?}", game, step, repetition);
            }
        }

        max_len = max_len.max(pos.history().len());

        let report = pos.consistency_report();
        ensure!(
            report == REPORT_OK,
            "game {} step {}: inconsistent position\n{}\n{}",
            game,
            step,
            pos,
            report
        );
    }

    while !pos.history().is_empty() {
        pos.undo_move();

        let report = pos.consistency_report();
        ensure!(
            report == REPORT_OK,
            "game {} unwinding: inconsistent position\n{}\n{}",
            game,
            pos,
            report
        );
    }

    ensure!(
        pos == initial,
        "game {}: unwinding did not restore the initial position\n{}",
        game,
        pos
    );

    info!("game {}: OK (max history length: {})", game, max_len);

    Ok(())
}
