use std::hint::black_box;
use std::time::Duration;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use plum_search::rules::chess_position::ChessPosition;
use plum_search::search::board_scoring::StandardScorer;
use plum_search::search::iterative_deepening::choose_move;
use plum_search::search::search_context::SearchConfig;
use plum_search::search::time_governor::TurnClock;

#[derive(Clone, Copy)]
struct BenchCase {
    name: &'static str,
    fen: &'static str,
    depth: u8,
}

const CASES: &[BenchCase] = &[
    BenchCase {
        name: "startpos",
        fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        depth: 4,
    },
    BenchCase {
        name: "kiwipete",
        fen: "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        depth: 3,
    },
    BenchCase {
        name: "rook_endgame",
        fen: "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        depth: 5,
    },
];

fn bench_fixed_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("fixed_depth_search");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(5));
    group.sample_size(10);

    for tt_enabled in [true, false] {
        for case in CASES {
            let config = SearchConfig {
                max_depth: case.depth,
                use_tt: tt_enabled,
                ..SearchConfig::default()
            };
            let position = ChessPosition::from_fen(case.fen).expect("benchmark FEN should parse");
            let bench_name = format!(
                "{}_d{}_{}",
                case.name,
                case.depth,
                if tt_enabled { "tt" } else { "no_tt" }
            );

            group.bench_with_input(BenchmarkId::from_parameter(bench_name), &config, |b, config| {
                b.iter(|| {
                    let mut position = position.clone();
                    let result = choose_move(
                        black_box(&mut position),
                        &StandardScorer,
                        TurnClock::start(),
                        Duration::MAX,
                        config,
                    )
                    .expect("benchmark position has moves");
                    assert_eq!(result.reached_depth, case.depth);
                    black_box(result.stats.nodes)
                });
            });
        }
    }

    group.finish();
}

criterion_group!(search_benches, bench_fixed_depth);
criterion_main!(search_benches);
