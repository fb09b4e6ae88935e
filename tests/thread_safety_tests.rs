//! Thread safety validation tests for the stock party engine
//!
//! These tests verify that per-game and per-user locking keeps the ledger
//! consistent under concurrent access

use chrono::{TimeZone, Utc};
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;
use stock_party::content_gen::ScriptedGenerator;
use stock_party::game_engine::ErrorKind;
use stock_party::market_types::{GameId, TradeRequest, UserId};
use stock_party::*;

fn engine(generator: ScriptedGenerator, config: GameConfig) -> Arc<GameEngine> {
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()));
    Arc::new(GameEngine::with_clock(config, Arc::new(generator), clock))
}

fn one_company(initial_gold: i64) -> GameConfig {
    GameConfig {
        companies_per_game: 1,
        initial_gold,
        ..GameConfig::default()
    }
}

fn started_game(engine: &GameEngine, players: &[UserId]) -> GameId {
    let game = tokio_test::block_on(engine.create_game("threads", None)).unwrap();
    for id in players {
        engine.join(game.id, *id).unwrap();
    }
    engine.start(game.id, players[0]).unwrap();
    game.id
}

#[test]
fn test_concurrent_trades_from_many_users() {
    let engine = engine(ScriptedGenerator::single("Acme", 10, &[]), one_company(1_000));
    let num_threads = 8;
    let trades_per_thread = 50;

    let users: Vec<UserId> = (0..num_threads)
        .map(|i| engine.sign_in(&format!("player{i}"), "pw").unwrap().id)
        .collect();
    let game_id = started_game(&engine, &users);
    let company = engine.game(game_id).unwrap().companies[0].id;

    let barrier = Arc::new(Barrier::new(num_threads));
    let handles: Vec<_> = users
        .iter()
        .map(|user_id| {
            let engine = Arc::clone(&engine);
            let barrier = Arc::clone(&barrier);
            let user_id = *user_id;

            thread::spawn(move || {
                barrier.wait();
                for _ in 0..trades_per_thread {
                    engine
                        .submit_trades(game_id, user_id, &[TradeRequest::buy(company, 1)])
                        .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let view = engine.game(game_id).unwrap();
    assert_eq!(view.trades.len(), num_threads * trades_per_thread);

    let ids: HashSet<_> = view.trades.iter().map(|t| t.id).collect();
    assert_eq!(ids.len(), view.trades.len());

    for user_id in &users {
        assert_eq!(engine.user(*user_id).unwrap().gold, 1_000 - 10 * trades_per_thread as i64);
        assert_eq!(engine.holdings(game_id, *user_id).unwrap().get(company), trades_per_thread as i64);
    }
}

#[test]
fn test_concurrent_trades_from_one_user_never_overspend() {
    let engine = engine(ScriptedGenerator::single("Acme", 100, &[]), one_company(1_000));
    let ada = engine.sign_in("ada", "pw").unwrap().id;
    let game_id = started_game(&engine, &[ada]);
    let company = engine.game(game_id).unwrap().companies[0].id;

    let num_threads = 8;
    let barrier = Arc::new(Barrier::new(num_threads));
    let handles: Vec<_> = (0..num_threads)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let barrier = Arc::clone(&barrier);

            thread::spawn(move || {
                barrier.wait();
                (0..5)
                    .filter(|_| {
                        engine
                            .submit_trades(game_id, ada, &[TradeRequest::buy(company, 1)])
                            .is_ok()
                    })
                    .count()
            })
        })
        .collect();

    let settled: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

    assert_eq!(settled, 10);
    assert_eq!(engine.user(ada).unwrap().gold, 0);
    assert_eq!(engine.holdings(game_id, ada).unwrap().get(company), 10);
    assert_eq!(engine.metrics().batches_rejected(), (num_threads * 5 - 10) as u64);
}

#[test]
fn test_concurrent_joins_pick_one_owner() {
    let engine = engine(ScriptedGenerator::demo(), GameConfig::default());
    let game_id = tokio_test::block_on(engine.create_game("lobby", None)).unwrap().id;

    let num_threads = 16;
    let users: Vec<UserId> = (0..num_threads)
        .map(|i| engine.sign_in(&format!("guest{i}"), "pw").unwrap().id)
        .collect();

    let barrier = Arc::new(Barrier::new(num_threads));
    let handles: Vec<_> = users
        .iter()
        .map(|user_id| {
            let engine = Arc::clone(&engine);
            let barrier = Arc::clone(&barrier);
            let user_id = *user_id;

            thread::spawn(move || {
                barrier.wait();
                engine.join(game_id, user_id).unwrap();
                engine.join(game_id, user_id).unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let view = engine.game(game_id).unwrap();
    assert_eq!(view.participants.len(), num_threads);

    let owner = view.owner.unwrap();
    assert_eq!(view.participants[0].id, owner);
    for user_id in &users {
        assert_eq!(engine.user(*user_id).unwrap().games, vec![game_id]);
    }
}

#[test]
fn test_concurrent_sign_ins_share_one_account() {
    let engine = engine(ScriptedGenerator::demo(), GameConfig::default());
    let num_threads = 8;
    let barrier = Arc::new(Barrier::new(num_threads));

    let handles: Vec<_> = (0..num_threads)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let barrier = Arc::clone(&barrier);

            thread::spawn(move || {
                barrier.wait();
                engine.sign_in("ada", "pw").unwrap().id
            })
        })
        .collect();

    let ids: HashSet<UserId> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(ids.len(), 1);
    assert_eq!(engine.rankings(100).len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creation_respects_cooldown() {
    let engine = engine(ScriptedGenerator::demo(), GameConfig::default());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move { engine.create_game(&format!("theme {i}"), None).await })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(e) => assert_eq!(e.kind(), ErrorKind::Conflict),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(engine.list_open_games().len(), 1);
}
