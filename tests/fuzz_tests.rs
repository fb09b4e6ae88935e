//! Property-based tests for the pure pricing, visibility and settlement rules
//!
//! These tests generate random event logs and trade batches to check the
//! invariants the engine relies on

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use stock_party::event_clock::{revealed_count, schedule_events, DayInterval};
use stock_party::market_types::{
    CompanyId, EventId, GameId, Gold, MarketEvent, Trade, TradeId, TradeRequest, UserId, DAYS_PER_GAME,
};
use stock_party::price_engine::{apply_percent, current_price, price_history, PriceBoard, Quote};
use stock_party::settlement::{game_result, settle, Holdings};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

prop_compose! {
    fn week_of_percents()(percents in prop::collection::vec(-90i64..=200, DAYS_PER_GAME as usize)) -> Vec<i64> {
        percents
    }
}

prop_compose! {
    fn trade_request()(company in 1u64..=3, amount in -20i64..=20) -> TradeRequest {
        TradeRequest { company_id: CompanyId(company), amount }
    }
}

/// A board for companies 1..=3 whose histories follow random weeks.
fn board_strategy() -> impl Strategy<Value = PriceBoard> {
    prop::collection::vec((1i64..2_000, week_of_percents()), 3).prop_map(|companies| {
        companies
            .into_iter()
            .enumerate()
            .map(|(i, (initial, percents))| {
                let history = price_history(initial, percents);
                Quote {
                    company_id: CompanyId(i as u64 + 1),
                    day: DAYS_PER_GAME,
                    price: history[history.len() - 1],
                    history,
                }
            })
            .collect()
    })
}

fn at_day(board: &PriceBoard, day: u32) -> PriceBoard {
    board
        .quotes()
        .map(|q| Quote {
            company_id: q.company_id,
            day,
            price: q.history[day as usize],
            history: q.history[..=day as usize].to_vec(),
        })
        .collect()
}

proptest! {
    #[test]
    fn fuzz_price_history_shape(initial in 0i64..1_000_000, percents in prop::collection::vec(-100i64..=500, 0..12)) {
        let history = price_history(initial, percents.iter().copied());

        prop_assert_eq!(history.len(), percents.len() + 1);
        prop_assert_eq!(history[0], initial);
        prop_assert!(history.iter().all(|p| *p >= 0));
        prop_assert_eq!(current_price(initial, percents.iter().copied()), history[history.len() - 1]);

        for (i, percent) in percents.iter().enumerate() {
            prop_assert_eq!(history[i + 1], apply_percent(history[i], *percent));
        }

        // Pure: same inputs, same output.
        prop_assert_eq!(price_history(initial, percents.iter().copied()), history);
    }

    #[test]
    fn fuzz_reveals_form_a_prefix(offset_secs in -600i64..3_000, interval_secs in 1i64..600) {
        let interval = DayInterval::from_secs(interval_secs);
        let mut events: Vec<MarketEvent> = (1..=DAYS_PER_GAME)
            .map(|day| MarketEvent::new(EventId(day as u64), day, String::new(), 1))
            .collect();
        schedule_events(&mut events, t0(), interval);

        let now = t0() + Duration::seconds(offset_secs);
        let expected = (offset_secs.max(0) / interval_secs).min(DAYS_PER_GAME as i64) as usize;

        prop_assert_eq!(revealed_count(&events, Some(t0()), now), expected);
        prop_assert_eq!(revealed_count(&events, None, now), 0);
    }

    #[test]
    fn fuzz_settlement_is_all_or_nothing(
        board in board_strategy(),
        gold in 0i64..50_000,
        requests in prop::collection::vec(trade_request(), 0..12),
    ) {
        let holdings = Holdings::with_companies(board.company_ids());

        match settle(gold, &holdings, &board, &requests) {
            Ok(settlement) => {
                let spent: Gold = settlement.drafts.iter().map(|d| d.cost()).sum();
                prop_assert_eq!(settlement.gold, gold - spent);
                prop_assert!(settlement.gold >= 0);
                prop_assert!(settlement.holdings.iter().all(|(_, h)| h >= 0));
                prop_assert!(settlement.drafts.iter().all(|d| d.amount != 0));
            }
            Err(_) => {
                let net_cost: Gold = requests
                    .iter()
                    .filter_map(|r| board.price(r.company_id).map(|p| p * r.amount))
                    .sum();
                let mut after = holdings.clone();
                for request in &requests {
                    after.apply(request.company_id, request.amount);
                }
                prop_assert!(net_cost > gold || after.first_negative().is_some());
            }
        }
    }

    #[test]
    fn fuzz_huge_offsetting_trades_never_mint_shares(
        price in 2i64..5_000,
        gold in 0i64..1_000_000,
        slack in 0i64..1_000,
        kept in 1i64..10,
    ) {
        let board: PriceBoard = std::iter::once(Quote {
            company_id: CompanyId(1),
            day: 0,
            price,
            history: vec![price],
        })
        .collect();
        let holdings = Holdings::with_companies(board.company_ids());

        // Buying `huge` shares costs more than i64 can hold.
        let huge = i64::MAX / price + 1 + slack;
        let requests = [
            TradeRequest { company_id: CompanyId(1), amount: huge },
            TradeRequest { company_id: CompanyId(1), amount: -(huge - kept) },
        ];

        prop_assert!(settle(gold, &holdings, &board, &requests).is_err());
        prop_assert!(holdings.is_flat());
    }

    #[test]
    fn fuzz_settlement_matches_exact_arithmetic(
        price in 1i64..1_000_000,
        gold in 0i64..=i64::MAX,
        amounts in prop::collection::vec(prop_oneof![-3i64..=3, (i64::MIN / 2)..=(i64::MAX / 2)], 1..4),
    ) {
        let board: PriceBoard = std::iter::once(Quote {
            company_id: CompanyId(1),
            day: 0,
            price,
            history: vec![price],
        })
        .collect();
        let holdings = Holdings::with_companies(board.company_ids());
        let requests: Vec<TradeRequest> = amounts
            .iter()
            .map(|amount| TradeRequest { company_id: CompanyId(1), amount: *amount })
            .collect();

        if let Ok(settlement) = settle(gold, &holdings, &board, &requests) {
            let net_cost: i128 = amounts.iter().map(|a| i128::from(*a) * i128::from(price)).sum();
            let net_shares: i128 = amounts.iter().map(|a| i128::from(*a)).sum();

            prop_assert_eq!(i128::from(settlement.gold), i128::from(gold) - net_cost);
            prop_assert_eq!(i128::from(settlement.holdings.get(CompanyId(1))), net_shares);
            prop_assert!(settlement.gold >= 0);
            prop_assert!(net_shares >= 0);
        }
    }

    #[test]
    fn fuzz_result_matches_gold_and_position_value(
        board in board_strategy(),
        batches in prop::collection::vec((0u32..=DAYS_PER_GAME, prop::collection::vec(trade_request(), 1..5)), 0..10),
    ) {
        let user = UserId(1);
        let initial_gold: Gold = 100_000;
        let mut gold = initial_gold;
        let mut trades: Vec<Trade> = Vec::new();

        let mut days: Vec<u32> = batches.iter().map(|(day, _)| *day).collect();
        days.sort_unstable();

        for (day, (_, requests)) in days.into_iter().zip(batches.iter()) {
            let prices = at_day(&board, day);
            let holdings = Holdings::compute(user, board.company_ids(), &trades);

            if let Ok(settlement) = settle(gold, &holdings, &prices, requests) {
                gold = settlement.gold;
                for draft in settlement.drafts {
                    trades.push(Trade {
                        id: TradeId(trades.len() as u64 + 1),
                        user_id: user,
                        game_id: GameId(1),
                        company_id: draft.company_id,
                        day: draft.day,
                        amount: draft.amount,
                        created_at: t0(),
                    });
                }
            }
        }

        let holdings = Holdings::compute(user, board.company_ids(), &trades);
        let position_value: Gold = holdings
            .iter()
            .map(|(company, shares)| board.price(company).unwrap_or(0) * shares)
            .sum();

        let result = game_result(&[user], &trades, &board);
        prop_assert_eq!(result.get(user), Some(gold - initial_gold + position_value));
    }
}
