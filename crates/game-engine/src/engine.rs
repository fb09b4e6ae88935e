use crate::clock::{Clock, SystemClock};
use crate::config::GameConfig;
use crate::error::GameError;
use crate::lifecycle;
use crate::metrics::EngineMetrics;
use crate::store::{GameStore, SharedGame, SharedUser};
use crate::view::{GameSummary, GameView, ParticipantView, UserView};
use crate::Result;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use content_gen::{generate_week, validate_lineup, ContentGenerator, GenerationError};
use futures::future::try_join_all;
use market_types::{Company, Game, GameId, MarketEvent, Trade, TradeRequest, User, UserId};
use parking_lot::Mutex;
use price_engine::PriceBoard;
use settlement::{game_result, liquidate, settle, GameResult, Holdings, TradeDraft};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

struct GeneratedGame {
    title: String,
    companies: Vec<Company>,
    thumbnails: Vec<(String, Bytes)>,
}

/// Owns every game and user and runs all game operations.
///
/// Each mutating operation holds the game's lock for its whole duration and
/// takes the user's lock inside it, never the other way round.
pub struct GameEngine {
    config: GameConfig,
    store: GameStore,
    generator: Arc<dyn ContentGenerator>,
    clock: Arc<dyn Clock>,
    metrics: EngineMetrics,
    last_created: Mutex<Option<DateTime<Utc>>>,
}

impl GameEngine {
    #[inline]
    pub fn new(config: GameConfig, generator: Arc<dyn ContentGenerator>) -> Self {
        Self::with_clock(config, generator, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: GameConfig,
        generator: Arc<dyn ContentGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        info!(
            "Game engine ready: {} companies per game, {}s per day, {} starting gold",
            config.companies_per_game, config.day_interval_secs, config.initial_gold
        );

        Self {
            config,
            store: GameStore::new(),
            generator,
            clock,
            metrics: EngineMetrics::new(),
            last_created: Mutex::new(None),
        }
    }

    #[inline]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[inline]
    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }

    #[inline]
    pub fn store(&self) -> &GameStore {
        &self.store
    }

    #[inline]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn sign_in(&self, nickname: &str, password: &str) -> Result<UserView> {
        let nickname = nickname.trim();
        if nickname.is_empty() {
            return Err(GameError::Unauthorized("nickname is required".to_string()));
        }

        let hash = credential_hash(nickname, password);
        let now = self.clock.now();
        let initial_gold = self.config.initial_gold;

        let (shared, created) = self.store.get_or_create_user(nickname, |id| User {
            id,
            nickname: nickname.to_string(),
            credential_hash: hash.clone(),
            gold: initial_gold,
            games: Vec::new(),
            created_at: now,
        });

        let user = shared.lock();
        if user.credential_hash != hash {
            warn!("Rejected sign-in for {}", nickname);
            return Err(GameError::Unauthorized(format!("wrong password for {}", nickname)));
        }
        if created {
            info!("Registered user {} as {}", user.nickname, user.id);
        }

        Ok(UserView::from(&*user))
    }

    pub fn user(&self, user_id: UserId) -> Result<UserView> {
        let shared = self.user_handle(user_id)?;
        let user = shared.lock();
        Ok(UserView::from(&*user))
    }

    /// Generates a new game and makes it visible for joining.
    ///
    /// Nothing is stored unless generation succeeds as a whole.
    pub async fn create_game(&self, theme: &str, language: Option<&str>) -> Result<GameView> {
        let now = self.clock.now();
        let language = language
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(self.config.default_language.as_str())
            .to_string();

        let previous = self.reserve_creation_slot(now)?;

        let generated = match self.generate(theme, &language).await {
            Ok(generated) => generated,
            Err(e) => {
                self.release_creation_slot(now, previous);
                self.metrics.record_generation_failure();
                warn!("Generating a game for theme '{}' failed: {}", theme, e);
                return Err(e.into());
            }
        };

        for (name, data) in generated.thumbnails {
            self.store.put_thumbnail(name, data);
        }

        let game = Game {
            id: self.store.next_game_id(),
            theme: theme.to_string(),
            title: generated.title,
            language,
            owner: None,
            created_at: now,
            started_at: None,
            participants: Vec::new(),
            companies: generated.companies,
            trades: Vec::new(),
        };

        let view = GameView::build(&game, Vec::new(), now);
        self.metrics.record_game_created(game.companies.len());
        info!("Created game {} '{}' with {} companies", game.id, game.title, game.companies.len());

        self.store.insert_game(game);
        Ok(view)
    }

    pub fn list_open_games(&self) -> Vec<GameSummary> {
        let now = self.clock.now();
        let mut open: Vec<GameSummary> = self
            .store
            .games()
            .iter()
            .filter_map(|shared| {
                let game = shared.lock();
                (!game.is_started()).then(|| GameSummary::build(&game, now))
            })
            .collect();

        sort_newest_first(&mut open);
        open
    }

    /// Every game the user currently takes part in, newest first.
    pub fn games_for_user(&self, user_id: UserId) -> Result<Vec<GameSummary>> {
        let game_ids = self.user_handle(user_id)?.lock().games.clone();
        let now = self.clock.now();

        let mut games: Vec<GameSummary> = game_ids
            .into_iter()
            .filter_map(|id| self.store.game(id))
            .map(|shared| GameSummary::build(&shared.lock(), now))
            .collect();

        sort_newest_first(&mut games);
        Ok(games)
    }

    pub fn game(&self, game_id: GameId) -> Result<GameView> {
        let shared = self.game_handle(game_id)?;
        let game = shared.lock();
        Ok(self.view_of(&game, self.clock.now()))
    }

    pub fn join(&self, game_id: GameId, user_id: UserId) -> Result<GameView> {
        let shared_game = self.game_handle(game_id)?;
        let shared_user = self.user_handle(user_id)?;

        let mut game = shared_game.lock();
        if lifecycle::join(&mut game, user_id)? {
            let mut user = shared_user.lock();
            if !user.games.contains(&game_id) {
                user.games.push(game_id);
            }
            info!("User {} joined game {}", user_id, game_id);
        }

        Ok(self.view_of(&game, self.clock.now()))
    }

    pub fn leave(&self, game_id: GameId, user_id: UserId) -> Result<GameView> {
        let shared_game = self.game_handle(game_id)?;
        let shared_user = self.user_handle(user_id)?;

        let mut game = shared_game.lock();
        lifecycle::leave(&mut game, user_id)?;
        shared_user.lock().games.retain(|g| *g != game_id);
        info!("User {} left game {}", user_id, game_id);

        Ok(self.view_of(&game, self.clock.now()))
    }

    pub fn start(&self, game_id: GameId, user_id: UserId) -> Result<GameView> {
        let shared = self.game_handle(game_id)?;
        let now = self.clock.now();

        let mut game = shared.lock();
        lifecycle::start(&mut game, user_id, now, self.config.day_interval())?;

        Ok(self.view_of(&game, now))
    }

    /// Settles a trade batch at current prices, all or nothing.
    pub fn submit_trades(
        &self,
        game_id: GameId,
        user_id: UserId,
        requests: &[TradeRequest],
    ) -> Result<Vec<Trade>> {
        let shared_game = self.game_handle(game_id)?;
        let shared_user = self.user_handle(user_id)?;
        let now = self.clock.now();

        let mut game = shared_game.lock();
        lifecycle::ensure_trading_open(&game, user_id, now, self.config.trading_window())?;

        let board = PriceBoard::for_game(&game, now);
        let holdings = Holdings::for_game(&game, user_id);

        let mut user = shared_user.lock();
        let settlement = settle(user.gold, &holdings, &board, requests).map_err(|e| {
            self.metrics.record_batch_rejected();
            debug!("Rejected batch of {} trades from user {}: {}", requests.len(), user_id, e);
            e
        })?;

        let volume = settlement.volume();
        let trades = self.record_trades(&mut game, user_id, &settlement.drafts, now);
        user.gold = settlement.gold;
        self.metrics.record_settlement(trades.len(), volume);

        info!(
            "User {} settled {} trades in game {}, gold now {}",
            user_id,
            trades.len(),
            game_id,
            user.gold
        );
        Ok(trades)
    }

    pub fn holdings(&self, game_id: GameId, user_id: UserId) -> Result<Holdings> {
        let shared = self.game_handle(game_id)?;
        self.user_handle(user_id)?;

        let game = shared.lock();
        Ok(Holdings::for_game(&game, user_id))
    }

    /// Final profit or loss of every participant. Only available once closed.
    pub fn result(&self, game_id: GameId) -> Result<GameResult> {
        let shared = self.game_handle(game_id)?;
        let now = self.clock.now();

        let game = shared.lock();
        lifecycle::ensure_closed(&game, now)?;

        let board = PriceBoard::for_game(&game, now);
        Ok(game_result(&game.participants, &game.trades, &board))
    }

    pub fn throw_all(&self, game_id: GameId, user_id: UserId) -> Result<Vec<Trade>> {
        let shared_game = self.game_handle(game_id)?;
        let shared_user = self.user_handle(user_id)?;
        let now = self.clock.now();

        let mut game = shared_game.lock();
        if !game.is_participant(user_id) {
            return Err(GameError::forbidden(format!("user {} is not in game {}", user_id, game_id)));
        }
        lifecycle::ensure_closed(&game, now)?;

        let board = PriceBoard::for_game(&game, now);
        let holdings = Holdings::for_game(&game, user_id);

        let mut user = shared_user.lock();
        let settlement = liquidate(user.gold, &holdings, &board);
        let volume = settlement.volume();
        let trades = self.record_trades(&mut game, user_id, &settlement.drafts, now);
        user.gold = settlement.gold;
        self.metrics.record_settlement(trades.len(), volume);

        info!("User {} threw {} positions in game {}", user_id, trades.len(), game_id);
        Ok(trades)
    }

    /// Richest users first, ties broken by id.
    pub fn rankings(&self, limit: usize) -> Vec<UserView> {
        let mut users: Vec<UserView> = self
            .store
            .users()
            .iter()
            .map(|shared| UserView::from(&*shared.lock()))
            .collect();

        users.sort_by(|a, b| b.gold.cmp(&a.gold).then(a.id.cmp(&b.id)));
        users.truncate(limit);
        users
    }

    pub fn thumbnail(&self, name: &str) -> Result<Bytes> {
        self.store
            .thumbnail(name)
            .ok_or_else(|| GameError::not_found(format!("thumbnail {}", name)))
    }

    #[inline]
    fn game_handle(&self, game_id: GameId) -> Result<SharedGame> {
        self.store
            .game(game_id)
            .ok_or_else(|| GameError::not_found(format!("game {}", game_id)))
    }

    #[inline]
    fn user_handle(&self, user_id: UserId) -> Result<SharedUser> {
        self.store
            .user(user_id)
            .ok_or_else(|| GameError::not_found(format!("user {}", user_id)))
    }

    /// Claims the system-wide creation slot, returning the slot it replaced.
    fn reserve_creation_slot(&self, now: DateTime<Utc>) -> Result<Option<DateTime<Utc>>> {
        let mut last = self.last_created.lock();
        if let Some(previous) = *last {
            let elapsed = now.signed_duration_since(previous);
            let cooldown = self.config.creation_cooldown();
            if elapsed < cooldown {
                return Err(GameError::conflict(format!(
                    "a game was created {}s ago, next one allowed in {}s",
                    elapsed.num_seconds(),
                    (cooldown - elapsed).num_seconds()
                )));
            }
        }

        Ok(last.replace(now))
    }

    fn release_creation_slot(&self, reserved: DateTime<Utc>, previous: Option<DateTime<Utc>>) {
        let mut last = self.last_created.lock();
        if *last == Some(reserved) {
            *last = previous;
        }
    }

    async fn generate(&self, theme: &str, language: &str) -> std::result::Result<GeneratedGame, GenerationError> {
        let lineup = self
            .generator
            .generate_lineup(theme, language, self.config.companies_per_game)
            .await?;
        validate_lineup(&lineup, self.config.companies_per_game)?;

        let thumbnails = try_join_all(
            lineup
                .companies
                .iter()
                .map(|company| self.generator.generate_thumbnail(company)),
        );
        let (week, images) =
            futures::try_join!(generate_week(self.generator.as_ref(), &lineup, language), thumbnails)?;

        let mut companies = Vec::with_capacity(lineup.companies.len());
        let mut stored = Vec::with_capacity(lineup.companies.len());

        for (seed, image) in lineup.companies.iter().zip(images) {
            let events = week
                .iter()
                .map(|day| {
                    let event = day.event_for(&seed.key).ok_or_else(|| {
                        GenerationError::malformed(format!("day {} has no event for {}", day.day, seed.name))
                    })?;
                    Ok::<_, GenerationError>(MarketEvent::new(
                        self.store.next_event_id(),
                        day.day,
                        event.description.clone(),
                        event.percent,
                    ))
                })
                .collect::<std::result::Result<Vec<_>, GenerationError>>()?;

            let thumbnail = format!("{}.jpg", Uuid::new_v4());
            let company = Company::new(
                self.store.next_company_id(),
                seed.name.clone(),
                seed.description.clone(),
                seed.price,
                thumbnail.clone(),
                events,
            )
            .map_err(|e| GenerationError::malformed(e.to_string()))?;

            companies.push(company);
            stored.push((thumbnail, image));
        }

        Ok(GeneratedGame {
            title: lineup.title,
            companies,
            thumbnails: stored,
        })
    }

    fn record_trades(
        &self,
        game: &mut Game,
        user_id: UserId,
        drafts: &[TradeDraft],
        now: DateTime<Utc>,
    ) -> Vec<Trade> {
        let trades: Vec<Trade> = drafts
            .iter()
            .map(|draft| Trade {
                id: self.store.next_trade_id(),
                user_id,
                game_id: game.id,
                company_id: draft.company_id,
                day: draft.day,
                amount: draft.amount,
                created_at: now,
            })
            .collect();

        game.trades.extend(trades.iter().cloned());
        trades
    }

    fn view_of(&self, game: &Game, now: DateTime<Utc>) -> GameView {
        let participants = game
            .participants
            .iter()
            .filter_map(|id| self.store.user(*id))
            .map(|shared| ParticipantView::build(&shared.lock(), game))
            .collect();

        GameView::build(game, participants, now)
    }
}

fn credential_hash(nickname: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(nickname.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn sort_newest_first(games: &mut [GameSummary]) {
    games.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}
