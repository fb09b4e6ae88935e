use bytes::Bytes;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use market_types::{CompanyId, EventId, Game, GameId, TradeId, User, UserId};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub type SharedGame = Arc<Mutex<Game>>;
pub type SharedUser = Arc<Mutex<User>>;

/// In-memory registry of games, users and thumbnails.
///
/// The maps only hand out `Arc`s; callers lock the game or user themselves,
/// always game before user.
#[derive(Debug)]
pub struct GameStore {
    games: DashMap<GameId, SharedGame>,
    users: DashMap<UserId, SharedUser>,
    nicknames: DashMap<String, UserId>,
    thumbnails: DashMap<String, Bytes>,
    next_game_id: AtomicU64,
    next_company_id: AtomicU64,
    next_event_id: AtomicU64,
    next_user_id: AtomicU64,
    next_trade_id: AtomicU64,
}

impl Default for GameStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStore {
    pub fn new() -> Self {
        Self {
            games: DashMap::new(),
            users: DashMap::new(),
            nicknames: DashMap::new(),
            thumbnails: DashMap::new(),
            next_game_id: AtomicU64::new(1),
            next_company_id: AtomicU64::new(1),
            next_event_id: AtomicU64::new(1),
            next_user_id: AtomicU64::new(1),
            next_trade_id: AtomicU64::new(1),
        }
    }

    #[inline]
    pub fn next_game_id(&self) -> GameId {
        GameId(self.next_game_id.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn next_company_id(&self) -> CompanyId {
        CompanyId(self.next_company_id.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn next_event_id(&self) -> EventId {
        EventId(self.next_event_id.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn next_trade_id(&self) -> TradeId {
        TradeId(self.next_trade_id.fetch_add(1, Ordering::Relaxed))
    }

    pub fn insert_game(&self, game: Game) -> SharedGame {
        let id = game.id;
        let shared = Arc::new(Mutex::new(game));
        self.games.insert(id, Arc::clone(&shared));
        shared
    }

    #[inline]
    pub fn game(&self, id: GameId) -> Option<SharedGame> {
        self.games.get(&id).map(|g| Arc::clone(g.value()))
    }

    pub fn games(&self) -> Vec<SharedGame> {
        self.games.iter().map(|g| Arc::clone(g.value())).collect()
    }

    #[inline]
    pub fn game_count(&self) -> usize {
        self.games.len()
    }

    /// Returns the user registered under `nickname`, creating it with `make`
    /// if the nickname is free. The flag tells whether a user was created.
    pub fn get_or_create_user<F>(&self, nickname: &str, make: F) -> (SharedUser, bool)
    where
        F: FnOnce(UserId) -> User,
    {
        match self.nicknames.entry(nickname.to_string()) {
            Entry::Occupied(entry) => {
                let id = *entry.get();
                match self.user(id) {
                    Some(user) => (user, false),
                    None => {
                        let user = Arc::new(Mutex::new(make(id)));
                        self.users.insert(id, Arc::clone(&user));
                        (user, true)
                    }
                }
            }
            Entry::Vacant(entry) => {
                let id = UserId(self.next_user_id.fetch_add(1, Ordering::Relaxed));
                let user = Arc::new(Mutex::new(make(id)));
                self.users.insert(id, Arc::clone(&user));
                entry.insert(id);
                (user, true)
            }
        }
    }

    #[inline]
    pub fn user(&self, id: UserId) -> Option<SharedUser> {
        self.users.get(&id).map(|u| Arc::clone(u.value()))
    }

    pub fn users(&self) -> Vec<SharedUser> {
        self.users.iter().map(|u| Arc::clone(u.value())).collect()
    }

    #[inline]
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    #[inline]
    pub fn put_thumbnail(&self, name: String, data: Bytes) {
        self.thumbnails.insert(name, data);
    }

    #[inline]
    pub fn thumbnail(&self, name: &str) -> Option<Bytes> {
        self.thumbnails.get(name).map(|t| t.value().clone())
    }
}
