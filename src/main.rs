use anyhow::Context;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use content_gen::{ContentGenerator, OpenAiGenerator, ScriptedGenerator};
use game_engine::{GameEngine, GameView, ManualClock, Phase};
use market_types::{CompanyId, Gold, TradeRequest, UserId, DAYS_PER_GAME};
use stock_party::AppConfig;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Plays one full game between two scripted players on a fast-forwarded clock.
struct PartyDemo {
    engine: Arc<GameEngine>,
    clock: Arc<ManualClock>,
}

impl PartyDemo {
    fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let generator: Arc<dyn ContentGenerator> = if config.uses_remote_generator() {
            config.generator.validate()?;
            info!("Using {} at {}", config.generator.chat_model, config.generator.base_url);
            Arc::new(OpenAiGenerator::new(config.generator.clone())?)
        } else {
            info!("OPENAI_API_KEY not set, using the scripted generator");
            Arc::new(ScriptedGenerator::demo())
        };

        let clock = Arc::new(ManualClock::new(chrono::Utc::now()));
        let engine = Arc::new(GameEngine::with_clock(config.game.clone(), generator, clock.clone()));

        Ok(Self { engine, clock })
    }

    async fn run(&self, theme: &str) -> anyhow::Result<()> {
        let ada = self.engine.sign_in("ada", "ada-secret")?;
        let bob = self.engine.sign_in("bob", "bob-secret")?;

        let game = self.engine.create_game(theme, None).await?;
        info!("Game {} '{}' is open", game.id, game.title);
        for company in &game.companies {
            info!("  {} opens at {} gold: {}", company.name, company.price, company.description);
        }

        self.engine.join(game.id, ada.id)?;
        self.engine.join(game.id, bob.id)?;
        self.engine.start(game.id, ada.id)?;

        let interval = self.engine.config().day_interval_secs;
        for _ in 0..DAYS_PER_GAME {
            let view = self.engine.game(game.id)?;
            self.report(&view);
            self.momentum_trader(&view, ada.id);
            self.bargain_hunter(&view, bob.id);
            self.clock.advance_secs(interval);
        }

        let view = self.engine.game(game.id)?;
        self.report(&view);
        if view.phase != Phase::Closed {
            warn!("Game {} is still {} after the last reveal", game.id, view.phase);
            return Ok(());
        }

        let thrown = self.engine.throw_all(game.id, bob.id)?;
        info!("bob sold {} positions at closing prices", thrown.len());

        let result = self.engine.result(game.id)?;
        info!("=== Result ===");
        for (user_id, pnl) in result.standings() {
            let nickname = self.engine.user(user_id).map(|u| u.nickname).unwrap_or_default();
            info!("{:>6}: {:+} gold", nickname, pnl);
        }

        info!("=== Rankings ===");
        for (rank, user) in self.engine.rankings(10).iter().enumerate() {
            info!("{}. {} with {} gold", rank + 1, user.nickname, user.gold);
        }

        Ok(())
    }

    fn report(&self, view: &GameView) {
        let day = view.companies.first().map_or(0, |c| c.events.len());
        info!("--- Day {} ({}) ---", day, view.phase);
        for company in &view.companies {
            match company.events.last() {
                Some(event) => info!(
                    "  {:<24} {:>6} ({:+}%) {}",
                    company.name, company.price, event.percent, event.description
                ),
                None => info!("  {:<24} {:>6}", company.name, company.price),
            }
        }
    }

    /// Buys yesterday's best riser with a quarter of its gold and dumps fallers.
    fn momentum_trader(&self, view: &GameView, user_id: UserId) {
        let Some(me) = view.participant(user_id) else {
            return;
        };

        let mut requests: Vec<TradeRequest> = view
            .companies
            .iter()
            .filter(|c| last_move(&c.history) < 0)
            .filter_map(|c| {
                let held = me.holdings.get(c.id);
                (held > 0).then(|| TradeRequest::sell(c.id, held))
            })
            .collect();

        let riser = view
            .companies
            .iter()
            .filter(|c| last_move(&c.history) > 0)
            .max_by_key(|c| last_move(&c.history));
        if let Some(company) = riser {
            if let Some(buy) = spend(company.id, company.price, me.gold / 4) {
                requests.push(buy);
            }
        }

        self.submit("ada", view, user_id, &requests);
    }

    /// Puts a third of its gold into the cheapest stock every day.
    fn bargain_hunter(&self, view: &GameView, user_id: UserId) {
        let Some(me) = view.participant(user_id) else {
            return;
        };

        let cheapest = view.companies.iter().min_by_key(|c| c.price);
        let requests: Vec<TradeRequest> = cheapest
            .and_then(|c| spend(c.id, c.price, me.gold / 3))
            .into_iter()
            .collect();

        self.submit("bob", view, user_id, &requests);
    }

    fn submit(&self, nickname: &str, view: &GameView, user_id: UserId, requests: &[TradeRequest]) {
        if requests.is_empty() {
            return;
        }

        match self.engine.submit_trades(view.id, user_id, requests) {
            Ok(trades) => info!("{} settled {} trades", nickname, trades.len()),
            Err(e) => warn!("{} could not trade: {}", nickname, e),
        }
    }
}

fn last_move(history: &[Gold]) -> Gold {
    match history {
        [.., before, last] => last - before,
        _ => 0,
    }
}

fn spend(company_id: CompanyId, price: Gold, budget: Gold) -> Option<TradeRequest> {
    if price <= 0 {
        return None;
    }
    let shares = budget / price;
    (shares > 0).then(|| TradeRequest::buy(company_id, shares))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::load_from_file(&path).with_context(|| format!("loading {}", path))?,
        None => AppConfig::from_env(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .init();
    let metrics = PrometheusBuilder::new().install_recorder()?;

    info!("Starting Stock Party v{}", stock_party::VERSION);

    let theme = std::env::var("STOCK_PARTY_THEME")
        .unwrap_or_else(|_| "a city where every business is run by cats".to_string());

    let demo = PartyDemo::new(&config)?;
    demo.run(&theme).await?;

    if config.print_metrics {
        println!("{}", metrics.render());
    }

    info!("Stock Party demo complete");
    Ok(())
}
