use async_trait::async_trait;
use bytes::Bytes;
use market_types::DAYS_PER_GAME;

use crate::types::{CompanySeed, DayEvents, EventSeed, GenerationError, Lineup};
use crate::{ContentGenerator, Result};

/// Offline generator that replays a fixed script.
///
/// Used by the demo binary when no API key is configured, and by tests that
/// need exact prices.
#[derive(Debug)]
pub struct ScriptedGenerator {
    companies: Vec<CompanySeed>,
    /// `percents[day - 1][company_index]`
    percents: Vec<Vec<i64>>,
    fail_on_day: Option<u32>,
}

impl ScriptedGenerator {
    pub fn new(companies: Vec<CompanySeed>, percents: Vec<Vec<i64>>) -> Self {
        Self {
            companies,
            percents,
            fail_on_day: None,
        }
    }

    /// A single company whose week follows `percents`; missing days are flat.
    pub fn single(name: &str, price: i64, percents: &[i64]) -> Self {
        let company = CompanySeed {
            key: "c1".to_string(),
            name: name.to_string(),
            description: format!("{name} makes things"),
            price,
        };
        let week = (0..DAYS_PER_GAME as usize)
            .map(|d| vec![percents.get(d).copied().unwrap_or(0)])
            .collect();

        Self::new(vec![company], week)
    }

    pub fn demo() -> Self {
        let companies = [
            ("Moonlight Bakery", "Croissants baked in low gravity", 320),
            ("Turbo Snail Logistics", "Fastest slow delivery in town", 150),
            ("Quantum Socks", "Socks that are never lost, only superposed", 540),
            ("Cloud Kitten Studios", "Streaming service for cat videos", 870),
            ("Volcano Coffee", "Espresso brewed with geothermal heat", 260),
        ]
        .into_iter()
        .enumerate()
        .map(|(i, (name, description, price))| CompanySeed {
            key: format!("c{}", i + 1),
            name: name.to_string(),
            description: description.to_string(),
            price,
        })
        .collect();

        let percents = vec![
            vec![12, -8, 5, 20, -3],
            vec![-15, 30, -2, -10, 7],
            vec![8, -20, 40, 5, -12],
            vec![-5, 10, -25, 15, 22],
            vec![30, -5, 3, -40, 9],
            vec![-12, 18, 10, 8, -30],
            vec![6, -9, -15, 25, 14],
        ];

        Self::new(companies, percents)
    }

    /// Makes `generate_day` fail for `day`, to exercise upstream failures.
    pub fn fail_on_day(mut self, day: u32) -> Self {
        self.fail_on_day = Some(day);
        self
    }
}

#[async_trait]
impl ContentGenerator for ScriptedGenerator {
    async fn generate_lineup(&self, theme: &str, _language: &str, _count: usize) -> Result<Lineup> {
        Ok(Lineup {
            title: format!("{theme} exchange"),
            companies: self.companies.clone(),
        })
    }

    async fn generate_day(
        &self,
        lineup: &Lineup,
        _prior_days: &[DayEvents],
        day: u32,
        _language: &str,
    ) -> Result<DayEvents> {
        if self.fail_on_day == Some(day) {
            return Err(GenerationError::malformed(format!("scripted failure on day {day}")));
        }

        let row = (day as usize)
            .checked_sub(1)
            .and_then(|i| self.percents.get(i))
            .ok_or_else(|| GenerationError::malformed(format!("no script for day {day}")))?;

        let events = lineup
            .companies
            .iter()
            .zip(row)
            .map(|(company, percent)| EventSeed {
                company_key: company.key.clone(),
                description: format!("{} moves {:+}% on day {}", company.name, percent, day),
                percent: *percent,
            })
            .collect();

        Ok(DayEvents { day, events })
    }

    async fn generate_thumbnail(&self, company: &CompanySeed) -> Result<Bytes> {
        Ok(Bytes::from(format!("thumbnail:{}", company.key)))
    }
}
