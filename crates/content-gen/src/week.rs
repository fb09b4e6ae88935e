use crate::types::{DayEvents, GenerationError, Lineup};
use crate::{ContentGenerator, Result};
use market_types::DAYS_PER_GAME;
use std::collections::HashSet;
use tracing::debug;

/// Checks a lineup before anything is built from it.
pub fn validate_lineup(lineup: &Lineup, expected_companies: usize) -> Result<()> {
    if lineup.companies.len() != expected_companies {
        return Err(GenerationError::malformed(format!(
            "expected {} companies, got {}",
            expected_companies,
            lineup.companies.len()
        )));
    }

    let mut keys = HashSet::new();
    for company in &lineup.companies {
        if company.name.trim().is_empty() {
            return Err(GenerationError::malformed(format!("company {} has no name", company.key)));
        }
        if company.price <= 0 {
            return Err(GenerationError::malformed(format!(
                "company {} has non-positive price {}",
                company.name, company.price
            )));
        }
        if !keys.insert(company.key.as_str()) {
            return Err(GenerationError::malformed(format!("duplicate company key {}", company.key)));
        }
    }

    Ok(())
}

/// Puts one generated day into lineup order, requiring exactly one event per company.
pub fn align_day(lineup: &Lineup, day: u32, generated: DayEvents) -> Result<DayEvents> {
    let mut seen = HashSet::new();
    for event in &generated.events {
        if lineup.company(&event.company_key).is_none() {
            return Err(GenerationError::malformed(format!(
                "day {} names unknown company key {}",
                day, event.company_key
            )));
        }
        if !seen.insert(event.company_key.as_str()) {
            return Err(GenerationError::malformed(format!(
                "day {} has more than one event for {}",
                day, event.company_key
            )));
        }
    }

    let mut events = Vec::with_capacity(lineup.companies.len());
    for company in &lineup.companies {
        let event = generated.event_for(&company.key).ok_or_else(|| {
            GenerationError::malformed(format!("day {} has no event for {}", day, company.name))
        })?;
        events.push(event.clone());
    }

    Ok(DayEvents { day, events })
}

/// Generates the full week one day at a time, feeding earlier days back as context.
pub async fn generate_week(
    generator: &dyn ContentGenerator,
    lineup: &Lineup,
    language: &str,
) -> Result<Vec<DayEvents>> {
    let mut days: Vec<DayEvents> = Vec::with_capacity(DAYS_PER_GAME as usize);

    for day in 1..=DAYS_PER_GAME {
        let generated = generator.generate_day(lineup, &days, day, language).await?;
        days.push(align_day(lineup, day, generated)?);
        debug!("Generated day {} of '{}'", day, lineup.title);
    }

    Ok(days)
}
