use super::types::{ChatMessage, DayPayload, EventPayload, LineupPayload};
use crate::types::{CompanySeed, DayEvents, EventSeed, GenerationError, Lineup};

const LINEUP_FORMAT: &str = r#"{
    "title": "A short catchy title for this market",
    "companies": [{
        "name": "Name of the company",
        "description": "Brief description of the company",
        "price": "Current stock price, a whole number between 100 and 1000"
    }]
}"#;

const DAY_FORMAT: &str = r#"{
    "events": [{
        "key": "The company key in square brackets",
        "company": "Company name",
        "description": "What happened",
        "percent": "Stock price change as a whole percentage, negative for drops"
    }]
}"#;

pub fn lineup_messages(theme: &str, language: &str, count: usize) -> Vec<ChatMessage> {
    vec![ChatMessage::user(format!(
        "Create {count} imaginary companies with very short descriptions, themed around: {theme}.\n\
         You can go wild! Come up with some fun concepts!\n\
         All text must be written in language '{language}'.\n\
         Answer in JSON with this format:\n{LINEUP_FORMAT}"
    ))]
}

fn company_listing(lineup: &Lineup) -> String {
    lineup
        .companies
        .iter()
        .map(|c| format!("[{}] {} ({} Gold): {}", c.key, c.name, c.price, c.description))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Conversation for `day`: the setup, every earlier day as a question/answer
/// pair, then the question for the new day.
pub fn day_messages(
    lineup: &Lineup,
    prior_days: &[DayEvents],
    day: u32,
    language: &str,
) -> Result<Vec<ChatMessage>, GenerationError> {
    let mut messages = vec![ChatMessage::user(format!(
        "We are playing a stock price game with these companies:\n\n{}\n\n\
         Each day, every company gets exactly one event and a stock price change caused by it.\n\
         All text must be written in language '{language}'.\n\
         Answer in JSON with this format:\n{DAY_FORMAT}",
        company_listing(lineup)
    ))];

    for prior in prior_days {
        let events: Vec<EventPayload> = prior
            .events
            .iter()
            .map(|e| EventPayload {
                key: Some(e.company_key.clone()),
                company: lineup.company(&e.company_key).map(|c| c.name.clone()),
                description: e.description.clone(),
                percent: e.percent as f64,
            })
            .collect();

        messages.push(ChatMessage::user(format!("Day {}", prior.day)));
        messages.push(ChatMessage::assistant(serde_json::to_string_pretty(
            &serde_json::json!({ "events": events }),
        )?));
    }

    messages.push(ChatMessage::user(format!("Day {day}")));
    Ok(messages)
}

pub fn thumbnail_prompt(company: &CompanySeed) -> String {
    format!(
        "Create an image thumbnail for the following company. Name: {}, Description: {}",
        company.name, company.description
    )
}

pub fn into_lineup(payload: LineupPayload, theme: &str) -> Lineup {
    let title = payload
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| theme.to_string());

    let companies = payload
        .companies
        .into_iter()
        .enumerate()
        .map(|(i, c)| CompanySeed {
            key: format!("c{}", i + 1),
            name: c.name.trim().to_string(),
            description: c.description.trim().to_string(),
            price: c.price as i64,
        })
        .collect();

    Lineup { title, companies }
}

/// Attaches each generated event to a company, by key first and by name as a fallback.
pub fn into_day(payload: DayPayload, lineup: &Lineup, day: u32) -> Result<DayEvents, GenerationError> {
    let events = payload
        .events
        .into_iter()
        .map(|e| {
            let by_key = e
                .key
                .as_deref()
                .map(|k| k.trim_matches(|c: char| c == '[' || c == ']' || c.is_whitespace()))
                .and_then(|k| lineup.company(k));
            let by_name = || {
                e.company
                    .as_deref()
                    .and_then(|name| lineup.companies.iter().find(|c| c.name == name.trim()))
            };

            let company = by_key.or_else(by_name).ok_or_else(|| {
                GenerationError::malformed(format!(
                    "day {day} event for unknown company (key {:?}, name {:?})",
                    e.key, e.company
                ))
            })?;

            Ok(EventSeed {
                company_key: company.key.clone(),
                description: e.description.trim().to_string(),
                percent: e.percent as i64,
            })
        })
        .collect::<Result<Vec<_>, GenerationError>>()?;

    Ok(DayEvents { day, events })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lineup() -> Lineup {
        Lineup {
            title: "Snacks".into(),
            companies: vec![
                CompanySeed { key: "c1".into(), name: "Crunchy".into(), description: "chips".into(), price: 120 },
                CompanySeed { key: "c2".into(), name: "Fizz".into(), description: "soda".into(), price: 300 },
            ],
        }
    }

    #[test]
    fn test_lineup_keys_are_assigned_in_order() {
        let payload: LineupPayload = serde_json::from_str(
            r#"{"companies": [
                {"name": " Crunchy ", "description": "chips", "price": 120.7},
                {"name": "Fizz", "price": 300}
            ]}"#,
        )
        .unwrap();

        let lineup = into_lineup(payload, "snack wars");
        assert_eq!(lineup.title, "snack wars");
        assert_eq!(lineup.companies[0].key, "c1");
        assert_eq!(lineup.companies[0].name, "Crunchy");
        assert_eq!(lineup.companies[0].price, 120);
        assert_eq!(lineup.companies[1].key, "c2");
    }

    #[test]
    fn test_day_events_resolve_by_key_then_name() {
        let payload: DayPayload = serde_json::from_str(
            r#"{"events": [
                {"company": "Fizz", "description": "recall", "price": -12.5},
                {"key": "[c1]", "description": "viral ad", "percent": 30}
            ]}"#,
        )
        .unwrap();

        let day = into_day(payload, &lineup(), 1).unwrap();
        assert_eq!(day.event_for("c2").unwrap().percent, -12);
        assert_eq!(day.event_for("c1").unwrap().description, "viral ad");
    }

    #[test]
    fn test_unknown_company_is_malformed() {
        let payload: DayPayload =
            serde_json::from_str(r#"{"events": [{"company": "Nobody", "percent": 5}]}"#).unwrap();

        let err = into_day(payload, &lineup(), 3).unwrap_err();
        assert!(matches!(err, GenerationError::Malformed(_)));
    }

    #[test]
    fn test_prior_days_become_conversation_turns() {
        let prior = vec![DayEvents {
            day: 1,
            events: vec![EventSeed { company_key: "c1".into(), description: "launch".into(), percent: 10 }],
        }];

        let messages = day_messages(&lineup(), &prior, 2, "ko").unwrap();
        assert_eq!(messages.len(), 4);
        assert!(messages[0].content.contains("[c1] Crunchy (120 Gold): chips"));
        assert_eq!(messages[1], ChatMessage::user("Day 1"));
        assert_eq!(messages[2].role, "assistant");
        assert!(messages[2].content.contains("launch"));
        assert_eq!(messages[3], ChatMessage::user("Day 2"));
    }
}
