//! Operator workflows

pub mod automated;
pub mod collections;
pub mod listings;
pub mod loans;
pub mod single_offer;

use arcade::{Currency, BID_LIFETIME_PRESETS, SUPPORTED_CURRENCIES};

use crate::prompt::{Prompt, Step};

/// Human label for a bid lifetime in minutes
pub fn lifetime_label(minutes: u64) -> String {
    match minutes {
        m if m % 60 == 0 && m >= 120 => format!("{} hours", m / 60),
        60 => "1 hour".to_string(),
        m => format!("{} minutes", m),
    }
}

pub async fn ask_currency<R>(prompt: &mut Prompt<R>) -> anyhow::Result<Step<&'static Currency>>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    let codes: Vec<&str> = SUPPORTED_CURRENCIES.iter().map(|c| c.code).collect();
    Ok(prompt
        .select("Currency:", codes.as_slice())
        .await?
        .map(|i| &SUPPORTED_CURRENCIES[i]))
}

pub async fn ask_bid_lifetime<R>(prompt: &mut Prompt<R>) -> anyhow::Result<Step<u64>>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    let labels: Vec<String> = BID_LIFETIME_PRESETS.iter().map(|m| lifetime_label(*m)).collect();
    Ok(prompt
        .select("How long should the bid stay alive?", labels.as_slice())
        .await?
        .map(|i| BID_LIFETIME_PRESETS[i]))
}

/// Positive whole number of days
pub fn parse_duration_days(answer: &str) -> Result<i64, String> {
    match answer.parse::<i64>() {
        Ok(days) if days > 0 => arcade::validate_duration_days(days)
            .map(|_| days)
            .map_err(|e| e.to_string()),
        _ => Err("Enter a positive whole number of days".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifetime_labels() {
        let labels: Vec<_> = BID_LIFETIME_PRESETS.iter().map(|m| lifetime_label(*m)).collect();
        assert_eq!(
            labels,
            vec![
                "15 minutes",
                "30 minutes",
                "1 hour",
                "2 hours",
                "6 hours",
                "12 hours",
                "24 hours"
            ]
        );
    }

    #[test]
    fn test_parse_duration_days() {
        assert_eq!(parse_duration_days("30"), Ok(30));
        assert!(parse_duration_days("0").is_err());
        assert!(parse_duration_days("1.5").is_err());
        assert!(parse_duration_days("300000000000000").is_err());
    }
}
