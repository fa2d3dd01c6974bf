// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Retry, criticality-weight, and SLA profile tables.

use crate::models::bot::BotCategory;
use crate::models::config::RetryProfile;
use std::time::Duration;

/// Resolve a retry profile by name; unknown names fall back to "standard"
pub fn retry_profile(name: &str) -> RetryProfile {
    match name.to_lowercase().as_str() {
        "strict" => RetryProfile {
            name: "strict",
            retries: 1,
            backoff_secs: 0.2,
            timeout: Duration::from_secs(10),
        },
        "aggressive" => RetryProfile {
            name: "aggressive",
            retries: 4,
            backoff_secs: 0.6,
            timeout: Duration::from_secs(22),
        },
        _ => RetryProfile {
            name: "standard",
            retries: 2,
            backoff_secs: 0.4,
            timeout: Duration::from_secs(15),
        },
    }
}

/// Category criticality weight in [0, 1] for priority scoring.
/// Unknown profile names fall back to "balanced".
pub fn criticality_weight(profile: &str, category: BotCategory) -> f64 {
    match profile.to_lowercase().as_str() {
        "search_first" => match category {
            BotCategory::Google => 1.0,
            BotCategory::Bing => 0.9,
            BotCategory::Yandex => 0.9,
            BotCategory::Search => 0.8,
            BotCategory::Ai => 0.4,
            BotCategory::SeoCrawler => 0.2,
            BotCategory::Social => 0.3,
        },
        "ai_first" => match category {
            BotCategory::Google => 0.7,
            BotCategory::Bing => 0.6,
            BotCategory::Yandex => 0.5,
            BotCategory::Search => 0.5,
            BotCategory::Ai => 1.0,
            BotCategory::SeoCrawler => 0.2,
            BotCategory::Social => 0.3,
        },
        _ => match category {
            BotCategory::Google => 1.0,
            BotCategory::Bing => 0.8,
            BotCategory::Yandex => 0.7,
            BotCategory::Search => 0.6,
            BotCategory::Ai => 0.8,
            BotCategory::SeoCrawler => 0.3,
            BotCategory::Social => 0.4,
        },
    }
}

/// Category SLA target as a percentage of indexable bots.
/// Unknown profile names fall back to "standard".
pub fn sla_target_pct(profile: &str, category: BotCategory) -> f64 {
    match profile.to_lowercase().as_str() {
        "strict" => match category {
            BotCategory::Google => 99.0,
            BotCategory::Bing => 97.0,
            BotCategory::Yandex => 95.0,
            BotCategory::Search => 90.0,
            BotCategory::Ai => 90.0,
            BotCategory::SeoCrawler => 70.0,
            BotCategory::Social => 80.0,
        },
        _ => match category {
            BotCategory::Google => 95.0,
            BotCategory::Bing => 90.0,
            BotCategory::Yandex => 85.0,
            BotCategory::Search => 80.0,
            BotCategory::Ai => 75.0,
            BotCategory::SeoCrawler => 50.0,
            BotCategory::Social => 60.0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_profiles() {
        let strict = retry_profile("strict");
        assert_eq!(strict.retries, 1);
        assert_eq!(strict.timeout, Duration::from_secs(10));

        let standard = retry_profile("standard");
        assert_eq!(standard.retries, 2);
        assert_eq!(standard.backoff_secs, 0.4);

        let aggressive = retry_profile("aggressive");
        assert_eq!(aggressive.retries, 4);
        assert_eq!(aggressive.timeout, Duration::from_secs(22));
    }

    #[test]
    fn test_unknown_retry_profile_falls_back_to_standard() {
        assert_eq!(retry_profile("nope").name, "standard");
    }

    #[test]
    fn test_weights_stay_in_unit_interval() {
        for profile in ["balanced", "search_first", "ai_first"] {
            for category in BotCategory::ALL {
                let w = criticality_weight(profile, category);
                assert!((0.0..=1.0).contains(&w));
            }
        }
    }

    #[test]
    fn test_ai_first_puts_ai_on_top() {
        assert_eq!(criticality_weight("ai_first", BotCategory::Ai), 1.0);
        assert!(
            criticality_weight("ai_first", BotCategory::Ai)
                > criticality_weight("ai_first", BotCategory::Google)
        );
    }

    #[test]
    fn test_strict_sla_is_tighter_than_standard() {
        for category in BotCategory::ALL {
            assert!(sla_target_pct("strict", category) >= sla_target_pct("standard", category));
        }
    }
}
