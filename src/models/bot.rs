// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use serde::{Deserialize, Serialize};

/// Coarse bot grouping used for weighting and SLA targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BotCategory {
    Google,
    Yandex,
    Bing,
    Search,
    #[serde(rename = "AI")]
    Ai,
    #[serde(rename = "SEO Crawler")]
    SeoCrawler,
    Social,
}

impl BotCategory {
    /// All categories in their canonical (reporting) order
    pub const ALL: [BotCategory; 7] = [
        BotCategory::Google,
        BotCategory::Yandex,
        BotCategory::Bing,
        BotCategory::Search,
        BotCategory::Ai,
        BotCategory::SeoCrawler,
        BotCategory::Social,
    ];
}

impl std::fmt::Display for BotCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BotCategory::Google => write!(f, "Google"),
            BotCategory::Yandex => write!(f, "Yandex"),
            BotCategory::Bing => write!(f, "Bing"),
            BotCategory::Search => write!(f, "Search"),
            BotCategory::Ai => write!(f, "AI"),
            BotCategory::SeoCrawler => write!(f, "SEO Crawler"),
            BotCategory::Social => write!(f, "Social"),
        }
    }
}

/// A single catalog entry: a named HTTP client identity the target site may
/// treat specially
#[derive(Debug, Clone, Copy)]
pub struct BotDefinition {
    /// Unique bot name, e.g. "Googlebot"
    pub name: &'static str,
    /// Identifying User-Agent string sent with the probe
    pub user_agent: &'static str,
    pub category: BotCategory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_display_matches_serde() {
        for category in BotCategory::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category));
        }
    }

    #[test]
    fn test_category_order_is_reporting_order() {
        assert!(BotCategory::Google < BotCategory::Yandex);
        assert!(BotCategory::Search < BotCategory::Ai);
        assert!(BotCategory::SeoCrawler < BotCategory::Social);
    }
}
