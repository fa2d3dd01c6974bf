// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Static bot catalog and selection resolution.

use crate::models::bot::{BotCategory, BotDefinition};

const fn bot(
    name: &'static str,
    user_agent: &'static str,
    category: BotCategory,
) -> BotDefinition {
    BotDefinition {
        name,
        user_agent,
        category,
    }
}

/// Process-wide bot registry. Order within a category is the reporting order.
pub const CATALOG: &[BotDefinition] = &[
    // Google
    bot("Googlebot", "Mozilla/5.0 AppleWebKit/537.36 (KHTML, like Gecko; compatible; Googlebot/2.1; +http://www.google.com/bot.html) Chrome/125.0.0.0 Safari/537.36", BotCategory::Google),
    bot("Googlebot-Smartphone", "Mozilla/5.0 (Linux; Android 6.0.1; Nexus 5X Build/MMB29P) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Mobile Safari/537.36 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)", BotCategory::Google),
    bot("Googlebot-Image", "Googlebot-Image/1.0", BotCategory::Google),
    bot("Googlebot-News", "Googlebot-News", BotCategory::Google),
    bot("Googlebot-Video", "Googlebot-Video/1.0", BotCategory::Google),
    bot("Storebot-Google", "Mozilla/5.0 (X11; Linux x86_64; Storebot-Google/1.0) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36", BotCategory::Google),
    bot("Google-InspectionTool", "Mozilla/5.0 (compatible; Google-InspectionTool/1.0)", BotCategory::Google),
    bot("GoogleOther", "GoogleOther", BotCategory::Google),
    bot("AdsBot-Google", "AdsBot-Google (+http://www.google.com/adsbot.html)", BotCategory::Google),
    bot("Mediapartners-Google", "Mediapartners-Google", BotCategory::Google),
    // Yandex
    bot("YandexBot", "Mozilla/5.0 (compatible; YandexBot/3.0; +http://yandex.com/bots)", BotCategory::Yandex),
    bot("YandexMobileBot", "Mozilla/5.0 (iPhone; CPU iPhone OS 8_1 like Mac OS X) AppleWebKit/600.1.4 (KHTML, like Gecko) Version/8.0 Mobile/12B411 Safari/600.1.4 (compatible; YandexMobileBot/3.0; +http://yandex.com/bots)", BotCategory::Yandex),
    bot("YandexImages", "Mozilla/5.0 (compatible; YandexImages/3.0; +http://yandex.com/bots)", BotCategory::Yandex),
    bot("YandexVideo", "Mozilla/5.0 (compatible; YandexVideo/3.0; +http://yandex.com/bots)", BotCategory::Yandex),
    bot("YandexNews", "Mozilla/5.0 (compatible; YandexNews/4.0; +http://yandex.com/bots)", BotCategory::Yandex),
    bot("YandexMetrika", "Mozilla/5.0 (compatible; YandexMetrika/2.0; +http://yandex.com/bots yabs01)", BotCategory::Yandex),
    // Bing
    bot("Bingbot", "Mozilla/5.0 AppleWebKit/537.36 (KHTML, like Gecko; compatible; bingbot/2.0; +http://www.bing.com/bingbot.htm) Chrome/116.0.1938.76 Safari/537.36", BotCategory::Bing),
    bot("BingPreview", "Mozilla/5.0 (Windows NT 6.3; WOW64) AppleWebKit/537.36 (KHTML, like Gecko) BingPreview/1.0b", BotCategory::Bing),
    bot("AdIdxBot", "adidxbot/2.0 (+http://www.bing.com/bingbot.htm)", BotCategory::Bing),
    bot("MicrosoftPreview", "Mozilla/5.0 (compatible; MicrosoftPreview/2.0; +https://aka.ms/MicrosoftPreview)", BotCategory::Bing),
    // Search
    bot("DuckDuckBot", "DuckDuckBot/1.1; (+http://duckduckgo.com/duckduckbot.html)", BotCategory::Search),
    bot("Baiduspider", "Mozilla/5.0 (compatible; Baiduspider/2.0; +http://www.baidu.com/search/spider.html)", BotCategory::Search),
    bot("Slurp", "Mozilla/5.0 (compatible; Yahoo! Slurp; http://help.yahoo.com/help/us/ysearch/slurp)", BotCategory::Search),
    bot("SeznamBot", "Mozilla/5.0 (compatible; SeznamBot/4.0; +http://napoveda.seznam.cz/seznambot-intro/)", BotCategory::Search),
    bot("Applebot", "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.4 Safari/605.1.15 (Applebot/0.1; +http://www.apple.com/go/applebot)", BotCategory::Search),
    bot("PetalBot", "Mozilla/5.0 (compatible; PetalBot;+https://webmaster.petalsearch.com/site/petalbot)", BotCategory::Search),
    bot("Yeti", "Mozilla/5.0 (compatible; Yeti/1.1; +https://naver.me/spd)", BotCategory::Search),
    bot("MojeekBot", "Mozilla/5.0 (compatible; MojeekBot/0.11; +https://www.mojeek.com/bot.html)", BotCategory::Search),
    bot("Qwantbot", "Mozilla/5.0 (compatible; Qwantbot/1.0; +https://help.qwant.com/bot/)", BotCategory::Search),
    bot("CocCocBot", "Mozilla/5.0 (compatible; coccocbot-web/1.0; +http://help.coccoc.com/searchengine)", BotCategory::Search),
    // AI
    bot("GPTBot", "Mozilla/5.0 AppleWebKit/537.36 (KHTML, like Gecko); compatible; GPTBot/1.2; +https://openai.com/gptbot", BotCategory::Ai),
    bot("ChatGPT-User", "Mozilla/5.0 AppleWebKit/537.36 (KHTML, like Gecko); compatible; ChatGPT-User/1.0; +https://openai.com/bot", BotCategory::Ai),
    bot("OAI-SearchBot", "OAI-SearchBot/1.0; +https://openai.com/searchbot", BotCategory::Ai),
    bot("ClaudeBot", "Mozilla/5.0 AppleWebKit/537.36 (KHTML, like Gecko; compatible; ClaudeBot/1.0; +claudebot@anthropic.com)", BotCategory::Ai),
    bot("Claude-User", "Mozilla/5.0 AppleWebKit/537.36 (KHTML, like Gecko; compatible; Claude-User/1.0; +Claude-User@anthropic.com)", BotCategory::Ai),
    bot("PerplexityBot", "Mozilla/5.0 AppleWebKit/537.36 (KHTML, like Gecko; compatible; PerplexityBot/1.0; +https://perplexity.ai/perplexitybot)", BotCategory::Ai),
    bot("Perplexity-User", "Mozilla/5.0 AppleWebKit/537.36 (KHTML, like Gecko; compatible; Perplexity-User/1.0; +https://perplexity.ai/perplexity-user)", BotCategory::Ai),
    bot("CCBot", "CCBot/2.0 (https://commoncrawl.org/faq/)", BotCategory::Ai),
    bot("Bytespider", "Mozilla/5.0 (Linux; Android 5.0) AppleWebKit/537.36 (KHTML, like Gecko) Mobile Safari/537.36 (compatible; Bytespider; spider-feedback@bytedance.com)", BotCategory::Ai),
    bot("Amazonbot", "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_10_1) AppleWebKit/600.2.5 (KHTML, like Gecko) Version/8.0.2 Safari/600.2.5 (Amazonbot/0.1; +https://developer.amazon.com/support/amazonbot)", BotCategory::Ai),
    bot("Meta-ExternalAgent", "meta-externalagent/1.1 (+https://developers.facebook.com/docs/sharing/webmasters/crawler)", BotCategory::Ai),
    bot("Applebot-Extended", "Mozilla/5.0 (compatible; Applebot-Extended/0.1; +https://support.apple.com/en-us/119829)", BotCategory::Ai),
    bot("AI2Bot", "Mozilla/5.0 (compatible) AI2Bot (+https://www.allenai.org/crawler)", BotCategory::Ai),
    // SEO crawlers
    bot("AhrefsBot", "Mozilla/5.0 (compatible; AhrefsBot/7.0; +http://ahrefs.com/robot/)", BotCategory::SeoCrawler),
    bot("SemrushBot", "Mozilla/5.0 (compatible; SemrushBot/7~bl; +http://www.semrush.com/bot.html)", BotCategory::SeoCrawler),
    bot("SiteAuditBot", "Mozilla/5.0 (compatible; SiteAuditBot/0.97; +http://www.semrush.com/bot.html)", BotCategory::SeoCrawler),
    bot("MJ12bot", "Mozilla/5.0 (compatible; MJ12bot/v1.4.8; http://mj12bot.com/)", BotCategory::SeoCrawler),
    bot("DotBot", "Mozilla/5.0 (compatible; DotBot/1.2; +https://opensiteexplorer.org/dotbot; help@moz.com)", BotCategory::SeoCrawler),
    bot("Rogerbot", "rogerbot/1.2 (https://moz.com/help/guides/moz-procedures/what-is-rogerbot, rogerbot-crawler@moz.com)", BotCategory::SeoCrawler),
    bot("Screaming Frog SEO Spider", "Screaming Frog SEO Spider/19.4", BotCategory::SeoCrawler),
    bot("BLEXBot", "Mozilla/5.0 (compatible; BLEXBot/1.0; +http://webmeup-crawler.com/)", BotCategory::SeoCrawler),
    bot("DataForSeoBot", "Mozilla/5.0 (compatible; DataForSeoBot/1.0; +https://dataforseo.com/dataforseo-bot)", BotCategory::SeoCrawler),
    // Social
    bot("facebookexternalhit", "facebookexternalhit/1.1 (+http://www.facebook.com/externalhit_uatext.php)", BotCategory::Social),
    bot("Facebot", "Facebot/1.0", BotCategory::Social),
    bot("Twitterbot", "Twitterbot/1.0", BotCategory::Social),
    bot("LinkedInBot", "LinkedInBot/1.0 (compatible; Mozilla/5.0; Apache-HttpClient +http://www.linkedin.com)", BotCategory::Social),
    bot("Pinterestbot", "Mozilla/5.0 (compatible; Pinterestbot/1.0; +https://www.pinterest.com/bot.html)", BotCategory::Social),
    bot("Slackbot", "Slackbot-LinkExpanding 1.0 (+https://api.slack.com/robots)", BotCategory::Social),
    bot("TelegramBot", "TelegramBot (like TwitterBot)", BotCategory::Social),
    bot("WhatsApp", "WhatsApp/2.23.20.0", BotCategory::Social),
    bot("Discordbot", "Mozilla/5.0 (compatible; Discordbot/2.0; +https://discordapp.com)", BotCategory::Social),
    bot("Redditbot", "Mozilla/5.0 (compatible; redditbot/1.0; +http://www.reddit.com/feedback)", BotCategory::Social),
];

/// High-value bots probed when the caller selects nothing
pub const DEFAULT_BOTS: &[&str] = &[
    "Googlebot",
    "Googlebot-Smartphone",
    "Bingbot",
    "YandexBot",
    "DuckDuckBot",
    "GPTBot",
    "ChatGPT-User",
    "ClaudeBot",
    "PerplexityBot",
];

/// Categories covered by a named bot group, or None for an unknown group
pub fn group_categories(group: &str) -> Option<&'static [BotCategory]> {
    match group.to_lowercase().as_str() {
        "search" => Some(&[
            BotCategory::Google,
            BotCategory::Yandex,
            BotCategory::Bing,
            BotCategory::Search,
        ]),
        "ai" => Some(&[BotCategory::Ai]),
        "crawlers" => Some(&[BotCategory::SeoCrawler, BotCategory::Social]),
        _ => None,
    }
}

/// Resolve the caller's selection to catalog entries.
///
/// Selection is the union of explicit names (case-insensitive) and group
/// expansions; unknown names and groups are silently dropped. An empty
/// selection falls back to DEFAULT_BOTS. Catalog order is preserved.
pub fn resolve_bots(
    selected_bots: &[String],
    bot_groups: &[String],
) -> Vec<&'static BotDefinition> {
    let names: Vec<String> = selected_bots.iter().map(|n| n.to_lowercase()).collect();
    let categories: Vec<BotCategory> = bot_groups
        .iter()
        .filter_map(|g| group_categories(g))
        .flat_map(|cats| cats.iter().copied())
        .collect();

    let picked: Vec<&'static BotDefinition> = CATALOG
        .iter()
        .filter(|b| {
            names.iter().any(|n| n == &b.name.to_lowercase())
                || categories.contains(&b.category)
        })
        .collect();

    if !picked.is_empty() {
        return picked;
    }
    if !selected_bots.is_empty() || !bot_groups.is_empty() {
        // Every provided name/group was unknown; fall through to defaults
        eprintln!("No known bots in selection, using the default bot list");
    }
    CATALOG
        .iter()
        .filter(|b| DEFAULT_BOTS.contains(&b.name))
        .collect()
}

/// Look up a catalog entry by case-insensitive name
pub fn find_bot(name: &str) -> Option<&'static BotDefinition> {
    CATALOG
        .iter()
        .find(|b| b.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_names_are_unique() {
        let mut seen = HashSet::new();
        for bot in CATALOG {
            assert!(seen.insert(bot.name), "duplicate bot name: {}", bot.name);
        }
    }

    #[test]
    fn test_catalog_size_is_about_sixty() {
        assert!(CATALOG.len() >= 55 && CATALOG.len() <= 70, "catalog has {} bots", CATALOG.len());
    }

    #[test]
    fn test_default_bots_exist_in_catalog() {
        for name in DEFAULT_BOTS {
            assert!(find_bot(name).is_some(), "default bot {} missing", name);
        }
        assert_eq!(DEFAULT_BOTS.len(), 9);
    }

    #[test]
    fn test_empty_selection_falls_back_to_defaults() {
        let bots = resolve_bots(&[], &[]);
        assert_eq!(bots.len(), DEFAULT_BOTS.len());
    }

    #[test]
    fn test_unknown_names_are_dropped() {
        let bots = resolve_bots(
            &["Googlebot".to_string(), "NotARealBot".to_string()],
            &[],
        );
        assert_eq!(bots.len(), 1);
        assert_eq!(bots[0].name, "Googlebot");
    }

    #[test]
    fn test_names_are_case_insensitive() {
        let bots = resolve_bots(&["gptbot".to_string()], &[]);
        assert_eq!(bots.len(), 1);
        assert_eq!(bots[0].name, "GPTBot");
    }

    #[test]
    fn test_group_expansion_unions_with_names() {
        let bots = resolve_bots(&["AhrefsBot".to_string()], &["ai".to_string()]);
        assert!(bots.iter().any(|b| b.name == "AhrefsBot"));
        assert!(bots.iter().any(|b| b.name == "GPTBot"));
        assert!(bots
            .iter()
            .all(|b| b.category == BotCategory::Ai || b.name == "AhrefsBot"));
    }

    #[test]
    fn test_search_group_covers_engine_categories() {
        let bots = resolve_bots(&[], &["search".to_string()]);
        let cats: HashSet<BotCategory> = bots.iter().map(|b| b.category).collect();
        assert!(cats.contains(&BotCategory::Google));
        assert!(cats.contains(&BotCategory::Yandex));
        assert!(cats.contains(&BotCategory::Bing));
        assert!(cats.contains(&BotCategory::Search));
        assert!(!cats.contains(&BotCategory::Ai));
    }
}
