// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use serde::ser::Serializer;
use serde::Serialize;

/// Tri-state robots verdict. Unknown means robots.txt was unreachable or no
/// user-agent group matched the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobotsAllowed {
    Allowed,
    Disallowed,
    Unknown,
}

impl RobotsAllowed {
    pub fn is_disallowed(&self) -> bool {
        matches!(self, RobotsAllowed::Disallowed)
    }
}

// Serialized as true / false / "unknown" to keep the document shape the
// report consumers expect.
impl Serialize for RobotsAllowed {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RobotsAllowed::Allowed => serializer.serialize_bool(true),
            RobotsAllowed::Disallowed => serializer.serialize_bool(false),
            RobotsAllowed::Unknown => serializer.serialize_str("unknown"),
        }
    }
}

/// Outcome of evaluating robots.txt for one bot and one path
#[derive(Debug, Clone, Serialize)]
pub struct RobotsEvaluation {
    pub allowed: RobotsAllowed,
    /// The user-agent line of the group that matched, if any
    pub matched_user_agent: Option<String>,
    /// "allow", "disallow", or "none"
    pub matched_rule: String,
    pub matched_pattern: Option<String>,
    /// Human-readable one-liner for the evidence pack
    pub explain: String,
}

impl RobotsEvaluation {
    /// Verdict used when robots.txt could not be fetched
    pub fn unavailable() -> Self {
        Self {
            allowed: RobotsAllowed::Unknown,
            matched_user_agent: None,
            matched_rule: "none".to_string(),
            matched_pattern: None,
            explain: "robots.txt unavailable".to_string(),
        }
    }

    /// Verdict used when no user-agent group matches the bot
    pub fn no_matching_group() -> Self {
        Self {
            allowed: RobotsAllowed::Unknown,
            matched_user_agent: None,
            matched_rule: "none".to_string(),
            matched_pattern: None,
            explain: "no matching user-agent group".to_string(),
        }
    }
}

/// Fetch-level robots.txt facts surfaced in the result document
#[derive(Debug, Clone, Serialize)]
pub struct RobotsReport {
    pub found: bool,
    pub status_code: Option<u16>,
    /// Sitemap: directives seen during the parse
    pub sitemaps: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_serializes_as_tri_state() {
        assert_eq!(serde_json::to_string(&RobotsAllowed::Allowed).unwrap(), "true");
        assert_eq!(
            serde_json::to_string(&RobotsAllowed::Disallowed).unwrap(),
            "false"
        );
        assert_eq!(
            serde_json::to_string(&RobotsAllowed::Unknown).unwrap(),
            "\"unknown\""
        );
    }

    #[test]
    fn test_unavailable_has_unknown_verdict() {
        let eval = RobotsEvaluation::unavailable();
        assert_eq!(eval.allowed, RobotsAllowed::Unknown);
        assert_eq!(eval.matched_rule, "none");
    }
}
