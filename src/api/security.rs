//! API key gate and CORS origin policy.
//!
//! Both are pure lookups built once from configuration: no clock, no I/O,
//! no side effects. A failed check surfaces as a 401 or an absent CORS
//! header, never as an error path.

use std::collections::HashSet;

/// Membership check against the configured comma-separated key list.
#[derive(Debug, Clone, Default)]
pub struct ApiKeyValidator {
    keys: HashSet<String>,
}

impl ApiKeyValidator {
    /// Build from a comma-separated list. Entries are trimmed; empty entries
    /// are ignored, so an unset config rejects every key.
    pub fn from_list(list: &str) -> Self {
        let keys = list
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect();
        Self { keys }
    }

    pub fn validate(&self, key: Option<&str>) -> bool {
        match key {
            Some(key) => self.keys.contains(key.trim()),
            None => false,
        }
    }
}

/// Origin allow-list with wildcard-subdomain support.
///
/// Entries: exact origins (`https://app.example.com`), wildcard suffixes
/// (`*.example.com`), or `*` to allow everything.
#[derive(Debug, Clone, Default)]
pub struct OriginPolicy {
    rules: Vec<OriginRule>,
}

#[derive(Debug, Clone)]
enum OriginRule {
    Any,
    Exact(String),
    Suffix(String),
}

impl OriginPolicy {
    pub fn from_list(list: &str) -> Self {
        let rules = list
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                if entry == "*" {
                    OriginRule::Any
                } else if let Some(domain) = entry.strip_prefix("*.") {
                    OriginRule::Suffix(domain.to_string())
                } else {
                    OriginRule::Exact(entry.to_string())
                }
            })
            .collect();
        Self { rules }
    }

    pub fn is_allowed(&self, origin: &str) -> bool {
        if origin.is_empty() {
            return false;
        }
        self.rules.iter().any(|rule| match rule {
            OriginRule::Any => true,
            OriginRule::Exact(allowed) => origin == allowed,
            OriginRule::Suffix(domain) => origin.ends_with(domain.as_str()),
        })
    }
}
