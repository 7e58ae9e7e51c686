//! Route classification for the cache router.
//!
//! Every intercepted GET is classified into exactly one policy by an
//! ordered rule table: authenticated and account routes bypass the cache
//! entirely, static assets are served cache-first, and everything else is
//! network-first with opportunistic caching. Keeping the rules as data
//! makes the policy unit-testable without any fetch plumbing.

/// Routes that must never be answered from the static cache:
/// authentication, session, account, and API surfaces.
pub const DEFAULT_BYPASS: &[&str] = &[
    "/auth/",
    "/login",
    "/logout",
    "/setup",
    "/admin",
    "/delete_account",
    "/api/",
    "session",
    "account",
    "settings",
    "dashboard",
];

/// Path prefix identifying precacheable static assets.
pub const DEFAULT_STATIC_MARKER: &str = "/static/";

/// What the router does with a request once classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutePolicy {
    /// Never answer from the static cache; network with dynamic fallback.
    Bypass,
    /// Serve the precached static entry when present, network on a miss.
    CacheFirst,
    /// Network, caching 200 responses; cached fallback when offline.
    NetworkFirst,
}

/// How a rule matches a request path.
///
/// `Contains` is the historical exclusion-list semantics: bare words like
/// `settings` match anywhere in the path, which over-matches paths such as
/// `/static/assets/settings-icon.png`. That behavior is intentional until
/// the route list itself is tightened (see DESIGN.md).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutePattern {
    Contains(String),
    Prefix(String),
}

impl RoutePattern {
    pub fn matches(&self, path: &str) -> bool {
        match self {
            RoutePattern::Contains(needle) => path.contains(needle.as_str()),
            RoutePattern::Prefix(prefix) => path.starts_with(prefix.as_str()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RouteRule {
    pub pattern: RoutePattern,
    pub policy: RoutePolicy,
}

impl RouteRule {
    pub fn contains(needle: impl Into<String>, policy: RoutePolicy) -> Self {
        Self {
            pattern: RoutePattern::Contains(needle.into()),
            policy,
        }
    }

    pub fn prefix(prefix: impl Into<String>, policy: RoutePolicy) -> Self {
        Self {
            pattern: RoutePattern::Prefix(prefix.into()),
            policy,
        }
    }
}

/// Ordered rule table; the first matching rule wins and unmatched paths
/// fall through to the default policy.
#[derive(Debug, Clone)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
    default: RoutePolicy,
}

impl RouteTable {
    pub fn new(rules: Vec<RouteRule>, default: RoutePolicy) -> Self {
        Self { rules, default }
    }

    pub fn classify(&self, path: &str) -> RoutePolicy {
        self.rules
            .iter()
            .find(|rule| rule.pattern.matches(path))
            .map(|rule| rule.policy)
            .unwrap_or(self.default)
    }

    /// The TodoBox table: the exclusion list of authenticated and dynamic
    /// routes first, then the static-asset rule, then network-first.
    pub fn todobox_defaults() -> Self {
        let bypass: Vec<String> = DEFAULT_BYPASS.iter().map(|s| s.to_string()).collect();
        Self::from_lists(&bypass, DEFAULT_STATIC_MARKER)
    }

    /// Build a table from a configured exclusion list and static marker.
    /// Exclusion entries keep substring matching; the static rule is a
    /// path prefix.
    pub fn from_lists(bypass: &[String], static_marker: &str) -> Self {
        let mut rules: Vec<RouteRule> = bypass
            .iter()
            .map(|needle| RouteRule::contains(needle.clone(), RoutePolicy::Bypass))
            .collect();
        rules.push(RouteRule::prefix(static_marker, RoutePolicy::CacheFirst));
        Self::new(rules, RoutePolicy::NetworkFirst)
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::todobox_defaults()
    }
}
