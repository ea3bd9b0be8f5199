//! Application constants
//!
//! Centralized defaults for networking, caching, and the user-facing strings
//! used when live data is unavailable.

/// Network defaults
pub mod net {
    /// Default per-request timeout (milliseconds)
    pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;

    /// Accepted timeout range (milliseconds, inclusive)
    pub const MIN_TIMEOUT_MS: u64 = 1_000;
    pub const MAX_TIMEOUT_MS: u64 = 60_000;

    /// Default interval between periodic health probes (milliseconds)
    pub const DEFAULT_HEALTH_INTERVAL_MS: u64 = 30_000;

    pub const MIN_HEALTH_INTERVAL_MS: u64 = 1_000;
    pub const MAX_HEALTH_INTERVAL_MS: u64 = 3_600_000;

    /// Body marker a healthy backend reports in `status`
    pub const HEALTHY_MARKER: &str = "healthy";

    /// Development backend
    pub const DEV_BASE_URL: &str = "http://127.0.0.1:8000";

    /// Production backend
    pub const PROD_BASE_URL: &str = "https://api.breastfriendforever.app";
}

/// Offline cache defaults
pub mod cache {
    /// Namespace prefix for cache generations
    pub const NAMESPACE: &str = "bff";

    /// Generation tag shipped with this build
    ///
    /// Bumping it at deploy time drops every entry written under an older tag.
    pub const DEFAULT_GENERATION: &str = "v2.1.0";

    /// Default SQLite file for the persistent store
    pub const DEFAULT_DB_PATH: &str = "./bff_cache.db";

    /// Path segment that marks API data (network-first)
    pub const API_PATH_SEGMENT: &str = "/api/";
}

/// User-facing message strings
pub mod messages {
    /// Reply used when the chat backend cannot be reached
    pub const CHAT_FALLBACK: &str = "I'm having trouble connecting right now. \
        Please check your connection and try again. In the meantime, remember \
        that monthly self-exams and regular screenings are your best tools for \
        early detection. 💖";

    /// Greeting used when the greeting endpoint cannot be reached
    pub const GREETING_FALLBACK: &str = "Hello! I'm your breast health companion. \
        Ask me about self-exams, screening, or finding a hospital near you. 💖";

    /// Error text in a synthesized offline response
    pub const OFFLINE_ERROR: &str = "You are offline";

    /// Longer message in a synthesized offline response
    pub const OFFLINE_MESSAGE: &str = "Live data is unavailable. Showing saved information where possible.";

    /// Suggestions attached to a synthesized offline response
    pub const OFFLINE_SUGGESTIONS: [&str; 2] = ["Check connection", "Try again later"];

    /// Default category for posted encouragement
    pub const DEFAULT_ENCOURAGEMENT_TYPE: &str = "💖 General Support";

    /// Default chat conversation id
    pub const ANONYMOUS_CONVERSATION: &str = "anonymous";
}
