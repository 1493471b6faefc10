//! ─── SwapX Protocol Constants ───────────────────────────────────────────────

/// Hard cap on a single `get_stashes` / `get_events` page. Requests asking
/// for more are clamped, never rejected.
pub const MAX_PAGE_LIMIT: usize = 1_000;

/// Byte length of the canonical lock-id encoding:
/// tag(1) + token(20) + sender(20) + recipient(20) + hashed_secret(32) + timeout(8).
pub const LOCK_ENCODING_LEN: usize = 101;
