//! Storage key conventions.
//!
//! These names are shared with the web dashboard's local storage so a
//! session written by one client reads back in the other.

pub const ACCESS_TOKEN: &str = "access_token";

pub const REFRESH_TOKEN: &str = "refresh_token";

pub const USER: &str = "user";

pub const THERAPEUTE_ID: &str = "therapeuteId";

pub const CURRENT_THERAPEUTE: &str = "currentTherapeute";

/// Every key written by a login; all of them are cleared on logout.
pub const SESSION_KEYS: [&str; 5] = [
    ACCESS_TOKEN,
    REFRESH_TOKEN,
    USER,
    THERAPEUTE_ID,
    CURRENT_THERAPEUTE,
];
