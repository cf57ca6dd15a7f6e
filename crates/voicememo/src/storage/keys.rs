//! Key layout of the persistent store.
//!
//! | key | value |
//! |---|---|
//! | `users` | JSON array of users |
//! | `session.email` | email of the logged-in user |
//! | `recordings.<email>` | JSON array of recordings |
//! | `profile.<email>.firstName` | first name |
//! | `profile.<email>.lastName` | last name |

/// Registered users.
pub const USERS: &str = "users";

/// Email of the logged-in user.
pub const SESSION_EMAIL: &str = "session.email";

const RECORDINGS_PREFIX: &str = "recordings.";
const PROFILE_PREFIX: &str = "profile.";

/// Recording list partition for a user.
#[must_use]
pub fn recordings(email: &str) -> String {
    format!("{RECORDINGS_PREFIX}{email}")
}

/// Stored first name for a user.
#[must_use]
pub fn profile_first_name(email: &str) -> String {
    format!("{PROFILE_PREFIX}{email}.firstName")
}

/// Stored last name for a user.
#[must_use]
pub fn profile_last_name(email: &str) -> String {
    format!("{PROFILE_PREFIX}{email}.lastName")
}
