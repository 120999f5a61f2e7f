/// Minimum password length, counted in characters
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Minimum number of ASCII letters in a password
pub const MIN_PASSWORD_LETTERS: usize = 4;

/// Minimum number of ASCII digits in a password
pub const MIN_PASSWORD_DIGITS: usize = 3;

/// Minimum number of special characters in a password
pub const MIN_PASSWORD_SPECIALS: usize = 1;

/// Characters that count towards the special-character rule
pub const PASSWORD_SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Maximum username length in characters
pub const MAX_USERNAME_LENGTH: usize = 64;

/// Name of the session cookie
pub const SESSION_COOKIE_NAME: &str = "fingerspell_session";

/// Session token length in bytes before hex encoding
pub const SESSION_TOKEN_BYTES: usize = 32;

// =============================================================================
// User-facing messages
// =============================================================================

pub const MSG_ACCOUNT_CREATED: &str = "Account created successfully! Please log in.";

pub const MSG_USERNAME_TAKEN: &str = "Username already exists";

pub const MSG_INVALID_CREDENTIALS: &str = "Invalid credentials";

pub const MSG_LOGIN_LOCKED: &str = "Too many failed attempts";

pub const MSG_STORE_FAILURE: &str = "Database error occurred.";

pub const MSG_LOWERCASE_WARNING: &str = "Please type English letters in ALL CAPS.";

pub const ERR_USERNAME_FORMAT: &str =
    "Username must be 1-64 characters without control characters";
