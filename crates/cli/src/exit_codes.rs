//! CLI Exit Code Registry
//!
//! This is the single source of truth for all `hhrr` exit codes.
//! Exit codes are part of the shell contract: import jobs in cron or CI
//! branch on them.
//!
//! # Exit Codes
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success                                              |
//! | 1    | General error (unspecified)                          |
//! | 2    | Usage error (bad args, unreadable input file)        |
//! | 3    | Import config failed to parse or validate            |
//! | 4    | Spreadsheet could not be parsed                      |
//! | 5    | Store could not be opened or queried                 |
//! | 6    | Import finished but some rows were rejected          |
//! | 7    | Import cancelled (timeout) before all rows were read |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant below
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing or unreadable input file.
pub const EXIT_USAGE: u8 = 2;

/// Config TOML did not parse, or failed validation.
pub const EXIT_CONFIG_INVALID: u8 = 3;

/// Spreadsheet bytes could not be decoded into rows.
pub const EXIT_PARSE: u8 = 4;

/// Database could not be opened, seeded or listed.
/// Per-row write failures are reported as rejections instead.
pub const EXIT_STORE: u8 = 5;

/// Import ran to completion with at least one rejected row.
pub const EXIT_REJECTED_ROWS: u8 = 6;

/// Import stopped early by `--timeout-secs`. Takes precedence over 6.
pub const EXIT_CANCELLED: u8 = 7;
