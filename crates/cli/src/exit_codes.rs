//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Description                                          |
//! |------|------------------------------------------------------|
//! | 0    | Success                                              |
//! | 1    | General error (unspecified)                          |
//! | 2    | CLI usage error (bad args)                           |
//! | 3    | Input could not be read (missing, too large, format) |
//! | 4    | Annex workbook could not be written                  |
//! | 5    | Invalid grid config                                  |
//! | 6    | Only a skeleton grid could be built (`--strict`)     |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Source file missing, unreadable, over the size limit or of an unknown type.
pub const EXIT_INGEST: u8 = 3;

/// Annex workbook could not be produced or saved.
pub const EXIT_EXPORT: u8 = 4;

/// Grid config failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 5;

/// Neither layout was recognized and `--strict` was given.
pub const EXIT_SKELETON: u8 = 6;
