//! Process exit statuses, numbered after sysexits(3)

pub const OK: i32 = 0;

/// Bad flags, missing command or unparsable argument
pub const USAGE: i32 = 64;

/// Model content rejected: unknown element, wrong field, broken interchange file
pub const DATAERR: i32 = 65;

/// Store file does not exist
pub const NOINPUT: i32 = 66;

pub const IOERR: i32 = 74;

/// Settings file or environment override rejected
pub const CONFIG: i32 = 78;
