pub mod types;
pub mod price_infra;
pub mod engine;
pub mod error;
pub mod config;
pub mod observability;
pub mod interfaces;
pub mod render;
pub mod utils;

// Process exit statuses (sysexits.h)
pub const EXIT_DATAERR: u8 = 65;  // upstream payload no longer parseable
pub const EXIT_CONFIG: u8 = 78;   // invalid configuration
