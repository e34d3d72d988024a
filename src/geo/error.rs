use std::net::AddrParseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("not a valid IP address: {0}")]
    Addr(#[from] AddrParseError),
    /// Valid address outside all known ranges. An ordinary outcome, not a
    /// failure: callers omit the point instead of reporting an error.
    #[error("address is outside all known ranges")]
    NotFound,
    #[error("no database is loaded for this address family")]
    DatabaseUnavailable,
}
