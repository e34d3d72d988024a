pub use error::LookupError;

mod error;

use crate::config::Config;
use crate::coordinate::Coordinate;
use crate::db::{self, DbError};
use crate::range_table::RangeTable;

use std::net::IpAddr;

/// Offline geolocation over the IPv4 and IPv6 range databases. Tables are
/// immutable once loaded; lookups are pure reads, safe under any concurrency.
pub struct GeoIp {
    ipv4: Option<RangeTable<u32>>,
    ipv6: Option<RangeTable<u128>>,
}

impl GeoIp {
    pub fn new(ipv4: Option<RangeTable<u32>>, ipv6: Option<RangeTable<u128>>) -> Self {
        Self { ipv4, ipv6 }
    }

    /// One-shot initialization the host must run before any lookups. The
    /// IPv4 database is required; the IPv6 one is loaded when explicitly
    /// configured or present at its default location.
    pub async fn load(config: &Config) -> Result<Self, DbError> {
        let ipv4_path = config.ipv4_database_path();
        let ipv6_path = config.ipv6_database_path();
        let ipv6_required = config.ipv6_database.is_some();
        tokio::task::spawn_blocking(move || {
            let ipv4 = db::load(&ipv4_path)?;
            log::info!(
                "loaded {} IPv4 ranges from {}",
                ipv4.len(),
                ipv4_path.display()
            );
            let ipv6 = if ipv6_required || db::database_exists(&ipv6_path) {
                let table = db::load(&ipv6_path)?;
                log::info!(
                    "loaded {} IPv6 ranges from {}",
                    table.len(),
                    ipv6_path.display()
                );
                Some(table)
            } else {
                log::info!(
                    "no IPv6 database at {}, IPv6 lookups unavailable",
                    ipv6_path.display()
                );
                None
            };
            Ok(Self::new(Some(ipv4), ipv6))
        })
        .await
        .expect("database loading task panicked")
    }

    /// Address bytes are interpreted most-significant-byte-first regardless
    /// of host endianness: std's `u32`/`u128` conversions are defined over
    /// network byte order. Each family queries its own table only.
    pub fn try_lookup(&self, address: IpAddr) -> Result<Coordinate, LookupError> {
        match address {
            IpAddr::V4(ip) => Self::lookup_table(self.ipv4.as_ref(), u32::from(ip)),
            IpAddr::V6(ip) => Self::lookup_table(self.ipv6.as_ref(), u128::from(ip)),
        }
    }

    pub fn try_lookup_str(&self, address: &str) -> Result<Coordinate, LookupError> {
        let address: IpAddr = address.parse()?;
        self.try_lookup(address)
    }

    fn lookup_table<K>(table: Option<&RangeTable<K>>, key: K) -> Result<Coordinate, LookupError>
    where
        K: Copy + Ord,
    {
        table
            .ok_or(LookupError::DatabaseUnavailable)?
            .get(key)
            .ok_or(LookupError::NotFound)
    }
}
