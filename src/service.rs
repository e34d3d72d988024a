use crate::connection::ConnectionGeo;
use crate::coordinate::Coordinate;
use crate::geo::{GeoIp, LookupError};
use crate::public_address::{PublicAddress, PublicAddressError};
use crate::trace::RouteTracer;

use std::net::IpAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;

#[derive(Error, Debug)]
pub enum LocationError {
    /// Fatal to every geolocation feature: the host should disable them for
    /// the session instead of retrying.
    #[error("cannot determine the public address of this machine: {0}")]
    PublicAddressUnavailable(#[source] PublicAddressError),
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

/// Shared geolocation state: the loaded databases, the collaborators, and
/// the write-once location of this machine.
pub struct GeoService {
    geoip: GeoIp,
    public_address: Arc<dyn PublicAddress>,
    tracer: Arc<dyn RouteTracer>,
    location: OnceCell<Coordinate>,
}

impl GeoService {
    pub fn new(
        geoip: GeoIp,
        public_address: Arc<dyn PublicAddress>,
        tracer: Arc<dyn RouteTracer>,
    ) -> Self {
        Self {
            geoip,
            public_address,
            tracer,
            location: OnceCell::new(),
        }
    }

    pub fn geoip(&self) -> &GeoIp {
        &self.geoip
    }

    pub(crate) fn tracer(&self) -> &dyn RouteTracer {
        self.tracer.as_ref()
    }

    /// Lookup for addresses arriving from the network: IPv4-mapped IPv6
    /// addresses are folded onto the IPv4 table first.
    pub fn lookup(&self, address: IpAddr) -> Result<Coordinate, LookupError> {
        self.geoip.try_lookup(address.to_canonical())
    }

    /// Location of this machine, fetched and resolved once per process and
    /// cached for the rest of its lifetime. Concurrent first callers share
    /// a single in-flight computation. There is no refresh path: staleness
    /// after a mid-session public-address change is accepted.
    pub async fn current_location(&self) -> Result<Coordinate, LocationError> {
        self.location
            .get_or_try_init(|| async {
                let address = self
                    .public_address
                    .public_address()
                    .await
                    .map_err(LocationError::PublicAddressUnavailable)?;
                log::info!("public address is {address}");
                Ok(self.lookup(address)?)
            })
            .await
            .copied()
    }

    /// Best-available value for latency-critical callers: never blocks,
    /// `None` until the first `current_location` call completes.
    pub fn cached_location(&self) -> Option<Coordinate> {
        self.location.get().copied()
    }

    pub fn connection(self: &Arc<Self>, remote: IpAddr) -> ConnectionGeo {
        ConnectionGeo::new(Arc::clone(self), remote)
    }
}
