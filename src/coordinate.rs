use smallvec::SmallVec;

/// Geographic point in decimal degrees. `(0.0, 0.0)` marks "no geolocation
/// available" in the range databases and is dropped from displayed routes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }
}

/// Two-point "ray" from the local machine to a remote endpoint
pub type RayPoints = SmallVec<[Coordinate; 2]>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_sentinel() {
        assert!(Coordinate::new(0.0, 0.0).is_unknown());
        assert!(!Coordinate::new(0.0, 10.0).is_unknown());
        assert!(!Coordinate::new(10.0, 0.0).is_unknown());
        assert!(!Coordinate::new(48.8, 2.3).is_unknown());
    }
}
