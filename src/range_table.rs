use crate::coordinate::Coordinate;

/// One `[start, end)` block of numeric address space mapped to a coordinate
#[derive(Clone, Copy, Debug)]
pub struct RangeRecord<K> {
    pub start: K,
    pub end: K,
    pub coordinate: Coordinate,
}

/// Sorted, non-overlapping ranges over a numeric address space, queried by
/// binary search. Built once, read-only afterwards.
#[derive(Clone, Debug)]
pub struct RangeTable<K> {
    starts: Vec<K>,
    ends: Vec<K>,
    coordinates: Vec<Coordinate>,
}

impl<K> RangeTable<K>
where
    K: Copy + Ord,
{
    /// Records may arrive in any order; they are sorted by range start here
    pub fn from_records(mut records: Vec<RangeRecord<K>>) -> Self {
        records.sort_unstable_by_key(|record| record.start);
        let mut starts = Vec::with_capacity(records.len());
        let mut ends = Vec::with_capacity(records.len());
        let mut coordinates = Vec::with_capacity(records.len());
        for record in records {
            starts.push(record.start);
            ends.push(record.end);
            coordinates.push(record.coordinate);
        }
        Self {
            starts,
            ends,
            coordinates,
        }
    }

    pub fn get(&self, key: K) -> Option<Coordinate> {
        let index = match self.starts.binary_search(&key) {
            Ok(index) => index,
            Err(0) => return None,
            Err(index) => index - 1,
        };
        // starts[index] <= key, match iff key is below the exclusive end
        if key < self.ends[index] {
            Some(self.coordinates[index])
        } else {
            None
        }
    }

    pub fn contains(&self, key: K) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record<K>(start: K, end: K, latitude: f64, longitude: f64) -> RangeRecord<K> {
        RangeRecord {
            start,
            end,
            coordinate: Coordinate::new(latitude, longitude),
        }
    }

    #[test]
    fn empty() {
        let table: RangeTable<u32> = RangeTable::from_records(vec![]);
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
        assert_eq!(table.get(0), None);
        assert_eq!(table.get(u32::MAX), None);
    }

    #[test]
    fn two_ranges() {
        let table = RangeTable::from_records(vec![
            record(0u32, 100, 10.0, 20.0),
            record(101, 200, 30.0, 40.0),
        ]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(50), Some(Coordinate::new(10.0, 20.0)));
        assert_eq!(table.get(150), Some(Coordinate::new(30.0, 40.0)));
        assert_eq!(table.get(250), None);
    }

    #[test]
    fn half_open_bounds() {
        let table = RangeTable::from_records(vec![
            record(0u32, 100, 10.0, 20.0),
            record(101, 200, 30.0, 40.0),
        ]);
        // lower bound inclusive, upper bound exclusive
        assert_eq!(table.get(0), Some(Coordinate::new(10.0, 20.0)));
        assert_eq!(table.get(99), Some(Coordinate::new(10.0, 20.0)));
        assert_eq!(table.get(100), None);
        assert_eq!(table.get(101), Some(Coordinate::new(30.0, 40.0)));
        assert_eq!(table.get(200), None);
    }

    #[test]
    fn unsorted_input() {
        let table = RangeTable::from_records(vec![
            record(400u32, 500, 3.0, 3.0),
            record(0, 100, 1.0, 1.0),
            record(200, 300, 2.0, 2.0),
        ]);
        assert_eq!(table.get(50), Some(Coordinate::new(1.0, 1.0)));
        assert_eq!(table.get(250), Some(Coordinate::new(2.0, 2.0)));
        assert_eq!(table.get(450), Some(Coordinate::new(3.0, 3.0)));
        assert_eq!(table.get(150), None);
        assert_eq!(table.get(350), None);
    }

    #[test]
    fn wide_keys() {
        let table = RangeTable::from_records(vec![record(
            1u128 << 64,
            1u128 << 65,
            -33.9,
            18.4,
        )]);
        assert_eq!(table.get(1u128 << 64), Some(Coordinate::new(-33.9, 18.4)));
        assert_eq!(table.get((1u128 << 65) - 1), Some(Coordinate::new(-33.9, 18.4)));
        assert_eq!(table.get((1u128 << 64) - 1), None);
        assert_eq!(table.get(1u128 << 65), None);
    }
}
