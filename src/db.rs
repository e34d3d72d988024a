use crate::coordinate::Coordinate;
use crate::range_table::{RangeRecord, RangeTable};

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::num::{ParseFloatError, ParseIntError};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Default database file names, looked up in the configured data directory
pub const IPV4_DATABASE: &str = "IPDatabase.gz";
pub const IPV6_DATABASE: &str = "IPv6Database.gz";

#[derive(Error, Debug)]
pub enum DbError {
    #[error(r#"cannot read database file "{path}": {source}"#)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(r#"invalid record "{record}" in "{path}": {source}"#)]
    Record {
        path: PathBuf,
        record: String,
        #[source]
        source: RecordError,
    },
}

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("record must have 4 comma-separated fields, found {0}")]
    FieldCount(usize),
    #[error("range bound is not an unsigned integer: {0}")]
    Bound(#[from] ParseIntError),
    #[error("coordinate is not a number: {0}")]
    Coordinate(#[from] ParseFloatError),
}

pub fn database_exists<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().is_file()
}

/// Load a gzip-compressed range database, one `start,end,latitude,longitude`
/// record per line. Any malformed record fails the whole load: a partial
/// database would silently serve wrong geolocations.
pub fn load<K>(path: &Path) -> Result<RangeTable<K>, DbError>
where
    K: Copy + Ord + FromStr<Err = ParseIntError>,
{
    let file = File::open(path).map_err(|source| DbError::Io {
        path: path.to_owned(),
        source,
    })?;
    from_gzip_reader(file, path)
}

/// `path` is only used for error context
pub fn from_gzip_reader<K, R>(reader: R, path: &Path) -> Result<RangeTable<K>, DbError>
where
    K: Copy + Ord + FromStr<Err = ParseIntError>,
    R: Read,
{
    let buf_reader = BufReader::new(GzDecoder::new(reader));
    let mut records = Vec::new();
    for line in buf_reader.lines() {
        let line = line.map_err(|source| DbError::Io {
            path: path.to_owned(),
            source,
        })?;
        let record = line.trim_end_matches('\r');
        match record.parse() {
            Ok(record) => records.push(record),
            Err(source) => {
                return Err(DbError::Record {
                    path: path.to_owned(),
                    record: record.to_owned(),
                    source,
                })
            }
        }
    }
    Ok(RangeTable::from_records(records))
}

impl<K> FromStr for RangeRecord<K>
where
    K: FromStr<Err = ParseIntError>,
{
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(',').collect();
        let [start, end, latitude, longitude]: [&str; 4] = fields
            .try_into()
            .map_err(|fields: Vec<&str>| RecordError::FieldCount(fields.len()))?;
        Ok(Self {
            start: start.parse()?,
            end: end.parse()?,
            coordinate: Coordinate::new(latitude.parse()?, longitude.parse()?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn gzip(text: &str) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(text.as_bytes()).unwrap();
        encoder.finish().unwrap()
    }

    fn test_path() -> &'static Path {
        Path::new("test.gz")
    }

    #[test]
    fn loads_records() {
        let data = gzip("0,100,10.0,20.0\n101,200,30.0,40.0\n");
        let table: RangeTable<u32> = from_gzip_reader(data.as_slice(), test_path()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(50), Some(Coordinate::new(10.0, 20.0)));
        assert_eq!(table.get(150), Some(Coordinate::new(30.0, 40.0)));
        assert_eq!(table.get(250), None);
    }

    #[test]
    fn loads_crlf_and_negative_coordinates() {
        let data = gzip("16777216,16777471,-33.86,151.2\r\n");
        let table: RangeTable<u32> = from_gzip_reader(data.as_slice(), test_path()).unwrap();
        assert_eq!(table.get(16777300), Some(Coordinate::new(-33.86, 151.2)));
    }

    #[test]
    fn loads_128_bit_keys() {
        let key = 0x2001_0db8_u128 << 96;
        let data = gzip(&format!("{},{},51.5,-0.1\n", key, key + 1000));
        let table: RangeTable<u128> = from_gzip_reader(data.as_slice(), test_path()).unwrap();
        assert_eq!(table.get(key + 500), Some(Coordinate::new(51.5, -0.1)));
    }

    #[test]
    fn rejects_wrong_field_count() {
        let data = gzip("0,100,10.0\n");
        let error = from_gzip_reader::<u32, _>(data.as_slice(), test_path()).unwrap_err();
        match error {
            DbError::Record {
                record,
                source: RecordError::FieldCount(3),
                ..
            } => assert_eq!(record, "0,100,10.0"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_non_numeric_bound() {
        let data = gzip("zero,100,10.0,20.0\n");
        let error = from_gzip_reader::<u32, _>(data.as_slice(), test_path()).unwrap_err();
        assert!(matches!(
            error,
            DbError::Record {
                source: RecordError::Bound(_),
                ..
            }
        ));
    }

    #[test]
    fn rejects_non_numeric_coordinate() {
        let data = gzip("0,100,north,20.0\n");
        let error = from_gzip_reader::<u32, _>(data.as_slice(), test_path()).unwrap_err();
        assert!(matches!(
            error,
            DbError::Record {
                source: RecordError::Coordinate(_),
                ..
            }
        ));
    }

    #[test]
    fn one_bad_record_fails_the_load() {
        let data = gzip("0,100,10.0,20.0\n101,200,30.0\n201,300,50.0,60.0\n");
        assert!(from_gzip_reader::<u32, _>(data.as_slice(), test_path()).is_err());
    }

    #[test]
    fn rejects_non_gzip_input() {
        let error =
            from_gzip_reader::<u32, _>(b"0,100,10.0,20.0\n".as_slice(), test_path()).unwrap_err();
        assert!(matches!(error, DbError::Io { .. }));
    }

    #[test]
    fn missing_file() {
        let path = Path::new("no-such-directory/no-such-database.gz");
        assert!(!database_exists(path));
        assert!(matches!(load::<u32>(path).unwrap_err(), DbError::Io { .. }));
    }
}
