//! Address lookups against the local database.

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use maxminddb::Reader;

use crate::error_handling::LookupError;

use super::types::LocationRecord;

/// Resolves an address to a location using the database at `path`.
///
/// An address with no entry in the database is not an error; it yields an
/// empty record.
pub trait LocationSource: Send + Sync {
    fn locate(&self, path: &Path, ip: &str) -> Result<LocationRecord, LookupError>;
}

struct OpenDatabase {
    path: PathBuf,
    modified: SystemTime,
    reader: Arc<Reader<Vec<u8>>>,
}

/// MaxMind reader that keeps the opened database in memory.
///
/// The database is reopened whenever the file's modification time changes,
/// so a refreshed file is picked up without a restart.
#[derive(Default)]
pub struct MaxMindReader {
    open: RwLock<Option<OpenDatabase>>,
}

impl MaxMindReader {
    pub fn new() -> Self {
        Self::default()
    }

    fn reader_for(&self, path: &Path) -> Result<Arc<Reader<Vec<u8>>>, LookupError> {
        let read_error = |source| LookupError::Read {
            path: path.to_path_buf(),
            source,
        };
        let modified = std::fs::metadata(path)
            .and_then(|metadata| metadata.modified())
            .map_err(read_error)?;

        // A poisoned lock only costs a reopen
        if let Ok(open) = self.open.read() {
            if let Some(db) = open.as_ref() {
                if db.path == path && db.modified == modified {
                    return Ok(Arc::clone(&db.reader));
                }
            }
        }

        log::info!("Opening location database: {}", path.display());
        let bytes = std::fs::read(path).map_err(read_error)?;
        let reader = Arc::new(Reader::from_source(bytes)?);

        if let Ok(mut open) = self.open.write() {
            *open = Some(OpenDatabase {
                path: path.to_path_buf(),
                modified,
                reader: Arc::clone(&reader),
            });
        }
        Ok(reader)
    }
}

impl LocationSource for MaxMindReader {
    fn locate(&self, path: &Path, ip: &str) -> Result<LocationRecord, LookupError> {
        let ip_addr: IpAddr = ip
            .trim()
            .parse()
            .map_err(|_| LookupError::InvalidAddress(ip.to_string()))?;

        let reader = self.reader_for(path)?;

        // maxminddb 0.27: lookup() then has_data()/decode()
        let lookup = reader.lookup(ip_addr)?;
        if !lookup.has_data() {
            log::debug!("No location entry for {}", ip_addr);
            return Ok(LocationRecord::default());
        }
        let city: maxminddb::geoip2::City = match lookup.decode()? {
            Some(city) => city,
            None => return Ok(LocationRecord::default()),
        };

        let record = LocationRecord {
            city: city.city.names.english.map(|s| s.to_string()),
            region: city
                .subdivisions
                .first()
                .and_then(|subdivision| subdivision.names.english)
                .map(|s| s.to_string()),
            country: city.country.names.english.map(|s| s.to_string()),
        };
        log::debug!("Located {} at {}", ip_addr, record.display_name());
        Ok(record)
    }
}
