//! SDP service record loading.
//!
//! The record is opaque XML handed to bluetoothd unchanged.  A default
//! keyboard record is compiled into the binary; an operator can supply a
//! different one with `--service-record` or `bluetooth.service_record`.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

/// The built-in HID keyboard record.
pub const DEFAULT_SERVICE_RECORD: &str = include_str!("../../assets/service_record.xml");

#[derive(Debug, Error)]
pub enum ServiceRecordError {
    #[error("cannot read service record {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("service record {path} is empty")]
    Empty { path: PathBuf },
    #[error("service record {path} does not declare the HID service class 0x1124")]
    NotHid { path: PathBuf },
}

/// Returns the record at `path`, or the built-in record for `None`.
///
/// # Errors
///
/// [`ServiceRecordError`] if the file cannot be read, is blank, or does not
/// mention the HID service class.
pub fn load_service_record(path: Option<&Path>) -> Result<String, ServiceRecordError> {
    let Some(path) = path else {
        return Ok(DEFAULT_SERVICE_RECORD.to_string());
    };

    let xml = std::fs::read_to_string(path).map_err(|source| ServiceRecordError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    validate(&xml, path)?;
    info!(path = %path.display(), "loaded service record");
    Ok(xml)
}

fn validate(xml: &str, path: &Path) -> Result<(), ServiceRecordError> {
    if xml.trim().is_empty() {
        return Err(ServiceRecordError::Empty {
            path: path.to_path_buf(),
        });
    }
    let lower = xml.to_ascii_lowercase();
    if !lower.contains("0x1124") && !lower.contains("00001124-0000-1000-8000-00805f9b34fb") {
        return Err(ServiceRecordError::NotHid {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}
