//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`StoragePort`] (the setpoint slot) and [`ConfigPort`] (an
//! optional postcard-encoded [`SystemConfig`] override) for the irrigator.
//!
//! On target every call opens the namespace through `EspNvs` on the
//! default partition; `set_blob` commits before returning.  Host builds
//! keep slots in memory and count writes, so tests can assert flash wear
//! directly.

use crate::app::ports::{ConfigPort, StorageError, StoragePort};
use crate::config::SystemConfig;
use crate::error::Error;
use log::info;

#[cfg(not(target_os = "espidf"))]
use std::collections::BTreeMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs, NvsDefault};
#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::{ESP_ERR_NVS_NOT_ENOUGH_SPACE, ESP_ERR_NVS_NOT_FOUND, EspError};

const CONFIG_NAMESPACE: &str = "irrigator";
const CONFIG_KEY: &str = "syscfg";

/// Upper bound for the encoded config blob.
const MAX_CONFIG_BLOB: usize = 128;

pub struct NvsAdapter {
    #[cfg(target_os = "espidf")]
    partition: EspDefaultNvsPartition,
    #[cfg(not(target_os = "espidf"))]
    slots: BTreeMap<(String, String), Vec<u8>>,
    #[cfg(not(target_os = "espidf"))]
    writes: usize,
    #[cfg(not(target_os = "espidf"))]
    fail_writes: bool,
}

impl NvsAdapter {
    /// Take the default NVS partition.
    ///
    /// ESP-IDF erases and re-initialises the partition itself when it is
    /// full or was written by a newer layout.
    #[cfg(target_os = "espidf")]
    pub fn new() -> Result<Self, StorageError> {
        let partition = EspDefaultNvsPartition::take().map_err(|e| {
            log::error!("NvsAdapter: default partition unavailable ({})", e);
            StorageError::IoError
        })?;
        info!("NvsAdapter: ESP-IDF NVS ready");
        Ok(Self { partition })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Result<Self, StorageError> {
        info!("NvsAdapter: simulation backend");
        Ok(Self {
            slots: BTreeMap::new(),
            writes: 0,
            fail_writes: false,
        })
    }

    /// Successful writes since construction (simulation only).
    #[cfg(not(target_os = "espidf"))]
    pub fn write_count(&self) -> usize {
        self.writes
    }

    /// Make every subsequent write fail with `IoError` (simulation only).
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    #[cfg(not(target_os = "espidf"))]
    fn slot(namespace: &str, key: &str) -> (String, String) {
        (namespace.to_owned(), key.to_owned())
    }

    #[cfg(target_os = "espidf")]
    fn open(&self, namespace: &str, read_write: bool) -> Result<EspNvs<NvsDefault>, StorageError> {
        EspNvs::new(self.partition.clone(), namespace, read_write).map_err(map_esp_error)
    }
}

#[cfg(target_os = "espidf")]
fn map_esp_error(e: EspError) -> StorageError {
    match e.code() {
        c if c == ESP_ERR_NVS_NOT_FOUND as i32 => StorageError::NotFound,
        c if c == ESP_ERR_NVS_NOT_ENOUGH_SPACE as i32 => StorageError::Full,
        _ => StorageError::IoError,
    }
}

#[cfg(not(target_os = "espidf"))]
impl StoragePort for NvsAdapter {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        let data = self
            .slots
            .get(&Self::slot(namespace, key))
            .ok_or(StorageError::NotFound)?;
        let len = data.len().min(buf.len());
        buf[..len].copy_from_slice(&data[..len]);
        Ok(len)
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::IoError);
        }
        self.slots.insert(Self::slot(namespace, key), data.to_vec());
        self.writes += 1;
        Ok(())
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        self.slots.remove(&Self::slot(namespace, key));
        Ok(())
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.slots.contains_key(&Self::slot(namespace, key))
    }
}

#[cfg(target_os = "espidf")]
impl StoragePort for NvsAdapter {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        let nvs = self.open(namespace, false)?;
        match nvs.get_blob(key, buf).map_err(map_esp_error)? {
            Some(data) => Ok(data.len()),
            None => Err(StorageError::NotFound),
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        let mut nvs = self.open(namespace, true)?;
        nvs.set_blob(key, data).map_err(map_esp_error)
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        let mut nvs = self.open(namespace, true)?;
        nvs.remove(key).map(|_| ()).map_err(map_esp_error)
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.open(namespace, false)
            .and_then(|nvs| nvs.contains(key).map_err(map_esp_error))
            .unwrap_or(false)
    }
}

// ── Config override ───────────────────────────────────────────────
//
// The firmware runs on compiled-in defaults.  A bench tool may store a
// postcard-encoded override under `irrigator::syscfg`; it is only used
// when it decodes and validates.

impl ConfigPort for NvsAdapter {
    fn load(&self) -> Result<SystemConfig, Error> {
        let mut buf = [0u8; MAX_CONFIG_BLOB];
        match self.read(CONFIG_NAMESPACE, CONFIG_KEY, &mut buf) {
            Ok(len) => {
                let cfg: SystemConfig = postcard::from_bytes(&buf[..len])
                    .map_err(|_| Error::Config("stored config does not decode"))?;
                cfg.validate()?;
                info!("NvsAdapter: loaded config override ({} bytes)", len);
                Ok(cfg)
            }
            Err(StorageError::NotFound) => {
                info!("NvsAdapter: no stored config, using defaults");
                Ok(SystemConfig::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, config: &SystemConfig) -> Result<(), Error> {
        config.validate()?;
        let mut buf = [0u8; MAX_CONFIG_BLOB];
        let bytes = postcard::to_slice(config, &mut buf).map_err(|_| StorageError::Full)?;
        self.write(CONFIG_NAMESPACE, CONFIG_KEY, bytes)?;
        info!("NvsAdapter: config override saved ({} bytes)", bytes.len());
        Ok(())
    }
}
