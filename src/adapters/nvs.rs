//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`ConfigPort`] for the GarageWatch configuration.  The whole
//! [`DoorConfig`] is stored as one postcard blob under a single key.
//!
//! - Validation: every field is range-checked before persistence and after
//!   load, so a blob written by an older build cannot sneak out-of-range
//!   values past boot.
//! - Atomic writes: ESP-IDF NVS commits are atomic per `nvs_commit()`.
//! - The simulation backend is an in-memory map (dev/test only).

use log::info;
#[cfg(target_os = "espidf")]
use log::warn;

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::DoorConfig;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
const CONFIG_NAMESPACE: &[u8] = b"garagewatch\0";
#[cfg(target_os = "espidf")]
const CONFIG_KEY: &[u8] = b"doorcfg\0";
#[cfg(target_os = "espidf")]
const MAX_BLOB_SIZE: usize = 1024;

pub struct NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    blob: std::cell::RefCell<Option<Vec<u8>>>,
}

impl NvsAdapter {
    /// Initialise NVS flash.
    ///
    /// On first boot or after a version mismatch the partition is erased
    /// and re-initialised.
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: called once from the main task before any other NVS
            // access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK || unsafe { nvs_flash_init() } != ESP_OK {
                    return Err(ConfigError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(ConfigError::IoError);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            blob: std::cell::RefCell::new(None),
        })
    }

    /// Load the stored config, falling back to defaults on any error.
    pub fn load_or_default(&self) -> DoorConfig {
        match self.load() {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("NvsAdapter: {}, using defaults", e);
                DoorConfig::default()
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_blob(&self) -> Result<Option<Vec<u8>>, ConfigError> {
        Ok(self.blob.borrow().clone())
    }

    #[cfg(not(target_os = "espidf"))]
    fn write_blob(&self, bytes: Vec<u8>) -> Result<(), ConfigError> {
        *self.blob.borrow_mut() = Some(bytes);
        Ok(())
    }

    /// Open the config namespace, run `f` with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_handle<F, T>(write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };
        // SAFETY: namespace is NUL-terminated and `handle` outlives the call.
        let ret = unsafe { nvs_open(CONFIG_NAMESPACE.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }
        let result = f(handle);
        unsafe { nvs_close(handle) };
        result
    }

    #[cfg(target_os = "espidf")]
    fn read_blob(&self) -> Result<Option<Vec<u8>>, ConfigError> {
        let result = Self::with_handle(false, |handle| {
            let mut size: usize = 0;
            // First call: size only.
            let ret = unsafe {
                nvs_get_blob(handle, CONFIG_KEY.as_ptr() as *const _, core::ptr::null_mut(), &mut size)
            };
            if ret != ESP_OK {
                return Err(ret);
            }
            if size == 0 || size > MAX_BLOB_SIZE {
                return Err(ESP_ERR_NVS_INVALID_LENGTH);
            }
            let mut buf = vec![0u8; size];
            let ret = unsafe {
                nvs_get_blob(
                    handle,
                    CONFIG_KEY.as_ptr() as *const _,
                    buf.as_mut_ptr() as *mut _,
                    &mut size,
                )
            };
            if ret != ESP_OK {
                return Err(ret);
            }
            Ok(buf)
        });
        match result {
            Ok(bytes) => Ok(Some(bytes)),
            // A missing namespace or key both mean "never saved".
            Err(e) if e == ESP_ERR_NVS_NOT_FOUND => Ok(None),
            Err(ESP_ERR_NVS_INVALID_LENGTH) => Err(ConfigError::Corrupted),
            Err(e) => {
                warn!("NvsAdapter: NVS read error {}", e);
                Err(ConfigError::IoError)
            }
        }
    }

    #[cfg(target_os = "espidf")]
    fn write_blob(&self, bytes: Vec<u8>) -> Result<(), ConfigError> {
        Self::with_handle(true, |handle| {
            let ret = unsafe {
                nvs_set_blob(
                    handle,
                    CONFIG_KEY.as_ptr() as *const _,
                    bytes.as_ptr() as *const _,
                    bytes.len(),
                )
            };
            if ret != ESP_OK {
                return Err(ret);
            }
            let ret = unsafe { nvs_commit(handle) };
            if ret != ESP_OK {
                return Err(ret);
            }
            Ok(())
        })
        .map_err(|e| {
            warn!("NvsAdapter: NVS write error {}", e);
            ConfigError::IoError
        })
    }
}

impl ConfigPort for NvsAdapter {
    fn load(&self) -> Result<DoorConfig, ConfigError> {
        match self.read_blob()? {
            Some(bytes) => {
                let cfg: DoorConfig =
                    postcard::from_bytes(&bytes).map_err(|_| ConfigError::Corrupted)?;
                cfg.validate()?;
                info!("NvsAdapter: loaded config ({} bytes)", bytes.len());
                Ok(cfg)
            }
            None => {
                info!("NvsAdapter: no stored config, using defaults");
                Ok(DoorConfig::default())
            }
        }
    }

    fn save(&self, config: &DoorConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
        let len = bytes.len();
        self.write_blob(bytes)?;
        info!("NvsAdapter: config saved ({} bytes)", len);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn missing_blob_loads_defaults() {
        let nvs = NvsAdapter::new().unwrap();
        assert_eq!(nvs.load().unwrap(), DoorConfig::default());
    }

    #[test]
    fn save_then_load() {
        let nvs = NvsAdapter::new().unwrap();
        let cfg = DoorConfig {
            trigger_time: NaiveTime::from_hms_opt(21, 30, 0).unwrap(),
            notification_delay_secs: 600,
            ..Default::default()
        };
        nvs.save(&cfg).unwrap();
        assert_eq!(nvs.load().unwrap(), cfg);
    }

    #[test]
    fn invalid_config_is_not_persisted() {
        let nvs = NvsAdapter::new().unwrap();
        let cfg = DoorConfig {
            relay_pulse_ms: 10,
            ..Default::default()
        };
        assert!(matches!(nvs.save(&cfg), Err(ConfigError::ValidationFailed(_))));
        assert_eq!(nvs.load().unwrap(), DoorConfig::default());
    }

    #[test]
    fn corrupted_blob_falls_back_to_defaults() {
        let nvs = NvsAdapter::new().unwrap();
        nvs.write_blob(vec![0xFF; 3]).unwrap();
        assert_eq!(nvs.load(), Err(ConfigError::Corrupted));
        assert_eq!(nvs.load_or_default(), DoorConfig::default());
    }
}
