//! Append-only audit log on flash.
//!
//! One `timestamp,tag` line per [`AuditEntry`], flushed with `sync_data`
//! before returning.  On ESP the file lives on a SPIFFS partition mounted
//! at `/spiffs` through the VFS layer.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use chrono::NaiveDateTime;

use crate::app::ports::{AuditLogPort, ClockPort};
use crate::door::messages::TIMESTAMP_FORMAT;
use crate::door::AuditEntry;

/// Render one CSV line (with trailing newline).  An unsynced clock writes
/// an empty timestamp column rather than a bogus date.
pub fn format_line(at: Option<NaiveDateTime>, entry: AuditEntry) -> String {
    match at {
        Some(t) => format!("{},{}\n", t.format(TIMESTAMP_FORMAT), entry),
        None => format!(",{}\n", entry),
    }
}

pub struct FileAuditLog<C: ClockPort> {
    path: PathBuf,
    clock: C,
}

impl<C: ClockPort> FileAuditLog<C> {
    pub fn new(path: impl Into<PathBuf>, clock: C) -> Self {
        Self {
            path: path.into(),
            clock,
        }
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.sync_data()
    }
}

impl<C: ClockPort> AuditLogPort for FileAuditLog<C> {
    fn record(&mut self, entry: AuditEntry) {
        let line = format_line(self.clock.now(), entry);
        if let Err(e) = self.append(&line) {
            log::warn!("audit: write to {} failed: {}", self.path.display(), e);
        }
    }
}

/// Register the SPIFFS partition at `/spiffs`, formatting it on first use.
#[cfg(target_os = "espidf")]
pub fn mount_spiffs() -> Result<(), esp_idf_svc::sys::EspError> {
    use esp_idf_svc::sys::{esp, esp_vfs_spiffs_conf_t, esp_vfs_spiffs_register};

    let conf = esp_vfs_spiffs_conf_t {
        base_path: c"/spiffs".as_ptr(),
        partition_label: core::ptr::null(),
        max_files: 4,
        format_if_mount_failed: true,
    };
    // SAFETY: `conf` and its string pointers are valid for the call; the
    // VFS copies what it keeps.
    esp!(unsafe { esp_vfs_spiffs_register(&conf) })?;
    log::info!("audit: SPIFFS mounted at /spiffs");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::door::{DoorStatus, DoorTarget};
    use chrono::NaiveDate;

    struct Fixed(Option<NaiveDateTime>);

    impl ClockPort for Fixed {
        fn now(&self) -> Option<NaiveDateTime> {
            self.0
        }
    }

    fn t() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap().and_hms_opt(23, 0, 0).unwrap()
    }

    #[test]
    fn line_format() {
        assert_eq!(
            format_line(Some(t()), AuditEntry::OpenPastTrigger),
            "06-01-2024 11:00:00 PM,OPEN\n"
        );
        assert_eq!(format_line(None, AuditEntry::Actuated(DoorTarget::Close)), ",CLOSE\n");
    }

    #[test]
    fn appends_lines() {
        let path = std::env::temp_dir().join(format!("garagewatch-audit-{}.csv", std::process::id()));
        let _ = std::fs::remove_file(&path);
        let mut log = FileAuditLog::new(&path, Fixed(Some(t())));
        log.record(AuditEntry::StatusChanged(DoorStatus::Open));
        log.record(AuditEntry::AutoClosing);
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "06-01-2024 11:00:00 PM,OPEN\n06-01-2024 11:00:00 PM,AUTO_CLOSE\n");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn unwritable_path_does_not_panic() {
        let mut log = FileAuditLog::new("/nonexistent-dir/x/log.csv", Fixed(None));
        log.record(AuditEntry::AutoClosing);
    }
}
