//! Wall-clock adapter.
//!
//! Implements [`ClockPort`] with local time.
//!
//! - **`target_os = "espidf"`**: `gettimeofday` + `localtime_r`, driven by
//!   SNTP and the POSIX `TZ` string from the config.
//! - **`not(target_os = "espidf")`**: `chrono::Local` for host-side
//!   simulation.
//!
//! Until the clock is plausibly synced (after 2020-01-01) `now()` returns
//! `None` and the auto-close policy stays idle.

use chrono::{Datelike, NaiveDateTime};

use crate::app::ports::ClockPort;

/// First year accepted as a synced wall clock.
pub const MIN_SYNCED_YEAR: i32 = 2020;

/// Reject timestamps from an RTC that has not been set yet.
pub fn plausibly_synced(t: NaiveDateTime) -> bool {
    t.year() >= MIN_SYNCED_YEAR
}

/// Local wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(not(target_os = "espidf"))]
impl ClockPort for SystemClock {
    fn now(&self) -> Option<NaiveDateTime> {
        Some(chrono::Local::now().naive_local()).filter(|t| plausibly_synced(*t))
    }
}

#[cfg(target_os = "espidf")]
impl ClockPort for SystemClock {
    fn now(&self) -> Option<NaiveDateTime> {
        use esp_idf_svc::sys;

        let mut tv = sys::timeval {
            tv_sec: 0,
            tv_usec: 0,
        };
        // SAFETY: `tv` is a valid out-pointer; the timezone argument may be null.
        if unsafe { sys::gettimeofday(&mut tv, core::ptr::null_mut()) } != 0 {
            return None;
        }
        let secs = tv.tv_sec as sys::time_t;
        // SAFETY: `tm` is plain old data and fully written by localtime_r.
        let mut tm: sys::tm = unsafe { core::mem::zeroed() };
        if unsafe { sys::localtime_r(&secs, &mut tm) }.is_null() {
            return None;
        }
        let date = chrono::NaiveDate::from_ymd_opt(
            tm.tm_year + 1900,
            u32::try_from(tm.tm_mon + 1).ok()?,
            u32::try_from(tm.tm_mday).ok()?,
        )?;
        let t = date.and_hms_opt(
            u32::try_from(tm.tm_hour).ok()?,
            u32::try_from(tm.tm_min).ok()?,
            // tm_sec may be 60 on a leap second
            u32::try_from(tm.tm_sec.min(59)).ok()?,
        )?;
        Some(t).filter(|t| plausibly_synced(*t))
    }
}

/// Apply a POSIX TZ string to the C runtime's local time conversion.
pub fn apply_timezone(tz: &str) {
    // SAFETY: called once during single-threaded bring-up, before any
    // other thread reads the environment.
    unsafe { std::env::set_var("TZ", tz) };
    #[cfg(target_os = "espidf")]
    unsafe {
        esp_idf_svc::sys::tzset()
    };
    log::info!("time: timezone set to {}", tz);
}

/// Start SNTP.  The returned handle must stay alive for syncing to continue.
#[cfg(target_os = "espidf")]
pub fn start_sntp() -> Result<esp_idf_svc::sntp::EspSntp<'static>, esp_idf_svc::sys::EspError> {
    let sntp = esp_idf_svc::sntp::EspSntp::new_default()?;
    log::info!("time: SNTP started");
    Ok(sntp)
}
