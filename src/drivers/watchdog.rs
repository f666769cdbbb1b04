//! Task Watchdog Timer (TWDT) driver.
//!
//! Resets the device if the control loop stalls for longer than the
//! armed timeout.  The loop feeds once per tick, so the timeout must cover
//! the slowest tick (see `DoorConfig::watchdog_budget_ms`).

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::{
    ESP_OK, esp_task_wdt_add, esp_task_wdt_config_t, esp_task_wdt_delete,
    esp_task_wdt_reconfigure, esp_task_wdt_reset,
};

pub struct Watchdog {
    /// Whether the control task is subscribed; on the host this is always
    /// false.
    subscribed: bool,
    timeout_ms: u32,
    feeds: u64,
}

impl Watchdog {
    /// Arm the TWDT with `timeout_ms` and subscribe the calling task.
    /// A failed subscription is logged and the loop runs unguarded.
    pub fn new(timeout_ms: u32) -> Self {
        Self {
            subscribed: subscribe(timeout_ms),
            timeout_ms,
            feeds: 0,
        }
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    /// Feeds since arming.
    pub fn feeds(&self) -> u64 {
        self.feeds
    }

    pub fn feed(&mut self) {
        self.feeds = self.feeds.wrapping_add(1);
        #[cfg(target_os = "espidf")]
        if self.subscribed {
            // SAFETY: resets the TWDT entry of the current, subscribed task.
            unsafe {
                esp_task_wdt_reset();
            }
        }
    }
}

#[cfg(target_os = "espidf")]
fn subscribe(timeout_ms: u32) -> bool {
    let cfg = esp_task_wdt_config_t {
        timeout_ms,
        idle_core_mask: 0,
        trigger_panic: true,
    };
    // SAFETY: plain FFI calls on the current task; `cfg` outlives the
    // reconfigure call.
    let (reconfigured, added) =
        unsafe { (esp_task_wdt_reconfigure(&cfg), esp_task_wdt_add(core::ptr::null_mut())) };
    if reconfigured != ESP_OK {
        log::warn!("watchdog: reconfigure returned {} (already running?)", reconfigured);
    }
    if added == ESP_OK {
        log::info!("watchdog: armed, {} ms, panic on trigger", timeout_ms);
        true
    } else {
        log::warn!("watchdog: subscribe failed ({}), loop unguarded", added);
        false
    }
}

#[cfg(not(target_os = "espidf"))]
fn subscribe(timeout_ms: u32) -> bool {
    log::info!("watchdog(sim): {} ms, not armed", timeout_ms);
    false
}

impl Drop for Watchdog {
    fn drop(&mut self) {
        #[cfg(target_os = "espidf")]
        if self.subscribed {
            // Leaving the loop on a stop request must not trip a reset.
            // SAFETY: removes the current task, which `subscribe` added.
            unsafe {
                esp_task_wdt_delete(core::ptr::null_mut());
            }
        }
    }
}
