//! `critical-section` implementation for the ESP-IDF std runtime.
//!
//! The static command inbox (`embassy-sync` channel) locks through
//! `critical-section`.  On ESP-IDF the producers are ordinary FreeRTOS
//! threads, so a re-entrant process-wide mutex is enough.

#[cfg(target_os = "espidf")]
use core::cell::{Cell, RefCell};
#[cfg(target_os = "espidf")]
use std::sync::{Mutex, MutexGuard, PoisonError};

#[cfg(target_os = "espidf")]
static CRITICAL_SECTION_MUTEX: Mutex<()> = Mutex::new(());

#[cfg(target_os = "espidf")]
thread_local! {
    static CRITICAL_SECTION_DEPTH: Cell<u8> = const { Cell::new(0) };
    static CRITICAL_SECTION_GUARD: RefCell<Option<MutexGuard<'static, ()>>> = const { RefCell::new(None) };
}

/// Acquire hook called by `critical-section` 1.x.
#[cfg(target_os = "espidf")]
#[unsafe(no_mangle)]
pub extern "C" fn _critical_section_1_0_acquire() -> u8 {
    CRITICAL_SECTION_DEPTH.with(|depth| {
        CRITICAL_SECTION_GUARD.with(|guard| {
            let d = depth.get();
            if d == 0 {
                // A panic while holding the lock cannot leave the guarded
                // channel half-updated, so poisoning is ignored.
                let lock = CRITICAL_SECTION_MUTEX
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                *guard.borrow_mut() = Some(lock);
            }
            let new_depth = d.saturating_add(1);
            depth.set(new_depth);
            new_depth
        })
    })
}

/// Release hook called by `critical-section` 1.x.
#[cfg(target_os = "espidf")]
#[unsafe(no_mangle)]
pub extern "C" fn _critical_section_1_0_release(_token: u8) {
    CRITICAL_SECTION_DEPTH.with(|depth| {
        CRITICAL_SECTION_GUARD.with(|guard| {
            let d = depth.get();
            if d == 0 {
                return;
            }
            let new_depth = d - 1;
            depth.set(new_depth);
            if new_depth == 0 {
                *guard.borrow_mut() = None;
            }
        })
    })
}
