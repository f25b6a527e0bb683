//! Task Watchdog Timer (TWDT).
//!
//! Subscribes the control task to the ESP-IDF TWDT so a stalled loop
//! resets the board with the pump relay released.  The loop never blocks,
//! so a few seconds of timeout is generous.
//!
//! The main loop must call [`Watchdog::feed`] on every pass.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use log::{info, warn};

/// Default TWDT timeout for the control task.
pub const WATCHDOG_TIMEOUT_MS: u32 = 5_000;

pub struct Watchdog {
    subscribed: bool,
}

impl Watchdog {
    /// Reconfigure the TWDT and subscribe the calling task.
    pub fn new(timeout_ms: u32) -> Self {
        #[cfg(target_os = "espidf")]
        let subscribed = {
            // SAFETY: called once from the main task before the loop starts.
            unsafe {
                let cfg = esp_task_wdt_config_t {
                    timeout_ms,
                    idle_core_mask: 0,
                    trigger_panic: true,
                };
                let ret = esp_task_wdt_reconfigure(&cfg);
                if ret != ESP_OK {
                    warn!("Watchdog: reconfigure returned {} (may already be configured)", ret);
                }
                esp_task_wdt_add(core::ptr::null_mut()) == ESP_OK
            }
        };

        #[cfg(not(target_os = "espidf"))]
        let subscribed = true;

        if subscribed {
            info!("Watchdog: subscribed ({} ms timeout)", timeout_ms);
        } else {
            warn!("Watchdog: failed to subscribe, running unguarded");
        }
        Self { subscribed }
    }

    /// Feed the watchdog.  Must be called at least once per timeout.
    pub fn feed(&mut self) {
        if !self.subscribed {
            return;
        }
        #[cfg(target_os = "espidf")]
        // SAFETY: the calling task subscribed in `new`.
        unsafe {
            esp_task_wdt_reset();
        }
    }
}
