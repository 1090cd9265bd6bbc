// clock.rs
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{bail, Result};
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::sntp::{EspSntp, SyncStatus};
use log::info;

use crate::scheduler::TimeSource;
use crate::secrets::ClockConfig;
use crate::time_utils::{self, LocalTime};

const SYNC_TIMEOUT_MS: u32 = 20_000;
const POLL_INTERVAL_MS: u32 = 250;

/// Anything earlier than 2001 means the system clock was never set.
const EPOCH_FLOOR_SECS: i64 = 1_000_000_000;

fn epoch_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Wall clock backed by SNTP. The EspSntp handle must stay alive for the
/// periodic background re-sync to keep running.
pub struct SntpClock {
    sntp: EspSntp<'static>,
    utc_offset_hours: i32,
    eu_dst: bool,
}

impl SntpClock {
    pub fn start(config: &ClockConfig) -> Result<Self> {
        info!("Starting SNTP");
        let sntp = EspSntp::new_default()?;
        Ok(Self {
            sntp,
            utc_offset_hours: config.utc_offset_hours,
            eu_dst: config.eu_dst,
        })
    }
}

impl TimeSource for SntpClock {
    /// Wait for the system clock to be valid. Once the first sync has landed,
    /// esp-idf keeps re-syncing in the background and this returns at once;
    /// until then a timeout is a retryable error.
    fn synchronize(&mut self) -> Result<()> {
        if epoch_secs() > EPOCH_FLOOR_SECS {
            return Ok(());
        }

        info!("Waiting for SNTP time synchronization...");
        let mut elapsed_ms = 0u32;
        while elapsed_ms < SYNC_TIMEOUT_MS {
            if self.sntp.get_sync_status() == SyncStatus::Completed
                || epoch_secs() > EPOCH_FLOOR_SECS
            {
                info!("Time synchronized after {}ms", elapsed_ms);
                return Ok(());
            }
            FreeRtos::delay_ms(POLL_INTERVAL_MS);
            elapsed_ms += POLL_INTERVAL_MS;
        }

        bail!("SNTP sync not completed within {}s", SYNC_TIMEOUT_MS / 1000)
    }

    fn local_now(&self) -> LocalTime {
        time_utils::utc_to_local(epoch_secs(), self.utc_offset_hours, self.eu_dst)
    }
}
