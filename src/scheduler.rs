// scheduler.rs
use std::time::{Duration, Instant};

use anyhow::Result;
use log::info;

use crate::time_utils::LocalTime;
use crate::weather::WeatherReport;

/// Re-query the online time once per hour.
pub const CLOCK_SYNC_INTERVAL: Duration = Duration::from_secs(3600);
/// Re-query the weather every 10 minutes.
pub const WEATHER_INTERVAL: Duration = Duration::from_secs(600);
/// Redraw the panel every minute (mostly to update the clock).
pub const DISPLAY_INTERVAL: Duration = Duration::from_secs(60);

/// Local hour before which the panel is blanked instead of drawn.
pub const NIGHT_END_HOUR: u32 = 8;

/// Network time synchronization, plus the current local wall clock.
pub trait TimeSource {
    fn synchronize(&mut self) -> Result<()>;
    fn local_now(&self) -> LocalTime;
}

/// One JSON GET against the weather endpoint.
pub trait WeatherSource {
    fn fetch(&mut self) -> Result<WeatherReport>;
}

/// Panel drawing operations. Rendering is best-effort and surfaces no errors.
pub trait WeatherPanel {
    fn render(&mut self, report: Option<&WeatherReport>, now: &LocalTime);
    fn blank(&mut self);
    fn advance_scroll(&mut self);
}

/// Tracks when each activity last succeeded, and the latest weather snapshot.
///
/// Each marker starts unset so every activity fires on the first iteration.
/// Markers are only stamped after the corresponding activity succeeds; a
/// failed activity is retried on the next iteration with no backoff.
pub struct Scheduler {
    clock_synced: Option<Instant>,
    weather_fetched: Option<Instant>,
    display_drawn: Option<Instant>,
    report: Option<WeatherReport>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            clock_synced: None,
            weather_fetched: None,
            display_drawn: None,
            report: None,
        }
    }

    fn due(last: Option<Instant>, now: Instant, interval: Duration) -> bool {
        match last {
            None => true,
            Some(t) => now.duration_since(t) > interval,
        }
    }

    /// One pass over the three activity guards, in fixed order: clock sync,
    /// weather fetch, display refresh. The display guard runs last so it can
    /// use the clock reading and snapshot refreshed earlier in the same pass.
    ///
    /// The first error aborts the pass: later guards and the trailing scroll
    /// step are skipped, and the failed activity stays due for the next pass.
    pub fn tick<T, W, P>(
        &mut self,
        now: Instant,
        time: &mut T,
        weather: &mut W,
        panel: &mut P,
    ) -> Result<()>
    where
        T: TimeSource,
        W: WeatherSource,
        P: WeatherPanel,
    {
        if Self::due(self.clock_synced, now, CLOCK_SYNC_INTERVAL) {
            time.synchronize()?;
            self.clock_synced = Some(now);
        }

        if Self::due(self.weather_fetched, now, WEATHER_INTERVAL) {
            self.report = Some(weather.fetch()?);
            self.weather_fetched = Some(now);
        }

        if Self::due(self.display_drawn, now, DISPLAY_INTERVAL) {
            let local = time.local_now();
            if local.hour < NIGHT_END_HOUR {
                // Between midnight and 08:00 keep the panel dark. The blanking
                // itself is throttled by the same display marker.
                info!("Night hours ({:02}h), blanking panel", local.hour);
                panel.blank();
            } else {
                panel.render(self.report.as_ref(), &local);
            }
            self.display_drawn = Some(now);
        }

        // The marquee advances every pass, whether or not any guard fired.
        panel.advance_scroll();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use std::cell::RefCell;
    use std::rc::Rc;

    type CallLog = Rc<RefCell<Vec<&'static str>>>;

    struct FakeTime {
        log: CallLog,
        hour: u32,
        fail: bool,
    }

    impl TimeSource for FakeTime {
        fn synchronize(&mut self) -> Result<()> {
            self.log.borrow_mut().push("sync");
            if self.fail {
                bail!("ntp timeout");
            }
            Ok(())
        }

        fn local_now(&self) -> LocalTime {
            LocalTime {
                year: 2026,
                month: 8,
                day: 5,
                hour: self.hour,
                minute: 0,
                second: 0,
            }
        }
    }

    struct FakeWeather {
        log: CallLog,
        fail: bool,
        city: &'static str,
    }

    impl WeatherSource for FakeWeather {
        fn fetch(&mut self) -> Result<WeatherReport> {
            self.log.borrow_mut().push("fetch");
            if self.fail {
                bail!("connection reset");
            }
            Ok(crate::weather::tests::sample_report(self.city))
        }
    }

    #[derive(Default)]
    struct FakePanel {
        log: Option<CallLog>,
        rendered: Vec<Option<String>>,
    }

    impl WeatherPanel for FakePanel {
        fn render(&mut self, report: Option<&WeatherReport>, _now: &LocalTime) {
            if let Some(log) = &self.log {
                log.borrow_mut().push("render");
            }
            self.rendered.push(report.map(|r| r.name.clone()));
        }

        fn blank(&mut self) {
            if let Some(log) = &self.log {
                log.borrow_mut().push("blank");
            }
        }

        fn advance_scroll(&mut self) {
            if let Some(log) = &self.log {
                log.borrow_mut().push("scroll");
            }
        }
    }

    fn rig(hour: u32) -> (CallLog, FakeTime, FakeWeather, FakePanel) {
        let log: CallLog = Rc::new(RefCell::new(Vec::new()));
        let time = FakeTime {
            log: log.clone(),
            hour,
            fail: false,
        };
        let weather = FakeWeather {
            log: log.clone(),
            fail: false,
            city: "Tampere",
        };
        let panel = FakePanel {
            log: Some(log.clone()),
            rendered: Vec::new(),
        };
        (log, time, weather, panel)
    }

    #[test]
    fn first_tick_fires_all_activities_in_order() {
        let (log, mut time, mut weather, mut panel) = rig(12);
        let mut sched = Scheduler::new();

        sched.tick(Instant::now(), &mut time, &mut weather, &mut panel).unwrap();

        assert_eq!(*log.borrow(), vec!["sync", "fetch", "render", "scroll"]);
        assert_eq!(panel.rendered, vec![Some("Tampere".to_string())]);
    }

    #[test]
    fn fresh_markers_leave_only_display_due() {
        let (log, mut time, mut weather, mut panel) = rig(12);
        let mut sched = Scheduler::new();
        let t0 = Instant::now();

        sched.tick(t0, &mut time, &mut weather, &mut panel).unwrap();
        log.borrow_mut().clear();

        // 61s later: clock (3600s) and weather (600s) are still fresh.
        sched
            .tick(t0 + Duration::from_secs(61), &mut time, &mut weather, &mut panel)
            .unwrap();
        assert_eq!(*log.borrow(), vec!["render", "scroll"]);
    }

    #[test]
    fn idle_pass_still_advances_scroll() {
        let (log, mut time, mut weather, mut panel) = rig(12);
        let mut sched = Scheduler::new();
        let t0 = Instant::now();

        sched.tick(t0, &mut time, &mut weather, &mut panel).unwrap();
        log.borrow_mut().clear();

        sched
            .tick(t0 + Duration::from_secs(1), &mut time, &mut weather, &mut panel)
            .unwrap();
        assert_eq!(*log.borrow(), vec!["scroll"]);
    }

    #[test]
    fn threshold_must_be_strictly_exceeded() {
        let (log, mut time, mut weather, mut panel) = rig(12);
        let mut sched = Scheduler::new();
        let t0 = Instant::now();

        sched.tick(t0, &mut time, &mut weather, &mut panel).unwrap();
        log.borrow_mut().clear();

        // Exactly 60s elapsed: not yet due.
        sched
            .tick(t0 + DISPLAY_INTERVAL, &mut time, &mut weather, &mut panel)
            .unwrap();
        assert_eq!(*log.borrow(), vec!["scroll"]);
        log.borrow_mut().clear();

        sched
            .tick(t0 + Duration::from_millis(60_001), &mut time, &mut weather, &mut panel)
            .unwrap();
        assert_eq!(*log.borrow(), vec!["render", "scroll"]);
    }

    #[test]
    fn sync_failure_aborts_before_fetch() {
        let (log, mut time, mut weather, mut panel) = rig(12);
        time.fail = true;
        let mut sched = Scheduler::new();

        let err = sched.tick(Instant::now(), &mut time, &mut weather, &mut panel);
        assert!(err.is_err());
        assert_eq!(*log.borrow(), vec!["sync"]);
    }

    #[test]
    fn fetch_failure_skips_display_and_scroll_then_retries() {
        let (log, mut time, mut weather, mut panel) = rig(12);
        weather.fail = true;
        let mut sched = Scheduler::new();
        let t0 = Instant::now();

        assert!(sched.tick(t0, &mut time, &mut weather, &mut panel).is_err());
        assert_eq!(*log.borrow(), vec!["sync", "fetch"]);
        assert!(panel.rendered.is_empty());
        log.borrow_mut().clear();

        // The clock marker was stamped before the fetch failed, so only the
        // weather fetch is retried on the next pass.
        weather.fail = false;
        sched
            .tick(t0 + Duration::from_secs(1), &mut time, &mut weather, &mut panel)
            .unwrap();
        assert_eq!(*log.borrow(), vec!["fetch", "render", "scroll"]);
    }

    #[test]
    fn snapshot_and_marker_survive_a_failed_refetch() {
        let (_log, mut time, mut weather, mut panel) = rig(12);
        let mut sched = Scheduler::new();
        let t0 = Instant::now();

        sched.tick(t0, &mut time, &mut weather, &mut panel).unwrap();
        assert_eq!(sched.weather_fetched, Some(t0));

        // The refetch fails: the snapshot and the success marker keep their
        // previous values, so the fetch stays due.
        weather.fail = true;
        let t1 = t0 + Duration::from_secs(601);
        assert!(sched.tick(t1, &mut time, &mut weather, &mut panel).is_err());
        assert_eq!(sched.report.as_ref().map(|r| r.name.as_str()), Some("Tampere"));
        assert_eq!(sched.weather_fetched, Some(t0));
    }

    #[test]
    fn night_hours_blank_instead_of_render() {
        let (log, mut time, mut weather, mut panel) = rig(7);
        let mut sched = Scheduler::new();
        let t0 = Instant::now();

        sched.tick(t0, &mut time, &mut weather, &mut panel).unwrap();
        assert_eq!(*log.borrow(), vec!["sync", "fetch", "blank", "scroll"]);
        log.borrow_mut().clear();

        // The blank is throttled by the display marker like a normal draw.
        sched
            .tick(t0 + Duration::from_secs(1), &mut time, &mut weather, &mut panel)
            .unwrap();
        assert_eq!(*log.borrow(), vec!["scroll"]);
    }

    #[test]
    fn eight_oclock_renders_again() {
        let (log, mut time, mut weather, mut panel) = rig(8);
        let mut sched = Scheduler::new();

        sched.tick(Instant::now(), &mut time, &mut weather, &mut panel).unwrap();
        assert_eq!(*log.borrow(), vec!["sync", "fetch", "render", "scroll"]);
    }
}
