//! Wall-clock pacing for hosts that drive a [`crate::SimulationLoop`] live.

use std::{
    thread,
    time::{Duration, Instant},
};

/// Sleeps between frames and measures the real time that passed.
///
/// Each call to [`FramePacer::wait`] blocks until the next frame slot and
/// returns the wall-clock time elapsed since the previous call, ready to be
/// fed to [`crate::SimulationLoop::advance`]. A host that falls more than two
/// frames behind restarts the schedule from now instead of catching up.
#[derive(Debug)]
pub struct FramePacer {
    interval: Duration,
    next_frame: Instant,
    last_wake: Instant,
}

impl FramePacer {
    /// Starts pacing frames `interval` apart from now.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            interval,
            next_frame: now,
            last_wake: now,
        }
    }

    /// Target period between two frames.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Blocks until the next frame is due and returns the real elapsed time.
    pub fn wait(&mut self) -> Duration {
        self.next_frame += self.interval;
        let now = Instant::now();
        if self.next_frame > now {
            thread::sleep(self.next_frame - now);
        }

        let woke = Instant::now();
        let behind = woke.saturating_duration_since(self.next_frame);
        if behind > self.interval * 2 {
            log::debug!("frame pacing fell behind by {behind:?}");
            self.next_frame = woke;
        }
        let elapsed = woke.saturating_duration_since(self.last_wake);
        self.last_wake = woke;
        elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waits_hold_frames_apart_and_report_real_time() {
        let interval = Duration::from_millis(20);
        let started = Instant::now();
        let mut pacer = FramePacer::new(interval);

        let mut reported = Duration::ZERO;
        for _ in 0..3 {
            let elapsed = pacer.wait();
            assert!(elapsed > Duration::ZERO);
            reported += elapsed;
        }

        let real = started.elapsed();
        assert!(real >= interval * 3, "three frames take at least {:?}", interval * 3);
        assert!(reported >= interval * 3);
        assert!(reported <= real, "reported time never exceeds real time");
    }

    #[test]
    fn falling_behind_restarts_the_schedule() {
        let interval = Duration::from_millis(5);
        let mut pacer = FramePacer::new(interval);
        thread::sleep(Duration::from_millis(40));

        let late = pacer.wait();
        assert!(late >= Duration::from_millis(40), "the stall is reported once");

        let next = pacer.wait();
        assert!(next >= interval, "no catch-up frame follows the stall");
    }
}
