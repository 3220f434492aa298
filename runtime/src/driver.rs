//! Real-time loop driving a [`Simulation`] from wall-clock time.

use std::time::Duration;

use path_defence_core::RunStatus;

use crate::{
    session::{Frame, SessionError, Simulation},
    timers::{TaskId, TaskKind, Timers},
};

/// Loop that owns a simulation and its frame and spawn tasks.
///
/// The host feeds elapsed wall-clock time through [`SimulationLoop::advance`].
/// The frame task releases due spawns, then scales each clamped wall delta by
/// the speed multiplier and steps the simulation while it is playing. Spawn
/// times are simulation times, so releasing them per frame keeps fast runs
/// from stacking a group on the spawn point. The spawn task catches entries
/// that fall due between two frames. Pausing leaves both tasks running.
#[derive(Debug)]
pub struct SimulationLoop {
    simulation: Simulation,
    timers: Timers,
    frame_task: Option<TaskId>,
    spawn_task: Option<TaskId>,
    wall_clock: Duration,
    last_frame_at: Duration,
    latest_frame: Option<Frame>,
    frames: u64,
}

impl SimulationLoop {
    /// Wraps an idle simulation. No task runs until [`Self::start`].
    #[must_use]
    pub fn new(simulation: Simulation) -> Self {
        Self {
            simulation,
            timers: Timers::new(),
            frame_task: None,
            spawn_task: None,
            wall_clock: Duration::ZERO,
            last_frame_at: Duration::ZERO,
            latest_frame: None,
            frames: 0,
        }
    }

    /// Starts a run on `level_id` and registers the frame and spawn tasks.
    pub fn start(&mut self, level_id: &str) -> Result<(), SessionError> {
        self.simulation.start(level_id)?;
        self.stop();

        let config = self.simulation.config();
        let (frame_interval, spawn_interval) = (config.frame_interval(), config.spawn_interval());
        self.frame_task = Some(
            self.timers
                .schedule(TaskKind::Frame, frame_interval, self.wall_clock),
        );
        self.spawn_task = Some(
            self.timers
                .schedule(TaskKind::Spawn, spawn_interval, self.wall_clock),
        );
        self.last_frame_at = self.wall_clock;
        self.latest_frame = Some(self.simulation.frame());
        log::info!("simulation loop started on level '{level_id}'");
        Ok(())
    }

    /// Cancels both tasks. Nothing fires afterwards until the next start.
    pub fn stop(&mut self) {
        let mut cancelled = false;
        for task in [self.frame_task.take(), self.spawn_task.take()]
            .into_iter()
            .flatten()
        {
            cancelled |= self.timers.cancel(task);
        }
        if cancelled {
            log::info!("simulation loop stopped");
        }
    }

    /// Reports whether both tasks are registered.
    #[must_use]
    pub fn is_running(&self) -> bool {
        [self.frame_task, self.spawn_task]
            .into_iter()
            .all(|task| task.is_some_and(|task| self.timers.is_scheduled(task)))
    }

    /// Number of tasks currently registered.
    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.timers.len()
    }

    /// Feeds `elapsed` wall-clock time and runs every task that became due.
    pub fn advance(&mut self, elapsed: Duration) {
        let until = self.wall_clock.saturating_add(elapsed);
        while let Some(firing) = self.timers.pop_due(until) {
            match firing.kind {
                TaskKind::Frame => self.run_frame(firing.at),
                TaskKind::Spawn => self.simulation.poll_spawns(),
            }
        }
        self.wall_clock = until;
    }

    /// Most recent frame snapshot, refreshed on every frame task firing.
    #[must_use]
    pub fn frame(&self) -> Option<&Frame> {
        self.latest_frame.as_ref()
    }

    /// Number of frame task firings since the loop was created.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Wall-clock time fed to the loop so far.
    #[must_use]
    pub fn wall_clock(&self) -> Duration {
        self.wall_clock
    }

    /// Hosted simulation.
    #[must_use]
    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    /// Hosted simulation, for player commands between frames.
    pub fn simulation_mut(&mut self) -> &mut Simulation {
        &mut self.simulation
    }

    fn run_frame(&mut self, at: Duration) {
        let wall_delta = at.saturating_sub(self.last_frame_at);
        self.last_frame_at = at;
        self.frames += 1;

        if self.simulation.status() == RunStatus::Playing {
            self.simulation.poll_spawns();
            let clamped = wall_delta.min(self.simulation.config().max_frame_delta());
            let speed = f64::from(self.simulation.speed());
            let scaled = clamped.as_secs_f64() * speed;
            let dt = Duration::try_from_secs_f64(scaled).unwrap_or_else(|_| {
                log::warn!("speed multiplier {speed} overflows the frame delta; running at 1x");
                clamped
            });
            self.simulation.step(dt);
        }
        self.latest_frame = Some(self.simulation.frame());
    }
}
