//! Simulation thread that runs independently from the front-end.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::World;

use super::commands::{SimCommand, SimState};
use super::snapshot::WorldSnapshot;

/// Ticks between periodic snapshots
const SNAPSHOT_INTERVAL: u32 = 3;

/// Handle for controlling the simulation thread
pub struct SimulationHandle {
    /// Thread handle
    thread: Option<JoinHandle<()>>,
    /// Channel to send commands to simulation
    command_tx: Sender<SimCommand>,
    /// Channel to receive snapshots from simulation
    snapshot_rx: Receiver<WorldSnapshot>,
    /// Current state
    pub state: SimState,
}

impl SimulationHandle {
    /// Spawn a new simulation thread. The world starts paused.
    pub fn spawn(config: Config) -> Self {
        let (command_tx, command_rx) = mpsc::channel();
        let (snapshot_tx, snapshot_rx) = mpsc::channel();

        let thread = thread::spawn(move || {
            run_simulation(config, command_rx, snapshot_tx);
        });

        Self {
            thread: Some(thread),
            command_tx,
            snapshot_rx,
            state: SimState::Paused,
        }
    }

    /// Send a command to the simulation
    pub fn send(&mut self, command: SimCommand) {
        match &command {
            SimCommand::Pause => self.state = SimState::Paused,
            SimCommand::Resume => self.state = SimState::Running,
            SimCommand::Shutdown => self.state = SimState::Stopped,
            SimCommand::Reset | SimCommand::ResetWithSettings(_) => self.state = SimState::Paused,
            _ => {}
        }
        let _ = self.command_tx.send(command);
    }

    /// Try to receive the latest snapshot (non-blocking)
    pub fn try_recv_snapshot(&self) -> Option<WorldSnapshot> {
        let mut latest = None;
        // Drain all available snapshots, keep only the latest
        loop {
            match self.snapshot_rx.try_recv() {
                Ok(snapshot) => latest = Some(snapshot),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break,
            }
        }
        latest
    }

    /// Wait up to `timeout` for the next snapshot
    pub fn recv_snapshot_timeout(&self, timeout: Duration) -> Option<WorldSnapshot> {
        match self.snapshot_rx.recv_timeout(timeout) {
            Ok(snapshot) => Some(snapshot),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Check if simulation is running
    pub fn is_running(&self) -> bool {
        self.state == SimState::Running
    }

    /// Shutdown the simulation thread
    pub fn shutdown(&mut self) {
        self.send(SimCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for SimulationHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Advance the world by one tick, publishing a snapshot when a generation
/// ends. Errors stop the run.
fn step_world(world: &mut World, snapshot_tx: &Sender<WorldSnapshot>) -> SimState {
    match world.step() {
        Ok(Some(summary)) => {
            log::info!("{}", summary.summary());
            let _ = snapshot_tx.send(WorldSnapshot::from_world(world));
            if world.is_extinct() {
                SimState::Stopped
            } else {
                SimState::Running
            }
        }
        Ok(None) => SimState::Running,
        Err(e) => {
            log::error!("simulation stopped: {}", e);
            SimState::Stopped
        }
    }
}

/// Main simulation loop running in separate thread
fn run_simulation(
    config: Config,
    command_rx: Receiver<SimCommand>,
    snapshot_tx: Sender<WorldSnapshot>,
) {
    let mut current_config = config;
    let mut world = match World::new(current_config.clone()) {
        Ok(world) => world,
        Err(e) => {
            log::error!("could not create world: {}", e);
            return;
        }
    };
    world.pause();
    let mut state = SimState::Paused;
    let mut speed = 1.0f32;

    // Timing control: one tick covers tick_millis of simulated time
    let mut last_step = Instant::now();
    let mut steps_since_snapshot = 0u32;

    // Send initial snapshot
    let _ = snapshot_tx.send(WorldSnapshot::from_world(&world));

    loop {
        // Process commands (non-blocking)
        match command_rx.try_recv() {
            Ok(cmd) => match cmd {
                SimCommand::Pause => {
                    state = SimState::Paused;
                    world.pause();
                    let _ = snapshot_tx.send(WorldSnapshot::from_world(&world));
                }
                SimCommand::Resume => {
                    if state != SimState::Stopped {
                        state = SimState::Running;
                        world.resume();
                    }
                }
                SimCommand::Step => {
                    let was_paused = world.is_paused();
                    world.resume();
                    if step_world(&mut world, &snapshot_tx) == SimState::Stopped {
                        state = SimState::Stopped;
                    }
                    if was_paused {
                        world.pause();
                    }
                    let _ = snapshot_tx.send(WorldSnapshot::from_world(&world));
                }
                SimCommand::SetSpeed(s) => {
                    speed = s.clamp(0.1, 10.0);
                    log::debug!("speed set to {:.1}x", speed);
                }
                SimCommand::Reset => {
                    log::debug!("reset with current config");
                    if let Err(e) = world.reset() {
                        log::error!("reset failed: {}", e);
                    }
                    world.pause();
                    state = SimState::Paused;
                    let _ = snapshot_tx.send(WorldSnapshot::from_world(&world));
                }
                SimCommand::ResetWithSettings(settings) => {
                    log::debug!(
                        "reset with {} species, {} food, {}% mutation",
                        settings.nr_of_species,
                        settings.nr_of_foods,
                        settings.mutation_percent
                    );
                    let mut candidate = current_config.clone();
                    settings.apply_to_config(&mut candidate);
                    match world.reset_with_config(candidate) {
                        Ok(()) => current_config = world.config.clone(),
                        Err(e) => log::warn!("settings rejected: {}", e),
                    }
                    world.pause();
                    state = SimState::Paused;
                    let _ = snapshot_tx.send(WorldSnapshot::from_world(&world));
                }
                SimCommand::Shutdown => return,
            },
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                return;
            }
        }

        // Run simulation step if not paused or stopped
        if state == SimState::Running {
            let step_duration = Duration::from_micros(
                (current_config.timing.tick_millis as f32 * 1000.0 / speed) as u64,
            );

            if last_step.elapsed() >= step_duration {
                state = step_world(&mut world, &snapshot_tx);
                last_step = Instant::now();
                steps_since_snapshot += 1;

                // Send snapshot periodically
                if steps_since_snapshot >= SNAPSHOT_INTERVAL {
                    let _ = snapshot_tx.send(WorldSnapshot::from_world(&world));
                    steps_since_snapshot = 0;
                }
            }
        }

        // Small sleep to avoid busy-waiting when idle
        if state == SimState::Running {
            thread::sleep(Duration::from_millis(1));
        } else {
            thread::sleep(Duration::from_millis(16)); // ~60fps polling
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::SimSettings;

    fn small_config() -> Config {
        let mut config = Config::default();
        config.world.width = 200;
        config.world.height = 200;
        config.population.nr_of_species = 4;
        config.food.nr_of_foods = 10;
        config
    }

    fn wait_for<F: Fn(&WorldSnapshot) -> bool>(handle: &SimulationHandle, pred: F) -> Option<WorldSnapshot> {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if let Some(s) = handle.recv_snapshot_timeout(Duration::from_millis(100)) {
                if pred(&s) {
                    return Some(s);
                }
            }
        }
        None
    }

    #[test]
    fn test_starts_paused_and_steps() {
        let mut handle = SimulationHandle::spawn(small_config());
        let first = wait_for(&handle, |_| true).unwrap();
        assert_eq!(first.generation, 1);
        assert!(first.paused);
        assert_eq!(first.total_ticks, 0);

        handle.send(SimCommand::Step);
        let stepped = wait_for(&handle, |s| s.total_ticks == 1).unwrap();
        assert!(stepped.paused);

        handle.shutdown();
        assert_eq!(handle.state, SimState::Stopped);
    }

    #[test]
    fn test_reset_with_settings() {
        let mut handle = SimulationHandle::spawn(small_config());
        handle.send(SimCommand::ResetWithSettings(SimSettings {
            nr_of_species: 7,
            nr_of_foods: 20,
            mutation_percent: 10.0,
            world_width: 300,
            world_height: 300,
        }));
        let snapshot = wait_for(&handle, |s| s.width == 300).unwrap();
        assert_eq!(snapshot.agents.len(), 7);
        assert_eq!(handle.state, SimState::Paused);
    }

    #[test]
    fn test_runs_when_resumed() {
        let mut handle = SimulationHandle::spawn(small_config());
        handle.send(SimCommand::SetSpeed(10.0));
        handle.send(SimCommand::Resume);
        assert!(handle.is_running());
        assert!(wait_for(&handle, |s| s.total_ticks >= 3).is_some());
    }
}
