use std::{
    fmt,
    sync::mpsc,
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use log::{debug, warn};

use crate::{ConfigError, Grid, Ticker};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    Stopped,
    Running,
    Paused,
}

impl fmt::Display for ControlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ControlState::Stopped => "stopped",
            ControlState::Running => "running",
            ControlState::Paused => "paused",
        };
        f.write_str(label)
    }
}

/// One coherent view of the board, taken between generations.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub size: usize,
    pub generation: u64,
    pub state: ControlState,
    pub delay: Duration,
    pub density: f64,
    cells: Vec<bool>,
}

impl Snapshot {
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.cells[y * self.size + x]
    }

    pub fn population(&self) -> usize {
        self.cells.iter().filter(|&&alive| alive).count()
    }

    pub fn is_running(&self) -> bool {
        self.state == ControlState::Running
    }

    /// Iterates every cell as (x, y, alive), row-major.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, bool)> + '_ {
        let size = self.size;
        self.cells
            .iter()
            .enumerate()
            .map(move |(index, &alive)| (index % size, index / size, alive))
    }
}

/// Board, ticker and control state under one roof. The engine is
/// synchronous; [`Sim`] runs it on a thread, and embedders without a
/// thread can drive it directly.
#[derive(Debug)]
pub struct Engine {
    grid: Grid,
    ticker: Ticker,
    state: ControlState,
}

impl Engine {
    pub fn new(grid: Grid) -> Self {
        let ticker = Ticker::new(grid.delay());
        Self {
            grid,
            ticker,
            state: ControlState::Stopped,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn state(&self) -> ControlState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ControlState::Running
    }

    /// Runs one immediate generation and arms the timer. Starting an
    /// already running engine changes nothing.
    pub fn start(&mut self, now: Instant) {
        if self.state == ControlState::Running {
            debug!("start ignored, already running");
            return;
        }
        debug!("starting");
        self.grid.tick();
        self.ticker.arm(now);
        self.state = ControlState::Running;
    }

    /// Disarms the timer, keeping the board. Idempotent.
    pub fn stop(&mut self) {
        self.ticker.disarm();
        if self.state == ControlState::Running {
            debug!("pausing");
            self.state = ControlState::Paused;
        }
    }

    pub fn start_or_pause(&mut self, now: Instant) {
        if self.is_running() {
            self.stop()
        } else {
            self.start(now)
        }
    }

    /// Manual single generation, honored only while halted.
    pub fn step(&mut self) {
        if self.is_running() {
            debug!("step ignored while running");
            return;
        }
        self.grid.tick();
    }

    /// Back to a freshly seeded, stopped board.
    pub fn reset(&mut self) {
        debug!("resetting");
        self.ticker.disarm();
        self.grid.initialize();
        self.state = ControlState::Stopped;
    }

    /// Applies a new delay; a pending deadline is replaced, never fired
    /// at the stale period.
    pub fn set_delay(&mut self, delay: Duration, now: Instant) -> Result<(), ConfigError> {
        self.grid.set_delay(delay)?;
        self.ticker.set_period(delay, now);
        Ok(())
    }

    pub fn set_size(&mut self, size: usize) -> Result<(), ConfigError> {
        self.grid.set_size(size)?;
        self.halt();
        Ok(())
    }

    pub fn set_density(&mut self, density: f64) -> Result<(), ConfigError> {
        self.grid.set_density(density)?;
        self.halt();
        Ok(())
    }

    fn halt(&mut self) {
        self.ticker.disarm();
        self.state = ControlState::Stopped;
    }

    pub fn toggle(&mut self, x: usize, y: usize) {
        self.grid.toggle(x, y);
    }

    /// Drives the timer; returns whether a generation ran.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.ticker.poll(now) {
            self.grid.tick();
            true
        } else {
            false
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            size: self.grid.size(),
            generation: self.grid.generation(),
            state: self.state,
            delay: self.grid.delay(),
            density: self.grid.density(),
            cells: self.grid.cells().iter().map(|cell| cell.is_alive()).collect(),
        }
    }
}

/// Commands accepted by the simulation thread.
pub enum SimCmd {
    Start,
    Stop,
    StartOrPause,
    Step,
    Reset,
    SetDelay(Duration),
    SetSize(usize),
    SetDensity(f64),
    Toggle(usize, usize),
    Snapshot(mpsc::Sender<Snapshot>),
    Shutdown,
}

#[derive(Clone)]
pub struct SimHandle {
    sender: mpsc::Sender<SimCmd>,
}

impl SimHandle {
    pub fn new(sender: mpsc::Sender<SimCmd>) -> Self {
        Self { sender }
    }

    pub fn start(&self) {
        self.sender.send(SimCmd::Start).unwrap();
    }

    pub fn stop(&self) {
        self.sender.send(SimCmd::Stop).unwrap();
    }

    pub fn start_or_pause(&self) {
        self.sender.send(SimCmd::StartOrPause).unwrap();
    }

    pub fn step(&self) {
        self.sender.send(SimCmd::Step).unwrap();
    }

    pub fn reset(&self) {
        self.sender.send(SimCmd::Reset).unwrap();
    }

    pub fn set_delay(&self, delay: Duration) {
        self.sender.send(SimCmd::SetDelay(delay)).unwrap();
    }

    pub fn set_size(&self, size: usize) {
        self.sender.send(SimCmd::SetSize(size)).unwrap();
    }

    pub fn set_density(&self, density: f64) {
        self.sender.send(SimCmd::SetDensity(density)).unwrap();
    }

    pub fn toggle(&self, x: usize, y: usize) {
        self.sender.send(SimCmd::Toggle(x, y)).unwrap();
    }

    pub fn snapshot(&self) -> Snapshot {
        let (sender, receiver) = mpsc::channel();
        self.sender.send(SimCmd::Snapshot(sender)).unwrap();
        receiver.recv().unwrap()
    }

    pub fn shutdown(&self) {
        self.sender.send(SimCmd::Shutdown).unwrap();
    }
}

#[derive(Debug)]
pub struct Sim {
    thread: JoinHandle<()>,
    sender: mpsc::Sender<SimCmd>,
}

impl Sim {
    pub fn spawn(engine: Engine) -> Self {
        let (sender, receiver) = mpsc::channel();
        let thread = thread::spawn(move || sim_loop(receiver, engine));
        Self { sender, thread }
    }

    pub fn handle(&self) -> SimHandle {
        let sender = self.sender.clone();
        SimHandle { sender }
    }

    pub fn join(self) {
        let Self { thread, sender } = self;
        drop(sender);
        thread.join().unwrap();
    }
}

const EVT_CHECK_TIMEOUT: Duration = Duration::from_millis(10);

fn sim_loop(receiver: mpsc::Receiver<SimCmd>, mut engine: Engine) {
    loop {
        loop {
            match receiver.try_recv() {
                Ok(cmd) => match cmd {
                    SimCmd::Start => engine.start(Instant::now()),
                    SimCmd::Stop => engine.stop(),
                    SimCmd::StartOrPause => engine.start_or_pause(Instant::now()),
                    SimCmd::Step => engine.step(),
                    SimCmd::Reset => engine.reset(),
                    SimCmd::SetDelay(delay) => {
                        if let Err(error) = engine.set_delay(delay, Instant::now()) {
                            warn!("delay rejected: {error}");
                        }
                    }
                    SimCmd::SetSize(size) => {
                        if let Err(error) = engine.set_size(size) {
                            warn!("size rejected: {error}");
                        }
                    }
                    SimCmd::SetDensity(density) => {
                        if let Err(error) = engine.set_density(density) {
                            warn!("density rejected: {error}");
                        }
                    }
                    SimCmd::Toggle(x, y) => engine.toggle(x, y),
                    SimCmd::Snapshot(sender) => sender.send(engine.snapshot()).unwrap(),
                    SimCmd::Shutdown => return,
                },
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => return,
            }
        }

        engine.poll(Instant::now());
        thread::sleep(EVT_CHECK_TIMEOUT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GridConfig;

    fn engine(delay_ms: u64) -> Engine {
        let config = GridConfig {
            size: 7,
            density: 0.0,
            delay: Duration::from_millis(delay_ms),
            seed: Some(0),
        };
        Engine::new(Grid::new(config).unwrap())
    }

    #[test]
    fn start_ticks_once_and_is_idempotent() {
        let mut engine = engine(100);
        let start = Instant::now();
        engine.start(start);
        assert_eq!(engine.grid().generation(), 1);
        assert!(engine.is_running());
        engine.start(start + Duration::from_millis(10));
        assert_eq!(engine.grid().generation(), 1);
        assert_eq!(engine.state(), ControlState::Running);
    }

    #[test]
    fn stop_pauses_and_is_idempotent() {
        let mut engine = engine(100);
        engine.stop();
        assert_eq!(engine.state(), ControlState::Stopped);
        let start = Instant::now();
        engine.start(start);
        engine.stop();
        assert_eq!(engine.state(), ControlState::Paused);
        assert!(!engine.poll(start + Duration::from_millis(1000)));
        assert_eq!(engine.grid().generation(), 1);
        engine.stop();
        assert_eq!(engine.state(), ControlState::Paused);
    }

    #[test]
    fn start_or_pause_alternates() {
        let mut engine = engine(100);
        let start = Instant::now();
        engine.start_or_pause(start);
        assert_eq!(engine.state(), ControlState::Running);
        assert_eq!(engine.grid().generation(), 1);
        engine.start_or_pause(start);
        assert_eq!(engine.state(), ControlState::Paused);
        engine.start_or_pause(start);
        assert_eq!(engine.state(), ControlState::Running);
        assert_eq!(engine.grid().generation(), 2);
    }

    #[test]
    fn step_only_advances_a_halted_board() {
        let mut engine = engine(100);
        engine.step();
        assert_eq!(engine.grid().generation(), 1);
        assert_eq!(engine.state(), ControlState::Stopped);
        let start = Instant::now();
        engine.start(start);
        assert_eq!(engine.grid().generation(), 2);
        engine.step();
        assert_eq!(engine.grid().generation(), 2);
        engine.stop();
        engine.step();
        assert_eq!(engine.grid().generation(), 3);
    }

    #[test]
    fn timer_runs_generations_on_schedule() {
        let mut engine = engine(100);
        let start = Instant::now();
        engine.start(start);
        assert!(!engine.poll(start + Duration::from_millis(99)));
        assert!(engine.poll(start + Duration::from_millis(100)));
        assert_eq!(engine.grid().generation(), 2);
        assert!(!engine.poll(start + Duration::from_millis(150)));
        assert!(engine.poll(start + Duration::from_millis(250)));
        assert_eq!(engine.grid().generation(), 3);
    }

    #[test]
    fn set_delay_swaps_the_schedule_cleanly() {
        let mut engine = engine(100);
        let start = Instant::now();
        engine.start(start);
        engine
            .set_delay(Duration::from_millis(300), start + Duration::from_millis(50))
            .unwrap();
        assert!(!engine.poll(start + Duration::from_millis(100)));
        assert!(!engine.poll(start + Duration::from_millis(349)));
        assert!(engine.poll(start + Duration::from_millis(350)));
        assert_eq!(engine.grid().delay(), Duration::from_millis(300));
        assert_eq!(engine.grid().generation(), 2);
    }

    #[test]
    fn rejected_delay_keeps_the_schedule() {
        let mut engine = engine(100);
        let start = Instant::now();
        engine.start(start);
        let rejected = engine.set_delay(Duration::ZERO, start + Duration::from_millis(50));
        assert_eq!(rejected, Err(ConfigError::DelayZero));
        assert_eq!(engine.grid().delay(), Duration::from_millis(100));
        assert!(engine.poll(start + Duration::from_millis(100)));
    }

    #[test]
    fn reconfiguration_halts_and_zeroes() {
        let mut engine = engine(100);
        let start = Instant::now();
        engine.toggle(1, 1);
        engine.start(start);
        engine.set_size(9).unwrap();
        assert_eq!(engine.state(), ControlState::Stopped);
        assert_eq!(engine.grid().size(), 9);
        assert_eq!(engine.grid().generation(), 0);
        assert!(!engine.poll(start + Duration::from_millis(1000)));
    }

    #[test]
    fn rejected_reconfiguration_keeps_running() {
        let mut engine = engine(100);
        let start = Instant::now();
        engine.start(start);
        assert_eq!(engine.set_size(0), Err(ConfigError::SizeZero));
        assert!(engine.is_running());
        assert_eq!(engine.grid().size(), 7);
        assert!(engine.poll(start + Duration::from_millis(100)));
        assert_eq!(engine.grid().generation(), 2);
    }

    #[test]
    fn snapshots_reflect_the_engine() {
        let mut engine = engine(100);
        engine.toggle(1, 1);
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.size, 7);
        assert_eq!(snapshot.generation, 0);
        assert_eq!(snapshot.state, ControlState::Stopped);
        assert!(!snapshot.is_running());
        assert_eq!(snapshot.delay, Duration::from_millis(100));
        assert_eq!(snapshot.density, 0.0);
        assert!(snapshot.get(1, 1));
        assert_eq!(snapshot.population(), 1);
        let alive: Vec<(usize, usize)> = snapshot
            .iter()
            .filter(|&(_, _, alive)| alive)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert_eq!(alive, [(1, 1)]);
    }

    // thread tests: an hour-long delay keeps the timer out of the way,
    // and the command channel serializes everything else.
    fn spawn_sim() -> (Sim, SimHandle) {
        let config = GridConfig {
            size: 7,
            density: 0.0,
            delay: Duration::from_secs(3600),
            seed: Some(0),
        };
        let sim = Sim::spawn(Engine::new(Grid::new(config).unwrap()));
        let handle = sim.handle();
        (sim, handle)
    }

    #[test]
    fn commands_are_applied_in_order() {
        let (sim, handle) = spawn_sim();
        handle.toggle(2, 2);
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.generation, 0);
        assert!(snapshot.get(2, 2));
        assert_eq!(snapshot.population(), 1);
        handle.shutdown();
        sim.join();
    }

    #[test]
    fn start_and_stop_over_the_channel() {
        let (sim, handle) = spawn_sim();
        handle.start();
        let running = handle.snapshot();
        assert_eq!(running.generation, 1);
        assert!(running.is_running());
        handle.stop();
        let paused = handle.snapshot();
        assert_eq!(paused.generation, 1);
        assert_eq!(paused.state, ControlState::Paused);
        handle.shutdown();
        sim.join();
    }

    #[test]
    fn blinker_steps_over_the_channel() {
        let (sim, handle) = spawn_sim();
        for x in [2, 3, 4] {
            handle.toggle(x, 3);
        }
        handle.step();
        let vertical: Vec<(usize, usize)> = handle
            .snapshot()
            .iter()
            .filter(|&(_, _, alive)| alive)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert_eq!(vertical, [(3, 2), (3, 3), (3, 4)]);
        handle.step();
        let horizontal: Vec<(usize, usize)> = handle
            .snapshot()
            .iter()
            .filter(|&(_, _, alive)| alive)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert_eq!(horizontal, [(2, 3), (3, 3), (4, 3)]);
        handle.shutdown();
        sim.join();
    }

    #[test]
    fn reset_over_the_channel() {
        let (sim, handle) = spawn_sim();
        handle.toggle(1, 1);
        handle.step();
        handle.reset();
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.generation, 0);
        assert_eq!(snapshot.population(), 0);
        assert_eq!(snapshot.state, ControlState::Stopped);
        handle.shutdown();
        sim.join();
    }
}
