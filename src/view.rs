use std::{
    io::{stdin, stdout, Write},
    sync::mpsc,
    thread::{self, JoinHandle},
    time::Duration,
};

use lifers::{SimHandle, Snapshot};
use termion::{event::Key, input::TermRead, raw::IntoRawMode};

use crate::{pos, Pos};

pub use canvas::Canvas;
mod canvas;

pub struct View {
    thread: JoinHandle<()>,
}
impl View {
    pub fn spawn(handle: SimHandle) -> Self {
        let thread = thread::spawn(move || view_loop(handle));
        Self { thread }
    }

    pub fn join(self) {
        self.thread.join().unwrap();
    }
}

#[derive(Debug)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug)]
pub enum InputCmd {
    Exit,
    Move(Dir),
    Toggle,
    StartOrPause,
    Step,
    Reset,
    Accelerate,
    Decelerate,
    GrowBoard,
    ShrinkBoard,
    RaiseDensity,
    LowerDensity,
}

fn input_loop(sender: mpsc::Sender<InputCmd>) {
    for c in stdin().keys() {
        let command = match c.unwrap() {
            Key::Char('q') => InputCmd::Exit,
            Key::Up => InputCmd::Move(Dir::Up),
            Key::Down => InputCmd::Move(Dir::Down),
            Key::Left => InputCmd::Move(Dir::Left),
            Key::Right => InputCmd::Move(Dir::Right),
            Key::Char('\n') => InputCmd::Toggle,
            Key::Char(' ') => InputCmd::StartOrPause,
            Key::Char('s') => InputCmd::Step,
            Key::Char('r') => InputCmd::Reset,
            Key::Char('+') => InputCmd::Accelerate,
            Key::Char('-') => InputCmd::Decelerate,
            Key::Char(']') => InputCmd::GrowBoard,
            Key::Char('[') => InputCmd::ShrinkBoard,
            Key::Char('.') => InputCmd::RaiseDensity,
            Key::Char(',') => InputCmd::LowerDensity,
            _ => continue,
        };

        let exit = matches!(command, InputCmd::Exit);
        if sender.send(command).is_err() || exit {
            break;
        }
    }
}

const VIEW_REFRESH_INTERVAL: Duration = Duration::from_millis(100);
const MIN_DELAY: Duration = Duration::from_millis(10);
const MAX_DELAY: Duration = Duration::from_secs(4);
const DENSITY_STEP: f64 = 0.05;

fn view_loop(handle: SimHandle) {
    let screen = stdout().into_raw_mode().unwrap();
    let (sender, receiver) = mpsc::channel();
    let _input_handle = thread::spawn(move || input_loop(sender));

    print!("{}", termion::cursor::Hide);

    let mut cursor = pos!(0, 0);
    'frames: loop {
        let snapshot = handle.snapshot();
        cursor = cursor.wrapped(snapshot.size);
        loop {
            match receiver.try_recv() {
                Ok(cmd) => {
                    if handle_input(cmd, &handle, &snapshot, &mut cursor) {
                        break 'frames;
                    }
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => break 'frames,
            }
        }
        display_board(&snapshot, cursor);
        thread::sleep(VIEW_REFRESH_INTERVAL);
    }

    print!(
        "{}{}{}",
        termion::clear::All,
        termion::cursor::Goto(1, 1),
        termion::cursor::Show
    );
    stdout().flush().unwrap();
    drop(screen);
    handle.shutdown();
}

fn handle_input(cmd: InputCmd, handle: &SimHandle, snapshot: &Snapshot, cursor: &mut Pos) -> bool {
    match cmd {
        InputCmd::Exit => return true,
        InputCmd::Move(direction) => {
            let offset = match direction {
                Dir::Up => pos!(0, -1),
                Dir::Down => pos!(0, 1),
                Dir::Left => pos!(-1, 0),
                Dir::Right => pos!(1, 0),
            };
            *cursor = (*cursor + offset).wrapped(snapshot.size);
        }
        InputCmd::Toggle => handle.toggle(cursor.x as usize, cursor.y as usize),
        InputCmd::StartOrPause => handle.start_or_pause(),
        InputCmd::Step => handle.step(),
        InputCmd::Reset => handle.reset(),
        InputCmd::Accelerate => handle.set_delay((snapshot.delay / 2).max(MIN_DELAY)),
        InputCmd::Decelerate => handle.set_delay((snapshot.delay * 2).min(MAX_DELAY)),
        InputCmd::GrowBoard => handle.set_size(snapshot.size + 1),
        InputCmd::ShrinkBoard => {
            if snapshot.size > 1 {
                handle.set_size(snapshot.size - 1)
            }
        }
        InputCmd::RaiseDensity => handle.set_density((snapshot.density + DENSITY_STEP).min(1.0)),
        InputCmd::LowerDensity => handle.set_density((snapshot.density - DENSITY_STEP).max(0.0)),
    }
    false
}

fn display_board(snapshot: &Snapshot, cursor: Pos) {
    let size = snapshot.size;
    let mut canvas = Canvas::new(size, size);
    canvas.layer(|_| Some('.'));
    canvas.layer(|pos| snapshot.get(pos.x as usize, pos.y as usize).then_some('#'));
    canvas.layer(|pos| (pos == cursor).then_some('+'));
    canvas.display();

    let status = termion::cursor::Goto(1, size as u16 + 2);
    print!(
        "{status}gen {}  pop {}  {}  delay {}ms  size {}  density {:.2}",
        snapshot.generation,
        snapshot.population(),
        snapshot.state,
        snapshot.delay.as_millis(),
        size,
        snapshot.density
    );
    stdout().flush().unwrap();
}
