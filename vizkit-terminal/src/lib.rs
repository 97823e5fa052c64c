/// Terminal front-end: scene programs, command line and interactive viewer
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use vizkit_core::Scene;
use vizkit_render::RenderWindow;

pub mod cli;
pub mod config;
pub mod renderer;
pub mod scenes;

pub use config::{SceneConfig, SceneKind};
pub use renderer::{CellMode, TerminalRenderer};

/// Degrees per key press when orbiting the cameras
const ORBIT_STEP: f32 = 5.0;

/// Camera change requested by a key
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewCommand {
    Quit,
    Azimuth(f32),
    Elevation(f32),
    Reset,
}

/// Map a key to a viewer command
pub fn command_for(code: KeyCode) -> Option<ViewCommand> {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Some(ViewCommand::Quit),
        KeyCode::Char('a') | KeyCode::Left => Some(ViewCommand::Azimuth(-ORBIT_STEP)),
        KeyCode::Char('d') | KeyCode::Right => Some(ViewCommand::Azimuth(ORBIT_STEP)),
        KeyCode::Char('w') | KeyCode::Up => Some(ViewCommand::Elevation(ORBIT_STEP)),
        KeyCode::Char('s') | KeyCode::Down => Some(ViewCommand::Elevation(-ORBIT_STEP)),
        KeyCode::Char('r') => Some(ViewCommand::Reset),
        _ => None,
    }
}

/// Apply a command to every renderer's camera; returns false on quit
pub fn apply_command(
    window: &mut RenderWindow,
    scene: &Scene,
    command: ViewCommand,
) -> vizkit_core::VizResult<bool> {
    match command {
        ViewCommand::Quit => return Ok(false),
        ViewCommand::Azimuth(degrees) => {
            for renderer in window.renderers_mut() {
                renderer.camera.azimuth(degrees);
            }
        }
        ViewCommand::Elevation(degrees) => {
            for renderer in window.renderers_mut() {
                renderer.camera.elevation(degrees);
            }
        }
        ViewCommand::Reset => window.reset_cameras(scene)?,
    }
    Ok(true)
}

/// Interactive viewer drawing a render window into the terminal
pub struct TerminalApp {
    scene: Scene,
    window: RenderWindow,
    renderer: TerminalRenderer,
    running: bool,
    dirty: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(scene: Scene, window: RenderWindow) -> io::Result<Self> {
        let (cols, rows) = terminal::size()?;

        Ok(Self {
            scene,
            window,
            // The top row holds the status line
            renderer: TerminalRenderer::new(cols, rows.saturating_sub(1), CellMode::TrueColor),
            running: true,
            dirty: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            // Handle input
            if event::poll(Duration::from_millis(0))? {
                self.handle_input()?;
            }

            // Only redraw after the view changed
            if self.dirty {
                self.render()?;
                self.dirty = false;
                self.frame_count += 1;
            }

            // Frame timing
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        match event::read()? {
            Event::Key(KeyEvent { code, .. }) => {
                if let Some(command) = command_for(code) {
                    self.running = apply_command(&mut self.window, &self.scene, command)
                        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
                    self.dirty = true;
                }
            }
            Event::Resize(cols, rows) => {
                self.renderer.resize(cols, rows.saturating_sub(1));
                self.dirty = true;
            }
            _ => {}
        }
        Ok(())
    }

    fn render(&mut self) -> io::Result<()> {
        let (width, height) = self.renderer.frame_size();
        if width == 0 || height == 0 {
            return Ok(());
        }
        let frame = self
            .window
            .render_with_size(&self.scene, width, height)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

        // Output to terminal
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 1))?;

        self.renderer.draw(&frame, &mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(terminal::ClearType::CurrentLine),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "{} | FPS: {:.1} | Controls: WASD/Arrows=Orbit R=Reset Q=Quit",
                self.window.title, self.fps
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}
