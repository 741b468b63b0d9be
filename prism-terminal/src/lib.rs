/// Terminal presentation for the Prism rasterizer
use anyhow::{Context, Result};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use log::{debug, info};
use std::io::{stdout, Write};
use std::time::Instant;

use prism_core::{Framebuffer, RenderStats, Screen};

pub mod display;
pub mod scene;

pub use display::DisplayMode;
pub use scene::{Scene, SceneOptions};

/// Size of the pixel buffer that fills a terminal of `columns` x `rows`
/// cells, leaving the last row for the status line.
pub fn screen_for_terminal(columns: u16, rows: u16) -> Screen {
    let pixel_rows = (rows as usize).saturating_sub(1) * 2;
    Screen::new(columns as usize, pixel_rows)
}

/// Shows one rendered frame until the user quits
pub struct TerminalApp {
    scene: Scene,
    mode: DisplayMode,
    frame: Option<(Framebuffer, RenderStats)>,
    render_millis: u128,
    running: bool,
}

impl TerminalApp {
    pub fn new(scene: Scene, mode: DisplayMode) -> Self {
        Self {
            scene,
            mode,
            frame: None,
            render_millis: 0,
            running: true,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        terminal::enable_raw_mode().context("failed to enable raw mode")?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> Result<()> {
        let (columns, rows) = terminal::size()?;
        self.render(columns, rows)?;
        self.present()?;

        while self.running {
            match event::read()? {
                Event::Key(key) => self.handle_key(key),
                // The frame is rebuilt only when the surface it was built for changes
                Event::Resize(columns, rows) => {
                    self.render(columns, rows)?;
                    self.present()?;
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if let KeyCode::Char('q') | KeyCode::Esc = key.code {
            self.running = false;
        }
    }

    fn render(&mut self, columns: u16, rows: u16) -> Result<()> {
        let screen = screen_for_terminal(columns, rows);
        if screen.width == 0 || screen.height == 0 {
            debug!("terminal too small to render ({}x{})", columns, rows);
            self.frame = None;
            return Ok(());
        }

        let start = Instant::now();
        let frame = self
            .scene
            .render(screen)
            .context("failed to render frame")?;
        self.render_millis = start.elapsed().as_millis();
        info!(
            "rendered {}x{} in {} ms",
            screen.width, screen.height, self.render_millis
        );

        self.frame = Some(frame);
        Ok(())
    }

    fn present(&self) -> Result<()> {
        let mut stdout = stdout();
        queue!(stdout, terminal::Clear(ClearType::All), cursor::MoveTo(0, 0))?;

        let Some((frame, stats)) = &self.frame else {
            stdout.flush()?;
            return Ok(());
        };
        display::draw(frame, self.mode, &mut stdout)?;

        // Status line
        queue!(
            stdout,
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "Prism | {:?} | {}x{} | {} faces, {} culled | {} ms | Q=Quit",
                self.scene.settings.shading,
                frame.width(),
                frame.height(),
                stats.faces_drawn,
                stats.faces_culled,
                self.render_millis
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_for_terminal() {
        assert_eq!(screen_for_terminal(80, 25), Screen::new(80, 48));
        assert_eq!(screen_for_terminal(80, 0), Screen::new(80, 0));
        assert_eq!(display::cell_rows(screen_for_terminal(80, 25).height), 24);
    }
}
