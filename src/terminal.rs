// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};

use crossterm::{
    cursor, event,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::frame::Frame;

/// Owns the terminal session: raw mode, alternate screen, hidden cursor
/// and (optionally) mouse capture. Everything acquired here is released
/// on Drop, so teardown happens on every exit path.
pub struct Terminal {
    stdout: Stdout,
    mouse_captured: bool,
}

impl Terminal {
    pub fn new(capture_mouse: bool) -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init_res: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            if capture_mouse {
                out.execute(event::EnableMouseCapture)?;
            }
            out.execute(event::EnableFocusChange)?;
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()?;
            Ok(())
        })();
        if let Err(e) = init_res {
            restore_terminal_best_effort();
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            mouse_captured: capture_mouse,
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn poll_event(timeout: std::time::Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    /// Flush the frame's dirty cells. The frame's own change tracking is
    /// exact (unchanged writes never dirty a cell), so everything in the
    /// dirty list really needs repainting.
    pub fn present(&mut self, frame: &mut Frame) -> Result<()> {
        let mut cur_fg: Option<Color> = None;
        let mut cur_bg: Option<Color> = None;
        let mut cur_bold = false;

        let mut apply_style =
            |out: &mut Stdout, fg: Option<Color>, bg: Option<Color>, bold: bool| -> Result<()> {
                if fg != cur_fg {
                    out.queue(SetForegroundColor(fg.unwrap_or(Color::Reset)))?;
                    cur_fg = fg;
                }
                if bg != cur_bg {
                    out.queue(SetBackgroundColor(bg.unwrap_or(Color::Reset)))?;
                    cur_bg = bg;
                }
                if bold != cur_bold {
                    out.queue(SetAttribute(if bold {
                        Attribute::Bold
                    } else {
                        Attribute::NormalIntensity
                    }))?;
                    cur_bold = bold;
                }
                Ok(())
            };

        if frame.is_dirty_all() {
            self.stdout.queue(terminal::Clear(terminal::ClearType::All))?;
            for y in 0..frame.height {
                self.stdout.queue(cursor::MoveTo(0, y))?;
                for x in 0..frame.width {
                    let idx = y as usize * frame.width as usize + x as usize;
                    let cell = frame.cell_at_index(idx);
                    apply_style(&mut self.stdout, cell.fg, cell.bg, cell.bold)?;
                    self.stdout.queue(Print(cell.ch))?;
                }
            }
        } else {
            let mut dirty: Vec<usize> = frame.dirty_indices().to_vec();
            dirty.sort_unstable();
            let width = frame.width as usize;

            let mut i = 0;
            while i < dirty.len() {
                let start = dirty[i];
                let cell = frame.cell_at_index(start);
                let x = (start % width) as u16;
                let y = (start / width) as u16;

                // Extend into a run of consecutive same-style cells so
                // one MoveTo covers the whole stretch.
                let mut run = String::new();
                run.push(cell.ch);
                let mut j = i + 1;
                let mut last = start;
                while j < dirty.len() && dirty[j] == last + 1 && dirty[j] % width != 0 {
                    let next = frame.cell_at_index(dirty[j]);
                    if next.fg != cell.fg || next.bg != cell.bg || next.bold != cell.bold {
                        break;
                    }
                    run.push(next.ch);
                    last = dirty[j];
                    j += 1;
                }

                self.stdout.queue(cursor::MoveTo(x, y))?;
                apply_style(&mut self.stdout, cell.fg, cell.bg, cell.bold)?;
                self.stdout.queue(Print(run.as_str()))?;
                i = j;
            }
        }

        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;
        frame.clear_dirty();
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.mouse_captured {
            let _ = self.stdout.execute(event::DisableMouseCapture);
        }
        let _ = self.stdout.execute(event::DisableFocusChange);
        let _ = self.stdout.execute(SetAttribute(Attribute::Reset));
        let _ = self.stdout.execute(ResetColor);
        let _ = self.stdout.execute(cursor::Show);
        let _ = self.stdout.execute(terminal::EnableLineWrap);
        let _ = self.stdout.execute(terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
        let _ = self.stdout.flush();
    }
}

/// Used by the panic hook and signal handlers, where no Terminal value
/// is reachable. Disables everything we might have enabled.
pub fn restore_terminal_best_effort() {
    let mut out = stdout();
    let _ = out.execute(event::DisableMouseCapture);
    let _ = out.execute(event::DisableFocusChange);
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}
