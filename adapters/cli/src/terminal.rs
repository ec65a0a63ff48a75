//! Text backend that prints scenes to a writer.

use std::{io::Write, thread, time::Duration};

use anyhow::{Context, Result};
use gridpulse_rendering::{FrameControl, Presentation, RenderingBackend, Scene};

/// Prints a status line, and optionally the board, every few frames.
#[derive(Debug)]
pub(crate) struct TerminalBackend<W> {
    out: W,
    frame: Duration,
    print_every: u32,
    show_board: bool,
    pace: bool,
}

impl<W: Write> TerminalBackend<W> {
    pub(crate) fn new(out: W, frame: Duration, print_every: u32) -> Self {
        Self {
            out,
            frame,
            print_every: print_every.max(1),
            show_board: true,
            pace: false,
        }
    }

    pub(crate) fn with_board(mut self, show_board: bool) -> Self {
        self.show_board = show_board;
        self
    }

    /// Sleeps for the frame duration between frames so wall-clock driven
    /// collaborators keep up with the simulation.
    pub(crate) fn paced(mut self, pace: bool) -> Self {
        self.pace = pace;
        self
    }

    fn present(&mut self, label: &str, scene: &Scene) -> Result<()> {
        writeln!(self.out, "{label}: {}", scene.status_line())
            .context("failed to write status line")?;
        if self.show_board {
            write!(self.out, "{}", scene.to_ascii()).context("failed to write board")?;
        }
        Ok(())
    }
}

impl<W: Write> RenderingBackend for TerminalBackend<W> {
    fn run<F>(mut self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, &mut Scene) -> Result<FrameControl>,
    {
        let Presentation {
            window_title,
            mut scene,
            ..
        } = presentation;
        writeln!(
            self.out,
            "{window_title} ({}x{} px)",
            scene.width(),
            scene.height()
        )
        .context("failed to write title")?;
        self.present("start", &scene)?;

        let mut frame_index: u64 = 0;
        loop {
            if self.pace {
                thread::sleep(self.frame);
            }
            let control = update_scene(self.frame, &mut scene)?;
            frame_index += 1;

            if control == FrameControl::Exit {
                self.present(&format!("frame {frame_index}"), &scene)?;
                break;
            }
            if frame_index % u64::from(self.print_every) == 0 {
                self.present(&format!("frame {frame_index}"), &scene)?;
            }
        }

        self.out.flush().context("failed to flush output")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridpulse_rendering::palette;
    use gridpulse_world::World;

    #[test]
    fn prints_until_update_exits() {
        let world = World::new();
        let scene = Scene::capture(&world);
        let presentation = Presentation::new("Grid Pulse", palette::OPEN_CELL, scene);
        let mut output = Vec::new();
        let mut frames = 0;

        TerminalBackend::new(&mut output, Duration::from_millis(16), 2)
            .with_board(false)
            .run(presentation, |_, _| {
                frames += 1;
                Ok(if frames == 5 {
                    FrameControl::Exit
                } else {
                    FrameControl::Continue
                })
            })
            .expect("writing to a vector succeeds");

        let text = String::from_utf8(output).expect("utf-8 output");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Grid Pulse (672x480 px)");
        assert!(lines[1].starts_with("start: energy 0"));
        assert!(lines[2].starts_with("frame 2:"));
        assert!(lines[3].starts_with("frame 4:"));
        assert!(lines[4].starts_with("frame 5:"));
        assert_eq!(lines.len(), 5);
    }
}
