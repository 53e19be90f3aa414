/*!
 * Rendering of resolved cues.
 *
 * The platform owns the actual overlay; the core hands it frames through
 * [`DisplayDriver`]. [`DisplayController`] sits in front of the driver and
 * forwards only frames that differ from what is already on screen.
 */

use anyhow::Result;
use std::io::Write;

use crate::subtitle::ResolvedCues;

/// Draws subtitle frames
pub trait DisplayDriver: Send {
    /// Show both sides of a frame; an empty side is hidden
    fn show(&mut self, frame: &ResolvedCues) -> Result<()>;

    /// Remove everything from the screen
    fn clear(&mut self) -> Result<()>;
}

/// Idempotent front for a [`DisplayDriver`]
#[derive(Debug)]
pub struct DisplayController<D: DisplayDriver> {
    driver: D,
    current: Option<ResolvedCues>,
}

impl<D: DisplayDriver> DisplayController<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            current: None,
        }
    }

    /// Render a frame, returning whether the driver was called
    pub fn render(&mut self, frame: ResolvedCues) -> Result<bool> {
        if frame.is_empty() {
            return self.clear();
        }
        if self.current.as_ref() == Some(&frame) {
            return Ok(false);
        }

        self.driver.show(&frame)?;
        self.current = Some(frame);
        Ok(true)
    }

    /// Clear the screen unless it is already clear
    pub fn clear(&mut self) -> Result<bool> {
        if self.current.is_none() {
            return Ok(false);
        }
        self.driver.clear()?;
        self.current = None;
        Ok(true)
    }

    /// The frame currently on screen
    pub fn current(&self) -> Option<&ResolvedCues> {
        self.current.as_ref()
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn into_driver(self) -> D {
        self.driver
    }
}

/// Writes frames as text lines, used by the CLI
#[derive(Debug)]
pub struct TextDisplay<W: Write + Send> {
    out: W,
    time: f64,
}

impl<W: Write + Send> TextDisplay<W> {
    pub fn new(out: W) -> Self {
        Self { out, time: 0.0 }
    }

    /// Playback time printed in front of the next frame
    pub fn set_time(&mut self, time: f64) {
        self.time = time;
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> DisplayDriver for TextDisplay<W> {
    fn show(&mut self, frame: &ResolvedCues) -> Result<()> {
        writeln!(self.out, "[{:>9.3}] {}", self.time, frame.original_text)?;
        if !frame.translated_text.is_empty() {
            writeln!(self.out, "{:>12}{}", "", frame.translated_text)?;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        writeln!(self.out, "[{:>9.3}] --", self.time)?;
        Ok(())
    }
}
