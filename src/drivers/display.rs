//! Status display worker.
//!
//! Renders the [`DisplayCommand`] contract onto a two-line, 16-column
//! frame: the top line carries the delivery headline, the bottom line
//! the link status, elapsed-time, and time-of-day fields. The frame is
//! written to the serial console; the worker re-renders only when the
//! frame content changes.

use core::str;

use crate::events::{DisplayCommand, DisplayMessage, MAX_DISPLAY_TEXT};

const COLS: usize = MAX_DISPLAY_TEXT;

/// Column where the elapsed-time field starts on the bottom line,
/// right after the 3-character link-status field.
const ELAPSED_COL: usize = 4;

/// Two-line fixed-width text frame.
pub struct Frame {
    rows: [[u8; COLS]; 2],
}

impl Frame {
    pub fn new() -> Self {
        Self {
            rows: [[b' '; COLS]; 2],
        }
    }

    fn clear(&mut self) {
        self.rows = [[b' '; COLS]; 2];
    }

    fn write_at(&mut self, row: usize, col: usize, text: &str) {
        for (i, byte) in text.bytes().enumerate() {
            let Some(cell) = self.rows[row].get_mut(col + i) else {
                break;
            };
            *cell = byte;
        }
    }

    /// Overwrite the whole top line (headline field).
    fn headline(&mut self, text: &str) {
        self.rows[0] = [b' '; COLS];
        self.write_at(0, 0, text);
    }

    /// Right-align `text` on the given row.
    fn write_right(&mut self, row: usize, text: &str) {
        let col = COLS.saturating_sub(text.len());
        self.write_at(row, col, text);
    }

    pub fn line(&self, row: usize) -> &str {
        // Rows only ever hold ASCII written by this module.
        str::from_utf8(&self.rows[row]).unwrap_or("")
    }

    /// Apply one display command to the frame.
    pub fn apply(&mut self, message: &DisplayMessage) {
        match message.command {
            DisplayCommand::Clear => self.clear(),
            DisplayCommand::Init => self.headline("Starting"),
            DisplayCommand::Run => {
                self.headline("Listening");
                self.write_at(1, 0, "OK ");
            }
            DisplayCommand::Connected => self.write_at(1, 0, "OK "),
            DisplayCommand::Disconnected => self.write_at(1, 0, "NET"),
            DisplayCommand::Arriving => self.headline("Milk Arriving"),
            DisplayCommand::Delivered => {
                self.headline("Delivered");
                self.write_at(1, 0, "OK ");
                if !message.text.is_empty() {
                    self.write_right(0, &message.text);
                }
            }
            DisplayCommand::TamperAlert => self.headline("Tamper Alert"),
            DisplayCommand::Panic => self.headline("XMIT FAIL"),
            DisplayCommand::Elapsed => self.write_at(1, ELAPSED_COL, &message.text),
            DisplayCommand::TimeOfDay => self.write_right(1, &message.text),
            DisplayCommand::Noop => {}
        }
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

/// Display worker loop. Drains the display queue; between messages it
/// refreshes the elapsed-since-delivery field once a minute ticks over.
#[cfg(target_os = "espidf")]
pub fn run<C: crate::app::ports::Clock>(
    stopwatch: crate::adapters::stopwatch::ElapsedStopwatch<C>,
) -> ! {
    use embassy_time::Duration;
    use log::info;

    use crate::app::channels::{DISPLAY_CHANNEL, recv_timeout};

    let mut frame = Frame::new();
    let mut shown: Option<(heapless::String<COLS>, heapless::String<COLS>)> = None;
    loop {
        match recv_timeout(&DISPLAY_CHANNEL, Duration::from_millis(1_000)) {
            Some(message) => frame.apply(&message),
            None => {
                let text = stopwatch.display_text();
                if !text.is_empty() {
                    frame.apply(&DisplayMessage::with_text(DisplayCommand::Elapsed, &text));
                }
            }
        }
        let current = (
            heapless::String::try_from(frame.line(0)).unwrap_or_default(),
            heapless::String::try_from(frame.line(1)).unwrap_or_default(),
        );
        if shown.as_ref() != Some(&current) {
            info!("display | {} | {}", current.0, current.1);
            shown = Some(current);
        }
    }
}
