use crossterm::{
    cursor::MoveToPreviousLine,
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use std::io;

use crate::models::{SessionResult, StopReason};

/// In-place status line for one interactive run: accepted-address count
/// while the walk is going, colored summary when it stops.
pub struct SessionDisplay {
    status_printed: bool,
    ticks: usize,
}

impl SessionDisplay {
    pub fn new() -> Self {
        SessionDisplay {
            status_printed: false,
            ticks: 0,
        }
    }

    /// Grey preamble: how much per-term history was loaded.
    pub fn show_history(&mut self, known_addresses: usize) -> io::Result<()> {
        execute!(
            io::stdout(),
            SetForegroundColor(Color::DarkGrey),
            Print(format!(
                "Ledger: {} previously saved addresses for this term\n",
                known_addresses
            )),
            ResetColor
        )
    }

    pub fn update_progress(&mut self, accepted: usize) -> io::Result<()> {
        if self.status_printed {
            execute!(
                io::stdout(),
                MoveToPreviousLine(1),
                Clear(ClearType::CurrentLine),
            )?;
        }

        let spinner = match self.ticks % 4 {
            0 => "⠋",
            1 => "⠙",
            2 => "⠹",
            _ => "⠸",
        };
        self.ticks += 1;

        execute!(
            io::stdout(),
            SetForegroundColor(Color::White),
            Print(format!("{} Extracting... {} new addresses\n", spinner, accepted)),
            ResetColor
        )?;
        self.status_printed = true;
        Ok(())
    }

    pub fn show_result(&mut self, result: &SessionResult) -> io::Result<()> {
        if self.status_printed {
            execute!(
                io::stdout(),
                MoveToPreviousLine(1),
                Clear(ClearType::CurrentLine),
            )?;
            self.status_printed = false;
        }

        let (color, mark) = match result.reason {
            StopReason::LimitReached | StopReason::PagesExhausted => (Color::Green, "✓"),
            StopReason::Cancelled => (Color::Yellow, "∙"),
            StopReason::SourceError(_) => (Color::Red, "✗"),
        };

        execute!(
            io::stdout(),
            SetForegroundColor(color),
            Print(format!(
                "{} {} addresses saved ({})\n",
                mark, result.accepted, result.reason
            )),
            ResetColor,
            SetForegroundColor(Color::DarkGrey),
            Print(format!(
                "  pages: {} | skipped details: {} | empty/PO box: {} | duplicates: {}\n",
                result.pages_visited,
                result.skipped_details,
                result.invalid_addresses,
                result.duplicate_addresses
            )),
            ResetColor
        )
    }
}

impl Default for SessionDisplay {
    fn default() -> Self {
        Self::new()
    }
}
