//! Line-oriented front-end for plain terminals and pipes.

use std::io::{BufRead, Write};
use std::ops::ControlFlow;

use anyhow::Result;

use crate::codec;
use crate::models::{DeckStats, Flashcard};
use crate::session::{describe, ReviewIo};

/// Line that ends a typed answer.
const END_OF_ANSWER: &str = "<<<";

/// Commands accepted at any prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    Template,
    Clear,
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "help" => Some(Self::Help),
            "quit" => Some(Self::Quit),
            "temp" => Some(Self::Template),
            "clear" => Some(Self::Clear),
            _ => None,
        }
    }
}

pub struct Console<R, W> {
    input: R,
    output: W,
    ansi_clear: bool,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W, ansi_clear: bool) -> Self {
        Self {
            input,
            output,
            ansi_clear,
        }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }

    /// Next input line, or `None` at end of input.
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    /// Run a command if the line is one. `Break` means the user wants out.
    fn exec(&mut self, line: &str) -> Result<ControlFlow<()>> {
        match Command::parse(line) {
            Some(Command::Quit) => return Ok(ControlFlow::Break(())),
            Some(Command::Help) => write!(self.output, "{}", codec::help())?,
            Some(Command::Template) => write!(self.output, "{}", codec::template())?,
            Some(Command::Clear) => self.clear()?,
            None => {}
        }
        Ok(ControlFlow::Continue(()))
    }

    fn clear(&mut self) -> Result<()> {
        if self.ansi_clear {
            write!(self.output, "\x1b[2J\x1b[H")?;
        } else {
            for _ in 0..100 {
                writeln!(self.output)?;
            }
        }
        self.output.flush()?;
        Ok(())
    }
}

impl<R: BufRead, W: Write> ReviewIo for Console<R, W> {
    fn begin(&mut self, stats: DeckStats) -> Result<()> {
        self.clear()?;
        writeln!(
            self.output,
            "{} cards, {} to review, {} in long-term memory. Type help for commands.\n",
            stats.total_cards, stats.learning_cards, stats.graduated_cards
        )?;
        Ok(())
    }

    fn show_question(&mut self, question: &str) -> Result<()> {
        writeln!(self.output, "Question:")?;
        write!(self.output, "{}", question)?;
        writeln!(self.output, "Type your answer (finish with a line {}):", END_OF_ANSWER)?;
        self.output.flush()?;
        Ok(())
    }

    fn wait_for_answer(&mut self) -> Result<ControlFlow<()>> {
        while let Some(line) = self.read_line()? {
            if line.trim() == END_OF_ANSWER {
                return Ok(ControlFlow::Continue(()));
            }
            if self.exec(&line)?.is_break() {
                return Ok(ControlFlow::Break(()));
            }
        }
        Ok(ControlFlow::Break(()))
    }

    fn show_answer(&mut self, answer: &str) -> Result<()> {
        writeln!(self.output, "Answer:")?;
        write!(self.output, "{}", answer)?;
        Ok(())
    }

    fn read_judgment(&mut self) -> Result<ControlFlow<(), bool>> {
        loop {
            writeln!(self.output, "Correct? (y for right / n for wrong)")?;
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                return Ok(ControlFlow::Break(()));
            };
            if self.exec(&line)?.is_break() {
                return Ok(ControlFlow::Break(()));
            }
            match line.trim() {
                "y" => return Ok(ControlFlow::Continue(true)),
                "n" => return Ok(ControlFlow::Continue(false)),
                _ => {}
            }
        }
    }

    /// A judged card clears the screen before its statistics are printed.
    fn show_statistics(&mut self, record: &Flashcard) -> Result<()> {
        if !record.is_header() {
            self.clear()?;
        }
        writeln!(self.output, "{}\n", describe(record))?;
        self.output.flush()?;
        Ok(())
    }
}
