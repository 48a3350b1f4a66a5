use crate::tui::{
    inputs::{map_event, Action},
    views::{self, Progress, RightPane},
};
use crossterm::{
    event::{self},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use recall_core::{Clock, Judgment, Persistence, Trainer};
use std::io::{stdout, Stdout};

pub struct TuiApp<P: Persistence, C: Clock> {
    trainer: Trainer<P, C>,
    reveal: bool,
    message: Option<String>,
}

impl<P: Persistence, C: Clock> TuiApp<P, C> {
    pub fn new(trainer: Trainer<P, C>) -> Self {
        Self { trainer, reveal: false, message: None }
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let res = self.mainloop(&mut terminal);

        disable_raw_mode().ok();
        let mut out: Stdout = std::io::stdout();
        execute!(out, LeaveAlternateScreen).ok();
        terminal.show_cursor().ok();

        res
    }

    fn progress(&self) -> Progress {
        let s = self.trainer.session();
        Progress {
            position: s.position(),
            total: s.total(),
            correct: s.correct_count(),
            incorrect: s.incorrect_count(),
        }
    }

    fn mainloop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> anyhow::Result<()> {
        loop {
            let progress = self.progress();
            terminal.draw(|f| {
                let right = match self.trainer.current_card() {
                    Some(card) => RightPane::Card { card, reveal: self.reveal },
                    None if self.trainer.session().total() == 0 => RightPane::NothingDue,
                    None => RightPane::Done(self.trainer.summary().ok()),
                };
                views::draw_ui(f, f.size(), &progress, right, self.message.as_deref());
            })?;

            if event::poll(std::time::Duration::from_millis(100))? {
                match self.handle(map_event(event::read()?)) {
                    Ok(true) => break,
                    Ok(false) => {}
                    Err(e) => self.message = Some(format!(" error: {e}")),
                }
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should exit.
    fn handle(&mut self, action: Action) -> anyhow::Result<bool> {
        match action {
            Action::Quit => return Ok(true),
            Action::ToggleReveal => self.reveal = !self.reveal,
            Action::Correct | Action::Incorrect => {
                if self.trainer.current_card().is_some() && self.reveal {
                    let j = if action == Action::Correct { Judgment::Correct } else { Judgment::Incorrect };
                    self.trainer.submit_judgment(j)?;
                    self.reveal = false;
                    self.message = self
                        .trainer
                        .last_outcome()
                        .map(|o| format!(" next review in {}h", o.interval_hours));
                }
            }
            Action::Restart => {
                self.trainer.reset_session();
                self.reveal = false;
                self.message = None;
            }
            Action::ResetCards => {
                // Only offered once nothing is left to review.
                if self.trainer.current_card().is_none() {
                    self.trainer.reset_cards()?;
                    self.reveal = false;
                    self.message = Some(" progress reset".into());
                }
            }
            Action::None => {}
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use recall_core::{Card, FixedClock, MemoryPersistence};

    fn app() -> TuiApp<MemoryPersistence, FixedClock> {
        let cards = vec![Card::with_id("1", "q1", "a1"), Card::with_id("2", "q2", "a2")];
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        TuiApp::new(Trainer::open(MemoryPersistence::with_cards(cards), clock).unwrap())
    }

    #[test]
    fn judgment_requires_reveal() {
        let mut a = app();
        a.handle(Action::Correct).unwrap();
        assert_eq!(a.trainer.session().position(), 0);
        a.handle(Action::ToggleReveal).unwrap();
        a.handle(Action::Correct).unwrap();
        assert_eq!(a.trainer.session().position(), 1);
        assert!(!a.reveal);
    }

    #[test]
    fn reset_cards_only_when_nothing_left() {
        let mut a = app();
        a.handle(Action::ResetCards).unwrap();
        assert!(a.message.is_none());
        for _ in 0..2 {
            a.handle(Action::ToggleReveal).unwrap();
            a.handle(Action::Correct).unwrap();
        }
        a.handle(Action::Restart).unwrap();
        assert_eq!(a.trainer.session().total(), 0);
        a.handle(Action::ResetCards).unwrap();
        assert_eq!(a.trainer.session().total(), 2);
        assert!(a.handle(Action::Quit).unwrap());
    }
}
