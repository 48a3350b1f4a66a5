use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    ToggleReveal,
    Correct,
    Incorrect,
    Restart,
    ResetCards,
    None,
}

pub fn map_event(ev: Event) -> Action {
    if let Event::Key(KeyEvent { code, kind, .. }) = ev {
        if kind == KeyEventKind::Release {
            return Action::None;
        }
        match code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Char(' ') | KeyCode::Enter => Action::ToggleReveal,
            KeyCode::Char('y') | KeyCode::Char('1') => Action::Correct,
            KeyCode::Char('n') | KeyCode::Char('0') => Action::Incorrect,
            KeyCode::Char('r') => Action::Restart,
            KeyCode::Char('R') => Action::ResetCards,
            _ => Action::None,
        }
    } else {
        Action::None
    }
}
