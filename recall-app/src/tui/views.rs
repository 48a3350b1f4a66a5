use crate::tui::theme::*;
use recall_core::{Card, SessionSummary};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

pub struct Progress {
    pub position: usize,
    pub total: usize,
    pub correct: u32,
    pub incorrect: u32,
}

pub enum RightPane<'a> {
    Card { card: &'a Card, reveal: bool },
    Done(Option<SessionSummary>),
    NothingDue,
}

pub fn draw_ui(f: &mut Frame, area: Rect, progress: &Progress, right: RightPane, message: Option<&str>) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(area);
    draw_progress(f, chunks[0], progress);
    draw_right(f, chunks[1], right);

    let foot = Paragraph::new(Line::from(vec![
        Span::raw(" space reveal  "),
        Span::raw(" y recalled  "),
        Span::raw(" n missed  "),
        Span::raw(" r new session  "),
        Span::raw(" q quit "),
        Span::raw(message.unwrap_or("")),
    ]))
    .style(footer_style());
    let fh = Rect {
        x: area.x,
        y: area.y + area.height.saturating_sub(1),
        width: area.width,
        height: 1,
    };
    f.render_widget(foot, fh);
}

fn draw_progress(f: &mut Frame, area: Rect, p: &Progress) {
    let block = Block::default().title("Session").borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let ratio = if p.total == 0 { 1.0 } else { p.position as f64 / p.total as f64 };
    let gauge = Gauge::default()
        .ratio(ratio.clamp(0.0, 1.0))
        .label(format!("{}/{}", p.position, p.total));
    f.render_widget(gauge, Rect { height: 1.min(inner.height), ..inner });

    let counts = Paragraph::new(vec![
        Line::from(vec![Span::raw("recalled: ").style(correct_style()), Span::raw(p.correct.to_string())]),
        Line::from(vec![Span::raw("missed:   ").style(incorrect_style()), Span::raw(p.incorrect.to_string())]),
    ]);
    let rest = Rect {
        y: inner.y + 2,
        height: inner.height.saturating_sub(2),
        ..inner
    };
    f.render_widget(counts, rest);
}

fn draw_right(f: &mut Frame, area: Rect, pane: RightPane) {
    let block = Block::default().title("Review").borders(Borders::ALL);
    match pane {
        RightPane::NothingDue => {
            let p = Paragraph::new(vec![
                Line::from("No cards are due right now."),
                Line::from(""),
                Line::from(Span::raw("Press R to reset all progress and start over.").style(hint_style())),
            ])
            .wrap(Wrap { trim: true })
            .block(block);
            f.render_widget(p, area);
        }
        RightPane::Done(summary) => {
            let text = match summary {
                Some(s) => vec![
                    Line::from(Span::raw("Session complete").style(title_style())),
                    Line::from(""),
                    Line::from(format!("recalled {}, missed {}", s.correct_count, s.incorrect_count)),
                    Line::from(format!("accuracy {:.0}%", s.accuracy * 100.0)),
                ],
                None => vec![Line::from("Session complete")],
            };
            let p = Paragraph::new(text).wrap(Wrap { trim: true }).block(block);
            f.render_widget(p, area);
        }
        RightPane::Card { card, reveal } => {
            let mut text = vec![
                Line::from(Span::raw(card.tags.category.as_str()).style(hint_style())),
                Line::from(""),
                Line::from(vec![Span::raw("Q: ").style(title_style()), Span::raw(&card.prompt)]),
                Line::from(""),
            ];
            if reveal {
                text.push(Line::from(vec![Span::raw("A: ").style(title_style()), Span::raw(&card.answer)]));
                if let Some(src) = &card.tags.source {
                    text.push(Line::from(""));
                    text.push(Line::from(Span::raw(src.as_str()).style(hint_style())));
                }
            } else {
                text.push(Line::from(Span::raw("(space to reveal)").style(hint_style())));
            }
            let p = Paragraph::new(text).wrap(Wrap { trim: true }).block(block);
            f.render_widget(p, area);
        }
    }
}
