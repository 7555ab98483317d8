use crate::ui::ticker::Label;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};

pub struct StatusBar {
    pub pending: usize,
}

impl StatusBar {
    pub fn new() -> Self {
        Self { pending: 0 }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, label: &Label) {
        let (arrow, arrow_color) = label.direction();
        let (status_text, status_color) = if self.pending > 0 {
            (format!("○ {} pending", self.pending), Color::Yellow)
        } else {
            ("●".to_string(), Color::Green)
        };

        let text = Line::from(vec![
            Span::styled(format!("{} ", arrow), Style::default().fg(arrow_color)),
            Span::styled(
                label.text.clone(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" | "),
            Span::styled(status_text, Style::default().fg(status_color)),
            Span::raw(" | "),
            Span::styled("Q", Style::default().fg(Color::Yellow)),
            Span::raw(":Quit "),
            Span::styled("1-7", Style::default().fg(Color::Yellow)),
            Span::raw(":Range "),
            Span::styled("←→", Style::default().fg(Color::Yellow)),
            Span::raw(":Prev/Next "),
            Span::styled("R", Style::default().fg(Color::Yellow)),
            Span::raw(":Refresh "),
            Span::styled("Space", Style::default().fg(Color::Yellow)),
            Span::raw(":Cycle"),
        ]);

        let para = Paragraph::new(text).block(Block::default());
        frame.render_widget(para, area);
    }
}
