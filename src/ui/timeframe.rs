use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use serde::{Deserialize, Serialize};

/// Chart time range together with the sampling interval requested for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Preset {
    Today,
    Week,
    Month,
    YearToDate,
    Year,
    FiveYears,
    All,
}

impl Preset {
    pub fn all() -> [Preset; 7] {
        [
            Preset::Today,
            Preset::Week,
            Preset::Month,
            Preset::YearToDate,
            Preset::Year,
            Preset::FiveYears,
            Preset::All,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Preset::Today => "Today",
            Preset::Week => "Week",
            Preset::Month => "Month",
            Preset::YearToDate => "YTD",
            Preset::Year => "Year",
            Preset::FiveYears => "5Y",
            Preset::All => "All",
        }
    }

    pub fn range(&self) -> &'static str {
        match self {
            Preset::Today => "1d",
            Preset::Week => "5d",
            Preset::Month => "1mo",
            Preset::YearToDate => "ytd",
            Preset::Year => "1y",
            Preset::FiveYears => "5y",
            Preset::All => "max",
        }
    }

    pub fn interval(&self) -> &'static str {
        match self {
            Preset::Today => "1m",
            Preset::Week => "5m",
            Preset::Month => "30m",
            Preset::YearToDate => "1d",
            Preset::Year => "1d",
            Preset::FiveYears => "1wk",
            Preset::All => "1mo",
        }
    }

    /// strftime pattern for time-axis labels at this range.
    pub fn time_label_format(&self) -> &'static str {
        match self {
            Preset::Today => "%H:%M",
            Preset::Week | Preset::Month => "%m/%d",
            _ => "%m/%Y",
        }
    }
}

/// Holds the active preset. Re-selecting it is a no-op.
pub struct PresetSelector {
    pub presets: [Preset; 7],
    pub selected: usize,
}

impl PresetSelector {
    pub fn from_preset(preset: Preset) -> Self {
        let presets = Preset::all();
        let selected = presets.iter().position(|p| *p == preset).unwrap_or(0);
        Self { presets, selected }
    }

    pub fn current(&self) -> Preset {
        self.presets[self.selected]
    }

    /// Returns the new preset when the selection actually changed.
    pub fn select(&mut self, preset: Preset) -> Option<Preset> {
        let idx = self.presets.iter().position(|p| *p == preset)?;
        if idx == self.selected {
            return None;
        }
        self.selected = idx;
        Some(preset)
    }

    pub fn select_index(&mut self, idx: usize) -> Option<Preset> {
        let preset = *self.presets.get(idx)?;
        self.select(preset)
    }

    pub fn select_next(&mut self) -> Option<Preset> {
        self.select_index((self.selected + 1) % self.presets.len())
    }

    pub fn select_prev(&mut self) -> Option<Preset> {
        let idx = if self.selected == 0 {
            self.presets.len() - 1
        } else {
            self.selected - 1
        };
        self.select_index(idx)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Time Range")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let text: Vec<Span> = self
            .presets
            .iter()
            .enumerate()
            .flat_map(|(idx, preset)| {
                // The active preset is shown but not selectable.
                let style = if idx == self.selected {
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
                } else {
                    Style::default().fg(Color::White)
                };
                vec![
                    Span::styled(format!("{}", idx + 1), Style::default().fg(Color::Yellow)),
                    Span::styled(format!(":{}", preset.label()), style),
                    Span::raw("  "),
                ]
            })
            .collect();

        let para = Paragraph::new(Line::from(text)).alignment(Alignment::Center);
        frame.render_widget(para, inner);
    }
}
