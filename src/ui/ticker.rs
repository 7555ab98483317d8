use crate::data::Quote;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

pub const LOADING: &str = "Loading...";
pub const NO_SYMBOLS: &str = "No stocks configured";
pub const NO_VALID_DATA: &str = "No valid stock data";

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub change_pct: f64,
}

impl Label {
    fn message(text: &str) -> Self {
        Self {
            text: text.to_string(),
            change_pct: 0.0,
        }
    }

    fn quote(quote: &Quote) -> Self {
        Self {
            text: format!("{}: ${:.2}", quote.display_symbol(), quote.price),
            change_pct: quote.change_pct,
        }
    }

    pub fn direction(&self) -> (&'static str, Color) {
        if self.change_pct > 0.0 {
            ("▲", Color::Green)
        } else if self.change_pct < 0.0 {
            ("▼", Color::Red)
        } else {
            ("●", Color::Gray)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Keep the cycle timer running.
    Continue,
    /// Nothing to rotate through; the timer should be dropped.
    Stop,
}

/// Rotates the panel label through the symbols that have valid quotes.
#[derive(Debug)]
pub struct TickerCycler {
    valid: Vec<usize>,
    position: usize,
    ready: bool,
    pub label: Label,
}

impl Default for TickerCycler {
    fn default() -> Self {
        Self::new()
    }
}

impl TickerCycler {
    pub fn new() -> Self {
        Self {
            valid: Vec::new(),
            position: 0,
            ready: false,
            label: Label::message(LOADING),
        }
    }

    /// A new quote generation started; old indices no longer apply.
    pub fn begin(&mut self) {
        self.valid.clear();
        self.position = 0;
        self.ready = false;
    }

    pub fn no_symbols(&mut self) {
        self.begin();
        self.label = Label::message(NO_SYMBOLS);
    }

    /// Called once per completed quote generation. Returns whether the cycle
    /// timer should be armed.
    pub fn rebuild(&mut self, quotes: &[Quote]) -> bool {
        self.valid = quotes
            .iter()
            .enumerate()
            .filter(|(_, q)| q.valid)
            .map(|(idx, _)| idx)
            .collect();
        self.position = 0;
        self.ready = true;

        match self.valid.first() {
            Some(&idx) => self.label = Label::quote(&quotes[idx]),
            None => self.label = Label::message(NO_VALID_DATA),
        }

        self.valid.len() > 1
    }

    pub fn advance(&mut self, quotes: &[Quote]) -> Tick {
        if !self.ready {
            return Tick::Continue;
        }

        match self.valid.len() {
            0 => {
                self.label = Label::message(NO_VALID_DATA);
                Tick::Continue
            }
            1 => Tick::Stop,
            n => {
                self.position = (self.position + 1) % n;
                if let Some(quote) = quotes.get(self.valid[self.position]) {
                    self.label = Label::quote(quote);
                }
                Tick::Continue
            }
        }
    }

    pub fn valid_count(&self) -> usize {
        self.valid.len()
    }
}

/// One line per symbol in slot order.
pub fn summary_lines(quotes: &[Quote]) -> Vec<String> {
    quotes
        .iter()
        .map(|q| {
            if q.valid {
                format!("{}: ${:.2} ({:.2}%)", q.symbol, q.price, q.change_pct)
            } else {
                format!("{}: No data", q.symbol)
            }
        })
        .collect()
}

pub struct SummaryPanel;

impl SummaryPanel {
    pub fn render(frame: &mut Frame, area: Rect, quotes: &[Quote]) {
        let block = Block::default()
            .title("Portfolio Summary")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta));

        let items: Vec<ListItem> = quotes
            .iter()
            .zip(summary_lines(quotes))
            .map(|(quote, line)| {
                let color = match (quote.valid, quote.change_pct) {
                    (false, _) => Color::DarkGray,
                    (true, c) if c >= 0.0 => Color::Green,
                    _ => Color::Red,
                };
                ListItem::new(Line::from(Span::styled(line, Style::default().fg(color))))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .style(Style::default().fg(Color::White));
        frame.render_widget(list, area);
    }
}
