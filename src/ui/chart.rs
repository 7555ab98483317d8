use crate::data::TimeSeries;
use crate::ui::Preset;
use chrono::{Local, TimeZone};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols::Marker,
    text::Span,
    widgets::{
        canvas::{Canvas, Context, Line as CanvasLine},
        Block, Borders,
    },
    Frame,
};

/// Virtual drawing surface; the canvas scales it onto whatever area it gets.
pub const SURFACE_WIDTH: f64 = 800.0;
pub const SURFACE_HEIGHT: f64 = 500.0;

pub const MARGIN: f64 = 50.0;
pub const GRID_DIVISIONS: usize = 10;
pub const LABEL_DIVISIONS: usize = 5;

/// Timestamps at or above this are treated as garbage.
pub const TIME_CEILING: i64 = 9_999_999_999;

pub const LOADING_MESSAGE: &str = "Loading chart data...";
pub const NO_DATA_MESSAGE: &str = "No chart data available";

pub const PALETTE: [Color; 8] = [
    Color::Rgb(0xCC, 0x00, 0x00),
    Color::Rgb(0x34, 0x65, 0xA4),
    Color::Rgb(0x73, 0xD2, 0x16),
    Color::Rgb(0xFC, 0xE9, 0x4F),
    Color::Rgb(0xAD, 0x7F, 0xA8),
    Color::Rgb(0xF5, 0x79, 0x00),
    Color::Rgb(0xC1, 0x7D, 0x11),
    Color::Rgb(0x55, 0x57, 0x53),
];

const GRID_COLOR: Color = Color::DarkGray;
const LABEL_COLOR: Color = Color::Gray;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// No chart generation has completed yet.
    Loading,
    Complete,
}

/// Surface coordinates, origin top-left, y growing downwards.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Message(String),
    Gridline {
        from: (f64, f64),
        to: (f64, f64),
    },
    PriceLabel {
        at: (f64, f64),
        text: String,
    },
    TimeLabel {
        at: (f64, f64),
        text: String,
    },
    Series {
        symbol: String,
        color: Color,
        points: Vec<(f64, f64)>,
    },
    Legend {
        at: (f64, f64),
        color: Color,
        text: String,
    },
}

struct Bounds {
    min_price: f64,
    max_price: f64,
    min_time: i64,
    max_time: i64,
}

fn plausible_time(ts: i64) -> bool {
    ts > 0 && ts < TIME_CEILING
}

fn compute_bounds(series: &[&TimeSeries]) -> Option<Bounds> {
    let mut price: Option<(f64, f64)> = None;
    let mut time: Option<(i64, i64)> = None;

    for s in series {
        for price_now in (0..s.data_count()).filter_map(|j| s.price_at(j)) {
            if price_now > 0.0 {
                price = Some(match price {
                    Some((lo, hi)) => (lo.min(price_now), hi.max(price_now)),
                    None => (price_now, price_now),
                });
            }
        }

        let first = s.timestamps[0];
        let last = s.timestamps[s.data_count() - 1];
        if first > 0 && last > 0 && first < TIME_CEILING {
            time = Some(match time {
                Some((lo, hi)) => (lo.min(first), hi.max(last)),
                None => (first, last),
            });
        }
    }

    let (min_price, max_price) = price?;
    let (min_time, max_time) = time?;

    let span = max_price - min_price;
    // A flat range would collapse the y scale; pad around the level instead.
    let pad = if span > 0.0 { span * 0.05 } else { max_price * 0.05 };

    Some(Bounds {
        min_price: min_price - pad,
        max_price: max_price + pad,
        min_time,
        max_time,
    })
}

pub fn format_time_label(ts: i64, preset: Preset) -> String {
    match Local.timestamp_opt(ts, 0).single() {
        Some(dt) => dt.format(preset.time_label_format()).to_string(),
        None => String::new(),
    }
}

/// Lays out one chart frame for the given series collection.
///
/// Only valid series with at least one point take part. Each qualifying series
/// is spread over the full plot width by its own point count, while the time
/// labels come from the global first/last timestamps.
pub fn plot(
    collection: &[TimeSeries],
    preset: Preset,
    state: LoadState,
    width: f64,
    height: f64,
) -> Vec<DrawCommand> {
    let qualifying: Vec<&TimeSeries> = collection.iter().filter(|s| s.qualifies()).collect();

    if qualifying.is_empty() {
        let message = match state {
            LoadState::Loading => LOADING_MESSAGE,
            LoadState::Complete => NO_DATA_MESSAGE,
        };
        return vec![DrawCommand::Message(message.to_string())];
    }

    let Some(bounds) = compute_bounds(&qualifying) else {
        return vec![DrawCommand::Message(NO_DATA_MESSAGE.to_string())];
    };

    let inner_width = width - 2.0 * MARGIN;
    let inner_height = height - 2.0 * MARGIN;
    let price_span = bounds.max_price - bounds.min_price;
    let y_scale = inner_height / price_span;

    let mut commands = Vec::new();

    for i in 0..=GRID_DIVISIONS {
        let y = MARGIN + i as f64 * inner_height / GRID_DIVISIONS as f64;
        commands.push(DrawCommand::Gridline {
            from: (MARGIN, y),
            to: (width - MARGIN, y),
        });
    }
    for i in 0..=GRID_DIVISIONS {
        let x = MARGIN + i as f64 * inner_width / GRID_DIVISIONS as f64;
        commands.push(DrawCommand::Gridline {
            from: (x, MARGIN),
            to: (x, height - MARGIN),
        });
    }

    for i in 0..=LABEL_DIVISIONS {
        let price = bounds.max_price - i as f64 * price_span / LABEL_DIVISIONS as f64;
        let y = MARGIN + i as f64 * inner_height / LABEL_DIVISIONS as f64;
        commands.push(DrawCommand::PriceLabel {
            at: (5.0, y + 3.0),
            text: format!("{:.2}", price),
        });
    }

    // A garbled last epoch can be near i64::MAX; interpolate in i128.
    let time_span = bounds.max_time as i128 - bounds.min_time as i128;
    for i in 0..=LABEL_DIVISIONS {
        let ts = (bounds.min_time as i128 + i as i128 * time_span / LABEL_DIVISIONS as i128) as i64;
        let x = MARGIN + i as f64 * inner_width / LABEL_DIVISIONS as f64;
        commands.push(DrawCommand::TimeLabel {
            at: (x - 20.0, height - 20.0),
            text: format_time_label(ts, preset),
        });
    }

    let mut order: Vec<(&TimeSeries, f64)> =
        qualifying.iter().map(|s| (*s, s.last_price())).collect();
    order.sort_by(|a, b| b.1.total_cmp(&a.1));

    for (rank, (series, last_price)) in order.iter().enumerate() {
        let color = PALETTE[rank % PALETTE.len()];
        let count = series.data_count();
        let step = if count > 1 {
            inner_width / (count - 1) as f64
        } else {
            0.0
        };

        let points = (0..count)
            .filter_map(|j| {
                let price = series.price_at(j)?;
                (price > 0.0 && plausible_time(series.timestamps[j])).then(|| {
                    let x = MARGIN + j as f64 * step;
                    let y = MARGIN + (bounds.max_price - price) * y_scale;
                    (x, y)
                })
            })
            .collect();

        commands.push(DrawCommand::Series {
            symbol: series.symbol.clone(),
            color,
            points,
        });
        commands.push(DrawCommand::Legend {
            at: (width - 200.0, 30.0 + rank as f64 * 20.0),
            color,
            text: format!("{}: ${:.2}", series.symbol, last_price),
        });
    }

    commands
}

pub struct ChartView {
    pub commands: Vec<DrawCommand>,
}

impl ChartView {
    pub fn new(collection: &[TimeSeries], preset: Preset, state: LoadState) -> Self {
        Self {
            commands: plot(collection, preset, state, SURFACE_WIDTH, SURFACE_HEIGHT),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, title: &str) {
        let canvas = Canvas::default()
            .block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .marker(Marker::Braille)
            .x_bounds([0.0, SURFACE_WIDTH])
            .y_bounds([0.0, SURFACE_HEIGHT])
            .paint(|ctx| self.paint(ctx));
        frame.render_widget(canvas, area);
    }

    fn paint(&self, ctx: &mut Context) {
        // Canvas y grows upwards.
        let flip = |y: f64| SURFACE_HEIGHT - y;

        for cmd in &self.commands {
            if let DrawCommand::Gridline { from, to } = cmd {
                ctx.draw(&CanvasLine {
                    x1: from.0,
                    y1: flip(from.1),
                    x2: to.0,
                    y2: flip(to.1),
                    color: GRID_COLOR,
                });
            }
        }
        ctx.layer();

        for cmd in &self.commands {
            match cmd {
                DrawCommand::Series { color, points, .. } => {
                    for pair in points.windows(2) {
                        ctx.draw(&CanvasLine {
                            x1: pair[0].0,
                            y1: flip(pair[0].1),
                            x2: pair[1].0,
                            y2: flip(pair[1].1),
                            color: *color,
                        });
                    }
                }
                DrawCommand::Message(text) => {
                    ctx.print(
                        SURFACE_WIDTH / 2.0 - 50.0,
                        flip(SURFACE_HEIGHT / 2.0),
                        Span::styled(text.clone(), Style::default().fg(Color::White)),
                    );
                }
                DrawCommand::PriceLabel { at, text } | DrawCommand::TimeLabel { at, text } => {
                    ctx.print(
                        at.0,
                        flip(at.1),
                        Span::styled(text.clone(), Style::default().fg(LABEL_COLOR)),
                    );
                }
                DrawCommand::Legend { at, color, text } => {
                    ctx.print(
                        at.0,
                        flip(at.1),
                        Span::styled(text.clone(), Style::default().fg(*color)),
                    );
                }
                DrawCommand::Gridline { .. } => {}
            }
        }
    }
}
