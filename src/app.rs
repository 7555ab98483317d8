use crate::config::AppConfig;
use crate::data::{Applied, Completion, Coordinator, FetchMode, Fetcher, Quote, TimeSeries};
use crate::error::Result;
use crate::ui::{LayoutManager, LoadState, Preset, PresetSelector, Tick, TickerCycler};
use crossterm::event::{
    Event, EventStream, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use futures_util::StreamExt;
use ratatui::{backend::Backend, Frame, Terminal};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    Refresh,
    Cycle,
}

pub struct Receivers {
    pub charts: UnboundedReceiver<Completion>,
    pub quotes: UnboundedReceiver<Completion>,
}

/// Everything the fetch, render and ticker paths share. Only the event loop
/// touches it, so no locking is involved.
pub struct App {
    pub config: AppConfig,
    fetcher: Fetcher,
    charts: Coordinator<TimeSeries>,
    quotes: Coordinator<Quote>,
    chart_tx: UnboundedSender<Completion>,
    quote_tx: UnboundedSender<Completion>,
    pub cycler: TickerCycler,
    pub layout: LayoutManager,
    /// Set once any chart generation has completed.
    charts_loaded: bool,
    dirty: bool,
}

impl App {
    pub fn new(config: AppConfig) -> Result<(Self, Receivers)> {
        let fetcher = Fetcher::new(&config.endpoint)?;
        let (chart_tx, chart_rx) = mpsc::unbounded_channel();
        let (quote_tx, quote_rx) = mpsc::unbounded_channel();
        let selector = PresetSelector::from_preset(config.preset);

        let app = Self {
            config,
            fetcher,
            charts: Coordinator::new(),
            quotes: Coordinator::new(),
            chart_tx,
            quote_tx,
            cycler: TickerCycler::new(),
            layout: LayoutManager::new(selector),
            charts_loaded: false,
            dirty: true,
        };

        Ok((
            app,
            Receivers {
                charts: chart_rx,
                quotes: quote_rx,
            },
        ))
    }

    pub fn preset(&self) -> Preset {
        self.layout.selector.current()
    }

    /// Starts fresh quote and chart generations for the configured symbols.
    pub fn refresh(&mut self) {
        self.start_quotes();
        self.start_chart();
    }

    fn start_quotes(&mut self) {
        if self.config.symbols.is_empty() {
            self.cycler.no_symbols();
            self.dirty = true;
            return;
        }

        self.cycler.begin();
        let requests = self
            .quotes
            .start_generation(&self.config.symbols, FetchMode::Summary);
        self.fetcher.dispatch(requests, &self.quote_tx);
    }

    fn start_chart(&mut self) {
        let preset = self.preset();
        let mode = FetchMode::Chart {
            range: preset.range(),
            interval: preset.interval(),
        };
        let requests = self.charts.start_generation(&self.config.symbols, mode);
        self.fetcher.dispatch(requests, &self.chart_tx);
        self.dirty = true;
    }

    pub fn select_preset(&mut self, changed: Option<Preset>) {
        if let Some(preset) = changed {
            info!(range = preset.range(), interval = preset.interval(), "preset changed");
            self.start_chart();
        }
    }

    /// Any stored completion (not just the last one) redraws the chart.
    pub fn on_chart_completion(&mut self, completion: Completion) {
        match self.charts.apply(completion) {
            Applied::Completed => {
                self.charts_loaded = true;
                self.dirty = true;
            }
            Applied::Stored { .. } => self.dirty = true,
            Applied::Discarded => {}
        }
    }

    /// Returns `Some(arm_cycle_timer)` once the quote generation is complete.
    pub fn on_quote_completion(&mut self, completion: Completion) -> Option<bool> {
        match self.quotes.apply(completion) {
            Applied::Completed => {
                self.dirty = true;
                Some(self.cycler.rebuild(self.quotes.slots()))
            }
            Applied::Stored { .. } => {
                self.dirty = true;
                None
            }
            Applied::Discarded => None,
        }
    }

    pub fn cycle(&mut self) -> Tick {
        let tick = self.cycler.advance(self.quotes.slots());
        self.dirty = true;
        tick
    }

    /// "Loading" only until the first chart generation completes; later
    /// generations keep showing "no data" while they are in flight.
    pub fn chart_state(&self) -> LoadState {
        if self.charts_loaded || self.charts.is_complete() {
            LoadState::Complete
        } else {
            LoadState::Loading
        }
    }

    pub fn chart_series(&self) -> &[TimeSeries] {
        self.charts.slots()
    }

    pub fn quote_slots(&self) -> &[Quote] {
        self.quotes.slots()
    }

    pub fn handle_event(&mut self, event: Event) -> Action {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(_, _) => {
                self.dirty = true;
                Action::None
            }
            _ => Action::None,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Char('r') => Action::Refresh,
            KeyCode::Char(' ') | KeyCode::Enter => Action::Cycle,
            KeyCode::Right => {
                let changed = self.layout.selector.select_next();
                self.select_preset(changed);
                Action::None
            }
            KeyCode::Left => {
                let changed = self.layout.selector.select_prev();
                self.select_preset(changed);
                Action::None
            }
            KeyCode::Char(c @ '1'..='7') => {
                let idx = c as usize - '1' as usize;
                let changed = self.layout.selector.select_index(idx);
                self.select_preset(changed);
                Action::None
            }
            _ => Action::None,
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> Action {
        if mouse.kind == MouseEventKind::Down(MouseButton::Left)
            && self.layout.hits_statusbar(mouse.column, mouse.row)
        {
            Action::Cycle
        } else {
            Action::None
        }
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        self.layout.statusbar.pending = self.charts.pending() + self.quotes.pending();
        let state = self.chart_state();
        self.layout.render(
            frame,
            self.charts.slots(),
            state,
            self.quotes.slots(),
            &self.cycler.label,
        );
    }

    pub async fn run<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        mut receivers: Receivers,
    ) -> color_eyre::Result<()> {
        let mut events = EventStream::new();
        let mut refresh = timer(self.config.refresh_period());
        let mut cycle: Option<Interval> = None;

        self.refresh();

        loop {
            if self.dirty {
                terminal.draw(|f| self.draw(f))?;
                self.dirty = false;
            }

            tokio::select! {
                maybe_event = events.next() => match maybe_event {
                    Some(Ok(event)) => match self.handle_event(event) {
                        Action::Quit => return Ok(()),
                        Action::Refresh => {
                            cycle = None;
                            self.refresh();
                        }
                        Action::Cycle => {
                            self.cycle();
                        }
                        Action::None => {}
                    },
                    Some(Err(e)) => return Err(e.into()),
                    None => return Ok(()),
                },
                Some(completion) = receivers.charts.recv() => {
                    self.on_chart_completion(completion);
                }
                Some(completion) = receivers.quotes.recv() => {
                    if let Some(arm) = self.on_quote_completion(completion) {
                        cycle = arm.then(|| timer(self.config.cycle_period()));
                    }
                }
                _ = refresh.tick() => {
                    cycle = None;
                    self.refresh();
                }
                _ = next_tick(&mut cycle) => {
                    if self.cycle() == Tick::Stop {
                        cycle = None;
                    }
                }
            }
        }
    }
}

fn timer(period: Duration) -> Interval {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn next_tick(timer: &mut Option<Interval>) {
    match timer {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::coordinator::FetchOutcome;
    use crossterm::event::KeyModifiers;
    use serde_json::json;

    fn test_config(symbols: &[&str]) -> AppConfig {
        AppConfig {
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
            // Nothing listens here; dispatched requests fail without side effects.
            endpoint: "http://127.0.0.1:9".to_string(),
            ..AppConfig::default()
        }
    }

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn chart_response(generation: crate::data::coordinator::GenerationId, slot: usize) -> Completion {
        let body = serde_json::to_vec(&json!({
            "chart": { "result": [{
                "timestamp": [1_700_000_000, 1_700_000_060],
                "indicators": { "quote": [{ "close": [10.0, 11.0] }] }
            }]}
        }))
        .unwrap();
        Completion {
            generation,
            slot,
            outcome: FetchOutcome::Response { status: 200, body },
        }
    }

    fn quote_response(generation: crate::data::coordinator::GenerationId, slot: usize, status: u16) -> Completion {
        let body = serde_json::to_vec(&json!({
            "chart": { "result": [{
                "meta": { "regularMarketPrice": 105.0, "previousClose": 100.0 }
            }]}
        }))
        .unwrap();
        Completion {
            generation,
            slot,
            outcome: FetchOutcome::Response { status, body },
        }
    }

    #[tokio::test]
    async fn test_failed_fetch_scenario() {
        let (mut app, _rx) = App::new(test_config(&["IBM"])).unwrap();
        app.refresh();
        assert_eq!(app.chart_state(), LoadState::Loading);

        let chart_gen = app.charts.current_id().unwrap();
        let quote_gen = app.quotes.current_id().unwrap();
        app.on_chart_completion(Completion {
            generation: chart_gen,
            slot: 0,
            outcome: FetchOutcome::Response { status: 500, body: Vec::new() },
        });
        let arm = app.on_quote_completion(quote_response(quote_gen, 0, 500));

        assert_eq!(app.chart_state(), LoadState::Complete);
        assert_eq!(arm, Some(false));
        assert_eq!(app.cycler.label.text, crate::ui::ticker::NO_VALID_DATA);
        assert_eq!(
            crate::ui::ticker::summary_lines(app.quote_slots()),
            vec!["IBM: No data"]
        );

        let commands = crate::ui::chart::plot(
            app.chart_series(),
            app.preset(),
            app.chart_state(),
            800.0,
            500.0,
        );
        assert_eq!(
            commands,
            vec![crate::ui::chart::DrawCommand::Message(
                crate::ui::chart::NO_DATA_MESSAGE.to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_preset_change_discards_in_flight() {
        let (mut app, _rx) = App::new(test_config(&["A", "B"])).unwrap();
        app.refresh();
        let old = app.charts.current_id().unwrap();

        assert_eq!(app.handle_event(press(KeyCode::Char('2'))), Action::None);
        assert_eq!(app.preset(), Preset::Week);
        assert_ne!(app.charts.current_id().unwrap(), old);

        app.on_chart_completion(chart_response(old, 0));
        app.on_chart_completion(chart_response(old, 1));

        assert_eq!(app.charts.pending(), 2);
        assert!(app.chart_series().iter().all(|s| !s.valid));
        assert_eq!(
            app.charts.mode(),
            Some(FetchMode::Chart { range: "5d", interval: "5m" })
        );
    }

    #[tokio::test]
    async fn test_loading_only_before_first_chart_generation() {
        let (mut app, _rx) = App::new(test_config(&["A"])).unwrap();
        app.refresh();
        assert_eq!(app.chart_state(), LoadState::Loading);

        let first = app.charts.current_id().unwrap();
        app.on_chart_completion(Completion {
            generation: first,
            slot: 0,
            outcome: FetchOutcome::Failed("connection refused".to_string()),
        });
        assert_eq!(app.chart_state(), LoadState::Complete);

        app.handle_event(press(KeyCode::Char('3')));
        assert_eq!(app.charts.pending(), 1);
        assert_eq!(app.chart_state(), LoadState::Complete);
    }

    #[tokio::test]
    async fn test_reselecting_preset_keeps_generation() {
        let (mut app, _rx) = App::new(test_config(&["A"])).unwrap();
        app.refresh();
        let current = app.charts.current_id();

        app.handle_event(press(KeyCode::Char('1')));
        assert_eq!(app.charts.current_id(), current);
    }

    #[tokio::test]
    async fn test_quotes_arm_cycle_with_multiple_valid() {
        let (mut app, _rx) = App::new(test_config(&["A", "B"])).unwrap();
        app.refresh();
        let generation = app.quotes.current_id().unwrap();

        assert_eq!(app.on_quote_completion(quote_response(generation, 1, 200)), None);
        assert_eq!(app.on_quote_completion(quote_response(generation, 0, 200)), Some(true));
        assert_eq!(app.cycler.label.text, "A: $105.00");
        assert_eq!(app.cycle(), Tick::Continue);
        assert_eq!(app.cycler.label.text, "B: $105.00");
    }

    #[tokio::test]
    async fn test_no_symbols_configured() {
        let (mut app, _rx) = App::new(test_config(&[])).unwrap();
        app.refresh();

        assert_eq!(app.cycler.label.text, crate::ui::ticker::NO_SYMBOLS);
        assert_eq!(app.chart_state(), LoadState::Complete);
    }

    #[tokio::test]
    async fn test_key_actions() {
        let (mut app, _rx) = App::new(test_config(&["A"])).unwrap();

        assert_eq!(app.handle_event(press(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(app.handle_event(press(KeyCode::Char('r'))), Action::Refresh);
        assert_eq!(app.handle_event(press(KeyCode::Char(' '))), Action::Cycle);
        assert_eq!(app.handle_event(press(KeyCode::Left)), Action::None);
        assert_eq!(app.preset(), Preset::All);
    }
}
