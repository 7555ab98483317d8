use crate::data::{Quote, TimeSeries};
use crate::ui::{ChartView, Label, LoadState, PresetSelector, StatusBar, SummaryPanel};
use ratatui::{
    layout::{Constraint, Direction, Layout, Position, Rect},
    Frame,
};

pub struct LayoutManager {
    pub selector: PresetSelector,
    pub statusbar: StatusBar,
    /// Where the status bar was last drawn, for mouse hit-testing.
    pub statusbar_area: Rect,
}

impl LayoutManager {
    pub fn new(selector: PresetSelector) -> Self {
        Self {
            selector,
            statusbar: StatusBar::new(),
            statusbar_area: Rect::default(),
        }
    }

    pub fn render(
        &mut self,
        frame: &mut Frame,
        series: &[TimeSeries],
        chart_state: LoadState,
        quotes: &[Quote],
        label: &Label,
    ) {
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(1),
            ])
            .split(frame.area());

        self.selector.render(frame, main_chunks[0]);

        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(40), Constraint::Length(34)])
            .split(main_chunks[1]);

        let preset = self.selector.current();
        let title = format!("Stock Chart / {}", preset.label());
        ChartView::new(series, preset, chart_state).render(frame, content_chunks[0], &title);
        SummaryPanel::render(frame, content_chunks[1], quotes);

        self.statusbar_area = main_chunks[2];
        self.statusbar.render(frame, main_chunks[2], label);
    }

    pub fn hits_statusbar(&self, column: u16, row: u16) -> bool {
        self.statusbar_area.contains(Position::new(column, row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::Preset;

    #[test]
    fn test_statusbar_hit_testing() {
        let mut layout = LayoutManager::new(PresetSelector::from_preset(Preset::Today));
        layout.statusbar_area = Rect::new(0, 23, 80, 1);

        assert!(layout.hits_statusbar(10, 23));
        assert!(!layout.hits_statusbar(10, 22));
        assert!(!layout.hits_statusbar(80, 23));
        assert!(!layout.hits_statusbar(0, 24));
    }
}
