pub mod chart;
pub mod layout;
pub mod statusbar;
pub mod ticker;
pub mod timeframe;

pub use chart::{ChartView, LoadState};
pub use layout::LayoutManager;
pub use statusbar::StatusBar;
pub use ticker::{Label, SummaryPanel, Tick, TickerCycler};
pub use timeframe::{Preset, PresetSelector};
