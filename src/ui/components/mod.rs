pub mod answer_keys;
pub mod menu;
pub mod progress_bar;
pub mod stats_panel;
pub mod stave;
pub mod trend_chart;
