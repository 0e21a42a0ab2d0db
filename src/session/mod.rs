pub mod key_practice;
pub mod sight_reading;
pub mod state;
pub mod stats_view;
