pub mod analysis;
pub mod cell_grid;
pub mod progress_bar;
pub mod results_panel;
pub mod welcome;
