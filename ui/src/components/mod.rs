pub mod describe;
mod map_panel;
pub mod nav_bar;
mod render_table;

pub use map_panel::MapPanel;
pub use render_table::txt_table;
