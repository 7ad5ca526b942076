pub mod footer;
pub mod header;
pub mod stat_cards;
pub mod type_chart;
pub mod user_table;
pub mod utils;

pub use footer::draw_footer;
pub use header::{draw_header, visible_shortcuts};
pub use stat_cards::draw_stat_cards;
pub use type_chart::draw_type_chart;
pub use user_table::draw_user_table;
pub use utils::{status_color, truncate};
