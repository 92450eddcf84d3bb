pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{error, header, phase, status, success, summary_table, warn};
pub use table::TableBuilder;
pub use theme::{error_theme, theme, Theme};
