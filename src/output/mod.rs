pub mod formatter;

pub use formatter::{format_guidance, format_report, format_sub_score, should_use_colors};
