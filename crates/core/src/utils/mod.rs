pub mod amount_utils;
pub mod time_utils;

pub use amount_utils::{format_amount, parse_amount};
pub use time_utils::now_millis;
