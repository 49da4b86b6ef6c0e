pub mod period;
pub mod units;

pub use period::{normalize_to_period_end, next_period_end, time_passed_in_period};
pub use units::{format_units, parse_units, serialize_amount, to_plain_string, TOKEN_DECIMALS};
