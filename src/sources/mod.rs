pub mod holiday;
pub mod koreaexim;

pub use holiday::HolidayClient;
pub use koreaexim::KoreaEximClient;
