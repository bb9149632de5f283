pub mod currency;
pub mod rates;
pub mod signals;

pub use currency::*;
pub use rates::*;
pub use signals::*;
