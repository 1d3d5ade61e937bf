pub mod draft_error;
pub mod money;

pub use draft_error::DraftError;
pub use money::{Amount, CurrencyFormat, CurrencyFormatError};
