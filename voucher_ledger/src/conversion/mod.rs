pub mod custody;
pub mod engine;
pub mod release;

pub use engine::ConversionEngine;
pub use release::{compute_release, convert_amount, ReleaseQuote, ReleaseQuoteQuery};
