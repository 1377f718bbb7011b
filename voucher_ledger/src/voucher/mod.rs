pub mod record;
pub mod sequence;
pub mod store;

pub use record::{Voucher, VoucherQuery};
pub use sequence::VoucherSequence;
pub use store::VoucherStore;
