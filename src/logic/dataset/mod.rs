//! Dataset Module - Transaction Ledger Input
//!
//! Raw transaction records as uploaded, in their original order.
//! Every original column is kept so it can be echoed back in results.

pub mod record;
pub mod reader;


pub use record::{Dataset, RawRecord};
pub use reader::{from_csv_bytes, from_csv_path, from_csv_reader};
