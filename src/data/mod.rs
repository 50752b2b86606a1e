//! Input records and table loading module

pub mod records;
pub mod table;

pub use records::EventRecord;
