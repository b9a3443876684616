pub mod exchange;
pub mod order;
pub mod report;
