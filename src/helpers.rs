pub mod gateway;
pub mod insights;
