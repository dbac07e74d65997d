pub mod attempt;
pub mod registration;
