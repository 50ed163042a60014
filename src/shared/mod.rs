pub mod constants;
pub mod csv;
pub mod test_helpers;
pub mod types;
pub mod validation;
