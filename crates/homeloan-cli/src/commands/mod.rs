pub mod financing;
pub mod jurisdiction;
