pub mod dto;
pub mod ports;
pub mod unit_of_work;
pub mod use_cases;
