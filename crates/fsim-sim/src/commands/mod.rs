pub mod check_config;
pub mod diagram;
pub mod estimate;
