pub mod config_cmd;
pub mod paste;
pub mod scan;

mod report;

pub use config_cmd::execute_config;
pub use paste::execute_paste;
pub use scan::execute_scan;
