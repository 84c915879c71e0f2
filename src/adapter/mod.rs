pub mod host;
pub mod host_config;
pub mod scanner;

pub use host::{AlwaysReady, HostProcess, LoggingRestarter};
pub use host_config::{ConfigNode, load_host_config, parse_host_config};
pub use scanner::TreeScanner;
