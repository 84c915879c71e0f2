pub mod directive_map;
pub mod interval;
pub mod log_file_set;
pub mod suffix;

pub use directive_map::{BUILTIN_DIRECTIVES, DirectiveMap};
pub use interval::{Interval, ParseIntervalError, ParseRestartMethodError, RestartMethod};
pub use log_file_set::LogFileSet;
pub use suffix::{DEFAULT_FORMAT, SuffixFormat, SuffixFormatError};
