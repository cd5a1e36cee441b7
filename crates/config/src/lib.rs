// Configuration loading

pub mod properties;
pub mod settings;

pub use properties::Properties;
pub use settings::{parse_max_size, ConfigWarning, PackageSettings, Setting, Settings};
