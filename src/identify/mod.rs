mod minimizer;
mod report;
mod scan;
mod separation;
mod targets;
mod window;

pub use minimizer::{minimize, DEFAULT_TOLERANCE_DAYS};
pub use report::{write_match, write_session_header, OutputFormat};
pub use scan::Session;
pub use separation::{SeparationModel, SkyTarget};
pub use targets::TargetReader;
pub use window::{parse_exposure_end, SearchWindow, WindowError, WindowPolicy};
