//! Runtime side of lesson playback: course loading, the watchdog task and
//! the monitor that executes session effects.

mod loader;
mod monitor;
mod watchdog;

pub use loader::{CourseLoader, LoadedCourse};
pub use monitor::{LoadTicket, MonitorEvent, MonitorEvents, MonitorView, PlaybackMonitor};
