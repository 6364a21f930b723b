//! Implementations of the application ports that are not storage.

mod system_clock;
mod tracing_sink;

pub use system_clock::SystemClock;
pub use tracing_sink::TracingEventSink;
