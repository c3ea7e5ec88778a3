mod timing;

pub use timing::{server_timing, ServerTiming};
