#![forbid(unsafe_code)]

mod heightfield;
mod logging;
mod rendering;

pub use heightfield::Heightfield;
pub use logging::init_tracing;
pub use rendering::{render_run_to_png, RenderConfig, SpeciesStyle};
