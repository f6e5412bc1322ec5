#![forbid(unsafe_code)]

pub mod actor;
pub mod animator;
pub mod core;
pub mod error;
pub mod node;
pub mod render_cpu;
pub mod scene;
pub mod shapes;
pub mod svg;

pub use actor::{Actor, Axis, Oscillator, Puff, PuffStream, Rotator, Scroller, WrapRule};
pub use animator::Animator;
pub use core::{Rgba8, Rng64, Viewport};
pub use error::{NightrailError, NightrailResult};
pub use node::{DisplayNode, NodeId, Shape, Stage};
pub use render_cpu::{CpuRenderer, FrameRGBA};
pub use scene::Scene;
