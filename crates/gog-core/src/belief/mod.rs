//! Hard-constraint inference over the ranks of opaque enemy pieces.
//!
//! [`BeliefState`] records, for one side, which ranks every enemy piece may
//! still hold. Combat outcomes narrow it through [`BeliefState::observe`],
//! quota reasoning tightens it in [`BeliefState::propagate`], and
//! [`BoardSampler`] draws complete boards that agree with it.

pub mod propagate;
pub mod sampler;
pub mod state;
pub mod telemetry;

pub use sampler::{BoardSampler, SampledBoard, SamplingError, SamplingStats};
pub use state::{BeliefError, BeliefState};
pub use telemetry::BeliefMetrics;
