// Response interpretation: classify an answer, normalize candidate records,
// format raw source snippets and assemble the views the UI draws.
// Pure functions only; session state lives in `crate::session`.

pub mod classifier;
pub mod experience;
pub mod handlers;
pub mod normalizer;
pub mod render;
pub mod sources;
