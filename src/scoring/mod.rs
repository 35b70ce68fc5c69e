pub mod engine;
pub mod markets;

pub use engine::score_fixture;
