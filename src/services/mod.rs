pub mod artifacts;
pub mod ranking;
pub mod recommender;

pub use artifacts::{ArtifactSource, FileArtifactSource, StaticArtifactSource};
pub use ranking::{Artifacts, CANDIDATE_WINDOW, RESULT_SIZE};
pub use recommender::Recommender;
