// Application layer - Use case interactors and the session pipeline

pub mod container;
pub mod download_interactor;
pub mod session;
pub mod trim_interactor;

#[cfg(test)]
pub(crate) mod fakes;

// Re-export interactors
pub use download_interactor::DownloadInteractor;
pub use session::{Action, DownloadOutcome, PhaseKind, Session};
pub use trim_interactor::{TrimInteractor, TrimOutcome};
