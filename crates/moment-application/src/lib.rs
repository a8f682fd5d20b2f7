pub mod outcome;
pub mod session_usecase;


pub use crate::outcome::{AuthOutcome, BootstrapOutcome, HomeState, RefreshWarning};
pub use crate::session_usecase::SessionUseCase;
