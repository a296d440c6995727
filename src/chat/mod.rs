pub mod controller;
pub mod ids;
pub mod loader;

pub use controller::{ChatController, DispatchOutcome};
pub use loader::LoaderTiming;
