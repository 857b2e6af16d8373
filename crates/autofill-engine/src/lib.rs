pub mod catalog;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod context;
pub mod dom;
pub mod filler;
pub mod scanner;
pub mod session;

pub use autofill_common::protocol;
pub use catalog::SelectorCatalog;
pub use filler::{FillTarget, Filler};
pub use scanner::{DetectedField, Scanner};
pub use session::ScanSession;
