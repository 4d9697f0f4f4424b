pub mod inputs;
pub mod logging;
