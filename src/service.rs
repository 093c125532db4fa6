pub mod quality;
pub mod task;
pub mod verifier;
