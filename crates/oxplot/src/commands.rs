//! Various commands that can be executed by oxplot
mod build;
mod demo;

pub use build::{Build, Scene, SceneElement};
pub use demo::Demo;
