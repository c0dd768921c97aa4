//! Iteration controller and run observers

pub mod iteration_controller;
pub mod observer;

pub use iteration_controller::{IterationController, OpenRouterController};
pub use observer::RunObserver;
