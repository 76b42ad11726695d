//! DO control loop components.

mod pid;

pub use pid::PidController;
