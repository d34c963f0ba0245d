mod executor;
mod process;
mod wait;

pub use executor::spawn;
pub use wait::{reap_finished, wait_child};
