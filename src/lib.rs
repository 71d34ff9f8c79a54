pub mod config;
pub mod counter;
pub mod io;
pub mod parallel;
pub mod prime;

pub use counter::Strategy;
pub use io::Report;
pub use parallel::{Chunk, ParallelProcessor};
pub use prime::is_prime;
