#![warn(clippy::all, rust_2018_idioms)]

mod args;
pub use args::Args;
