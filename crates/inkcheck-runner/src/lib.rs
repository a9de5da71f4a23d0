//! Process execution for the external contract toolchain
//!
//! Every build, audit and scaffold invocation goes through [`CommandSpec`] so that
//! arguments are passed as discrete argv elements and the working directory is an
//! explicit parameter. Nothing in this crate changes the process-wide current
//! directory, which keeps runners safe to call from any thread.

pub mod command_spec;
pub mod error;
pub mod native;
pub mod process;

pub use command_spec::CommandSpec;
pub use error::RunnerError;
pub use native::NativeRunner;
pub use process::{ProcessOutput, ProcessRunner};
