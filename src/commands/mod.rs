mod build;
pub use build::*;

mod deploy;
pub use deploy::*;

mod projects;
pub use projects::*;

mod targets;
pub use targets::*;

/// One deploy-tool mode; `run` consumes the command and yields the process
/// exit code.
pub trait CommandDelegate {
    fn run(self) -> Result<i32, Box<dyn std::error::Error>>;
}
