use std::error::Error;

use crate::{commands::CommandDelegate, config::Config};

pub struct ListTargetsCommand;

impl CommandDelegate for ListTargetsCommand {
    fn run(self) -> Result<i32, Box<dyn Error>> {
        let config = Config::load()?;
        for target in config.targets() {
            println!("{:<20} {}", target.name, target.url.as_deref().unwrap_or(""));
        }
        Ok(0)
    }
}
