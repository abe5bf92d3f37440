use std::error::Error;

use itertools::Itertools;

use crate::{commands::CommandDelegate, config::Config, http::ApiClient};

pub struct ListProjectsCommand {
    pub target: String,
}

impl CommandDelegate for ListProjectsCommand {
    fn run(self) -> Result<i32, Box<dyn Error>> {
        let config = Config::load()?;
        let target = config.target(&self.target)?;
        let projects = ApiClient::for_target(&target)?.list_projects()?;
        if !projects.is_empty() {
            println!("{}", projects.iter().join("\n"));
        }
        Ok(0)
    }
}
