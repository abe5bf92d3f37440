use std::{error::Error, fs, path::PathBuf};

use crate::{
    commands::CommandDelegate,
    config::{self, Config},
    egg,
};

/// Build-only mode: packs the egg and writes it to the requested path without
/// touching the network.
pub struct BuildCommand {
    pub output: PathBuf,
    pub include_dependencies: bool,
    pub debug: bool,
}

impl CommandDelegate for BuildCommand {
    fn run(self) -> Result<i32, Box<dyn Error>> {
        let config = Config::load()?;
        let (egg_path, build_dir) = egg::build_egg(
            &config::project_root()?,
            &config.settings_module(),
            self.include_dependencies,
            self.debug,
        )?;

        eprintln!("[crawl-deploy] Writing egg to {}", self.output.display());
        fs::copy(&egg_path, &self.output)?;

        egg::dispose(build_dir, self.debug);
        Ok(0)
    }
}
