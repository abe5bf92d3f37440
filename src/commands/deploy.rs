use std::{error::Error, path::PathBuf};

use crate::{
    commands::CommandDelegate,
    config::{self, Config, Target},
    egg,
    error::DeployError,
    http::ApiClient,
    version,
};

pub struct DeployCommand {
    pub target: String,
    pub all_targets: bool,
    pub project: Option<String>,
    pub version: Option<String>,
    pub egg: Option<PathBuf>,
    pub include_dependencies: bool,
    pub debug: bool,
}

impl DeployCommand {
    fn deploy_target(
        &self,
        config: &Config,
        target: &Target,
        version: &str,
    ) -> Result<i32, Box<dyn Error>> {
        let project = self
            .project
            .as_deref()
            .or(target.project.as_deref())
            .ok_or(DeployError::MissingProject)?;

        let (egg_path, build_dir) = match &self.egg {
            Some(path) => {
                eprintln!("[crawl-deploy] Using egg: {}", path.display());
                (path.clone(), None)
            }
            None => {
                eprintln!("[crawl-deploy] Packing version {version}");
                let (egg_path, build_dir) = egg::build_egg(
                    &config::project_root()?,
                    &config.settings_module(),
                    self.include_dependencies,
                    self.debug,
                )?;
                (egg_path, Some(build_dir))
            }
        };

        let client = ApiClient::for_target(target)?;
        let accepted = client.add_version(project, version, &egg_path)?;

        if let Some(build_dir) = build_dir {
            egg::dispose(build_dir, self.debug);
        }

        Ok(i32::from(!accepted))
    }
}

impl CommandDelegate for DeployCommand {
    fn run(self) -> Result<i32, Box<dyn Error>> {
        let config = Config::load()?;

        if self.all_targets {
            let targets = config.targets();
            // One version is resolved up front and shared by every target.
            let version = match targets.first() {
                Some(first) => {
                    version::resolve(self.version.as_deref(), first.version.as_deref())?
                }
                None => return Ok(0),
            };

            let mut exitcode = 0;
            for target in &targets {
                if self.deploy_target(&config, target, &version)? != 0 {
                    exitcode = 1;
                }
            }
            Ok(exitcode)
        } else {
            let target = config.target(&self.target)?;
            let version = version::resolve(self.version.as_deref(), target.version.as_deref())?;
            self.deploy_target(&config, &target, &version)
        }
    }
}
