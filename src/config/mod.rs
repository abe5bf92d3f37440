use std::{
    env, fs,
    path::{Path, PathBuf},
};

use ini::Ini;

use crate::error::DeployError;

mod creds;
pub use creds::*;

mod target;
pub use target::*;

pub const CONFIG_FILE_NAME: &str = "crawl.cfg";
pub const SETTINGS_ENV_VAR: &str = "CRAWL_SETTINGS_MODULE";

const DEPLOY_SECTION: &str = "deploy";
const DEPLOY_SECTION_PREFIX: &str = "deploy:";

/// Walks up from `dir` to the filesystem root looking for the nearest
/// `crawl.cfg`.
pub fn closest_config(dir: impl AsRef<Path>) -> Option<PathBuf> {
    let mut dir = dir.as_ref().to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

/// A directory is part of a crawl project when a config file is in scope or
/// the settings module is set in the environment.
pub fn inside_project() -> bool {
    env::var_os(SETTINGS_ENV_VAR).is_some()
        || env::current_dir().ok().and_then(closest_config).is_some()
}

/// Root of the current project: the directory holding the closest config file.
pub fn project_root() -> Result<PathBuf, DeployError> {
    env::current_dir()
        .ok()
        .and_then(closest_config)
        .and_then(|cfg| cfg.parent().map(Path::to_path_buf))
        .ok_or(DeployError::NotInProject)
}

/// Deployment configuration read from the closest `crawl.cfg`.
pub struct Config {
    ini: Ini,
}

impl Config {
    /// Loads the closest config file. An absent file resolves to an empty
    /// config, so every target lookup reports "unknown target".
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        match env::current_dir().ok().and_then(closest_config) {
            Some(path) => Self::from_path(path),
            None => Ok(Self { ini: Ini::new() }),
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            ini: Ini::load_from_str(contents)?,
        })
    }

    /// All configured targets, the default one first. The `[deploy]` section
    /// is only addressable as `default` when it carries a url.
    pub fn targets(&self) -> Vec<Target> {
        let base = self.ini.section(Some(DEPLOY_SECTION));
        let mut targets = Vec::new();

        if let Some(props) = base {
            if props.contains_key("url") {
                targets.push(Target::from_layers("default", &[props]));
            }
        }

        for (section, props) in self.ini.iter() {
            let Some(name) = section.and_then(|s| s.strip_prefix(DEPLOY_SECTION_PREFIX)) else {
                continue;
            };
            let layers: Vec<_> = base.into_iter().chain([props]).collect();
            targets.push(Target::from_layers(name, &layers));
        }

        targets
    }

    pub fn target(&self, name: &str) -> Result<Target, DeployError> {
        self.targets()
            .into_iter()
            .find(|target| target.name == name)
            .ok_or_else(|| DeployError::UnknownTarget(name.to_string()))
    }

    /// Settings module recorded for the project, used when generating a
    /// packaging manifest.
    pub fn settings_module(&self) -> String {
        self.ini
            .section(Some("settings"))
            .and_then(|props| props.get("default"))
            .map(expand_env)
            .unwrap_or_else(|| "default".to_string())
    }
}

/// Replaces `$VAR` and `${VAR}` with values from the environment. Unknown
/// variables are left verbatim.
pub(crate) fn expand_env(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];

        if let Some(inner) = tail.strip_prefix('{') {
            if let Some(end) = inner.find('}') {
                let name = &inner[..end];
                match env::var(name) {
                    Ok(replacement) => out.push_str(&replacement),
                    Err(_) => {
                        out.push_str("${");
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &inner[end + 1..];
            } else {
                out.push('$');
                rest = tail;
            }
            continue;
        }

        let len = tail
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
            .map(char::len_utf8)
            .sum();
        if len == 0 {
            out.push('$');
            rest = tail;
            continue;
        }

        let name = &tail[..len];
        match env::var(name) {
            Ok(replacement) => out.push_str(&replacement),
            Err(_) => {
                out.push('$');
                out.push_str(name);
            }
        }
        rest = &tail[len..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
[settings]
default = sample.settings

[deploy]
url = http://localhost:6800/
project = sample

[deploy:staging]
url = https://staging.example.com/api/
username = deploy
password = s3cret

[deploy:prod]
project = sample-prod
version = GIT
";

    #[test]
    fn named_target_inherits_unset_keys_and_overrides_set_ones() {
        let config = Config::parse(SAMPLE).expect("parse failed");

        let staging = config.target("staging").expect("target missing");
        assert_eq!(
            staging.url.as_deref(),
            Some("https://staging.example.com/api/")
        );
        assert_eq!(staging.project.as_deref(), Some("sample"));
        assert_eq!(staging.username.as_deref(), Some("deploy"));
        assert_eq!(staging.password.as_deref(), Some("s3cret"));

        let prod = config.target("prod").expect("target missing");
        assert_eq!(prod.url.as_deref(), Some("http://localhost:6800/"));
        assert_eq!(prod.project.as_deref(), Some("sample-prod"));
        assert_eq!(prod.version.as_deref(), Some("GIT"));
    }

    #[test]
    fn targets_list_default_first_in_file_order() {
        let config = Config::parse(SAMPLE).expect("parse failed");
        let names: Vec<_> = config.targets().into_iter().map(|t| t.name).collect();
        assert_eq!(names, ["default", "staging", "prod"]);
    }

    #[test]
    fn default_target_requires_url() {
        let config =
            Config::parse("[deploy]\nproject = sample\n\n[deploy:live]\nurl = http://h/\n")
                .expect("parse failed");
        let names: Vec<_> = config.targets().into_iter().map(|t| t.name).collect();
        assert_eq!(names, ["live"]);
        assert!(matches!(
            config.target("default"),
            Err(DeployError::UnknownTarget(_))
        ));
    }

    #[test]
    fn unknown_target_is_reported_by_name() {
        let config = Config::parse(SAMPLE).expect("parse failed");
        match config.target("nowhere") {
            Err(DeployError::UnknownTarget(name)) => assert_eq!(name, "nowhere"),
            other => panic!("expected UnknownTarget, got {other:?}"),
        }
    }

    #[test]
    fn settings_module_falls_back_to_default() {
        let config = Config::parse(SAMPLE).expect("parse failed");
        assert_eq!(config.settings_module(), "sample.settings");

        let bare = Config::parse("[deploy]\nurl = http://h/\n").expect("parse failed");
        assert_eq!(bare.settings_module(), "default");
    }

    #[test]
    fn values_expand_environment_variables() {
        // PATH is always present; unset names stay verbatim.
        let path = env::var("PATH").expect("PATH not set");
        assert_eq!(expand_env("$PATH"), path);
        assert_eq!(expand_env("pre-${PATH}-post"), format!("pre-{path}-post"));
        assert_eq!(
            expand_env("$CRAWL_DEPLOY_UNSET_VAR/x"),
            "$CRAWL_DEPLOY_UNSET_VAR/x"
        );
        assert_eq!(
            expand_env("${CRAWL_DEPLOY_UNSET_VAR}"),
            "${CRAWL_DEPLOY_UNSET_VAR}"
        );
        assert_eq!(expand_env("$$"), "$$");
    }

    #[test]
    fn closest_config_walks_up_to_the_owning_directory() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let nested = dir.path().join("spiders").join("deep");
        fs::create_dir_all(&nested).expect("mkdir failed");
        fs::write(dir.path().join(CONFIG_FILE_NAME), "[deploy]\n").expect("write failed");

        let found = closest_config(&nested).expect("config not found");
        assert_eq!(found, dir.path().join(CONFIG_FILE_NAME));
        assert!(closest_config(env::temp_dir().join("crawl-deploy-nonexistent")).is_none());
    }
}
