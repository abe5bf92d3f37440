use ini::Properties;

use crate::{config::expand_env, error::DeployError};

/// A named deployment destination resolved from `crawl.cfg`.
///
/// Named targets layer their own section over the default `[deploy]` section,
/// so any unset key falls back to the default's value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub name: String,
    pub url: Option<String>,
    pub project: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub version: Option<String>,
    pub settings: Option<String>,
}

impl Target {
    pub(crate) fn from_layers(name: &str, layers: &[&Properties]) -> Self {
        Self {
            name: name.to_string(),
            url: Self::get(layers, "url"),
            project: Self::get(layers, "project"),
            username: Self::get(layers, "username"),
            password: Self::get(layers, "password"),
            version: Self::get(layers, "version"),
            settings: Self::get(layers, "settings"),
        }
    }

    fn get(layers: &[&Properties], key: &str) -> Option<String> {
        layers
            .iter()
            .rev()
            .find_map(|props| props.get(key))
            .map(expand_env)
    }

    pub fn url(&self) -> Result<&str, DeployError> {
        self.url
            .as_deref()
            .ok_or_else(|| DeployError::MissingUrl(self.name.clone()))
    }
}
