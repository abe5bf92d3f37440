use std::{env, fs, path::PathBuf};

use reqwest::Url;

use crate::config::Target;

/// Basic-auth credentials attached to requests against a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Explicit credentials in the target win (password defaults to empty);
    /// otherwise `.netrc` is consulted for the target's hostname.
    pub fn for_target(target: &Target) -> Option<Credentials> {
        if let Some(username) = &target.username {
            return Some(Credentials {
                username: username.clone(),
                password: target.password.clone().unwrap_or_default(),
            });
        }

        let url = Url::parse(target.url.as_deref()?).ok()?;
        let host = url.host_str()?;
        let contents = fs::read_to_string(netrc_path()?).ok()?;
        lookup_netrc(&contents, host)
    }
}

fn netrc_path() -> Option<PathBuf> {
    if let Some(path) = env::var_os("NETRC") {
        return Some(PathBuf::from(path));
    }
    let home = env::var_os("HOME").or_else(|| env::var_os("USERPROFILE"))?;
    Some(PathBuf::from(home).join(".netrc"))
}

/// Scans netrc contents for a `machine` entry matching `host`, falling back to
/// a `default` entry. Only the token subset relevant to basic auth is read.
fn lookup_netrc(contents: &str, host: &str) -> Option<Credentials> {
    let mut tokens = contents.split_whitespace().peekable();
    let mut fallback = None;

    while let Some(token) = tokens.next() {
        let machine = match token {
            "machine" => Some(tokens.next()?.to_string()),
            "default" => None,
            _ => continue,
        };

        let mut username = String::new();
        let mut password = String::new();
        while let Some(&next) = tokens.peek() {
            match next {
                "machine" | "default" => break,
                "login" => {
                    tokens.next();
                    username = tokens.next().unwrap_or_default().to_string();
                }
                "password" => {
                    tokens.next();
                    password = tokens.next().unwrap_or_default().to_string();
                }
                "account" => {
                    tokens.next();
                    tokens.next();
                }
                _ => {
                    tokens.next();
                }
            }
        }

        let creds = Credentials { username, password };
        match machine {
            Some(name) if name == host => return Some(creds),
            Some(_) => {}
            None => fallback = Some(creds),
        }
    }

    fallback
}

#[cfg(test)]
mod tests {
    use super::*;

    const NETRC: &str = "\
machine example.com login alice password wonderland
machine jobs.internal
    login deploy
    password hunter2
default login anonymous password guest
";

    #[test]
    fn netrc_matches_hostname() {
        let creds = lookup_netrc(NETRC, "jobs.internal").expect("no credentials");
        assert_eq!(creds.username, "deploy");
        assert_eq!(creds.password, "hunter2");
    }

    #[test]
    fn netrc_falls_back_to_default_entry() {
        let creds = lookup_netrc(NETRC, "other.example.net").expect("no credentials");
        assert_eq!(creds.username, "anonymous");
        assert_eq!(creds.password, "guest");
    }

    #[test]
    fn netrc_without_default_yields_none() {
        let contents = "machine example.com login alice password wonderland";
        assert!(lookup_netrc(contents, "missing.example.net").is_none());
    }

    #[test]
    fn explicit_username_wins_over_netrc() {
        let target = Target {
            name: "default".to_string(),
            url: Some("http://example.com/".to_string()),
            project: None,
            username: Some("cli-user".to_string()),
            password: None,
            version: None,
            settings: None,
        };
        let creds = Credentials::for_target(&target).expect("no credentials");
        assert_eq!(creds.username, "cli-user");
        assert_eq!(creds.password, "");
    }
}
