use std::{error::Error, fs, path::Path};

use reqwest::{
    Url,
    blocking::{
        Client, RequestBuilder,
        multipart::{Form, Part},
    },
};
use serde_derive::Deserialize;
use serde_json::Value;

use crate::{
    config::{Credentials, Target},
    error::DeployError,
};

const USER_AGENT: &str = concat!("crawl-deploy/", env!("CARGO_PKG_VERSION"));

/// Client for a job server's REST interface.
pub struct ApiClient {
    http: Client,
    base: Url,
    creds: Option<Credentials>,
}

#[derive(Debug, Deserialize)]
struct ProjectList {
    status: String,
    #[serde(default)]
    projects: Vec<String>,
    #[serde(default)]
    message: String,
}

impl ApiClient {
    pub fn for_target(target: &Target) -> Result<Self, Box<dyn Error>> {
        let base = Url::parse(target.url()?)?;
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            base,
            creds: Credentials::for_target(target),
        })
    }

    /// Resolves an API action against the target url, with the reference
    /// resolution rules a browser would apply.
    fn endpoint(&self, action: &str) -> Result<Url, Box<dyn Error>> {
        Ok(self.base.join(action)?)
    }

    pub fn list_projects(&self) -> Result<Vec<String>, Box<dyn Error>> {
        let url = self.endpoint("listprojects.json")?;
        let body = self.authed(self.http.get(url)).send()?.text()?;

        let decoded: ProjectList = serde_json::from_str(&body)
            .map_err(|_| DeployError::MalformedResponse(body.clone()))?;
        match decoded.status.as_str() {
            "ok" => Ok(decoded.projects),
            "error" => Err(DeployError::ErrorResponse(decoded.message).into()),
            other => Err(format!("unhandled response status: {other}").into()),
        }
    }

    /// Posts the egg as a new version of `project` and prints the server's
    /// verdict. Returns whether the server accepted the version.
    pub fn add_version(
        &self,
        project: &str,
        version: &str,
        egg_path: &Path,
    ) -> Result<bool, Box<dyn Error>> {
        let url = self.endpoint("addversion.json")?;
        let egg = fs::read(egg_path)?;
        let form = Form::new()
            .text("project", project.to_string())
            .text("version", version.to_string())
            .part("egg", Part::bytes(egg).file_name("project.egg"));

        eprintln!("[crawl-deploy] Deploying to project \"{project}\" in {url}");

        let response = match self.authed(self.http.post(url)).multipart(form).send() {
            Ok(response) => response,
            Err(err) => {
                eprintln!("[crawl-deploy] Deploy failed: {err}");
                return Ok(false);
            }
        };

        let status = response.status();
        let body = response.text()?;
        if status.is_success() {
            eprintln!("[crawl-deploy] Server response ({}):", status.as_u16());
            println!("{body}");
            Ok(true)
        } else {
            eprintln!("[crawl-deploy] Deploy failed ({}):", status.as_u16());
            println!("{}", render_error_body(&body));
            Ok(false)
        }
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.creds {
            Some(creds) => builder.basic_auth(&creds.username, Some(&creds.password)),
            None => builder,
        }
    }
}

/// Renders a failed upload's body: decoded `status`/`message` fields when the
/// server sent them, pretty-printed JSON otherwise, raw text as a last resort.
pub fn render_error_body(body: &str) -> String {
    let Ok(data) = serde_json::from_str::<Value>(body) else {
        return body.to_string();
    };

    let fields = data
        .get("status")
        .and_then(Value::as_str)
        .zip(data.get("message").and_then(Value::as_str));
    match fields {
        Some((status, message)) => format!("Status: {status}\nMessage:\n{message}"),
        None => serde_json::to_string_pretty(&data).unwrap_or_else(|_| body.to_string()),
    }
}
