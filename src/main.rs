use std::{path::PathBuf, process};

use clap::Parser;

use crate::{
    commands::{
        BuildCommand, CommandDelegate, DeployCommand, ListProjectsCommand, ListTargetsCommand,
    },
    error::DeployError,
};

mod commands;
mod config;
mod egg;
mod error;
mod http;
mod version;

/// Deploy a crawl project to a job server.
#[derive(Parser)]
#[clap(author, about, long_about = None, disable_version_flag = true)]
struct Args {
    /// Target to deploy to
    #[arg(value_name = "TARGET", default_value = "default")]
    target: String,

    /// The project name in the target
    #[arg(short, long)]
    project: Option<String>,

    /// The version to deploy. Defaults to current timestamp
    #[arg(short, long)]
    version: Option<String>,

    /// List available targets
    #[arg(short = 'l', long)]
    list_targets: bool,

    /// List available projects in the target
    #[arg(short = 'L', long, value_name = "TARGET")]
    list_projects: Option<String>,

    /// Deploy all targets
    #[arg(short = 'a', long)]
    deploy_all_targets: bool,

    /// Debug mode (do not remove build dir)
    #[arg(short, long)]
    debug: bool,

    /// Use the given egg, instead of building it
    #[arg(long, value_name = "FILE")]
    egg: Option<PathBuf>,

    /// Only build the egg, don't deploy it
    #[arg(long, value_name = "FILE")]
    build_egg: Option<PathBuf>,

    /// Include dependencies from requirements.txt in the egg
    #[arg(long)]
    include_dependencies: bool,
}

#[derive(Debug, PartialEq, Eq)]
enum Mode {
    ListTargets,
    ListProjects(String),
    Build(PathBuf),
    Deploy,
}

impl Args {
    fn mode(&self) -> Mode {
        if self.list_targets {
            Mode::ListTargets
        } else if let Some(target) = &self.list_projects {
            Mode::ListProjects(target.clone())
        } else if let Some(output) = &self.build_egg {
            Mode::Build(output.clone())
        } else {
            Mode::Deploy
        }
    }
}

fn run(args: Args) -> Result<i32, Box<dyn std::error::Error>> {
    if !config::inside_project() {
        return Err(DeployError::NotInProject.into());
    }

    match args.mode() {
        Mode::ListTargets => ListTargetsCommand.run(),
        Mode::ListProjects(target) => ListProjectsCommand { target }.run(),
        Mode::Build(output) => BuildCommand {
            output,
            include_dependencies: args.include_dependencies,
            debug: args.debug,
        }
        .run(),
        Mode::Deploy => DeployCommand {
            target: args.target,
            all_targets: args.deploy_all_targets,
            project: args.project,
            version: args.version,
            egg: args.egg,
            include_dependencies: args.include_dependencies,
            debug: args.debug,
        }
        .run(),
    }
}

fn main() {
    let args = Args::parse();
    match run(args) {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("[crawl-deploy] Error: {err}");
            process::exit(1);
        }
    }
}
