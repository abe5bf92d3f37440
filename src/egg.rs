use std::{
    error::Error,
    fs,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use tempfile::TempDir;

use crate::error::DeployError;

const SETUP_PY_TEMPLATE: &str = "\
# Automatically created by: crawl-deploy

from setuptools import setup, find_packages

setup(
    name         = 'project',
    version      = '1.0',
    packages     = find_packages(),
    entry_points = {'crawler': ['settings = %(settings)s']},
)
";

/// Builds the project egg in a fresh temporary directory, returning the egg
/// path together with the directory that owns it. Dropping the directory
/// removes the egg; pass both through [`dispose`] when done.
pub fn build_egg(
    project_root: &Path,
    settings: &str,
    include_dependencies: bool,
    debug: bool,
) -> Result<(PathBuf, TempDir), Box<dyn Error>> {
    ensure_setup_py(project_root, settings)?;

    let build_dir = tempfile::Builder::new()
        .prefix("crawl-deploy-")
        .tempdir()?;

    let command = if include_dependencies {
        eprintln!("[crawl-deploy] Including dependencies from requirements.txt");
        if !project_root.join("requirements.txt").is_file() {
            return Err(DeployError::MissingRequirements.into());
        }
        "bdist_uberegg"
    } else {
        "bdist_egg"
    };

    let mut python = Command::new("python");
    python
        .args(["setup.py", "clean", "-a", command, "-d"])
        .arg(build_dir.path())
        .current_dir(project_root);
    if !debug {
        python.stdout(Stdio::null()).stderr(Stdio::null());
    }

    let status = python.status()?;
    if !status.success() {
        return Err(DeployError::BuildFailed(status.to_string()).into());
    }

    let egg = find_egg(build_dir.path())?;
    Ok((egg, build_dir))
}

/// Drops the build directory, or keeps it for inspection in debug mode.
pub fn dispose(build_dir: TempDir, debug: bool) {
    if debug {
        let path = build_dir.keep();
        eprintln!("[crawl-deploy] Output dir not removed: {}", path.display());
    }
}

fn ensure_setup_py(project_root: &Path, settings: &str) -> Result<(), Box<dyn Error>> {
    let setup_py = project_root.join("setup.py");
    if setup_py.exists() {
        return Ok(());
    }
    fs::write(setup_py, SETUP_PY_TEMPLATE.replace("%(settings)s", settings))?;
    Ok(())
}

fn find_egg(build_dir: &Path) -> Result<PathBuf, Box<dyn Error>> {
    for entry in fs::read_dir(build_dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "egg") {
            return Ok(path);
        }
    }
    Err(DeployError::NoEggProduced(build_dir.to_path_buf()).into())
}
