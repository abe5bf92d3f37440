use std::{
    error::Error,
    process::Command,
    time::{SystemTime, UNIX_EPOCH},
};

/// Resolves the version string to deploy: an explicit CLI value wins, then
/// the target's version policy, then the current timestamp.
///
/// The `GIT` and `HG` policies derive the version from the working copy by
/// invoking the respective tool.
pub fn resolve(explicit: Option<&str>, policy: Option<&str>) -> Result<String, Box<dyn Error>> {
    match explicit.or(policy) {
        Some("GIT") => git_version(),
        Some("HG") => hg_version(),
        Some(version) => Ok(version.to_string()),
        None => Ok(timestamp()),
    }
}

fn timestamp() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
        .to_string()
}

fn git_version() -> Result<String, Box<dyn Error>> {
    // `git describe` needs at least one tag; fall back to the revision count.
    let descriptor = match capture("git", &["describe"])? {
        Some(described) => described,
        None => {
            let count = capture("git", &["rev-list", "--count", "HEAD"])?
                .ok_or("git rev-list failed")?;
            format!("r{count}")
        }
    };
    let branch =
        capture("git", &["rev-parse", "--abbrev-ref", "HEAD"])?.ok_or("git rev-parse failed")?;
    Ok(format!("{descriptor}-{branch}"))
}

fn hg_version() -> Result<String, Box<dyn Error>> {
    let revision = capture("hg", &["tip", "--template", "{rev}"])?.ok_or("hg tip failed")?;
    let branch = capture("hg", &["branch"])?.ok_or("hg branch failed")?;
    Ok(format!("r{revision}-{branch}"))
}

/// Runs a command and returns its trimmed stdout, or `None` on a non-zero
/// exit. Failing to spawn the tool at all is an error.
fn capture(program: &str, args: &[&str]) -> Result<Option<String>, Box<dyn Error>> {
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|err| format!("failed to run {program}: {err}"))?;
    if !output.status.success() {
        return Ok(None);
    }
    Ok(Some(
        String::from_utf8_lossy(&output.stdout).trim().to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_version_wins_over_policy() {
        let version = resolve(Some("1.0"), Some("GIT")).expect("resolve failed");
        assert_eq!(version, "1.0");
    }

    #[test]
    fn plain_policy_string_is_used_verbatim() {
        let version = resolve(None, Some("2.4-rc1")).expect("resolve failed");
        assert_eq!(version, "2.4-rc1");
    }

    #[test]
    fn absent_version_and_policy_fall_back_to_timestamp() {
        let version = resolve(None, None).expect("resolve failed");
        let secs: u64 = version.parse().expect("not a number");
        // Sanity bound: some time after 2020.
        assert!(secs > 1_577_836_800);
    }
}
