use anyhow::{Context, Result};
use std::process::{Command, Stdio};

#[cfg(target_os = "macos")]
const OPENER: (&str, &[&str]) = ("open", &[]);
#[cfg(target_os = "windows")]
const OPENER: (&str, &[&str]) = ("cmd", &["/C", "start", ""]);
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const OPENER: (&str, &[&str]) = ("xdg-open", &[]);

/// Program and leading arguments used to open a URL on this platform
pub fn opener_command() -> (&'static str, &'static [&'static str]) {
    OPENER
}

/// Open `url` in the default browser without blocking the UI
pub fn open_url(url: &str) -> Result<()> {
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        anyhow::bail!("Refusing to open non-http URL: {url}");
    }

    let (program, args) = opener_command();
    tracing::debug!(url = %url, program, "opening url");

    Command::new(program)
        .args(args)
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("Failed to launch {program} to open {url}"))?;

    Ok(())
}
