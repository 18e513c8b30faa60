// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Optional "open the app in a browser" step at startup.

use std::process::{Command, Stdio};

/// Platform command that opens a URL, if this platform has one.
pub fn launcher_command(url: &str) -> Option<Command> {
    let mut cmd = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        // The empty string is the window title `start` expects first.
        c.args(["/C", "start", ""]);
        c
    } else if cfg!(any(
        target_os = "linux",
        target_os = "freebsd",
        target_os = "openbsd",
        target_os = "netbsd"
    )) {
        Command::new("xdg-open")
    } else {
        return None;
    };

    cmd.arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    Some(cmd)
}

/// Open `url` in the default browser. Failures are logged, never fatal.
pub fn open(url: &str) {
    let Some(mut cmd) = launcher_command(url) else {
        tracing::info!(url, "No browser launcher for this platform");
        return;
    };

    match cmd.spawn() {
        Ok(_) => tracing::info!(url, "Opened browser"),
        Err(e) => tracing::warn!(error = %e, url, "Failed to open browser"),
    }
}
