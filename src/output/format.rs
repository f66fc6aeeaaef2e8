//! External formatter

use crate::error::{Error, Result};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Pipe `raw` through `formatter` and return its stdout
///
/// `formatter` is split on whitespace into program and arguments; an
/// empty command returns `raw` unchanged. Spawn failure or a non-zero
/// exit is [`Error::Formatter`] carrying `raw`.
pub async fn format_code(raw: &str, formatter: &str) -> Result<String> {
    let mut parts = formatter.split_whitespace();
    let Some(program) = parts.next() else {
        return Ok(raw.to_string());
    };

    let failed = |code: Option<i32>, output: String| Error::Formatter {
        code,
        output,
        raw: raw.to_string(),
    };

    let mut child = Command::new(program)
        .args(parts)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| failed(None, format!("{program}: {e}")))?;

    // Feed stdin concurrently so a formatter that streams its output
    // cannot block on a full pipe.
    let writer = child.stdin.take().map(|mut stdin| {
        let input = raw.as_bytes().to_vec();
        tokio::spawn(async move {
            let written = stdin.write_all(&input).await;
            drop(stdin);
            written
        })
    });

    let output = child
        .wait_with_output()
        .await
        .map_err(|e| failed(None, e.to_string()))?;
    if let Some(writer) = writer {
        // A formatter that exits early closes the pipe; its status decides
        let _ = writer.await;
    }

    debug!(program, status = ?output.status.code(), "formatter finished");
    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Err(failed(output.status.code(), text.trim().to_string()))
    }
}
