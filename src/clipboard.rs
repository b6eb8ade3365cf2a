use async_trait::async_trait;
use log::debug;
use std::io::ErrorKind;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::ShareError;

/// Somewhere a generated share link can be copied to.
///
/// Copying is best-effort: callers treat an error as "not copied" and carry
/// on with the link they already have.
#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<(), ShareError>;
}

/// The desktop clipboard, reached through whichever helper is installed.
#[derive(Debug, Clone)]
pub struct SystemClipboard {
    helpers: Vec<(String, Vec<String>)>,
}

impl Default for SystemClipboard {
    fn default() -> Self {
        let helpers = [
            ("wl-copy", &[][..]),
            ("xclip", &["-selection", "clipboard"][..]),
            ("xsel", &["--clipboard", "--input"][..]),
            ("pbcopy", &[][..]),
            ("clip.exe", &[][..]),
        ];
        SystemClipboard {
            helpers: helpers
                .iter()
                .map(|(program, args)| {
                    (
                        program.to_string(),
                        args.iter().map(|arg| arg.to_string()).collect(),
                    )
                })
                .collect(),
        }
    }
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use one specific helper program instead of probing the usual ones.
    pub fn with_helper(program: impl Into<String>, args: Vec<String>) -> Self {
        SystemClipboard {
            helpers: vec![(program.into(), args)],
        }
    }

    async fn pipe_to(program: &str, args: &[String], text: &str) -> std::io::Result<bool> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).await?;
        }
        Ok(child.wait().await?.success())
    }
}

#[async_trait]
impl Clipboard for SystemClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ShareError> {
        for (program, args) in &self.helpers {
            match Self::pipe_to(program, args, text).await {
                Ok(true) => {
                    debug!("copied {} bytes with {}", text.len(), program);
                    return Ok(());
                }
                Ok(false) => debug!("{} exited with failure", program),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => debug!("{} failed: {}", program, e),
            }
        }
        Err(ShareError::Clipboard(
            "no working clipboard helper found".to_string(),
        ))
    }
}

/// For hosts without clipboard access; every write is declined.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoClipboard;

#[async_trait]
impl Clipboard for NoClipboard {
    async fn write_text(&self, _text: &str) -> Result<(), ShareError> {
        Err(ShareError::Clipboard(
            "clipboard access is disabled".to_string(),
        ))
    }
}
