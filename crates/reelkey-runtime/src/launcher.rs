use std::sync::Mutex;

/// Opens a URL in a new browsing context.
pub trait Launcher: Send + Sync + 'static {
    fn open(&self, url: &str) -> std::io::Result<()>;
}

/// The desktop's default browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn open(&self, url: &str) -> std::io::Result<()> {
        open::that_detached(url)
    }
}

/// Records URLs instead of opening them. Used by `--dry-run` and tests.
#[derive(Debug, Default)]
pub struct RecordingLauncher {
    opened: Mutex<Vec<String>>,
}

impl RecordingLauncher {
    pub fn opened(&self) -> Vec<String> {
        self.opened
            .lock()
            .map(|urls| urls.clone())
            .unwrap_or_default()
    }
}

impl Launcher for RecordingLauncher {
    fn open(&self, url: &str) -> std::io::Result<()> {
        self.opened
            .lock()
            .map_err(|_| std::io::Error::other("launcher lock poisoned"))?
            .push(url.to_string());
        Ok(())
    }
}
