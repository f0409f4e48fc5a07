//! Unix-domain control socket plumbing.
//!
//! The manager binds a socket under its runtime directory; the served
//! proxy process and command-line tools connect to it. Access control
//! is the socket file's filesystem permissions - this layer does no
//! authentication of its own.
//!
//! # Example
//!
//! ```ignore
//! use ctlwire::transport::{ControlSocketListener, connect};
//!
//! let listener = ControlSocketListener::bind("/run/mgmt.sock")?;
//! let channel = listener.accept().await?;
//! ```

use std::path::{Path, PathBuf};

use tokio::net::{UnixListener, UnixStream};

use crate::error::Result;

use super::channel::ControlChannel;

/// Well-known socket file name for the request/response channel.
pub const CONTROL_SOCKET_NAME: &str = "mgmt.sock";

/// Well-known socket file name for the event notification channel.
pub const EVENT_SOCKET_NAME: &str = "events.sock";

/// Path of the control socket inside a runtime directory.
pub fn control_socket_path(run_dir: &Path) -> PathBuf {
    run_dir.join(CONTROL_SOCKET_NAME)
}

/// Path of the event socket inside a runtime directory.
pub fn event_socket_path(run_dir: &Path) -> PathBuf {
    run_dir.join(EVENT_SOCKET_NAME)
}

/// Listening end of a control socket.
///
/// Removes any stale socket file before binding, and removes the file
/// again when dropped so a restarted manager can always rebind.
pub struct ControlSocketListener {
    listener: UnixListener,
    path: PathBuf,
}

impl ControlSocketListener {
    /// Bind to a socket path, replacing any stale socket file.
    pub fn bind(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if path.exists() {
            std::fs::remove_file(&path)?;
        }

        let listener = UnixListener::bind(&path)?;
        Ok(Self { listener, path })
    }

    /// Accept one client connection as an established channel.
    pub async fn accept(&self) -> Result<ControlChannel<UnixStream>> {
        let (stream, _addr) = self.listener.accept().await?;
        Ok(ControlChannel::connected(stream))
    }

    /// The bound socket path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ControlSocketListener {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Connect to a manager's control socket.
pub async fn connect(path: impl AsRef<Path>) -> Result<ControlChannel<UnixStream>> {
    let stream = UnixStream::connect(path.as_ref()).await?;
    Ok(ControlChannel::connected(stream))
}
