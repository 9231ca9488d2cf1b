//! Remote control via Unix socket
//!
//! Accepts one command per line and forwards it to the main loop as if the
//! matching key had been pressed.

use std::io::{BufRead, BufReader};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

pub const SOCKET_PATH: &str = "/tmp/tendril.sock";

/// Commands that can be sent over the socket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Select or generate the next tool
    Tool,
    /// Select or generate the next color
    Color,
    Clear,
    Save,
    ToggleFps,
    Quit,
}

/// Parse one line of the control protocol. Case and surrounding space are ignored.
pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim().to_lowercase();
    match line.as_str() {
        "t" | "tool" => Some(Command::Tool),
        "c" | "color" | "colour" => Some(Command::Color),
        "clear" | "space" => Some(Command::Clear),
        "s" | "save" => Some(Command::Save),
        "f" | "fps" => Some(Command::ToggleFps),
        "q" | "quit" | "exit" => Some(Command::Quit),
        _ => None,
    }
}

/// Controller that listens for commands on a Unix socket
pub struct Controller {
    receiver: Receiver<Command>,
    path: PathBuf,
    _listener_thread: thread::JoinHandle<()>,
}

impl Controller {
    /// Listen on `path`, replacing a stale socket file
    pub fn new(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref().to_path_buf();
        let _ = std::fs::remove_file(&path);

        let listener = UnixListener::bind(&path).map_err(|e| format!("Failed to bind socket: {}", e))?;

        // Non-blocking so the thread notices when the socket goes away
        listener
            .set_nonblocking(true)
            .map_err(|e| format!("Failed to set non-blocking: {}", e))?;

        let (sender, receiver) = mpsc::channel();

        let handle = thread::spawn(move || {
            Self::listener_loop(listener, sender);
        });

        debug!(path = %path.display(), "control socket listening");

        Ok(Self {
            receiver,
            path,
            _listener_thread: handle,
        })
    }

    fn listener_loop(listener: UnixListener, sender: Sender<Command>) {
        loop {
            match listener.accept() {
                Ok((stream, _)) => {
                    let sender = sender.clone();
                    thread::spawn(move || {
                        Self::handle_client(stream, sender);
                    });
                }
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(50));
                }
                Err(e) => {
                    warn!(error = %e, "control socket closed");
                    break;
                }
            }
        }
    }

    fn handle_client(stream: UnixStream, sender: Sender<Command>) {
        let reader = BufReader::new(stream);
        for line in reader.lines().map_while(Result::ok) {
            match parse_command(&line) {
                Some(cmd) => {
                    if sender.send(cmd).is_err() {
                        break;
                    }
                }
                None => debug!(line = %line.trim(), "ignored control line"),
            }
        }
    }

    /// Get any pending commands (non-blocking)
    pub fn poll(&self) -> Vec<Command> {
        self.receiver.try_iter().collect()
    }

    pub fn socket_path(&self) -> &Path {
        &self.path
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
