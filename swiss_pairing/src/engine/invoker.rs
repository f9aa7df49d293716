//! Bounded execution of the external pairing engine.

use serde::Serialize;
use std::io::ErrorKind;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::sync::Mutex;
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::timeout;

use super::artifact::TempArtifact;
use super::config::{EngineConfig, PAIRING_SYSTEM};
use super::errors::{EngineError, EngineResult};
use super::excerpt;

/// How long output is still read after the engine exits
const STREAM_GRACE: Duration = Duration::from_millis(500);

type StreamBuf = Arc<Mutex<Vec<u8>>>;

/// What a successful engine run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOutput {
    /// Process exit code (always 0 here)
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
    /// Output artifact contents, or stdout when no artifact was written
    pub result: String,
    /// Whether `result` came from the output artifact
    pub from_artifact: bool,
}

/// Outcome of running the engine in help mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PingReport {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Raw process outcome
struct Captured {
    code: Option<i32>,
    stdout: String,
    stderr: String,
}

/// Runs the configured engine as a subprocess under a time bound
#[derive(Debug, Clone)]
pub struct EngineInvoker {
    config: EngineConfig,
}

impl EngineInvoker {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Run the engine against a serialized tournament record
    ///
    /// The record goes to a fresh input artifact, the engine is asked to
    /// write its pairings to a fresh output artifact, and both are removed
    /// before this returns, on every path.
    ///
    /// # Errors
    ///
    /// * `Unavailable` - program could not be spawned
    /// * `Failure` - non-zero exit, with truncated streams
    /// * `Timeout` - bound exceeded, process killed
    /// * `Io` - artifact could not be written or read
    pub async fn invoke(&self, record: &str, round: u32) -> EngineResult<EngineOutput> {
        let input = TempArtifact::reserve(&self.config.temp_dir, &self.config.name, "trf");
        let output = TempArtifact::reserve(&self.config.temp_dir, &self.config.name, "out.txt");

        input.write(record).await?;

        let mut command = self.base_command();
        command
            .arg("--in")
            .arg(input.path())
            .arg("--out")
            .arg(output.path())
            .arg("--system")
            .arg(PAIRING_SYSTEM)
            .arg("--round")
            .arg(round.to_string());

        let started = Instant::now();
        let captured = run_bounded(command, &self.config).await?;
        log::debug!(
            "Engine {} finished round {} in {}ms with code {:?}",
            self.config.name,
            round,
            started.elapsed().as_millis(),
            captured.code
        );

        let code = match captured.code {
            Some(0) => 0,
            other => {
                return Err(EngineError::Failure {
                    code: other.unwrap_or(-1),
                    stderr: excerpt(&captured.stderr, self.config.output_limit),
                    stdout: excerpt(&captured.stdout, self.config.output_limit),
                });
            }
        };

        let (result, from_artifact) = match output.read_if_exists().await? {
            Some(text) => (text, true),
            None => (captured.stdout.clone(), false),
        };

        Ok(EngineOutput {
            code,
            stdout: captured.stdout,
            stderr: captured.stderr,
            result,
            from_artifact,
        })
    }

    /// Run the engine with `-h` to check that it can be started
    ///
    /// A non-zero exit is reported, not treated as an error.
    pub async fn ping(&self) -> EngineResult<PingReport> {
        let mut command = self.base_command();
        command.arg("-h");

        let captured = run_bounded(command, &self.config).await?;
        Ok(PingReport {
            code: captured.code,
            stdout: excerpt(&captured.stdout, self.config.output_limit),
            stderr: excerpt(&captured.stderr, self.config.output_limit),
        })
    }

    fn base_command(&self) -> Command {
        let mut command = Command::new(&self.config.program);
        command.args(&self.config.args);
        command
    }
}

/// Spawn `command` and wait for it to exit, killing it on timeout.
///
/// Output is collected until exit plus [`STREAM_GRACE`]. A descendant that
/// inherited the pipes cannot hold the run open past that.
async fn run_bounded(mut command: Command, config: &EngineConfig) -> EngineResult<Captured> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command.spawn().map_err(|e| spawn_error(config, e))?;

    let (stdout_buf, stdout_task) = spawn_drain(child.stdout.take());
    let (stderr_buf, stderr_task) = spawn_drain(child.stderr.take());
    let readers: Vec<JoinHandle<()>> = [stdout_task, stderr_task].into_iter().flatten().collect();
    let abort_handles: Vec<AbortHandle> = readers.iter().map(JoinHandle::abort_handle).collect();

    let status = match timeout(config.timeout, child.wait()).await {
        Ok(Ok(status)) => status,
        Ok(Err(e)) => {
            abort_all(&abort_handles);
            return Err(EngineError::Io(e));
        }
        Err(_) => {
            log::warn!(
                "Engine {} exceeded {:?}, killing process",
                config.name,
                config.timeout
            );
            abort_all(&abort_handles);
            if let Err(e) = child.kill().await {
                log::warn!("Failed to kill engine {}: {}", config.name, e);
            }
            return Err(EngineError::Timeout(config.timeout));
        }
    };

    let flushed = timeout(STREAM_GRACE, async {
        for reader in readers {
            let _ = reader.await;
        }
    })
    .await;
    if flushed.is_err() {
        log::debug!(
            "Engine {} exited with its output streams still open",
            config.name
        );
        abort_all(&abort_handles);
    }

    Ok(Captured {
        code: status.code(),
        stdout: String::from_utf8_lossy(&stdout_buf.lock().await).into_owned(),
        stderr: String::from_utf8_lossy(&stderr_buf.lock().await).into_owned(),
    })
}

fn spawn_error(config: &EngineConfig, e: std::io::Error) -> EngineError {
    let program = config.program.display();
    match e.kind() {
        ErrorKind::NotFound => EngineError::Unavailable(format!("{program} not found")),
        ErrorKind::PermissionDenied => {
            EngineError::Unavailable(format!("{program} is not executable"))
        }
        _ => EngineError::Unavailable(format!("failed to start {program}: {e}")),
    }
}

fn spawn_drain<R>(stream: Option<R>) -> (StreamBuf, Option<JoinHandle<()>>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let buf = StreamBuf::default();
    let task = stream.map(|s| tokio::spawn(drain(s, Arc::clone(&buf))));
    (buf, task)
}

async fn drain<R: AsyncRead + Unpin>(mut stream: R, sink: StreamBuf) {
    let mut chunk = [0u8; 8192];
    loop {
        match stream.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => sink.lock().await.extend_from_slice(&chunk[..n]),
            Err(e) => {
                log::debug!("Engine stream read stopped: {}", e);
                break;
            }
        }
    }
}

fn abort_all(handles: &[AbortHandle]) {
    for handle in handles {
        handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell_engine(script: &str, dir: &std::path::Path) -> EngineInvoker {
        EngineInvoker::new(
            EngineConfig::command(
                "mock",
                "sh",
                vec!["-c".to_string(), script.to_string(), "mock-engine".to_string()],
            )
            .with_temp_dir(dir)
            .with_timeout(Duration::from_secs(5)),
        )
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_arguments_follow_cli_contract() {
        let dir = tempfile::tempdir().unwrap();
        let engine = shell_engine(r#"printf '%s|' "$@""#, dir.path());

        let output = engine.invoke("012 T; R4\n", 4).await.unwrap();
        let args: Vec<&str> = output.result.trim_end_matches('|').split('|').collect();

        assert!(!output.from_artifact);
        assert_eq!(args.len(), 8);
        assert_eq!(args[0], "--in");
        assert!(args[1].ends_with(".trf"));
        assert_eq!(args[2], "--out");
        assert!(args[3].ends_with(".out.txt"));
        assert_eq!(&args[4..], &["--system", "fide-dutch", "--round", "4"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_signal_exit_reports_minus_one() {
        let dir = tempfile::tempdir().unwrap();
        let engine = shell_engine("kill -9 $$", dir.path());

        let err = engine.invoke("012 T; R2\n", 2).await.unwrap_err();
        assert!(matches!(err, EngineError::Failure { code: -1, .. }));
    }
}
