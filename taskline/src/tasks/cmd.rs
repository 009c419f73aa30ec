//! Runs a script with the platform shell.

use super::{TaskInfo, TypedTask};
use crate::context::TaskContext;
use crate::errors::TaskError;
use async_trait::async_trait;
use serde::Deserialize;
use std::process::Stdio;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

/// Inputs of [`CmdTask`].
#[derive(Debug, Clone, Deserialize)]
pub struct CmdInputs {
    /// Script text handed to the shell.
    #[serde(alias = "Script")]
    pub script: String,
}

/// Executes a script and streams its stdout into the step output.
///
/// On Windows the script is piped to `cmd.exe` on stdin; elsewhere it is
/// passed to `bash -c` as a single argument. A non-zero exit fails the step.
/// Stdout bytes that are not valid UTF-8 are replaced, not rejected. On Unix,
/// cancelling or dropping the run kills the shell's whole process group.
#[derive(Debug, Clone, Copy, Default)]
pub struct CmdTask;

impl TaskInfo for CmdTask {
    const NAME: &'static str = "cmd";
    const DESCRIPTION: &'static str = "Execute a script with the platform shell";
}

#[async_trait]
impl TypedTask for CmdTask {
    type Inputs = CmdInputs;

    async fn execute(&self, ctx: &TaskContext, inputs: CmdInputs) -> Result<(), TaskError> {
        if ctx.is_cancelled() {
            return Err(TaskError::Cancelled);
        }

        let mut child = spawn_shell(ctx, &inputs.script).await?;
        // Declared after `child` so the group is killed before the child handle drops.
        let mut tree = ProcessTree::new(&child);
        info!(task = %ctx.task_name(), pid = ?child.id(), "started shell process");

        if let Some(stderr) = child.stderr.take() {
            let task_name = ctx.task_name().to_string();
            tokio::spawn(async move {
                let mut stderr = BufReader::new(stderr);
                let mut buf = Vec::new();
                while let Ok(Some(line)) = read_line_lossy(&mut stderr, &mut buf).await {
                    debug!(task = %task_name, "stderr: {}", line);
                }
            });
        }

        if let Some(stdout) = child.stdout.take() {
            let mut stdout = BufReader::new(stdout);
            let mut buf = Vec::new();
            loop {
                tokio::select! {
                    () = ctx.cancellation().cancelled() => {
                        terminate(&mut child, &mut tree).await;
                        return Err(TaskError::Cancelled);
                    }
                    line = read_line_lossy(&mut stdout, &mut buf) => match line? {
                        Some(line) => ctx.output().write_line(line)?,
                        None => break,
                    },
                }
            }
        }

        let status = tokio::select! {
            () = ctx.cancellation().cancelled() => {
                terminate(&mut child, &mut tree).await;
                return Err(TaskError::Cancelled);
            }
            status = child.wait() => status?,
        };
        tree.disarm();

        info!(
            task = %ctx.task_name(),
            exit_code = ?status.code(),
            success = status.success(),
            "shell process exited"
        );

        if status.success() {
            Ok(())
        } else {
            Err(TaskError::failed(match status.code() {
                Some(code) => format!("Script exited with code {code}"),
                None => "Script terminated by signal".to_string(),
            }))
        }
    }
}

async fn spawn_shell(ctx: &TaskContext, script: &str) -> Result<Child, TaskError> {
    let mut command = if cfg!(windows) {
        let mut c = Command::new("cmd.exe");
        c.stdin(Stdio::piped());
        c
    } else {
        let mut c = Command::new("bash");
        c.arg("-c").arg(script).stdin(Stdio::null());
        c
    };

    command
        .current_dir(ctx.working_directory())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    // The shell leads its own process group so its descendants can be
    // killed together.
    #[cfg(unix)]
    command.process_group(0);

    let mut child = command.spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(script.as_bytes()).await?;
        stdin.write_all(b"\r\n").await?;
        stdin.flush().await?;
    }

    Ok(child)
}

/// Reads one line, replacing invalid UTF-8 instead of failing.
///
/// Returns `None` at end of stream.
async fn read_line_lossy<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    if reader.read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }
    Ok(Some(
        String::from_utf8_lossy(buf)
            .trim_end_matches(['\r', '\n'])
            .to_string(),
    ))
}

/// The shell's process group; killed on drop unless disarmed.
///
/// `kill_on_drop` only reaches the shell itself, not the commands it forked.
struct ProcessTree {
    pid: Option<u32>,
}

impl ProcessTree {
    fn new(child: &Child) -> Self {
        Self { pid: child.id() }
    }

    fn disarm(&mut self) {
        self.pid = None;
    }

    fn kill(&mut self) {
        if let Some(pid) = self.pid.take() {
            kill_process_group(pid);
        }
    }
}

impl Drop for ProcessTree {
    fn drop(&mut self) {
        self.kill();
    }
}

#[cfg(unix)]
fn kill_process_group(pid: u32) {
    use nix::errno::Errno;
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        return;
    };
    match killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(err) => warn!(pid, error = %err, "failed to kill process group"),
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: u32) {}

async fn terminate(child: &mut Child, tree: &mut ProcessTree) {
    warn!(pid = ?child.id(), "cancellation requested; killing shell process group");
    tree.kill();
    if let Err(e) = child.kill().await {
        warn!(error = %e, "failed to kill shell process");
    }
}
