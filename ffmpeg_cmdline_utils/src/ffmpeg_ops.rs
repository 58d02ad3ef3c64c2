use std::{
    ffi::{OsStr, OsString},
    io::prelude::*,
    path::{Path, PathBuf},
    process::{Child, Command, ExitStatus, Stdio},
    thread::JoinHandle,
    time::Duration,
};

#[cfg(target_family = "windows")]
use std::os::windows::process::CommandExt;

use log::{debug, trace, warn};
use wait_timeout::ChildExt;
use FfmpegError::*;

use crate::*;

//Sometimes ffmpeg prints enormous diagnostics. Limit what gets carried around in errors.
const MAX_DIAGNOSTIC_CHARS: usize = 4000;

/// An ffmpeg invocation, described as a program and an argument vector.
///
/// Arguments are handed to the operating system as-is, never through a shell, so paths containing
/// spaces, quotes or other shell metacharacters need no escaping on any platform.
#[derive(Clone, Debug)]
pub struct FfmpegCommand {
    program: PathBuf,
    args: Vec<OsString>,
    timeout: Option<Duration>,
}

impl FfmpegCommand {
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            args: vec![],
            timeout: None,
        }
    }

    pub fn arg(&mut self, arg: impl AsRef<OsStr>) -> &mut Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|arg| arg.as_ref().to_os_string()));
        self
    }

    /// Kill the command if it has not exited after `timeout`. None waits forever.
    pub fn timeout(&mut self, timeout: Option<Duration>) -> &mut Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    /// The command rendered as a single line, for logging and error messages only.
    pub fn command_line(&self) -> String {
        let words = std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .map(|word| word.to_string_lossy().into_owned())
            .collect::<Vec<_>>();

        shell_words::join(words)
    }

    /// Run the command to completion, capturing stdout and stderr.
    ///
    /// A nonzero exit status is not an error here: ffmpeg frequently reports a failure exit code
    /// after doing useful work, so callers inspect [`FfmpegOutput::status`] themselves.
    ///
    /// # Errors
    /// * [`FfmpegError::ToolNotFound`] if the program does not exist
    /// * [`FfmpegError::Timeout`] if a timeout was set and the command overran it
    /// * [`FfmpegError::Io`] for any other failure to spawn or wait on the process
    pub fn run(&self) -> Result<FfmpegOutput, FfmpegError> {
        debug!("Running: {}", self.command_line());

        let mut child = self.spawn()?;

        //drain both pipes on their own threads. Otherwise ffmpeg can block forever
        //writing diagnostics to a full stderr while we wait for it to exit.
        let stdout_reader = drain_pipe(child.stdout.take());
        let stderr_reader = drain_pipe(child.stderr.take());

        let status = match self.timeout {
            None => child.wait()?,
            Some(timeout) => match child.wait_timeout(timeout)? {
                Some(status) => status,
                None => {
                    warn!("Killing ffmpeg after {timeout:?}: {}", self.command_line());

                    //reap the child so that no zombie process is left behind.
                    let _kill_error = child.kill();
                    let _wait_error = child.wait();

                    //detach the readers. They finish by themselves once the pipes close.
                    drop(stdout_reader);
                    drop(stderr_reader);

                    return Err(Timeout {
                        command: self.command_line(),
                        timeout,
                    });
                }
            },
        };

        let stdout = join_reader(stdout_reader)?;
        let stderr = join_reader(stderr_reader)?;
        trace!(
            "ffmpeg exited with {status}. stdout: {} bytes, stderr: {} bytes",
            stdout.len(),
            stderr.len()
        );

        Ok(FfmpegOutput {
            status,
            stdout,
            stderr,
        })
    }

    fn spawn(&self) -> Result<Child, FfmpegError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        //do not spawn a command window on windows when when in a gui application
        #[cfg(target_family = "windows")]
        command.creation_flags(winapi::um::winbase::CREATE_NO_WINDOW);

        command.spawn().map_err(|e| match e.kind() {
            //Separate out NotFound from all other errors as by far the most likely cause
            //is that ffmpeg is not installed where we were told it would be.
            std::io::ErrorKind::NotFound => ToolNotFound {
                path: Some(self.program.clone()),
            },
            _ => FfmpegError::from(e),
        })
    }
}

type PipeReader = Option<JoinHandle<std::io::Result<Vec<u8>>>>;

fn drain_pipe(pipe: Option<impl Read + Send + 'static>) -> PipeReader {
    pipe.map(|mut pipe| {
        std::thread::spawn(move || {
            let mut acc = vec![];
            pipe.read_to_end(&mut acc)?;
            Ok(acc)
        })
    })
}

fn join_reader(reader: PipeReader) -> Result<Vec<u8>, FfmpegError> {
    match reader {
        None => Ok(vec![]),
        Some(handle) => handle
            .join()
            .map_err(|_| Io("output reader thread panicked".to_string()))?
            .map_err(FfmpegError::from),
    }
}

/// Everything an ffmpeg command printed, and how it exited.
#[derive(Debug, Clone)]
pub struct FfmpegOutput {
    status: ExitStatus,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

impl FfmpegOutput {
    pub fn status(&self) -> ExitStatus {
        self.status
    }

    pub fn success(&self) -> bool {
        self.status.success()
    }

    pub fn stdout(&self) -> &[u8] {
        &self.stdout
    }

    pub fn stderr(&self) -> &[u8] {
        &self.stderr
    }

    /// stdout followed by stderr, lossily decoded. ffmpeg writes nearly all of its diagnostics
    /// (including filter output such as cropdetect) to stderr.
    pub fn combined_lossy(&self) -> String {
        let mut ret = String::from_utf8_lossy(&self.stdout).into_owned();
        ret.push_str(&String::from_utf8_lossy(&self.stderr));
        ret
    }

    /// As [`Self::combined_lossy`], but limited to a length suitable for embedding in an error.
    pub fn diagnostic_text(&self) -> String {
        truncate_diagnostic(&self.combined_lossy())
    }
}

pub fn truncate_diagnostic(text: &str) -> String {
    text.chars().take(MAX_DIAGNOSTIC_CHARS).collect::<String>()
}

#[cfg(all(test, unix))]
mod test {
    use super::*;

    fn sh(script: &str) -> FfmpegCommand {
        let mut cmd = FfmpegCommand::new("/bin/sh");
        cmd.args(["-c", script]);
        cmd
    }

    #[test]
    fn test_captures_stdout_and_stderr() {
        let output = sh("echo out; echo err 1>&2").run().unwrap();

        assert!(output.success());
        assert_eq!(output.stdout(), b"out\n");
        assert_eq!(output.stderr(), b"err\n");
        assert_eq!(output.combined_lossy(), "out\nerr\n");
    }

    #[test]
    fn test_nonzero_exit_is_not_an_error() {
        let output = sh("echo failing 1>&2; exit 3").run().unwrap();

        assert!(!output.success());
        assert_eq!(output.status().code(), Some(3));
        assert_eq!(output.stderr(), b"failing\n");
    }

    #[test]
    fn test_large_stderr_does_not_deadlock() {
        //well over the size of a pipe buffer
        let script = "i=0; while [ $i -lt 20000 ]; do echo 0123456789abcdef 1>&2; i=$((i+1)); done";
        let output = sh(script).run().unwrap();

        assert_eq!(output.stderr().len(), 20000 * 17);
        assert!(output.diagnostic_text().chars().count() <= MAX_DIAGNOSTIC_CHARS);
    }

    #[test]
    fn test_timeout_kills_command() {
        let mut cmd = sh("exec sleep 10");
        cmd.timeout(Some(Duration::from_millis(200)));

        let start = std::time::Instant::now();
        let result = cmd.run();

        assert!(start.elapsed() < Duration::from_secs(5));

        let error = result.unwrap_err();
        assert_eq!(
            error,
            Timeout {
                command: "/bin/sh -c 'exec sleep 10'".to_string(),
                timeout: Duration::from_millis(200),
            }
        );
        assert!(error.to_string().contains("after 200ms"), "{error}");
    }

    #[test]
    fn test_missing_program_is_tool_not_found() {
        let path = PathBuf::from("/this/program/does/not/exist/ffmpeg");
        let result = FfmpegCommand::new(&path).arg("-version").run();

        assert_eq!(result.unwrap_err(), ToolNotFound { path: Some(path) });
    }

    #[test]
    fn test_command_line_quotes_awkward_arguments() {
        let mut cmd = FfmpegCommand::new("ffmpeg");
        cmd.args(["-i", "my video.mkv", "-s", "144x144"]);

        assert_eq!(cmd.command_line(), "ffmpeg -i 'my video.mkv' -s 144x144");
    }
}
