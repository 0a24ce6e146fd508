//! gpg process management.
//!
//! Everything here is synchronous: the calling thread blocks on the child and
//! no helper threads are started. Output streaming is pull-based, so a slow
//! reader applies backpressure through the pipe buffer.

use crate::error::{Error, Result};
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, ExitStatus, Stdio};
use tracing::{debug, info, warn, Level};

/// How stdout and stderr of a child are wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Output {
    /// Collect both streams, log them at debug level and keep stderr for errors.
    #[default]
    Capture,
    /// Share the parent's stdout and stderr.
    Inherit,
    /// Discard both streams.
    Null,
}

impl Output {
    /// Stdio for a stream that is not spooled; `Capture` alone discards.
    fn stdio(self) -> Stdio {
        match self {
            Output::Capture => Stdio::null(),
            Output::Inherit => Stdio::inherit(),
            Output::Null => Stdio::null(),
        }
    }
}

/// A fully realized invocation, ready to spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSpec {
    program: PathBuf,
    args: Vec<OsString>,
    output: Output,
}

impl ProcessSpec {
    /// Create a spec for `program` with no arguments.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            output: Output::default(),
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Set the output wiring.
    pub fn with_output(mut self, output: Output) -> Self {
        self.output = output;
        self
    }

    /// Program to execute.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments, not including the program.
    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    /// Output wiring.
    pub fn output(&self) -> Output {
        self.output
    }

    /// Full argv, program first.
    pub fn argv(&self) -> Vec<OsString> {
        std::iter::once(self.program.as_os_str().to_os_string())
            .chain(self.args.iter().cloned())
            .collect()
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).stdin(Stdio::null());
        cmd
    }

    fn spawn(&self, mut cmd: Command) -> Result<Child> {
        info!("Spawning gpg: {}", self);
        cmd.spawn().map_err(|source| Error::SpawnFailed {
            program: self.program.display().to_string(),
            source,
        })
    }
}

impl fmt::Display for ProcessSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Run the process to completion and return its raw exit status.
pub fn run(spec: &ProcessSpec) -> Result<ExitStatus> {
    run_inner(spec, None).map(|(status, _)| status)
}

/// Run the process and fail with [`Error::ProcessFailed`] unless it exits 0.
pub fn run_checked(spec: &ProcessSpec) -> Result<()> {
    let (status, stderr) = run_inner(spec, None)?;
    check_status(spec, status, stderr)
}

/// Like [`run`], with `input` streamed into the child's stdin.
///
/// stdin is closed once `input` is exhausted. A child that exits without
/// reading everything is not an error by itself; its exit status decides.
pub fn run_with_input(spec: &ProcessSpec, mut input: impl Read) -> Result<ExitStatus> {
    run_inner(spec, Some(&mut input)).map(|(status, _)| status)
}

/// Like [`run_checked`], with `input` streamed into the child's stdin.
pub fn run_checked_with_input(spec: &ProcessSpec, mut input: impl Read) -> Result<()> {
    let (status, stderr) = run_inner(spec, Some(&mut input))?;
    check_status(spec, status, stderr)
}

fn run_inner(spec: &ProcessSpec, input: Option<&mut dyn Read>) -> Result<(ExitStatus, String)> {
    let mut cmd = spec.command();

    // Captured output goes to unnamed temp files rather than pipes, so the
    // child never blocks on a full pipe while we are still feeding stdin.
    let capture = match spec.output {
        Output::Capture => {
            let capture = Captured::new()?;
            cmd.stdout(capture.stdout.try_clone()?)
                .stderr(capture.stderr.try_clone()?);
            Some(capture)
        }
        other => {
            cmd.stdout(other.stdio()).stderr(other.stdio());
            None
        }
    };
    if input.is_some() {
        cmd.stdin(Stdio::piped());
    }

    let mut child = spec.spawn(cmd)?;
    if let Some(input) = input {
        if let Err(e) = feed_stdin(&mut child, input) {
            if let Err(kill) = child.kill() {
                warn!("Failed to kill gpg process: {}", kill);
            }
            let _ = child.wait();
            return Err(e.into());
        }
    }

    let status = child.wait()?;
    debug!("gpg exited with {}", status);

    let stderr = match capture {
        Some(capture) => capture.finish()?,
        None => String::new(),
    };
    Ok((status, stderr))
}

fn feed_stdin(child: &mut Child, input: &mut dyn Read) -> io::Result<()> {
    let Some(mut stdin) = child.stdin.take() else {
        return Ok(());
    };

    match io::copy(input, &mut stdin) {
        Ok(written) => {
            debug!("Wrote {} bytes to gpg stdin", written);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            debug!("gpg closed stdin before all input was written");
            Ok(())
        }
        Err(e) => Err(e),
    }
    // stdin drops here, so the child sees EOF.
}

/// stdout and stderr of a finished child, spooled to unnamed temp files.
struct Captured {
    stdout: File,
    stderr: File,
}

impl Captured {
    fn new() -> io::Result<Self> {
        Ok(Self {
            stdout: tempfile::tempfile()?,
            stderr: tempfile::tempfile()?,
        })
    }

    /// Log both streams line by line and return stderr.
    ///
    /// stdout is only read back when debug logging is on; it can be large.
    fn finish(mut self) -> io::Result<String> {
        if tracing::enabled!(Level::DEBUG) {
            self.stdout.seek(SeekFrom::Start(0))?;
            let mut reader = BufReader::new(&mut self.stdout);
            let mut line = Vec::new();
            while reader.read_until(b'\n', &mut line)? > 0 {
                debug!("gpg stdout: {}", String::from_utf8_lossy(&line).trim_end());
                line.clear();
            }
        }

        self.stderr.seek(SeekFrom::Start(0))?;
        let mut bytes = Vec::new();
        self.stderr.read_to_end(&mut bytes)?;
        let stderr = String::from_utf8_lossy(&bytes).into_owned();
        for line in stderr.lines() {
            debug!("gpg stderr: {}", line);
        }
        Ok(stderr)
    }
}

fn check_status(spec: &ProcessSpec, status: ExitStatus, stderr: String) -> Result<()> {
    if status.success() {
        return Ok(());
    }
    Err(Error::ProcessFailed {
        spec: spec.clone(),
        code: status.code(),
        stderr,
    })
}

/// Spawn the process with only stdout piped and return a pull-based reader.
///
/// stderr follows the spec's [`Output`], except that [`Output::Capture`] is
/// treated as [`Output::Null`]: nothing would drain a second pipe while the
/// caller reads stdout.
pub fn stream_stdout(spec: &ProcessSpec) -> Result<StdoutStream> {
    let mut cmd = spec.command();
    cmd.stdout(Stdio::piped()).stderr(spec.output.stdio());

    let mut child = spec.spawn(cmd)?;
    let stdout = child.stdout.take().map(BufReader::new);

    Ok(StdoutStream {
        spec: spec.clone(),
        child,
        stdout,
        status: None,
    })
}

/// Lazy, non-restartable stdout of a running process.
///
/// Reads block until the child writes or exits; EOF means the child closed its
/// output. Dropping the stream before [`StdoutStream::finish`] closes the pipe,
/// kills the child and reaps it.
pub struct StdoutStream {
    spec: ProcessSpec,
    child: Child,
    stdout: Option<BufReader<ChildStdout>>,
    status: Option<ExitStatus>,
}

impl StdoutStream {
    /// The invocation this stream belongs to.
    pub fn spec(&self) -> &ProcessSpec {
        &self.spec
    }

    /// Drain any unread output, wait for the child and check its exit status.
    pub fn finish(mut self) -> Result<()> {
        if let Some(mut stdout) = self.stdout.take() {
            let skipped = io::copy(&mut stdout, &mut io::sink())?;
            if skipped > 0 {
                debug!("Discarded {} unread bytes of gpg output", skipped);
            }
        }

        let status = self.child.wait()?;
        self.status = Some(status);
        debug!("gpg exited with {}", status);
        check_status(&self.spec, status, String::new())
    }
}

impl Read for StdoutStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.stdout.as_mut() {
            Some(stdout) => stdout.read(buf),
            None => Ok(0),
        }
    }
}

impl BufRead for StdoutStream {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match self.stdout.as_mut() {
            Some(stdout) => stdout.fill_buf(),
            None => Ok(&[]),
        }
    }

    fn consume(&mut self, amt: usize) {
        if let Some(stdout) = self.stdout.as_mut() {
            stdout.consume(amt);
        }
    }
}

impl Drop for StdoutStream {
    fn drop(&mut self) {
        if self.status.is_some() {
            return;
        }

        // Close our end first so a child blocked on write sees EPIPE.
        self.stdout.take();
        if let Err(e) = self.child.kill() {
            warn!("Failed to kill gpg process: {}", e);
        }
        match self.child.wait() {
            Ok(status) => debug!("Abandoned gpg process exited with {}", status),
            Err(e) => warn!("Failed to reap gpg process: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_renders_argv() {
        let spec = ProcessSpec::new("gpg").args(["--batch", "--with-colons", "key.asc"]);
        assert_eq!(spec.to_string(), "gpg --batch --with-colons key.asc");
    }

    #[test]
    fn test_argv_starts_with_program() {
        let spec = ProcessSpec::new("/usr/bin/gpg").arg("--import").arg("k");
        let argv: Vec<String> = spec
            .argv()
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(argv, ["/usr/bin/gpg", "--import", "k"]);
    }

    #[test]
    fn test_spawn_failure_is_distinct() {
        let spec = ProcessSpec::new("/nonexistent/gpgstream-no-such-binary");
        match run_checked(&spec) {
            Err(Error::SpawnFailed { program, .. }) => {
                assert!(program.contains("gpgstream-no-such-binary"));
            }
            other => panic!("expected SpawnFailed, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_run_checked_success_is_silent() {
        let spec = ProcessSpec::new("sh").args(["-c", "exit 0"]);
        run_checked(&spec).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_run_checked_carries_exit_code() {
        for code in [1, 2, 42] {
            let script = format!("echo nope >&2; exit {}", code);
            let spec = ProcessSpec::new("sh").args(["-c", script.as_str()]);
            let err = run_checked(&spec).unwrap_err();

            assert_eq!(err.exit_code(), Some(code));
            match err {
                Error::ProcessFailed { spec: failed, stderr, .. } => {
                    assert_eq!(failed, spec);
                    assert_eq!(stderr.trim(), "nope");
                }
                other => panic!("expected ProcessFailed, got {:?}", other),
            }
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_run_returns_raw_status() {
        let spec = ProcessSpec::new("sh")
            .args(["-c", "exit 3"])
            .with_output(Output::Null);
        let status = run(&spec).unwrap();
        assert_eq!(status.code(), Some(3));
    }

    #[cfg(unix)]
    #[test]
    fn test_input_reaches_child_stdin() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("received");
        let spec = ProcessSpec::new("sh")
            .args(["-c", "cat > \"$1\"", "sh"])
            .arg(&out);

        let payload = b"binary\0payload\nwith lines\n".to_vec();
        run_checked_with_input(&spec, payload.as_slice()).unwrap();
        assert_eq!(std::fs::read(&out).unwrap(), payload);
    }

    #[cfg(unix)]
    #[test]
    fn test_large_input_echoed_under_capture() {
        // Larger than a pipe buffer in both directions at once.
        let payload = vec![b'k'; 4 * 1024 * 1024];
        let spec = ProcessSpec::new("cat");

        let status = run_with_input(&spec, payload.as_slice()).unwrap();
        assert!(status.success());
    }

    #[cfg(unix)]
    #[test]
    fn test_child_ignoring_input_is_judged_by_exit_code() {
        let payload = vec![0u8; 1024 * 1024];

        let ok = ProcessSpec::new("sh").args(["-c", "exit 0"]);
        run_checked_with_input(&ok, payload.as_slice()).unwrap();

        let failing = ProcessSpec::new("sh").args(["-c", "exit 4"]);
        let err = run_checked_with_input(&failing, payload.as_slice()).unwrap_err();
        assert_eq!(err.exit_code(), Some(4));
    }

    #[cfg(unix)]
    #[test]
    fn test_input_read_error_propagates() {
        struct Failing;
        impl Read for Failing {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "source went away"))
            }
        }

        let spec = ProcessSpec::new("cat").with_output(Output::Null);
        let err = run_with_input(&spec, Failing).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_large_stdout_under_capture_completes() {
        let spec = ProcessSpec::new("sh").args(["-c", "head -c 8000000 /dev/zero; echo done >&2"]);
        run_checked(&spec).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_stream_stdout_reads_to_eof() {
        let spec = ProcessSpec::new("sh").args(["-c", "printf 'one\\ntwo\\n'"]);
        let mut stream = stream_stdout(&spec).unwrap();

        let mut text = String::new();
        stream.read_to_string(&mut text).unwrap();
        assert_eq!(text, "one\ntwo\n");
        stream.finish().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_stream_finish_reports_failure() {
        let spec = ProcessSpec::new("sh").args(["-c", "echo partial; exit 5"]);
        let stream = stream_stdout(&spec).unwrap();

        let err = stream.finish().unwrap_err();
        assert_eq!(err.exit_code(), Some(5));
    }

    #[cfg(unix)]
    #[test]
    fn test_abandoned_stream_releases_endless_child() {
        let spec = ProcessSpec::new("yes");
        let mut stream = stream_stdout(&spec).unwrap();

        let mut line = String::new();
        stream.read_line(&mut line).unwrap();
        assert_eq!(line, "y\n");

        // Must not hang: drop kills and reaps the child.
        drop(stream);
    }
}
