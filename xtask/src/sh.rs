// sh! process execution

use std::ffi::OsStr;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};

use derive_builder::Builder;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Trait for types that can configure a `Command` before execution.
pub trait ShConfig {
    fn apply(&self, cmd: &mut Command);
}

impl<T: ShConfig + ?Sized> ShConfig for &T {
    fn apply(&self, cmd: &mut Command) {
        (*self).apply(cmd)
    }
}

#[derive(Clone, Debug)]
pub enum StreamMode {
    Inherit,
    Pipe,
    Null,
}

impl StreamMode {
    fn stdio(&self) -> Stdio {
        match self {
            StreamMode::Inherit => Stdio::inherit(),
            StreamMode::Pipe => Stdio::piped(),
            StreamMode::Null => Stdio::null(),
        }
    }
}

#[derive(Clone, Debug, Builder)]
#[builder(default)]
pub struct ShOptions {
    pub stdout: StreamMode,
    pub stderr: StreamMode,
    pub cwd: Option<PathBuf>,
    /// Extra environment variables for the child.
    pub env: Vec<(String, String)>,
}

impl Default for ShOptions {
    fn default() -> Self {
        Self {
            stdout: StreamMode::Inherit,
            stderr: StreamMode::Inherit,
            cwd: None,
            env: Vec::new(),
        }
    }
}

impl ShConfig for ShOptions {
    fn apply(&self, cmd: &mut Command) {
        cmd.stdout(self.stdout.stdio());
        cmd.stderr(self.stderr.stdio());

        if let Some(ref dir) = self.cwd {
            cmd.current_dir(dir);
        }
        for (key, value) in &self.env {
            cmd.env(key, value);
        }
    }
}

pub struct ShOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

#[macro_export]
macro_rules! sh {
    // Program and arguments with explicit options
    (options($opts:expr), $program:expr, $args:expr $(,)?) => {{
        $crate::sh::sh($program, $args, $opts)
    }};
}

/// Run `program` with `args` directly (no shell), failing on non-zero exit.
pub fn sh<P, I, A, O>(program: P, args: I, opts: O) -> Result<ShOutput>
where
    P: AsRef<OsStr>,
    I: IntoIterator<Item = A>,
    A: AsRef<OsStr>,
    O: ShConfig,
{
    let mut command = Command::new(program);
    command.args(args);
    opts.apply(&mut command);
    log::debug!("[sh] {:?}", command);

    let output = command.output()?;

    if !output.status.success() {
        return Err(format!(
            "Command failed: {:?}\nExit code: {:?}\n",
            command,
            output.status.code().unwrap_or(-1),
        )
        .into());
    }

    Ok(ShOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captures_stdout() {
        let opts = ShOptionsBuilder::default()
            .stdout(StreamMode::Pipe)
            .build()
            .unwrap();
        let out = crate::sh!(options(opts), "echo", ["hello"]).unwrap();
        assert!(out.status.success());
        assert_eq!(out.stdout.trim(), "hello");
    }

    #[test]
    fn test_nonzero_exit_is_error() {
        let opts = ShOptions {
            stdout: StreamMode::Null,
            stderr: StreamMode::Null,
            ..Default::default()
        };
        assert!(crate::sh!(options(opts), "false", Vec::<String>::new()).is_err());
    }

    #[test]
    fn test_env_is_passed() {
        let opts = ShOptions {
            stdout: StreamMode::Pipe,
            env: vec![("PARBENCH_PROBE".into(), "42".into())],
            ..Default::default()
        };
        let out = crate::sh!(options(opts), "sh", ["-c", "echo $PARBENCH_PROBE"]).unwrap();
        assert_eq!(out.stdout.trim(), "42");
    }
}
