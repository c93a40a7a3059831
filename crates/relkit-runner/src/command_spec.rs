use std::collections::{BTreeMap, HashMap};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;

// ============================================================================
// CommandSpec - what to launch
// ============================================================================

/// Specification for a command to execute.
///
/// Arguments are kept as discrete `OsString` elements. With `shell` set they
/// are joined by spaces and handed to the platform shell (`sh -c` or
/// `cmd /C`), which lets build scripts use pipes, `&&` and redirections.
///
/// # Example
///
/// ```rust
/// use relkit_runner::CommandSpec;
/// use std::ffi::OsString;
///
/// let cmd = CommandSpec::new("cmake")
///     .arg("--build")
///     .arg("build")
///     .cwd("/src/app");
///
/// assert_eq!(cmd.program, OsString::from("cmake"));
/// assert_eq!(cmd.args.len(), 2);
/// assert_eq!(cmd.display(), "cmake --build build (at /src/app)");
/// ```
#[derive(Debug, Clone, Default)]
pub struct CommandSpec {
    /// The program to execute
    pub program: OsString,
    /// Arguments as discrete elements
    pub args: Vec<OsString>,
    /// Optional working directory
    pub cwd: Option<PathBuf>,
    /// Environment overrides applied on top of the runner's environment
    pub env: Option<HashMap<OsString, OsString>>,
    /// Run the joined command line through the platform shell
    pub shell: bool,
    /// Prefix with `stdbuf -oL` so piped tools flush per line (Linux only)
    pub line_buffered: bool,
}

impl CommandSpec {
    /// Create a new `CommandSpec` with the given program.
    #[must_use]
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    /// Build a spec from a full argv. Returns `None` for an empty argv.
    #[must_use]
    pub fn from_argv<I, S>(argv: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let mut argv = argv.into_iter().map(Into::into);
        let program = argv.next()?;
        Some(Self::new(program).args(argv))
    }

    /// Add a single argument to the command.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments to the command.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the working directory for the command.
    #[must_use]
    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Set an environment variable for the command.
    #[must_use]
    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.env
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Set multiple environment variables for the command.
    #[must_use]
    pub fn envs<I, K, V>(mut self, envs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        let env_map = self.env.get_or_insert_with(HashMap::new);
        for (key, value) in envs {
            env_map.insert(key.into(), value.into());
        }
        self
    }

    #[must_use]
    pub fn shell(mut self, shell: bool) -> Self {
        self.shell = shell;
        self
    }

    #[must_use]
    pub fn line_buffered(mut self, line_buffered: bool) -> Self {
        self.line_buffered = line_buffered;
        self
    }

    /// Program name as a lossy string, for messages.
    #[must_use]
    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Human readable command line: argv joined by spaces, plus
    /// ` (at {cwd})` when a working directory is set.
    #[must_use]
    pub fn display(&self) -> String {
        let mut line = std::iter::once(&self.program)
            .chain(&self.args)
            .map(|part| part.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ");
        if let Some(cwd) = &self.cwd {
            line.push_str(&format!(" (at {})", cwd.display()));
        }
        line
    }

    /// Full argv that will be launched, including the `stdbuf` prefix and
    /// shell wrapping.
    #[must_use]
    pub fn launch_argv(&self) -> Vec<OsString> {
        let mut argv: Vec<OsString> = Vec::with_capacity(self.args.len() + 3);
        if self.line_buffered && cfg!(target_os = "linux") {
            argv.push("stdbuf".into());
            argv.push("-oL".into());
        }
        argv.push(self.program.clone());
        argv.extend(self.args.iter().cloned());

        if !self.shell {
            return argv;
        }

        let script = argv
            .iter()
            .map(|part| part.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ");
        if cfg!(windows) {
            vec!["cmd".into(), "/C".into(), script.into()]
        } else {
            vec!["sh".into(), "-c".into(), script.into()]
        }
    }

    /// Convert this `CommandSpec` into a `std::process::Command` that inherits
    /// the current process environment.
    #[must_use]
    pub fn to_command(&self) -> Command {
        let argv = self.launch_argv();
        let mut cmd = Command::new(&argv[0]);
        cmd.args(&argv[1..]);

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        if let Some(ref env) = self.env {
            cmd.envs(env);
        }

        cmd
    }

    /// Like [`to_command`](Self::to_command), but the child environment is
    /// exactly `base` plus this spec's own overrides.
    #[must_use]
    pub fn to_command_with_env(&self, base: &BTreeMap<OsString, OsString>) -> Command {
        let mut cmd = self.to_command();
        cmd.env_clear();
        cmd.envs(base);
        if let Some(ref env) = self.env {
            cmd.envs(env);
        }
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_spec_new() {
        let cmd = CommandSpec::new("git");
        assert_eq!(cmd.program, OsString::from("git"));
        assert!(cmd.args.is_empty());
        assert!(cmd.cwd.is_none());
        assert!(cmd.env.is_none());
        assert!(!cmd.shell);
        assert!(!cmd.line_buffered);
    }

    #[test]
    fn test_command_spec_from_argv() {
        let cmd = CommandSpec::from_argv(["echo", "hello", "world"]).unwrap();
        assert_eq!(cmd.program, OsString::from("echo"));
        assert_eq!(cmd.args, vec![OsString::from("hello"), OsString::from("world")]);
        assert!(CommandSpec::from_argv(Vec::<String>::new()).is_none());
    }

    #[test]
    fn test_command_spec_envs() {
        let cmd = CommandSpec::new("make")
            .env("CC", "clang")
            .envs([("JOBS", "8"), ("CC", "gcc")]);
        let env = cmd.env.as_ref().unwrap();
        assert_eq!(env.len(), 2);
        assert_eq!(env.get(&OsString::from("CC")), Some(&OsString::from("gcc")));
    }

    #[test]
    fn test_display_without_cwd() {
        let cmd = CommandSpec::new("echo").arg("hello");
        assert_eq!(cmd.display(), "echo hello");
    }

    #[test]
    fn test_display_with_cwd() {
        let cmd = CommandSpec::new("ls").arg("-la").cwd("/tmp");
        assert_eq!(cmd.display(), "ls -la (at /tmp)");
    }

    #[test]
    fn test_launch_argv_plain() {
        let cmd = CommandSpec::new("echo").arg("a b");
        assert_eq!(
            cmd.launch_argv(),
            vec![OsString::from("echo"), OsString::from("a b")]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_launch_argv_shell_joins_arguments() {
        let cmd = CommandSpec::new("echo").args(["one", "&&", "echo", "two"]).shell(true);
        assert_eq!(
            cmd.launch_argv(),
            vec![
                OsString::from("sh"),
                OsString::from("-c"),
                OsString::from("echo one && echo two"),
            ]
        );
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_launch_argv_line_buffered_prefix() {
        let cmd = CommandSpec::new("ninja").line_buffered(true);
        assert_eq!(
            cmd.launch_argv(),
            vec![
                OsString::from("stdbuf"),
                OsString::from("-oL"),
                OsString::from("ninja"),
            ]
        );
    }

    #[test]
    fn test_to_command_program_and_dir() {
        let cmd = CommandSpec::new("echo").arg("hello").cwd("/workspace");
        let std_cmd = cmd.to_command();
        assert_eq!(std_cmd.get_program(), "echo");
        assert_eq!(
            std_cmd.get_current_dir(),
            Some(std::path::Path::new("/workspace"))
        );
    }

    #[test]
    fn test_to_command_with_env_spec_overrides_win() {
        let mut base = BTreeMap::new();
        base.insert(OsString::from("MODE"), OsString::from("base"));
        base.insert(OsString::from("KEEP"), OsString::from("1"));

        let cmd = CommandSpec::new("env").env("MODE", "spec");
        let std_cmd = cmd.to_command_with_env(&base);
        let envs: BTreeMap<_, _> = std_cmd
            .get_envs()
            .map(|(k, v)| (k.to_os_string(), v.map(|v| v.to_os_string())))
            .collect();

        assert_eq!(envs.get(&OsString::from("MODE")), Some(&Some(OsString::from("spec"))));
        assert_eq!(envs.get(&OsString::from("KEEP")), Some(&Some(OsString::from("1"))));
    }
}
