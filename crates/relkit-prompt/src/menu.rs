use std::io::{self, Write};
use std::path::Path;
use std::process::Stdio;

use relkit_console::{BoxStyle, BoxTheme, HeaderOptions, capitalize};
use relkit_runner::CommandSpec;
use relkit_utils::{RelkitError, Session};
use tracing::debug;

use crate::keys::{Key, KeySource, TerminalKeys};

/// Text and numbering of a menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuOptions {
    pub header: String,
    pub prompt: String,
    /// Number shown next to the first option
    pub starts_at: usize,
}

impl Default for MenuOptions {
    fn default() -> Self {
        Self {
            header: "Choose one".to_string(),
            prompt: "Option:".to_string(),
            starts_at: 1,
        }
    }
}

/// Let the operator pick one option.
///
/// Returns `None` for an empty list, a cancelled prompt or a number out of
/// range. Uses `fzf` when it is on the session `PATH`.
pub fn menu(
    session: &mut Session,
    options: &[String],
    menu: &MenuOptions,
) -> Result<Option<String>, RelkitError> {
    if options.is_empty() {
        return Ok(None);
    }

    if let Some(fzf) = session.which_command("fzf") {
        debug!(fzf = %fzf.display(), "using fzf menu");
        return fzf_select(session, &fzf, options);
    }

    numbered_menu(session, options, menu, &mut TerminalKeys)
}

/// Pipe `options` (one per line) through `fzf` and return its trimmed
/// selection, or `None` when fzf exits unsuccessfully.
pub fn fzf_select(
    session: &Session,
    fzf: &Path,
    options: &[String],
) -> Result<Option<String>, RelkitError> {
    let mut command =
        CommandSpec::new(fzf.as_os_str()).to_command_with_env(&session.runner().environment());
    command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit());

    let mut child = command.spawn()?;
    if let Some(mut stdin) = child.stdin.take() {
        match stdin.write_all(options.join("\n").as_bytes()) {
            Ok(()) => {}
            // fzf may exit before reading everything
            Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {}
            Err(err) => return Err(err.into()),
        }
    }

    let output = child.wait_with_output()?;
    Ok(output
        .status
        .success()
        .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string()))
}

/// Draw the numbered tree menu and read the choice from `keys`.
///
/// At most as many digits as the option count has are read. `q` or a cancel
/// key abandons the prompt, Enter ends the input early, other keys are
/// ignored.
pub fn numbered_menu(
    session: &mut Session,
    options: &[String],
    menu: &MenuOptions,
    keys: &mut dyn KeySource,
) -> Result<Option<String>, RelkitError> {
    if options.is_empty() {
        return Ok(None);
    }

    let theme = BoxTheme::get(BoxStyle::Rounded);
    let console = session.console_mut();

    let header = HeaderOptions {
        pre: String::new(),
        post: String::new(),
        is_tree: true,
        theme,
        ..HeaderOptions::default()
    };
    let width = menu.header.chars().count() + 8;
    console.with_width(width, |console| console.print_header(&capitalize(&menu.header), &header))?;

    for (number, option) in (menu.starts_at..).zip(options) {
        console.println(&format!(
            "{}{} {number} {} {option}",
            theme.junction, theme.horizontal, theme.vertical
        ))?;
    }
    console.println(&format!("{} ", theme.vertical))?;

    let prompt = capitalize(menu.prompt.trim_end_matches(':'));
    console.print(&format!("{}{} {prompt}: ", theme.terminator, theme.horizontal))?;

    let max_digits = options.len().to_string().len();
    let mut choice = String::new();
    while choice.len() < max_digits {
        match keys.next_key()? {
            Key::Char('q') | Key::Cancel => {
                choice.clear();
                break;
            }
            Key::Enter => break,
            Key::Char(c) if c.is_ascii_digit() => {
                choice.push(c);
                console.print(&c.to_string())?;
            }
            Key::Char(_) => {}
        }
    }
    console.println("")?;

    let selected = choice
        .parse::<usize>()
        .ok()
        .and_then(|number| number.checked_sub(menu.starts_at))
        .and_then(|index| options.get(index))
        .cloned();
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::ScriptedKeys;
    use relkit_config::Settings;
    use relkit_console::test_support::SharedBuffer;

    fn session() -> (Session, SharedBuffer) {
        let out = SharedBuffer::new();
        (Session::with_writer(Settings::default(), out.clone()).unwrap(), out)
    }

    fn options(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    fn pick(names: &[&str], typed: &str, menu: &MenuOptions) -> Option<String> {
        let (mut session, _out) = session();
        numbered_menu(
            &mut session,
            &options(names),
            menu,
            &mut ScriptedKeys::from_text(typed),
        )
        .unwrap()
    }

    #[test]
    fn test_empty_options_return_none() {
        let (mut session, out) = session();
        assert_eq!(menu(&mut session, &[], &MenuOptions::default()).unwrap(), None);
        assert_eq!(out.contents(), "");
    }

    #[test]
    fn test_single_digit_selects_without_enter() {
        let menu = MenuOptions::default();
        assert_eq!(pick(&["alpha", "beta", "gamma"], "2", &menu), Some("beta".to_string()));
    }

    #[test]
    fn test_two_digit_menu_with_enter() {
        let names: Vec<String> = (1..=12).map(|i| format!("opt{i}")).collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        let menu = MenuOptions::default();
        assert_eq!(pick(&names, "1\n", &menu), Some("opt1".to_string()));
        assert_eq!(pick(&names, "12", &menu), Some("opt12".to_string()));
    }

    #[test]
    fn test_quit_and_cancel() {
        let menu = MenuOptions::default();
        assert_eq!(pick(&["a", "b"], "q", &menu), None);
        assert_eq!(pick(&["a", "b"], "", &menu), None);
        assert_eq!(pick(&["a", "b"], "\n", &menu), None);
    }

    #[test]
    fn test_non_digits_are_ignored() {
        let menu = MenuOptions::default();
        assert_eq!(pick(&["a", "b", "c"], "x3", &menu), Some("c".to_string()));
    }

    #[test]
    fn test_out_of_range_is_none() {
        let menu = MenuOptions::default();
        assert_eq!(pick(&["a", "b", "c"], "9", &menu), None);
        assert_eq!(pick(&["a", "b", "c"], "0", &menu), None);
    }

    #[test]
    fn test_zero_based_numbering() {
        let menu = MenuOptions {
            starts_at: 0,
            ..MenuOptions::default()
        };
        assert_eq!(pick(&["a", "b"], "0", &menu), Some("a".to_string()));
    }

    #[test]
    fn test_rendered_menu_layout() {
        let (mut session, out) = session();
        let choice = numbered_menu(
            &mut session,
            &options(&["debug", "release"]),
            &MenuOptions::default(),
            &mut ScriptedKeys::from_text("2"),
        )
        .unwrap();
        assert_eq!(choice.as_deref(), Some("release"));

        let text = out.contents();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with('╭') && lines[0].ends_with('╮'));
        assert!(lines[1].contains("CHOOSE ONE"));
        assert!(lines[2].starts_with('├'));
        assert_eq!(lines[3], "├─ 1 │ debug");
        assert_eq!(lines[4], "├─ 2 │ release");
        assert_eq!(lines[5], "│ ");
        assert_eq!(lines[6], "╰─ Option: 2");
    }

    #[cfg(unix)]
    #[test]
    fn test_fzf_on_path_is_used() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let fzf = dir.path().join("fzf");
        std::fs::write(&fzf, "#!/bin/sh\nhead -n 2 | tail -n 1\n").unwrap();
        std::fs::set_permissions(&fzf, std::fs::Permissions::from_mode(0o755)).unwrap();

        let (mut session, _out) = session();
        session.env_path_add([dir.path()]).unwrap();

        let choice = menu(
            &mut session,
            &options(&["first", "second", "third"]),
            &MenuOptions::default(),
        )
        .unwrap();
        assert_eq!(choice.as_deref(), Some("second"));
    }

    #[cfg(unix)]
    #[test]
    fn test_fzf_failure_is_none() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let fzf = dir.path().join("fzf");
        std::fs::write(&fzf, "#!/bin/sh\ncat >/dev/null\nexit 130\n").unwrap();
        std::fs::set_permissions(&fzf, std::fs::Permissions::from_mode(0o755)).unwrap();

        let (session, _out) = session();
        let choice = fzf_select(&session, &fzf, &options(&["a"])).unwrap();
        assert_eq!(choice, None);
    }
}
