use crate::error::ShellError;
use crate::shell::Status;
use log::debug;
use nix::sys::stat::Mode;
use nix::unistd;
use once_cell::sync::Lazy;
use std::fs::{self, FileTimes, OpenOptions};
use std::io::Write;
use std::process;
use std::time::SystemTime;

/// Permissions for directories created by `mkdir`, before the umask.
pub const MKDIR_MODE: u32 = 0o755;

/// Handler signature: the full token sequence (including the command name)
/// and the sink for regular output.
pub type BuiltinFn = fn(&[String], &mut dyn Write) -> Result<Status, ShellError>;

/// A named builtin command.
pub struct Builtin {
    pub name: &'static str,
    pub run: BuiltinFn,
}

/// The builtin table, in the order `help` lists it.
pub static BUILTINS: Lazy<Vec<Builtin>> = Lazy::new(|| {
    vec![
        Builtin { name: "cd", run: builtin_cd },
        Builtin { name: "help", run: builtin_help },
        Builtin { name: "exit", run: builtin_exit },
        Builtin { name: "mkdir", run: builtin_mkdir },
        Builtin { name: "ls", run: builtin_ls },
        Builtin { name: "pwd", run: builtin_pwd },
        Builtin { name: "touch", run: builtin_touch },
        Builtin { name: "rmdir", run: builtin_rmdir },
    ]
});

/// Finds the builtin with exactly this name.
pub fn lookup(name: &str) -> Option<&'static Builtin> {
    BUILTINS.iter().find(|builtin| builtin.name == name)
}

fn required_arg<'a>(args: &'a [String], command: &'static str) -> Result<&'a str, ShellError> {
    args.get(1)
        .map(String::as_str)
        .ok_or(ShellError::MissingArgument { command })
}

fn builtin_cd(args: &[String], _out: &mut dyn Write) -> Result<Status, ShellError> {
    let path = required_arg(args, "cd")?;
    unistd::chdir(path).map_err(|e| ShellError::sys(format!("cd: {}", path), e))?;
    Ok(Status::Continue)
}

fn builtin_help(_args: &[String], out: &mut dyn Write) -> Result<Status, ShellError> {
    let mut text = String::from(
        "SmartShell\n\
         Type program names and arguments, and hit enter.\n\
         The following are built-in commands:\n",
    );
    for builtin in BUILTINS.iter() {
        text.push_str("  ");
        text.push_str(builtin.name);
        text.push('\n');
    }
    text.push_str("Use the man command for information on other programs.\n");
    out.write_all(text.as_bytes())
        .map_err(|e| ShellError::io("help", e))?;
    Ok(Status::Continue)
}

fn builtin_exit(_args: &[String], _out: &mut dyn Write) -> Result<Status, ShellError> {
    Ok(Status::Terminate)
}

fn builtin_mkdir(args: &[String], _out: &mut dyn Write) -> Result<Status, ShellError> {
    let path = required_arg(args, "mkdir")?;
    unistd::mkdir(path, Mode::from_bits_truncate(MKDIR_MODE))
        .map_err(|e| ShellError::sys(format!("mkdir: {}", path), e))?;
    Ok(Status::Continue)
}

fn builtin_ls(args: &[String], out: &mut dyn Write) -> Result<Status, ShellError> {
    if args.len() > 1 {
        return Err(ShellError::UnexpectedArguments { command: "ls" });
    }
    out.flush().map_err(|e| ShellError::io("ls", e))?;
    let status = process::Command::new("ls")
        .status()
        .map_err(|e| ShellError::io("ls", e))?;
    debug!("ls finished: {}", status);
    Ok(Status::Continue)
}

fn builtin_pwd(_args: &[String], out: &mut dyn Write) -> Result<Status, ShellError> {
    let cwd = unistd::getcwd().map_err(|e| ShellError::sys("pwd", e))?;
    writeln!(out, "{}", cwd.display()).map_err(|e| ShellError::io("pwd", e))?;
    Ok(Status::Continue)
}

fn builtin_touch(args: &[String], _out: &mut dyn Write) -> Result<Status, ShellError> {
    let path = required_arg(args, "touch")?;
    let context = || format!("touch: {}", path);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| ShellError::io(context(), e))?;
    let now = SystemTime::now();
    file.set_times(FileTimes::new().set_accessed(now).set_modified(now))
        .map_err(|e| ShellError::io(context(), e))?;
    Ok(Status::Continue)
}

fn builtin_rmdir(args: &[String], _out: &mut dyn Write) -> Result<Status, ShellError> {
    let path = required_arg(args, "rmdir")?;
    fs::remove_dir(path).map_err(|e| ShellError::io(format!("rmdir: {}", path), e))?;
    Ok(Status::Continue)
}
