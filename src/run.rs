//! # Run a Command in the Local Collection
//!
//! Implements `run-local-collection`: copy the collection checkout in the
//! current directory into a temporary `ansible_collections` tree, run a
//! command inside the copy and hand back its exit code.
//!
//! ## Execution Flow
//!
//! 1. Resolve the VCS mode (`auto` runs detection) and pick a copier.
//! 2. Load the collection details from `galaxy.yml` or `MANIFEST.json`.
//! 3. Acquire the temporary [`CollectionTree`].
//! 4. Template the command line if requested.
//! 5. Point the collection search path variables at the tree.
//! 6. Run the command in the collection copy and wait for it.
//! 7. Remove the tree and return the command's exit code.
//!
//! Known orchestration failures are logged and reported as
//! [`exit_codes::ORCHESTRATION_FAILURE`]; a command that cannot be started is
//! an error for the caller to report.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::process::{Command, ExitStatus};

use log::{debug, error, info};

use crate::collection::load_collection_details;
use crate::copier::{copier_for, CollectionTree};
use crate::error::{Error, Result};
use crate::exit_codes;
use crate::template::{template_argv, TemplateContext};
use crate::vcs::VcsMode;

/// Collection search path variables, canonical name first.
///
/// When both are set the canonical `ANSIBLE_COLLECTIONS_PATH` wins.
pub const COLLECTIONS_PATH_VARS: [&str; 2] =
    ["ANSIBLE_COLLECTIONS_PATH", "ANSIBLE_COLLECTIONS_PATHS"];

/// Options for a single `run-local-collection` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// The command and its arguments.
    pub argv: Vec<String>,
    pub vcs: VcsMode,
    /// Substitute `{placeholders}` in `argv`.
    pub template: bool,
}

/// Run the command in a temporary copy of the collection checkout at `cwd`.
///
/// Returns the command's exit code, or
/// [`exit_codes::ORCHESTRATION_FAILURE`] for metadata, templating, VCS and
/// copier failures. Other errors, such as a command that cannot be started,
/// are returned.
pub fn run_local_collection(options: &RunOptions, cwd: &Path) -> Result<i32> {
    match run_in_collection_tree(options, cwd) {
        Ok(code) => Ok(code),
        Err(e) if e.is_orchestration_failure() => {
            error!("{}", e);
            Ok(i32::from(exit_codes::ORCHESTRATION_FAILURE))
        }
        Err(e) => Err(e),
    }
}

fn run_in_collection_tree(options: &RunOptions, cwd: &Path) -> Result<i32> {
    debug!("Resolving VCS mode {} for {}", options.vcs, cwd.display());
    let vcs = options.vcs.resolve(cwd)?;
    debug!("Using VCS {:?}", vcs);
    let copier = copier_for(vcs);

    let details = load_collection_details(cwd)?;
    info!(
        "Found collection {} in {}",
        details.collection_name(),
        cwd.display()
    );

    let tree = CollectionTree::acquire(cwd, &details.namespace, &details.name, copier.as_ref())?;

    let argv = if options.template {
        let context = TemplateContext::new(
            cwd.to_string_lossy(),
            tree.root_dir().to_string_lossy(),
            tree.collection_dir().to_string_lossy(),
            &details,
        );
        template_argv(&options.argv, &context)?
    } else {
        options.argv.clone()
    };

    let env = prepare_environment(tree.root_dir(), std::env::vars_os());
    let status = execute(&argv, tree.collection_dir(), &env)?;
    let code = exit_code(status);
    info!("Command exited with code {}", code);

    tree.close()?;
    Ok(code)
}

/// Build the child environment from `base`.
///
/// Both collection search path variables are set to `root_dir`, followed by
/// the previously configured search path if there was one.
pub fn prepare_environment<I>(root_dir: &Path, base: I) -> BTreeMap<OsString, OsString>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    let mut env: BTreeMap<OsString, OsString> = base.into_iter().collect();

    let mut existing = None;
    for name in COLLECTIONS_PATH_VARS {
        if let Some(value) = env.remove(OsStr::new(name)) {
            if existing.is_none() {
                existing = Some(value);
            }
        }
    }

    let mut search_path = OsString::from(root_dir.as_os_str());
    if let Some(existing) = existing {
        search_path.push(":");
        search_path.push(existing);
    }
    for name in COLLECTIONS_PATH_VARS {
        env.insert(OsString::from(name), search_path.clone());
    }
    env
}

fn execute(argv: &[String], dir: &Path, env: &BTreeMap<OsString, OsString>) -> Result<ExitStatus> {
    let Some((program, args)) = argv.split_first() else {
        return Err(Error::Spawn {
            program: String::new(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "no command given"),
        });
    };

    info!("Running {:?} in {}", argv, dir.display());
    let mut command = Command::new(program);
    command.args(args).current_dir(dir).env_clear().envs(env);

    // Ignored before spawning so an interrupt cannot hit this process between
    // spawning and waiting; the child gets the previous dispositions back.
    let guard = signals::IgnoreTerminalSignals::install();
    guard.restore_in_child(&mut command);
    let mut child = command.spawn().map_err(|source| Error::Spawn {
        program: program.clone(),
        source,
    })?;
    let status = child.wait()?;
    drop(guard);
    Ok(status)
}

/// Exit code of a finished child.
///
/// A child killed by a signal is reported as `128 + signal`, like a shell does.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    i32::from(exit_codes::UNHANDLED)
}

#[cfg(unix)]
mod signals {
    use std::os::unix::process::CommandExt;
    use std::process::Command;

    use log::debug;
    use nix::sys::signal::{signal, SigHandler, Signal};

    const TERMINAL_SIGNALS: [Signal; 2] = [Signal::SIGINT, Signal::SIGQUIT];

    /// Ignores `SIGINT` and `SIGQUIT` until dropped.
    ///
    /// Terminal interrupts reach the whole foreground process group, so the
    /// child receives them directly while this process waits for it and then
    /// removes the collection tree.
    pub struct IgnoreTerminalSignals {
        previous: Vec<(Signal, SigHandler)>,
    }

    impl IgnoreTerminalSignals {
        pub fn install() -> Self {
            let mut previous = Vec::with_capacity(TERMINAL_SIGNALS.len());
            for sig in TERMINAL_SIGNALS {
                // SAFETY: SigIgn installs no handler code.
                match unsafe { signal(sig, SigHandler::SigIgn) } {
                    Ok(handler) => previous.push((sig, handler)),
                    Err(e) => debug!("Could not ignore {:?}: {}", sig, e),
                }
            }
            Self { previous }
        }

        /// Reinstate the replaced dispositions in the child of `command`.
        pub fn restore_in_child(&self, command: &mut Command) {
            let previous = self.previous.clone();
            // SAFETY: the hook only calls sigaction, which is async-signal-safe,
            // and does not allocate.
            unsafe {
                command.pre_exec(move || {
                    for &(sig, handler) in &previous {
                        signal(sig, handler).map_err(std::io::Error::from)?;
                    }
                    Ok(())
                });
            }
        }
    }

    impl Drop for IgnoreTerminalSignals {
        fn drop(&mut self) {
            for (sig, handler) in self.previous.drain(..) {
                // SAFETY: restores the disposition that was active before.
                if let Err(e) = unsafe { signal(sig, handler) } {
                    debug!("Could not restore {:?}: {}", sig, e);
                }
            }
        }
    }
}

#[cfg(not(unix))]
mod signals {
    use std::process::Command;

    pub struct IgnoreTerminalSignals;

    impl IgnoreTerminalSignals {
        pub fn install() -> Self {
            Self
        }

        pub fn restore_in_child(&self, _command: &mut Command) {}
    }
}
