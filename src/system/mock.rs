//! Mock system implementation for testing

use super::{CommandOutput, System, WalkEntry};
use std::collections::{HashMap, HashSet, VecDeque};
use std::env::VarError;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// In-memory implementation of System trait for testing
///
/// `MockSystem` provides an in-memory filesystem and environment, plus a
/// scripted process table. Every command run through it is recorded so tests
/// can assert which collaborators were invoked.
///
/// Command responses are matched against the full command line
/// (`program arg1 arg2 ...`); the longest registered prefix wins. Commands
/// without a response fail with `NotFound`, like a missing binary.
///
/// # Example
/// ```
/// use format_configs::system::{mock::MockSystem, CommandOutput, System};
/// use std::path::Path;
///
/// let system = MockSystem::new()
///     .with_env("HOME", "/home/user").unwrap()
///     .with_file("/repo/README.md", b"# hello\n").unwrap()
///     .with_command("git -C /repo rev-parse", CommandOutput::ok("true\n")).unwrap();
///
/// assert_eq!(system.env_var("HOME").unwrap(), "/home/user");
/// assert!(system.exists(Path::new("/repo/README.md")));
/// assert!(system.has_command("git"));
/// ```
#[derive(Clone)]
pub struct MockSystem {
    state: Arc<RwLock<MockSystemState>>,
}

struct MockSystemState {
    env_vars: HashMap<String, String>,
    current_exe: PathBuf,
    files: HashMap<PathBuf, Vec<u8>>,
    dirs: HashSet<PathBuf>,
    responses: Vec<(String, VecDeque<CommandOutput>)>,
    available: HashSet<String>,
    commands: Vec<String>,
}

impl MockSystem {
    /// Create a new `MockSystem` with default state
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(MockSystemState {
                env_vars: HashMap::new(),
                current_exe: PathBuf::from("/usr/local/bin/format-configs"),
                files: HashMap::new(),
                dirs: HashSet::from([PathBuf::from("/")]),
                responses: Vec::new(),
                available: HashSet::new(),
                commands: Vec::new(),
            })),
        }
    }

    /// Set an environment variable (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned
    #[inline]
    pub fn with_env(self, key: &str, value: &str) -> io::Result<Self> {
        let mut state = self
            .state
            .write()
            .map_err(|e| io::Error::other(e.to_string()))?;
        state.env_vars.insert(key.to_owned(), value.to_owned());
        drop(state);
        Ok(self)
    }

    /// Set the path reported by `current_exe` (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned
    #[inline]
    pub fn with_current_exe<P: AsRef<Path>>(self, path: P) -> io::Result<Self> {
        let mut state = self
            .state
            .write()
            .map_err(|e| io::Error::other(e.to_string()))?;
        state.current_exe = path.as_ref().to_path_buf();
        drop(state);
        Ok(self)
    }

    /// Add a file with contents (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned
    #[inline]
    pub fn with_file<P: AsRef<Path>>(self, path: P, contents: &[u8]) -> io::Result<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let mut state = self
            .state
            .write()
            .map_err(|e| io::Error::other(e.to_string()))?;

        if let Some(parent) = path_buf.parent() {
            Self::ensure_parent_dirs(&mut state.dirs, parent);
        }

        state.files.insert(path_buf, contents.to_vec());
        drop(state);
        Ok(self)
    }

    /// Add a directory (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned
    #[inline]
    pub fn with_dir<P: AsRef<Path>>(self, path: P) -> io::Result<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let mut state = self
            .state
            .write()
            .map_err(|e| io::Error::other(e.to_string()))?;
        Self::ensure_parent_dirs(&mut state.dirs, &path_buf);
        drop(state);
        Ok(self)
    }

    /// Script the output of every command line starting with `prefix`
    ///
    /// The program named by the prefix also becomes available to `has_command`.
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned
    #[inline]
    pub fn with_command(self, prefix: &str, output: CommandOutput) -> io::Result<Self> {
        let mut state = self
            .state
            .write()
            .map_err(|e| io::Error::other(e.to_string()))?;
        if let Some(program) = prefix.split_whitespace().next() {
            state.available.insert(program.to_owned());
        }
        state.responses.retain(|(existing, _)| existing != prefix);
        state
            .responses
            .push((prefix.to_owned(), VecDeque::from([output])));
        drop(state);
        Ok(self)
    }

    /// Script successive outputs for command lines starting with `prefix`
    ///
    /// Each matching run consumes one output; the last one repeats.
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned or `outputs` is empty
    #[inline]
    pub fn with_command_sequence(
        self,
        prefix: &str,
        outputs: Vec<CommandOutput>,
    ) -> io::Result<Self> {
        if outputs.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "command sequence needs at least one output",
            ));
        }
        let mut state = self
            .state
            .write()
            .map_err(|e| io::Error::other(e.to_string()))?;
        if let Some(program) = prefix.split_whitespace().next() {
            state.available.insert(program.to_owned());
        }
        state.responses.retain(|(existing, _)| existing != prefix);
        state
            .responses
            .push((prefix.to_owned(), VecDeque::from(outputs)));
        drop(state);
        Ok(self)
    }

    /// Mark a program as present on `PATH` without scripting any output
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned
    #[inline]
    pub fn with_available_command(self, program: &str) -> io::Result<Self> {
        let mut state = self
            .state
            .write()
            .map_err(|e| io::Error::other(e.to_string()))?;
        state.available.insert(program.to_owned());
        drop(state);
        Ok(self)
    }

    /// All command lines run so far, in order
    #[must_use]
    #[inline]
    pub fn commands(&self) -> Vec<String> {
        self.state
            .read()
            .map(|state| state.commands.clone())
            .unwrap_or_default()
    }

    /// Whether any recorded command line starts with `prefix`
    #[must_use]
    #[inline]
    pub fn ran(&self, prefix: &str) -> bool {
        self.commands().iter().any(|line| line.starts_with(prefix))
    }

    #[inline]
    fn ensure_parent_dirs(dirs: &mut HashSet<PathBuf>, path: &Path) {
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            dirs.insert(ancestor.to_path_buf());
        }
    }

    fn record(&self, program: &str, args: &[String]) -> io::Result<Option<CommandOutput>> {
        let mut line = program.to_owned();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }

        let mut state = self
            .state
            .write()
            .map_err(|e| io::Error::other(e.to_string()))?;
        state.commands.push(line.clone());

        let response = state
            .responses
            .iter_mut()
            .filter(|(prefix, _)| line.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .and_then(|(_, outputs)| {
                if outputs.len() > 1 {
                    outputs.pop_front()
                } else {
                    outputs.front().cloned()
                }
            });
        drop(state);
        Ok(response)
    }
}

impl Default for MockSystem {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl System for MockSystem {
    #[inline]
    fn env_var(&self, key: &str) -> Result<String, VarError> {
        let state = self.state.read().map_err(|_| VarError::NotPresent)?;
        state.env_vars.get(key).cloned().ok_or(VarError::NotPresent)
    }

    #[inline]
    fn current_exe(&self) -> io::Result<PathBuf> {
        let state = self
            .state
            .read()
            .map_err(|e| io::Error::other(e.to_string()))?;
        Ok(state.current_exe.clone())
    }

    #[inline]
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let state = self
            .state
            .read()
            .map_err(|e| io::Error::other(e.to_string()))?;
        let bytes = state.files.get(path).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("File not found: {}", path.display()),
            )
        })?;
        let result = bytes.clone();
        drop(state);
        String::from_utf8(result)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("Invalid UTF-8: {e}")))
    }

    #[inline]
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut state = self
            .state
            .write()
            .map_err(|e| io::Error::other(e.to_string()))?;

        if let Some(parent) = path.parent()
            && !state.dirs.contains(parent)
        {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Parent directory does not exist: {}", parent.display()),
            ));
        }

        state.files.insert(path.to_path_buf(), contents.to_vec());
        drop(state);
        Ok(())
    }

    #[inline]
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut state = self
            .state
            .write()
            .map_err(|e| io::Error::other(e.to_string()))?;
        Self::ensure_parent_dirs(&mut state.dirs, path);
        drop(state);
        Ok(())
    }

    #[inline]
    fn remove_file(&self, path: &Path) -> io::Result<()> {
        let mut state = self
            .state
            .write()
            .map_err(|e| io::Error::other(e.to_string()))?;

        if state.files.remove(path).is_none() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("File not found: {}", path.display()),
            ));
        }

        drop(state);
        Ok(())
    }

    #[inline]
    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64> {
        let contents = {
            let state = self
                .state
                .read()
                .map_err(|e| io::Error::other(e.to_string()))?;
            state
                .files
                .get(from)
                .ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::NotFound,
                        format!("Source file not found: {}", from.display()),
                    )
                })?
                .clone()
        };

        let size = contents.len() as u64;
        self.write(to, &contents)?;
        Ok(size)
    }

    #[inline]
    fn exists(&self, path: &Path) -> bool {
        self.state
            .read()
            .map(|state| state.files.contains_key(path) || state.dirs.contains(path))
            .unwrap_or(false)
    }

    #[inline]
    fn is_file(&self, path: &Path) -> bool {
        self.state
            .read()
            .map(|state| state.files.contains_key(path))
            .unwrap_or(false)
    }

    #[inline]
    fn is_dir(&self, path: &Path) -> bool {
        self.state
            .read()
            .map(|state| state.dirs.contains(path))
            .unwrap_or(false)
    }

    #[inline]
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        if !self.exists(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Path not found: {}", path.display()),
            ));
        }
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Ok(Path::new("/").join(path))
        }
    }

    #[inline]
    fn walk_dir(&self, path: &Path, skip_names: &[&str]) -> io::Result<Vec<WalkEntry>> {
        let state = self
            .state
            .read()
            .map_err(|e| io::Error::other(e.to_string()))?;

        if !state.dirs.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Directory not found: {}", path.display()),
            ));
        }

        let skipped = |candidate: &Path| {
            candidate
                .strip_prefix(path)
                .map(|rel| {
                    rel.components().any(|component| {
                        component
                            .as_os_str()
                            .to_str()
                            .is_some_and(|name| skip_names.contains(&name))
                    })
                })
                .unwrap_or(true)
        };

        let mut entries = Vec::new();

        for dir in &state.dirs {
            if dir != path && dir.starts_with(path) && !skipped(dir) {
                entries.push(WalkEntry {
                    path: dir.clone(),
                    is_file: false,
                    is_dir: true,
                });
            }
        }

        for file in state.files.keys() {
            let parent_skipped = file.parent().is_some_and(|parent| skipped(parent));
            if file.starts_with(path) && !parent_skipped {
                entries.push(WalkEntry {
                    path: file.clone(),
                    is_file: true,
                    is_dir: false,
                });
            }
        }

        drop(state);

        // Sort entries by path for deterministic output
        entries.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(entries)
    }

    #[inline]
    fn run_command(
        &self,
        program: &str,
        args: &[String],
        _cwd: &Path,
    ) -> io::Result<CommandOutput> {
        self.record(program, args)?.ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("Command not found: {program}"),
            )
        })
    }

    #[inline]
    fn run_interactive(&self, program: &str, args: &[String], _cwd: &Path) -> io::Result<bool> {
        self.record(program, args)?
            .map(|output| output.success)
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("Command not found: {program}"),
                )
            })
    }

    #[inline]
    fn has_command(&self, program: &str) -> bool {
        self.state
            .read()
            .map(|state| state.available.contains(program))
            .unwrap_or(false)
    }
}
