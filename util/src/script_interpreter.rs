//! # Script interpreter module
//!
//! This module provides an interpreter for timed command scripts. A script is
//! a sequence of entries of the form
//!
//! ```text
//! <exec_time_s>: <json command>;
//! ```
//!
//! where the command is deserialised into the caller's command type. Entries
//! must be ordered by execution time.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::collections::VecDeque;
use std::path::Path;
use std::fs;
use regex::RegexBuilder;
use serde::de::DeserializeOwned;
use thiserror::Error;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A command which is scripted to occur at a specific time.
struct Command<C> {
    /// The time the command is supposed to execute at
    exec_time_s: f64,

    /// The command to run
    cmd: C
}

/// A script interpreter.
///
/// After initialising with the path to the script to run use `.get_pending`
/// to acquire a list of commands that need executing.
pub struct ScriptInterpreter<C> {
    cmds: VecDeque<Command<C>>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0}")]
    ScriptNotFound(String),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error(
        "Script contains an invalid timestamp: {0}. \
        Should be a float (like 1.0)")]
    InvalidTimestamp(String),

    #[error("Script contains an invalid command at {0} s: {1}")]
    InvalidCommand(f64, serde_json::Error),

    #[error("Script command at {0} s is earlier than the one before it")]
    OutOfOrder(f64)
}

/// Commands which are due at a given time.
#[derive(Debug, PartialEq)]
pub enum Pending<C> {
    None,
    Some(Vec<C>),
    EndOfScript
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<C> ScriptInterpreter<C>
where
    C: DeserializeOwned
{
    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {
        let path = script_path.as_ref();
        
        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(path.display().to_string()));
        }

        let script = fs::read_to_string(path).map_err(ScriptError::ScriptLoadError)?;

        Self::from_script(&script)
    }

    /// Create a new interpreter from the contents of a script.
    pub fn from_script(script: &str) -> Result<Self, ScriptError> {
        let mut cmd_queue: VecDeque<Command<C>> = VecDeque::new();

        // Go through the script executing __the magic regex__.
        let re = RegexBuilder::new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .expect("script regex is valid");

        for cap in re.captures_iter(script) {
            let exec_time_s: f64 = cap[1]
                .parse()
                .map_err(|e| ScriptError::InvalidTimestamp(format!("{}", e)))?;

            if let Some(prev) = cmd_queue.back() {
                if exec_time_s < prev.exec_time_s {
                    return Err(ScriptError::OutOfOrder(exec_time_s))
                }
            }

            let cmd = serde_json::from_str(cap[3].trim())
                .map_err(|e| ScriptError::InvalidCommand(exec_time_s, e))?;

            cmd_queue.push_back(Command { exec_time_s, cmd });
        }

        if cmd_queue.is_empty() {
            return Err(ScriptError::ScriptEmpty)
        }

        Ok(ScriptInterpreter { cmds: cmd_queue })
    }
}

impl<C> ScriptInterpreter<C> {
    /// Return the commands due at `current_time_s`.
    ///
    /// A command is due once the current time is strictly greater than its
    /// execution time. Once every command has been handed out
    /// `Pending::EndOfScript` is returned.
    pub fn get_pending(&mut self, current_time_s: f64) -> Pending<C> {
        if self.cmds.is_empty() {
            return Pending::EndOfScript
        }

        let mut due: Vec<C> = vec![];

        while self
            .cmds
            .front()
            .map(|c| c.exec_time_s < current_time_s)
            .unwrap_or(false)
        {
            if let Some(c) = self.cmds.pop_front() {
                due.push(c.cmd);
            }
        }

        if due.is_empty() {
            Pending::None
        }
        else {
            Pending::Some(due)
        }
    }

    /// Get the number of commands remaining in the script
    pub fn get_num_cmds(&self) -> usize {
        self.cmds.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        self.cmds.back().map(|c| c.exec_time_s).unwrap_or(0f64)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    enum Cmd {
        Reset,
        Speed(f64)
    }

    #[test]
    fn test_pending_commands() {
        let script = "\
            0.5: \"Reset\";\n\
            1.0: {\"Speed\": 2.0};\n\
            1.0: \"Reset\";\n";

        let mut interp: ScriptInterpreter<Cmd> = ScriptInterpreter::from_script(script).unwrap();
        assert_eq!(interp.get_num_cmds(), 3);
        assert_eq!(interp.get_duration(), 1.0);

        assert_eq!(interp.get_pending(0.5), Pending::None);
        assert_eq!(interp.get_pending(0.6), Pending::Some(vec![Cmd::Reset]));
        assert_eq!(interp.get_pending(0.9), Pending::None);
        assert_eq!(
            interp.get_pending(1.1),
            Pending::Some(vec![Cmd::Speed(2.0), Cmd::Reset])
        );
        assert_eq!(interp.get_pending(2.0), Pending::EndOfScript);
    }

    #[test]
    fn test_bad_scripts() {
        assert!(matches!(
            ScriptInterpreter::<Cmd>::from_script("nothing to see here"),
            Err(ScriptError::ScriptEmpty)
        ));
        assert!(matches!(
            ScriptInterpreter::<Cmd>::from_script("1.0: \"Launch\";"),
            Err(ScriptError::InvalidCommand(t, _)) if t == 1.0
        ));
        assert!(matches!(
            ScriptInterpreter::<Cmd>::from_script("2.0: \"Reset\";\n1.0: \"Reset\";"),
            Err(ScriptError::OutOfOrder(t)) if t == 1.0
        ));
        assert!(matches!(
            ScriptInterpreter::<Cmd>::new("/no/such/script.lfs"),
            Err(ScriptError::ScriptNotFound(_))
        ));
    }
}
