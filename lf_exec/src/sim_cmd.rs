//! Commands which can be sent to the simulation from outside the control loop

use serde::Deserialize;

/// An external event for the simulation.
///
/// In scripts these are written as JSON strings, for example `3.5: "Reset";`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
pub enum SimCmd {
    /// Put the vehicle back at its start pose with fresh controller state
    Reset,

    /// End the simulation
    Exit
}

#[cfg(test)]
mod test {
    use super::*;
    use util::script_interpreter::{Pending, ScriptInterpreter};

    #[test]
    fn test_demo_script_parses() {
        let mut script: ScriptInterpreter<SimCmd> = ScriptInterpreter::from_script(
            include_str!("../../scripts/stop_and_reset.lfs")
        ).unwrap();

        assert_eq!(script.get_num_cmds(), 3);
        assert_eq!(script.get_pending(0.0), Pending::None);
        assert_eq!(script.get_pending(1000.0), Pending::Some(vec![
            SimCmd::Reset, SimCmd::Reset, SimCmd::Exit
        ]));
    }
}
