/// Controller state machine.
///
/// State transitions:
/// ```text
/// idle --start ok--> running --reroute ok--> running
///                    running --reroute fail--> lost
/// any  --stop--> idle
/// ```
///
/// `Lost` is terminal for this start attempt: the controller keeps whatever
/// is left standing and waits for the owner to call `stop()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Running,
    Lost,
}

impl ControllerState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    pub fn is_lost(&self) -> bool {
        matches!(self, Self::Lost)
    }
}
