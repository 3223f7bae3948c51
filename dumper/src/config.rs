//! Runtime knobs for the dispatcher.

use crate::bus::DEFAULT_SETTLE_US;
use crate::command::PROBE_REPLY;

/// What to do with a byte that is not in the command table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownCommandPolicy {
    /// Consume the byte and send nothing. Existing host clients expect this.
    #[default]
    Ignore,
    /// Answer with a single NAK byte.
    Reply(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumperConfig {
    pub settle_us: u32,
    pub probe_reply: u8,
    pub unknown_command: UnknownCommandPolicy,
}

impl Default for DumperConfig {
    fn default() -> Self {
        DumperConfig {
            settle_us: DEFAULT_SETTLE_US,
            probe_reply: PROBE_REPLY,
            unknown_command: UnknownCommandPolicy::Ignore,
        }
    }
}
