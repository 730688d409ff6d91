//! Commands carried in the `command` field

/// Wire value requesting a device restart
pub const CMD_SYSTEM_RESET: &str = "system_reset";

/// Wire value requesting a status report
pub const CMD_SEND_STATUS: &str = "send_status";

/// Command parsed from an inbound message
///
/// Matching is exact and case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command<'a> {
    /// Restart the device (not recoverable)
    SystemReset,
    /// Publish the current metric values
    SendStatus,
    /// Anything else; logged and ignored by the receiver
    Unknown(&'a str),
}

impl<'a> Command<'a> {
    /// Parse a command from its wire string
    pub fn parse(text: &'a str) -> Self {
        match text {
            CMD_SYSTEM_RESET => Command::SystemReset,
            CMD_SEND_STATUS => Command::SendStatus,
            other => Command::Unknown(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_commands() {
        assert_eq!(Command::parse("system_reset"), Command::SystemReset);
        assert_eq!(Command::parse("send_status"), Command::SendStatus);
    }

    #[test]
    fn test_parse_is_exact_match() {
        assert_eq!(Command::parse("SEND_STATUS"), Command::Unknown("SEND_STATUS"));
        assert_eq!(Command::parse(" send_status"), Command::Unknown(" send_status"));
        assert_eq!(Command::parse("reboot"), Command::Unknown("reboot"));
    }
}
