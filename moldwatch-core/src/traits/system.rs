//! System control trait

/// Board-level control the indicator may request
pub trait SystemControl {
    /// Restart the device
    ///
    /// On hardware this does not return. Test doubles record the call.
    fn restart(&mut self);
}
