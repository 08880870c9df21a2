//! Protocol options that change how payloads are laid out.

/// Options passed explicitly to the codecs whose layout depends on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProtocolConfig {
    /// Append a name field to group and scene configuration payloads.
    ///
    /// Only firmware that stores names understands the longer payloads.
    pub send_name: bool,
}

impl ProtocolConfig {
    /// Size of the optional name field.
    pub const NAME_SIZE: usize = 20;

    pub const fn with_send_name(mut self, send_name: bool) -> Self {
        self.send_name = send_name;
        self
    }
}
