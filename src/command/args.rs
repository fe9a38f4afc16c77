//! Argument vector builder for the external client.

/// Builder for assembling command arguments one element at a time.
///
/// Every value lands in its own argv element; nothing is ever joined into a
/// string that a shell would re-split.
#[derive(Debug, Default)]
pub struct CommandArgsBuilder {
    args: Vec<String>,
}

impl CommandArgsBuilder {
    /// Create a new, empty builder.
    pub fn new() -> Self {
        Self { args: Vec::new() }
    }

    /// Append a flag with no value.
    pub fn push_flag(&mut self, flag: &str) {
        self.args.push(flag.to_string());
    }

    /// Append a flag with no value when `enabled` is true.
    pub fn push_flag_if(&mut self, flag: &str, enabled: bool) {
        if enabled {
            self.push_flag(flag);
        }
    }

    /// Append a flag followed by its value as a separate argument.
    pub fn push_flag_value(&mut self, flag: &str, value: impl Into<String>) {
        self.args.push(flag.to_string());
        self.args.push(value.into());
    }

    /// Append a flag with value if the value is not empty.
    pub fn push_flag_nonempty(&mut self, flag: &str, value: &str) {
        if !value.is_empty() {
            self.push_flag_value(flag, value);
        }
    }

    /// Return the collected arguments.
    pub fn into_args(self) -> Vec<String> {
        self.args
    }
}
