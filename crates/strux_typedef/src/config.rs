use strux_symbols::TypeId;

/// Knobs for synthesized members
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisConfig {
    /// Suffix mangled onto the structure name for the initializer
    pub init_suffix: String,
    /// Name of the initializer's receiver variable
    pub receiver_name: String,
    /// Initializer return type; nil when unset
    pub init_returns: Option<TypeId>,
}

impl SynthesisConfig {
    pub fn with_init_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.init_suffix = suffix.into();
        self
    }

    pub fn with_receiver_name(mut self, name: impl Into<String>) -> Self {
        self.receiver_name = name.into();
        self
    }

    pub fn with_init_returns(mut self, ty: TypeId) -> Self {
        self.init_returns = Some(ty);
        self
    }
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            init_suffix: "init".to_string(),
            receiver_name: "self".to_string(),
            init_returns: None,
        }
    }
}
