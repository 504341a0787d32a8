//! Construction configuration (§6). The capacities of [`crate::Engine`] are
//! const generics, so this struct carries only the runtime-variable fields:
//! whether autocompletion is enabled and the borrowed invitation string.

pub struct EngineConfig<'a> {
    pub invitation: &'a str,
    pub enable_auto_complete: bool,
}

impl<'a> EngineConfig<'a> {
    pub const fn new(invitation: &'a str) -> Self {
        Self {
            invitation,
            enable_auto_complete: true,
        }
    }

    pub const fn with_auto_complete(mut self, enabled: bool) -> Self {
        self.enable_auto_complete = enabled;
        self
    }
}

impl Default for EngineConfig<'static> {
    fn default() -> Self {
        Self::new(ucli_config::DEFAULT_INVITATION)
    }
}
