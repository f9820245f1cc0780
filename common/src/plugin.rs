use anyhow::Result;

use crate::{events::Event, host::Host};

/// Contract between the host and a loaded plugin.
///
/// The host calls `init` once after loading, `event` for every event kind the
/// plugin registered during `init`, and `cleanup` once before unloading. All
/// calls happen on the host's dispatch thread and run to completion.
pub trait Plugin {
    fn name(&self) -> &str;

    fn init(&mut self, host: &mut dyn Host, config: &str) -> Result<()>;

    fn event(&mut self, host: &mut dyn Host, event: &mut Event);

    fn cleanup(&mut self, host: &mut dyn Host) {
        host.flush_events();
    }
}
