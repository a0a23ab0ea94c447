use anyhow::Result;

use crate::store::ConfigStore;

#[derive(Clone, Debug)]
pub struct TuiRunOptions {
    /// Where the remote settings are read from.
    pub store: ConfigStore,
}

pub fn run(opts: TuiRunOptions) -> Result<()> {
    crate::tui_shell::run(opts)
}
