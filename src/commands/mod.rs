/// Command dispatch: wires the bridge client into the lookup workflow.
pub mod lookup;

use crate::association::LookupError;
use crate::cli::{Cli, OutputCtx};
use crate::proxy::BridgeProxy;

/// Run the lookup described by `cli` against the configured bridge program.
///
/// # Errors
///
/// Returns `LookupError` on any keyfile, association, or query failure.
pub fn dispatch(cli: &Cli, ctx: &OutputCtx) -> Result<(), LookupError> {
    let mut proxy = BridgeProxy::new(cli.proxy_command.as_str());
    lookup::run(cli, &mut proxy, ctx)
}
