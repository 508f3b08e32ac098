/// Lookup workflow: connect, associate or restore, verify, query, report.
use std::path::Path;

use crate::association::{Established, LookupError, establish, verify};
use crate::cli::Cli;
use crate::cli::OutputCtx;
use crate::cli::output::{write_logins, write_no_logins, write_notice};
use crate::proxy::{LoginRecord, ProxyClient};
use crate::template::Template;

/// Run `kpxc-lookup`.
///
/// An empty result is reported as a notice and is not an error.
///
/// # Errors
///
/// Returns `LookupError` on keyfile, association, or query failure.
pub fn run<P: ProxyClient + ?Sized>(
    cli: &Cli,
    proxy: &mut P,
    ctx: &OutputCtx,
) -> Result<(), LookupError> {
    let template = Template::parse(&cli.format);
    let logins = lookup(proxy, &cli.keyfile, &cli.url, ctx)?;

    if logins.is_empty() {
        write_no_logins(&cli.url, ctx);
    } else {
        write_logins(&logins, &template, ctx);
    }
    Ok(())
}

/// Drive the proxy from connection to query and return the matching entries.
///
/// # Errors
///
/// Returns `LookupError` from whichever step failed; later steps are not run.
pub fn lookup<P: ProxyClient + ?Sized>(
    proxy: &mut P,
    keyfile: &Path,
    url: &str,
    ctx: &OutputCtx,
) -> Result<Vec<LoginRecord>, LookupError> {
    let _t_connect = ctx.timer("connect");
    proxy.connect()?;
    drop(_t_connect);

    let _t_establish = ctx.timer("establish");
    let established = establish(proxy, keyfile)?;
    drop(_t_establish);

    match &established {
        Established::Created { id } => write_notice(&format!(
            "Association created and saved to {} with name '{id}'.",
            keyfile.display()
        )),
        Established::Loaded { id } => {
            log::info!("Loaded association '{id}' from {}.", keyfile.display());
        }
    }

    let _t_verify = ctx.timer("test_associate");
    verify(proxy)?;
    drop(_t_verify);

    let _t_query = ctx.timer("get_logins");
    let logins = proxy.get_logins(url)?;
    drop(_t_query);

    log::debug!("{} entries matched {url}", logins.len());
    Ok(logins)
}
