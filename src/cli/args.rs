/// CLI argument definitions via clap derive.
use std::path::PathBuf;

use clap::Parser;

use crate::proxy::bridge::DEFAULT_PROGRAM;
use crate::template::DEFAULT_TEMPLATE;

const PLACEHOLDER_HELP: &str = "Placeholders in --format:\n  \
    %n  Entry name\n  \
    %l  Login/username\n  \
    %p  Password\n\n\
    Missing fields render as N/A. The first run creates the keyfile and asks\n\
    KeePassXC to confirm the association; later runs reuse it. Delete the\n\
    keyfile to re-associate.";

/// kpxc-lookup — print KeePassXC credentials for a URL.
#[derive(Debug, Parser)]
#[command(
    name = "kpxc-lookup",
    about = "Look up KeePassXC credentials for a URL from the command line",
    version,
    arg_required_else_help = true,
    after_help = PLACEHOLDER_HELP
)]
pub struct Cli {
    /// URL to search in KeePassXC (must start with a scheme, e.g. https://).
    #[arg(short, long, value_name = "URL", value_parser = parse_url)]
    pub url: String,

    /// Path of the keyfile storing the association.
    #[arg(short, long, value_name = "PATH")]
    pub keyfile: PathBuf,

    /// Output template for each entry [default: "Name: %n\nLogin: %l\nPassword: %p\n"].
    #[arg(
        short,
        long,
        value_name = "TEMPLATE",
        default_value = DEFAULT_TEMPLATE,
        hide_default_value = true
    )]
    pub format: String,

    /// Do not print a newline after each entry.
    #[arg(short = 'n', long)]
    pub suppress_newline: bool,

    /// Print entries as a JSON array and errors as a JSON envelope.
    #[arg(long)]
    pub json: bool,

    /// Print debug logging and step timings to stderr.
    #[arg(long)]
    pub debug: bool,

    /// Program that speaks the KeePassXC proxy protocol on our behalf.
    #[arg(
        long,
        value_name = "PROGRAM",
        env = "KPXC_PROXY_COMMAND",
        default_value = DEFAULT_PROGRAM
    )]
    pub proxy_command: String,
}

/// Accept only URLs that start with a lowercase scheme (`^[a-z0-9]+://`).
///
/// # Errors
///
/// Returns a message for clap to print when the scheme prefix is missing.
pub fn parse_url(url: &str) -> Result<String, String> {
    let valid = url.split_once("://").is_some_and(|(scheme, _)| {
        !scheme.is_empty()
            && scheme
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
    });
    if valid {
        Ok(url.to_owned())
    } else {
        Err(format!(
            "'{url}' must start with a scheme such as https://"
        ))
    }
}
