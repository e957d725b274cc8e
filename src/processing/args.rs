use std::ffi::OsString;

use clap::Parser;

/// Indexes reference faces and reports which known people appear in each
/// input image.
#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// The name of the pulumi stack
    #[arg(long, default_value = "dev")]
    pub stack: String,
}

impl Args {
    /// Parses the process arguments, also accepting `-stack`.
    pub fn parse_args() -> Self {
        Self::try_parse_args(std::env::args_os()).unwrap_or_else(|e| e.exit())
    }

    pub fn try_parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::try_parse_from(args.into_iter().map(|arg| single_dash_stack(arg.into())))
    }
}

/// Rewrites `-stack` and `-stack=<name>` to their `--stack` form.
pub fn single_dash_stack(arg: OsString) -> OsString {
    match arg.to_str() {
        Some("-stack") => OsString::from("--stack"),
        Some(s) if s.starts_with("-stack=") => OsString::from(format!("-{}", s)),
        _ => arg,
    }
}
