use std::ffi::OsString;

use clap::Parser;
use tracing::warn;

use crate::output::OutputFormat;

#[derive(Parser, Debug, Default, PartialEq, Eq)]
#[command(
    name = "iag-inventory",
    disable_help_flag = true,
    disable_version_flag = true,
    about = "Ansible dynamic inventory for Itential Automation Gateway devices"
)]
pub struct Args {
    /// Print the whole inventory (the default)
    #[arg(long, conflicts_with = "host")]
    pub list: bool,

    /// Print the variables of a single host
    #[arg(long, value_name = "NAME")]
    pub host: Option<String>,

    /// Print YAML instead of JSON, for debugging
    #[arg(long)]
    pub yaml: bool,
}

/// What the inventory invocation asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    List,
    Host(String),
}

impl Args {
    /// Parse the process arguments.
    ///
    /// Ansible only ever passes `--list` or `--host`, so anything clap
    /// rejects falls back to listing the inventory as JSON rather than
    /// leaving stdout empty. There are no help or version flags: stdout
    /// only ever carries an inventory document.
    pub fn parse_lenient() -> Self {
        Self::parse_lenient_from(std::env::args_os())
    }

    pub fn parse_lenient_from<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match Self::try_parse_from(args) {
            Ok(args) => args,
            Err(err) => {
                warn!(kind = ?err.kind(), "Unrecognized arguments, listing the full inventory");
                Self::default()
            }
        }
    }

    pub fn mode(&self) -> Mode {
        self.host
            .as_ref()
            .map_or(Mode::List, |host| Mode::Host(host.clone()))
    }

    /// `--yaml` only applies to an explicit `--list` or `--host` request.
    pub const fn format(&self) -> OutputFormat {
        if self.yaml && (self.list || self.host.is_some()) {
            OutputFormat::Yaml
        } else {
            OutputFormat::Json
        }
    }
}
