use std::path::PathBuf;

use rangecarve_core::error::Result;
use rangecarve_core::{CarveOptions, DirectionPolicy, MalformedRangePolicy, carve_file};

use crate::presentation::cli::{Cli, DirectionArg};

pub fn options_from_cli(cli: &Cli) -> CarveOptions {
    CarveOptions {
        out_dir: cli.out_dir.clone(),
        extension: cli.extension.clone(),
        excluded_ports: cli.exclude_ports.clone(),
        direction: match cli.direction {
            DirectionArg::Strict => DirectionPolicy::Strict,
            DirectionArg::PortHint => DirectionPolicy::PortHint,
        },
        malformed_range: if cli.strict_ranges {
            MalformedRangePolicy::Abort
        } else {
            MalformedRangePolicy::SkipConnection
        },
    }
}

pub fn handle_carve(capture: PathBuf, opts: &CarveOptions, summary_json: bool) -> Result<()> {
    let summary = carve_file(&capture, Some(opts))?;
    if summary_json {
        let json = serde_json::to_string_pretty(&summary).map_err(std::io::Error::from)?;
        println!("{json}");
    }
    Ok(())
}
