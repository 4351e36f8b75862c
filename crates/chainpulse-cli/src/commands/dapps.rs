use chainpulse_core::catalog::{self, DAppFilter};

use crate::cli::DappsArgs;
use crate::error::CliError;

use super::CommandResult;

pub fn run(args: &DappsArgs) -> Result<CommandResult, CliError> {
    let filter = DAppFilter {
        query: args.query.clone(),
        category: args.category.clone(),
        featured_only: args.featured,
    };

    let directory = catalog::dapps();
    let data = serde_json::to_value(filter.apply(&directory))?;
    Ok(CommandResult::ok(data))
}
