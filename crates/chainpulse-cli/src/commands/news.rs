use chainpulse_core::catalog;
use time::OffsetDateTime;

use crate::cli::NewsArgs;
use crate::error::CliError;

use super::CommandResult;

pub fn run(args: &NewsArgs) -> Result<CommandResult, CliError> {
    let news = catalog::news(OffsetDateTime::now_utc().date());

    let data = match args.category.as_deref() {
        None | Some("all") => serde_json::to_value(&news)?,
        Some(category) => serde_json::to_value(catalog::news_by_category(&news, category))?,
    };
    Ok(CommandResult::ok(data))
}
