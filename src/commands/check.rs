//! `check-substitutable` command.

use crate::cli::CheckCli;
use crate::config::ToolConfig;
use crate::context::ServiceContext;
use crate::error::ToolError;
use crate::oracle::is_substitutable;

/// Execute `check-substitutable` against the live filesystem.
///
/// # Errors
///
/// Returns a [`ToolError`] only for fatal conditions; an unknown type is `false`.
pub fn run(args: &CheckCli) -> Result<String, ToolError> {
    let config = ToolConfig::load(args.platform_root.clone());
    run_with_context(&ServiceContext::live(), &config, args)
}

/// Execute `check-substitutable` with an explicit context and configuration.
///
/// Returns `"true\n"` or `"false\n"`.
///
/// # Errors
///
/// Returns a [`ToolError`] only for fatal conditions; an unknown type is `false`.
pub fn run_with_context(
    ctx: &ServiceContext,
    config: &ToolConfig,
    args: &CheckCli,
) -> Result<String, ToolError> {
    let loader = ctx.open_loader(&args.root, config)?;
    let answer = is_substitutable(&loader, &args.from, &args.to)?;
    Ok(format!("{answer}\n"))
}
