use anyhow::Result;
use console::style;

use adcraft::marketing;

/// Print every tool with its parameter schema; needs no credentials
pub fn execute() -> Result<()> {
    for tool in marketing::tools() {
        println!("{}", style(&tool.name).bold());
        println!("  {}", tool.description);
        println!("{}\n", serde_json::to_string_pretty(&tool.input_schema)?);
    }
    Ok(())
}
