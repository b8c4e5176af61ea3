use anyhow::Result;

use super::AgentOptions;
use crate::prompt::cliclack::print_markdown;

/// Answer a single message and exit
pub async fn execute(options: AgentOptions, session_id: String, text: String) -> Result<()> {
    let agent = options.build_agent()?;
    let answer = agent.invoke(&session_id, &text).await?;
    print_markdown(&answer);
    Ok(())
}
