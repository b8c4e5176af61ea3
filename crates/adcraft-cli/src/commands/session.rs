use anyhow::Result;

use super::AgentOptions;
use crate::prompt::cliclack::CliclackPrompt;
use crate::session::Session;

pub async fn execute(options: AgentOptions, session_id: String) -> Result<()> {
    let agent = options.build_agent()?;
    let mut session = Session::new(agent, session_id, Box::new(CliclackPrompt::new()));
    session.start().await
}
