use pagebrief::agent::Agent;
use pagebrief::config::Config;
use pagebrief::error::Result;
use pagebrief::model::Message;
use pagebrief::pipeline::{RequestContext, Services};
use tracing::info;

/// One message through the tool-use agent
pub fn cmd_ask(message: String, conversation: String, chat: Option<String>) -> Result<()> {
    let services = Services::from_config(Config::load()?)?;
    let mut ctx = RequestContext::new(conversation);
    ctx.chat_id = chat;

    let reply = Agent::new(&services, ctx).run(vec![Message::user_text(message)]);
    info!("Agent finished: {:?} after {} rounds", reply.stop, reply.rounds);

    println!("{}", reply.text);
    Ok(())
}
