use crate::connection::ConnectionArgs;
use crate::output::Outcome;
use clap::Args;
use ltmflow_icontrol::gather_facts;

#[derive(Args, Debug, Clone)]
pub struct FactsArgs {
    /// 取得するコレクション (例: /mgmt/tm/ltm/pool または ltm/pool)
    #[arg(long)]
    pub uri: String,
}

pub async fn handle(connection: &ConnectionArgs, args: &FactsArgs) -> anyhow::Result<Outcome> {
    let client = connection.client()?;
    let facts = gather_facts(&client, &args.uri).await?;
    Ok(Outcome::default().with_facts(serde_json::Value::Object(facts)))
}
