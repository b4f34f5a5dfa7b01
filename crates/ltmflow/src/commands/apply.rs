use crate::connection::ConnectionArgs;
use crate::output::Outcome;
use clap::{Args, ValueEnum};
use ltmflow_core::{ApplyIntent, ApplyTarget, Reconciler};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StateArg {
    Present,
    Absent,
}

impl From<StateArg> for ApplyIntent {
    fn from(state: StateArg) -> Self {
        match state {
            StateArg::Present => ApplyIntent::Present,
            StateArg::Absent => ApplyIntent::Absent,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ApplyArgs {
    /// リソース種別 (node, pool, virtual, ... または ltm/node のようなパス)
    #[arg(long)]
    pub kind: String,

    /// オブジェクト名（省略時はボディの name を使用）
    #[arg(long)]
    pub name: Option<String>,

    /// パーティション（省略時は Common）
    #[arg(long)]
    pub partition: Option<String>,

    /// 適用後のあるべき状態
    #[arg(long, value_enum, default_value = "present")]
    pub state: StateArg,

    /// 属性 (JSON オブジェクトまたは key=value)
    #[arg(long, conflicts_with = "body_file")]
    pub body: Option<String>,

    /// 属性を記述した YAML/JSON ファイル
    #[arg(long)]
    pub body_file: Option<PathBuf>,
}

pub async fn handle(connection: &ConnectionArgs, args: &ApplyArgs) -> anyhow::Result<Outcome> {
    let body = super::read_body(args.body.as_deref(), args.body_file.as_deref())?;

    let mut target = ApplyTarget::new(&args.kind, args.state.into()).with_body(body);
    if let Some(name) = &args.name {
        target = target.with_name(name);
    }
    if let Some(partition) = &args.partition {
        target = target.with_partition(partition);
    }

    // 識別子が不正なら接続前に失敗させる
    if let Err(e) = target.resolve() {
        return Ok(Outcome::failure(e.to_string()));
    }

    let client = connection.client()?;
    let reconciler = Reconciler::new(client);
    let result = reconciler.apply_target(&target).await;
    Ok(result.into())
}
