//! URI 指定モード
//!
//! `--uri /mgmt/tm/ltm/node` のようにコレクションを直接指定し、
//! メソッドであるべき状態を表す。

use crate::connection::ConnectionArgs;
use crate::output::Outcome;
use clap::Args;
use ltmflow_core::{ApplyIntent, ApplyTarget, Reconciler};
use ltmflow_icontrol::api_path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    /// 存在しなければ作成、あれば差分を更新
    Post,
    /// 作成のみ（既に存在すれば失敗）
    StrictPost,
    Patch,
    Delete,
}

impl FromStr for RequestMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "_POST_" => Ok(RequestMethod::StrictPost),
            _ => match s.to_ascii_uppercase().as_str() {
                "POST" | "PUT" => Ok(RequestMethod::Post),
                "PATCH" => Ok(RequestMethod::Patch),
                "DELETE" => Ok(RequestMethod::Delete),
                other => Err(format!(
                    "未対応のメソッドです: {} (POST, _POST_, PATCH, DELETE)",
                    other
                )),
            },
        }
    }
}

impl RequestMethod {
    fn intent(&self) -> ApplyIntent {
        match self {
            RequestMethod::Delete => ApplyIntent::Absent,
            _ => ApplyIntent::Present,
        }
    }

    /// URI の末尾がオブジェクト名を指すメソッドか
    fn addresses_object(&self) -> bool {
        matches!(self, RequestMethod::Patch | RequestMethod::Delete)
    }
}

#[derive(Args, Debug, Clone)]
pub struct RequestArgs {
    /// 対象 URI (例: /mgmt/tm/ltm/node, /mgmt/tm/ltm/node/~Common~web01)
    #[arg(long)]
    pub uri: String,

    /// POST, _POST_, PATCH, DELETE
    #[arg(long, default_value = "POST")]
    pub method: RequestMethod,

    /// 属性 (JSON オブジェクトまたは key=value)
    #[arg(long)]
    pub body: Option<String>,
}

/// URI から種別・名前・パーティションを取り出す
///
/// 末尾が `~P~name` ならそこから名前とパーティションを、
/// PATCH/DELETE では末尾のセグメントを名前として扱う。
pub fn split_uri(uri: &str, method: RequestMethod) -> (String, Option<String>, Option<String>) {
    let path = api_path(uri);
    let path = path.trim_end_matches('/');

    let Some((collection, last)) = path.rsplit_once('/') else {
        return (path.to_string(), None, None);
    };

    if let Some(rest) = last.strip_prefix('~') {
        return match rest.split_once('~') {
            Some((partition, name)) => (
                collection.to_string(),
                Some(name.to_string()),
                Some(partition.to_string()),
            ),
            None => (collection.to_string(), Some(rest.to_string()), None),
        };
    }

    if method.addresses_object() {
        (collection.to_string(), Some(last.to_string()), None)
    } else {
        (path.to_string(), None, None)
    }
}

pub async fn handle(connection: &ConnectionArgs, args: &RequestArgs) -> anyhow::Result<Outcome> {
    let body = super::read_body(args.body.as_deref(), None)?;
    let (kind, name, partition) = split_uri(&args.uri, args.method);
    tracing::debug!("{} -> kind={} name={:?} partition={:?}", args.uri, kind, name, partition);

    let mut target = ApplyTarget::new(kind, args.method.intent()).with_body(body);
    if let Some(name) = name {
        target = target.with_name(name);
    }
    if let Some(partition) = partition {
        target = target.with_partition(partition);
    }

    let (identity, desired) = match target.resolve() {
        Ok(resolved) => resolved,
        Err(e) => return Ok(Outcome::failure(e.to_string())),
    };

    let client = connection.client()?;
    let reconciler = Reconciler::new(client);
    let result = match args.method {
        RequestMethod::StrictPost => reconciler.create(&identity, &desired).await,
        _ => reconciler.apply(&identity, target.intent, Some(&desired)).await,
    };
    Ok(result.into())
}
