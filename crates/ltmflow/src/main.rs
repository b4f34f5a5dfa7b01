mod commands;
mod connection;
mod output;

use clap::{Parser, Subcommand};
use connection::ConnectionArgs;
use output::Outcome;

#[derive(Parser)]
#[command(name = "ltmflow")]
#[command(about = "ロードバランサー設定の冪等な適用ツール", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// デバッグログを有効化（stderr に出力）
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// リソースをあるべき状態に収束させる
    Apply(commands::apply::ApplyArgs),
    /// URI とメソッドを指定して適用
    Request(commands::request::RequestArgs),
    /// コレクションの内容をファクトとして取得
    Facts(commands::facts::FactsArgs),
    /// (任意で保存・再起動後) アプライアンスの準備完了を待つ
    Check(commands::check::CheckArgs),
    /// バージョン情報を表示
    Version,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // 標準出力は結果 JSON 専用なのでログは stderr へ
    let filter = if cli.debug {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Commands::Version = cli.command {
        println!("ltmflow {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let outcome = match run(&cli).await {
        Ok(outcome) => outcome,
        Err(e) => Outcome::failure(format!("{:#}", e)),
    };
    outcome.print();

    if outcome.failed {
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> anyhow::Result<Outcome> {
    match &cli.command {
        Commands::Apply(args) => commands::apply::handle(&cli.connection, args).await,
        Commands::Request(args) => commands::request::handle(&cli.connection, args).await,
        Commands::Facts(args) => commands::facts::handle(&cli.connection, args).await,
        Commands::Check(args) => commands::check::handle(&cli.connection, args).await,
        Commands::Version => Ok(Outcome::default()),
    }
}
