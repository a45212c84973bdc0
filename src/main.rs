//! 认证核心命令行入口
//! 从标准输入读取密码或令牌，避免出现在进程参数和 shell 历史中

use clap::{Parser, Subcommand};
use credential_core::{
    config::AppConfig,
    db,
    error::ErrorResponse,
    models::{auth::LoginResponse, Credential},
    repository::{InMemoryUserStore, PgUserStore, UserStore},
    telemetry, AuthError, AuthService,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Credential store and session token tool
#[derive(Parser)]
#[command(name = "credential-core")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register an identifier; the password is read from stdin
    Register { identifier: String },

    /// Authenticate and print a session token; the password is read from stdin
    Login { identifier: String },

    /// Validate a session token read from stdin and print its subject
    Authorize,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Register { .. } => "register",
            Command::Login { .. } => "login",
            Command::Authorize => "authorize",
        }
    }

    /// 令牌校验是无状态的，只有读写用户记录的命令需要数据库
    fn needs_persistent_store(&self) -> bool {
        !matches!(self, Command::Authorize)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 按优先级加载：.env.local > .env
    dotenv::from_filename(".env.local").ok();
    dotenv::dotenv().ok();

    // 1. 加载配置（缺少签名密钥时直接退出）
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        anyhow::anyhow!("Failed to load configuration: {}", e)
    })?;

    // 2. 初始化日志
    telemetry::init_telemetry(&config.logging);

    // 3. 用户存储：register/login 需要持久化存储，内存存储跨进程不保留
    let store: Arc<dyn UserStore> = match &config.database.url {
        Some(_) => {
            let pool = db::open(&config.database).await?;
            Arc::new(PgUserStore::new(pool))
        }
        None if cli.command.needs_persistent_store() => {
            anyhow::bail!(
                "`{}` needs a user database: set AUTH_DATABASE__URL",
                cli.command.name()
            );
        }
        None => Arc::new(InMemoryUserStore::new()),
    };

    // 4. 认证服务
    let service = AuthService::from_config(&config, store)?;
    tracing::debug!(?service, "Auth service ready");

    let input = read_stdin_line().await?;

    let outcome = match cli.command {
        Command::Register { identifier } => service
            .register(Credential::new(identifier, input))
            .await
            .map(|()| serde_json::json!({ "registered": true })),
        Command::Login { identifier } => service
            .authenticate(Credential::new(identifier, input))
            .await
            .map(|token| serde_json::json!(LoginResponse::from(token))),
        Command::Authorize => service
            .authorize(input.trim())
            .await
            .map(|subject| serde_json::json!({ "subject": subject })),
    };

    match outcome {
        Ok(body) => {
            println!("{}", body);
            Ok(())
        }
        Err(error) => exit_with(error),
    }
}

async fn read_stdin_line() -> anyhow::Result<String> {
    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn exit_with(error: AuthError) -> ! {
    let response = ErrorResponse::from(error);
    match serde_json::to_string(&response) {
        Ok(body) => eprintln!("{}", body),
        Err(_) => eprintln!("{}", error.user_message()),
    }
    std::process::exit(if error.is_retryable() { 75 } else { 1 });
}
