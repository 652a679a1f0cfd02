use clap::Parser;

use linktrack::cli::{Cli, Commands, ConfigCommands, generate_config};
use linktrack::config::{DEFAULT_CONFIG_PATH, get_config, init_config_from};
use linktrack::runtime::modes::run_server;
use linktrack::system::init_logging;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // .env 只用于补充环境变量，不存在时忽略
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Some(Commands::Config {
        action: ConfigCommands::Generate { output_path, force },
    }) = &cli.command
    {
        let path = generate_config(output_path.as_deref(), *force)?;
        if path != "-" {
            println!("Sample configuration written to {}", path);
        }
        return Ok(());
    }

    init_config_from(cli.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH));
    let config = get_config();

    // guard 必须存活到进程结束，否则缓冲中的日志会丢失
    let _log_guard = init_logging(&config.logging)?;

    run_server().await
}
