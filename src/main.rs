use aiterm::{config, router::InputRouter, session::SessionState, terminal::Terminal, translator};
use clap::{Arg, Command};
use std::io::IsTerminal;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("aiterm")
        .about("A command shell that can translate plain English into shell commands")
        .arg(Arg::new("command")
            .short('c')
            .long("command")
            .help("Dispatch a single line and exit")
            .value_name("TEXT")
            .num_args(1))
        .arg(Arg::new("no-ai")
            .long("no-ai")
            .help("Start with AI translation turned off")
            .action(clap::ArgAction::SetTrue))
        .arg(Arg::new("set-api-key")
            .long("set-api-key")
            .help("Save the OpenAI API key to the config file")
            .value_name("API_KEY")
            .num_args(1))
        .arg(Arg::new("config")
            .long("config")
            .help("Show configuration information")
            .action(clap::ArgAction::SetTrue))
        .get_matches();

    // Handle configuration commands
    if let Some(api_key) = matches.get_one::<String>("set-api-key") {
        let mut config = config::Config::load_file()?;
        config.set_api_key(api_key.clone())?;
        println!("API key saved successfully");
        return Ok(());
    }

    if matches.get_flag("config") {
        config::Config::show_config_info()?;
        return Ok(());
    }

    let config = config::Config::load()?;
    let ai_enabled = config.ai_enabled && !matches.get_flag("no-ai");
    let router = InputRouter::new(translator::from_config(&config));
    let mut session = SessionState::from_current_dir(ai_enabled)?;
    info!("Session started in {} (AI: {})", session.working_directory().display(), ai_enabled);

    let stdout = std::io::stdout();
    let color = stdout.is_terminal() && std::env::var_os("NO_COLOR").is_none();
    let mut terminal = Terminal::new(stdout.lock(), color);

    if let Some(line) = matches.get_one::<String>("command") {
        let dispatch = router.dispatch(line, &mut session).await;
        terminal.show(&dispatch)?;
        if dispatch.failed() {
            std::process::exit(1);
        }
        return Ok(());
    }

    let interactive = std::io::stdin().is_terminal();
    if interactive {
        terminal.welcome(&session)?;
    }
    let input = tokio::io::BufReader::new(tokio::io::stdin());
    let end = terminal.run(&router, &mut session, input, interactive).await?;
    info!("Session ended: {:?}", end);

    Ok(())
}
