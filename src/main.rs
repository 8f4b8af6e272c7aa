mod audio;
mod config;
mod debug;
mod game;
mod net;
mod session;
mod ui;

use anyhow::Context;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use rand::SeedableRng;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Instant;

use game::PeerId;
use session::engine::Engine;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let options = parse_args(&args);

    debug::init(options.debug).context("failed to initialize debug log")?;
    debug::log("SESSION_START", "marblenet starting");

    let mut config = config::load_config().context("failed to load configuration")?;
    if let Some(port) = options.port {
        config.network.port = port;
    }

    let my_id = PeerId::random();
    debug::log("IDENTITY", &format!("node id {}", my_id));
    println!("marblenet node {}", my_id);
    println!(
        "broadcasting on {}:{}",
        config.network.broadcast_addr, config.network.port
    );

    let client = net::start_network(my_id, &config.network)
        .context("failed to start broadcast networking")?;

    let rng = rand::rngs::StdRng::from_entropy();
    let mut engine = Engine::new(my_id, &config, rng, Instant::now());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = session::run_session(&mut terminal, &client, &mut engine, &config);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    debug::log("SESSION_END", "marblenet exiting");
    result.context("session loop failed")
}

struct Options {
    debug: bool,
    port: Option<u16>,
}

fn parse_args(args: &[String]) -> Options {
    let mut options = Options {
        debug: false,
        port: None,
    };

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--debug" | "-d" => options.debug = true,
            "--port" | "-p" => match iter.next().and_then(|v| v.parse().ok()) {
                Some(port) => options.port = Some(port),
                None => {
                    eprintln!("Error: --port requires a number");
                    std::process::exit(1);
                }
            },
            "--help" | "-h" => {
                print_usage(&args[0]);
                std::process::exit(0);
            }
            _ => {
                eprintln!("Unknown argument: {}", arg);
                print_usage(&args[0]);
                std::process::exit(1);
            }
        }
    }

    options
}

fn print_usage(program: &str) {
    println!("Marblenet - Networked Terminal Marble Game");
    println!();
    println!("Usage:");
    println!("  {}                   # Join or start a session", program);
    println!("  {} --port <port>     # Use a different UDP port", program);
    println!("  {} --debug           # Log to /tmp/marblenet-debug.log", program);
    println!();
    println!("All nodes on the same network segment and port form one session");
    println!("automatically; the node with the smallest identity leads it.");
    println!();
    println!("Config file: see `marblenet/config.toml` in your config directory.");
}
