mod account;
mod admin;
mod calendar;
mod events;
mod reservations;

use std::{
    io::{self, BufRead, Write},
    sync::Arc,
};

use anyhow::Result;
use clap::{Parser, Subcommand};
use eventdesk::App;
use eventdesk_session::WsTransport;

pub use account::ProfileArgs;
pub use admin::AdminCommand;
pub use calendar::CalendarCommand;
pub use events::EventsCommand;
pub use reservations::ReservationsCommand;

/// eventdesk - browse events, manage reservations and run administration
#[derive(Parser)]
#[command(name = "eventdesk")]
#[command(about = "Event registration client", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in
    Login {
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account and sign in
    Register {
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Sign out and forget the session
    Logout,
    /// Show the signed in user
    Whoami,
    /// Update the signed in user's profile
    Profile(ProfileArgs),
    /// Browse and manage events
    #[command(subcommand)]
    Events(EventsCommand),
    /// Your reservations
    #[command(subcommand)]
    Reservations(ReservationsCommand),
    /// Administration
    #[command(subcommand)]
    Admin(AdminCommand),
    /// Add an event to a calendar
    #[command(subcommand)]
    Calendar(CalendarCommand),
    /// Print realtime notifications until interrupted
    Listen,
}

impl Commands {
    /// Route of the page this command stands for.
    fn route(&self) -> String {
        match self {
            Commands::Login { .. } => "/login".to_owned(),
            Commands::Register { .. } => "/register".to_owned(),
            Commands::Logout | Commands::Whoami | Commands::Listen => "/".to_owned(),
            Commands::Profile(_) => "/profile".to_owned(),
            Commands::Events(command) => command.route(),
            Commands::Reservations(_) => "/my-reservations".to_owned(),
            Commands::Admin(command) => command.route(),
            Commands::Calendar(command) => command.route(),
        }
    }
}

pub async fn run(app: &App, transport: &Arc<WsTransport>, command: Commands) -> Result<()> {
    app.guard(&command.route())?;

    match command {
        Commands::Login { email, password } => account::login(app, email, password).await,
        Commands::Register {
            email,
            first_name,
            last_name,
            password,
        } => account::register(app, email, first_name, last_name, password).await,
        Commands::Logout => account::logout(app),
        Commands::Whoami => account::whoami(app),
        Commands::Profile(args) => account::profile(app, args).await,
        Commands::Events(command) => events::run(app, command).await,
        Commands::Reservations(command) => reservations::run(app, command).await,
        Commands::Admin(command) => admin::run(app, command).await,
        Commands::Calendar(command) => calendar::run(app, command).await,
        Commands::Listen => listen(app, transport).await,
    }
}

async fn listen(app: &App, transport: &Arc<WsTransport>) -> Result<()> {
    app.require_session()?;
    let mut messages = transport.subscribe();

    eprintln!("Listening for notifications, press Ctrl-C to stop.");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            message = messages.recv() => match message {
                Ok(message) => println!("{} {}", message.event, message.data),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "notifications dropped");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    Ok(())
}

/// Prompts on stderr and reads one line from stdin.
fn read_secret(prompt: &str) -> Result<String> {
    eprint!("{prompt}: ");
    io::stderr().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;

    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}
