use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use eventdesk::{App, terminal};
use eventdesk_reservation::{RosterQuery, Selection, SortKey, SortOrder};

#[derive(Subcommand)]
pub enum AdminCommand {
    /// Reservations of one event
    Roster(RosterArgs),
    /// Occupancy of every event
    Reports,
    /// Every event with headline figures
    Dashboard,
}

impl AdminCommand {
    pub fn route(&self) -> String {
        match self {
            AdminCommand::Roster(args) => format!("/admin/events/{}/reservations", args.event_id),
            AdminCommand::Reports => "/admin/reports".to_owned(),
            AdminCommand::Dashboard => "/admin/dashboard".to_owned(),
        }
    }
}

#[derive(Args)]
pub struct RosterArgs {
    event_id: String,
    /// Matches name or email, case insensitive
    #[arg(long, default_value = "")]
    search: String,
    /// name, email or date
    #[arg(long, default_value = "date")]
    sort: SortKey,
    /// asc or desc
    #[arg(long, default_value = "desc")]
    order: SortOrder,
    /// Write the visible reservations as CSV into this directory
    #[arg(long)]
    export: Option<PathBuf>,
    /// Cancel these reservations
    #[arg(long = "cancel", value_name = "RESERVATION_ID")]
    cancel: Vec<String>,
    /// Cancel every visible reservation
    #[arg(long, conflicts_with = "cancel")]
    cancel_all: bool,
}

pub async fn run(app: &App, command: AdminCommand) -> Result<()> {
    match command {
        AdminCommand::Roster(args) => roster(app, args).await,
        AdminCommand::Reports => {
            let Some(report) = app.occupancy_report().await else {
                bail!("reports are unavailable");
            };
            terminal::print_report(&report);
            Ok(())
        }
        AdminCommand::Dashboard => {
            let Some((events, stats)) = app.dashboard().await else {
                bail!("dashboard is unavailable");
            };
            terminal::print_dashboard(&events, &stats);
            Ok(())
        }
    }
}

async fn roster(app: &App, args: RosterArgs) -> Result<()> {
    let Some(mut roster) = app.load_roster(&args.event_id).await else {
        bail!("roster of event {} is unavailable", args.event_id);
    };

    let query = RosterQuery {
        search: args.search,
        sort_key: args.sort,
        sort_order: args.order,
    };

    let mut selection = if args.cancel_all {
        let mut selection = Selection::default();
        selection.toggle_all(&roster.view(&query));
        selection
    } else {
        args.cancel.into_iter().collect::<Selection>()
    };

    if args.cancel_all || !selection.is_empty() {
        roster.reservations = app.cancel_selected(&args.event_id, &mut selection).await?;

        for id in selection.ids() {
            eprintln!("still reserved: {id}");
        }
    }

    terminal::print_roster(&roster.event, &roster.view(&query), &roster.stats());

    if let Some(dir) = args.export {
        if let Some(path) = app.export_roster(&roster, &query, &dir)? {
            println!("{}", path.display());
        }
    }

    Ok(())
}
