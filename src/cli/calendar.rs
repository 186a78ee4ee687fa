use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Subcommand;
use eventdesk::App;
use eventdesk_calendar::{SENTINEL, google_calendar_link, ical_link_in};

#[derive(Subcommand)]
pub enum CalendarCommand {
    /// Print a Google Calendar link for an event
    Google { id: String },
    /// Write an iCalendar file for an event
    Ics {
        id: String,
        /// Directory the file is kept in
        #[arg(long, default_value = ".")]
        output: PathBuf,
    },
}

impl CalendarCommand {
    pub fn route(&self) -> String {
        match self {
            CalendarCommand::Google { id } | CalendarCommand::Ics { id, .. } => {
                format!("/events/{id}")
            }
        }
    }
}

pub async fn run(app: &App, command: CalendarCommand) -> Result<()> {
    match command {
        CalendarCommand::Google { id } => {
            let Some(event) = app.event_details(&id).await else {
                bail!("event {id} is unavailable");
            };
            let link = google_calendar_link(&event);
            if link == SENTINEL {
                bail!("event {id} has no usable date");
            }
            println!("{link}");
        }
        CalendarCommand::Ics { id, output } => {
            let Some(event) = app.event_details(&id).await else {
                bail!("event {id} is unavailable");
            };
            let link = ical_link_in(&event, &output)?;
            match link.persist() {
                Some(path) => println!("{}", path.display()),
                None => bail!("event {id} has no usable date"),
            }
        }
    }

    Ok(())
}
