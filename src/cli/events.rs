use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use eventdesk::{App, terminal};
use eventdesk_shared::{EventDraft, EventFilters, FilterField};

#[derive(Subcommand)]
pub enum EventsCommand {
    /// List published events
    List(ListArgs),
    /// Show one event
    Show { id: String },
    /// Create an event (administrators)
    Create(DraftArgs),
    /// Change an event (administrators); omitted fields keep their value
    Update {
        id: String,
        #[command(flatten)]
        draft: DraftArgs,
    },
    /// Delete an event (administrators)
    Delete { id: String },
    /// Reserve a spot
    Reserve { id: String },
}

impl EventsCommand {
    pub fn route(&self) -> String {
        match self {
            EventsCommand::List(_) => "/".to_owned(),
            EventsCommand::Show { id } | EventsCommand::Reserve { id } => format!("/events/{id}"),
            EventsCommand::Create(_) => "/events/create".to_owned(),
            EventsCommand::Update { id, .. } => format!("/admin/events/{id}/edit"),
            EventsCommand::Delete { .. } => "/admin/dashboard".to_owned(),
        }
    }
}

#[derive(Args)]
pub struct ListArgs {
    #[arg(long)]
    search: Option<String>,
    /// Earliest event date (YYYY-MM-DD)
    #[arg(long)]
    from: Option<String>,
    /// Latest event date (YYYY-MM-DD)
    #[arg(long)]
    to: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long, default_value_t = 10)]
    limit: u32,
}

impl ListArgs {
    fn filters(self) -> EventFilters {
        let mut filters = EventFilters::default();

        for (field, value) in [
            (FilterField::Search, self.search),
            (FilterField::StartDate, self.from),
            (FilterField::EndDate, self.to),
            (FilterField::Location, self.location),
        ] {
            if let Some(value) = value {
                filters.set(field, value);
            }
        }

        filters.page = self.page;
        filters.limit = self.limit;
        filters
    }
}

#[derive(Args)]
pub struct DraftArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// Local date and time, e.g. 2030-05-01T19:00
    #[arg(long)]
    date: Option<String>,
    #[arg(long)]
    capacity: Option<u32>,
    #[arg(long, conflicts_with = "online_link")]
    location: Option<String>,
    #[arg(long)]
    online_link: Option<String>,
}

impl DraftArgs {
    fn apply(self, mut draft: EventDraft) -> EventDraft {
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(date) = self.date {
            draft.event_date = date;
        }
        if let Some(capacity) = self.capacity {
            draft.max_capacity = capacity;
        }
        if let Some(location) = self.location {
            draft.location = location;
            draft.is_online = false;
        }
        if let Some(link) = self.online_link {
            draft.online_link = link;
            draft.is_online = true;
        }
        draft
    }
}

pub async fn run(app: &App, command: EventsCommand) -> Result<()> {
    match command {
        EventsCommand::List(args) => {
            let list = app.browse_events(&args.filters()).await;
            terminal::print_events(&list);
        }
        EventsCommand::Show { id } => {
            let Some(event) = app.event_details(&id).await else {
                bail!("event {id} is unavailable");
            };
            terminal::print_event(&event);
        }
        EventsCommand::Create(args) => {
            if let Some(event) = app.create_event(&args.apply(EventDraft::default())).await? {
                terminal::print_event(&event);
            }
        }
        EventsCommand::Update { id, draft } => {
            let Some(current) = app.edit_draft(&id).await else {
                bail!("event {id} cannot be edited");
            };
            if let Some(event) = app.update_event(&id, &draft.apply(current)).await? {
                terminal::print_event(&event);
            }
        }
        EventsCommand::Delete { id } => app.delete_event(&id).await?,
        EventsCommand::Reserve { id } => {
            if let Some(event) = app.reserve(&id).await? {
                terminal::print_event(&event);
            }
        }
    }

    Ok(())
}
