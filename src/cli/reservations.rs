use anyhow::Result;
use clap::Subcommand;
use eventdesk::{App, terminal::print_my_reservations};

#[derive(Subcommand)]
pub enum ReservationsCommand {
    /// List your reservations
    Mine,
    /// Cancel one of your reservations
    Cancel { id: String },
}

pub async fn run(app: &App, command: ReservationsCommand) -> Result<()> {
    match command {
        ReservationsCommand::Mine => {
            let reservations = app.my_reservations().await;
            print_my_reservations(&reservations);
        }
        ReservationsCommand::Cancel { id } => {
            app.cancel_reservation(&id).await?;
            let reservations = app.my_reservations().await;
            print_my_reservations(&reservations);
        }
    }

    Ok(())
}
