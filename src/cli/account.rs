use anyhow::Result;
use clap::Args;
use eventdesk::{App, terminal::print_user};
use eventdesk_shared::{LoginRequest, ProfileUpdate, RegisterRequest};

use super::read_secret;

#[derive(Args)]
pub struct ProfileArgs {
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
}

fn password(password: Option<String>) -> Result<String> {
    match password {
        Some(password) => Ok(password),
        None => read_secret("Password"),
    }
}

pub async fn login(app: &App, email: String, password_arg: Option<String>) -> Result<()> {
    let request = LoginRequest {
        email,
        password: password(password_arg)?,
    };

    let user = app.login(&request).await?;
    print_user(&user);

    Ok(())
}

pub async fn register(
    app: &App,
    email: String,
    first_name: String,
    last_name: String,
    password_arg: Option<String>,
) -> Result<()> {
    let request = RegisterRequest {
        email,
        password: password(password_arg)?,
        first_name,
        last_name,
    };

    let user = app.register(&request).await?;
    print_user(&user);

    Ok(())
}

pub fn logout(app: &App) -> Result<()> {
    app.logout()?;
    Ok(())
}

pub fn whoami(app: &App) -> Result<()> {
    let user = app.require_session()?;
    print_user(&user);

    if let Some(expires_at) = app.session().token_expires_at() {
        println!("  token expires: {}", eventdesk_shared::format_display(&expires_at));
    }

    Ok(())
}

pub async fn profile(app: &App, args: ProfileArgs) -> Result<()> {
    let update = ProfileUpdate {
        email: args.email,
        first_name: args.first_name,
        last_name: args.last_name,
    };

    let user = app.update_profile(&update).await?;
    print_user(&user);

    Ok(())
}
