mod terminal;

use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ums_core::{ClientConfig, CreateUserPage, Field, HttpUserApi, UserApi, UserListPage};

use terminal::{render_errors, render_list, render_user, Terminal};

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Parser)]
#[command(name = "ums", about = "User management client")]
struct Cli {
    /// Backend base URL. Defaults to UMS_API_BASE_URL, then the local dev server.
    #[arg(long)]
    base_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show every user
    List,
    /// Show one user by id
    Get { id: String },
    /// Create a user through the create-user form
    Create {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        phone_number: Option<String>,
    },
    /// Delete a user (not available yet)
    Delete { id: String, username: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e.into());
        }
    }

    let cli = Cli::parse();
    let config = match cli.base_url.as_deref() {
        Some(url) => ClientConfig::new(url),
        None => ClientConfig::from_env(),
    };
    tracing::debug!(base_url = %config.base_url, "using backend");
    let api = Arc::new(HttpUserApi::from_config(&config)?);
    let terminal = Arc::new(Terminal);

    match cli.command {
        Command::List => {
            let page = UserListPage::new(api, terminal);
            page.activate().await;
            print!("{}", render_list(page.title(), &page.view(), page.create_path()));
            page.deactivate();
        }
        Command::Get { id } => {
            let user = api.get_user_by_id(&id).await?;
            print!("{}", render_user(&user));
        }
        Command::Create {
            username,
            email,
            password,
            first_name,
            last_name,
            phone_number,
        } => {
            let mut page = CreateUserPage::new(api, terminal.clone(), terminal);
            let form = page.form_mut();
            form.set(Field::Username, username);
            form.set(Field::Email, email);
            form.set(Field::Password, password);
            for (field, value) in [
                (Field::FirstName, first_name),
                (Field::LastName, last_name),
                (Field::PhoneNumber, phone_number),
            ] {
                if let Some(value) = value {
                    form.set(field, value);
                }
            }

            match page.handle_submit().await {
                Ok(Some(user)) => print!("{}", render_user(&user)),
                Ok(None) => bail!(
                    "{}",
                    page.form().error.as_deref().unwrap_or("user was not created")
                ),
                Err(errors) => {
                    eprint!("{}", render_errors(&errors));
                    bail!("the form has invalid fields");
                }
            }
        }
        Command::Delete { id, username } => {
            let page = UserListPage::new(api, terminal);
            page.delete_user(&id, &username)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_log_filter_shows_info() {
        let filter = tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER);
        assert_eq!(filter.max_level_hint(), Some(tracing::level_filters::LevelFilter::INFO));
    }

    #[test]
    fn create_requires_credentials() {
        assert!(Cli::try_parse_from(["ums", "create", "--username", "jdoe"]).is_err());
        let cli = Cli::try_parse_from(["ums", "--base-url", "http://h/api", "list"]).unwrap();
        assert_eq!(cli.base_url.as_deref(), Some("http://h/api"));
        assert!(matches!(cli.command, Command::List));
    }
}
