use notefeed_core::auth::{Credentials, RegisterForm, RegisterRequest};
use notefeed_core::session::SessionPredicates;

use crate::cli::AuthCommands;
use crate::commands::common::{load_attachment, open_app};
use crate::error::CliError;

pub async fn run_auth(
    command: AuthCommands,
    global_profile: Option<&str>,
    api_url: Option<String>,
) -> Result<(), CliError> {
    let opened = open_app(global_profile, api_url)?;
    let profile_name = opened.profile_name.as_str();
    let app = &opened.app;

    match command {
        AuthCommands::Login { username, password } => {
            let payload = app
                .auth
                .login(&Credentials::new(username, password))
                .await?;
            let landing = app
                .navigator
                .current()
                .map_or_else(|| "/".to_string(), |route| route.path());
            println!(
                "Signed in profile '{profile_name}' as {} (landing page {landing})",
                payload.user.username
            );
        }
        AuthCommands::Register {
            username,
            email,
            name,
            password,
            picture,
        } => {
            let profile_picture = picture.as_deref().map(load_attachment).transpose()?;
            let form = RegisterForm {
                request: RegisterRequest {
                    username,
                    email,
                    name,
                    password,
                },
                profile_picture,
            };
            let payload = app.auth.register(form).await?;
            println!(
                "Registered and signed in profile '{profile_name}' as {}",
                payload.user.username
            );
        }
        AuthCommands::Status => {
            if !app.session.is_authenticated() {
                println!("Profile '{profile_name}' is not signed in.");
                return Ok(());
            }
            let user = app.session.current_user();
            let username = user
                .as_ref()
                .map_or("(unknown user)", |user| user.username.as_str());
            let role = if app.session.is_admin() { "admin" } else { "user" };
            println!(
                "Profile '{profile_name}' is signed in as {username} ({role}) against {}",
                app.config.api_base_url
            );
        }
        AuthCommands::Logout => {
            app.auth.logout()?;
            println!("Signed out profile '{profile_name}'");
        }
    }
    Ok(())
}
