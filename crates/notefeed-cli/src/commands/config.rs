use notefeed_core::util::normalize_text_option;

use crate::cli::ConfigCommands;
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            profile,
            api_base_url,
            page_size,
            no_activate,
        } => run_config_init(
            profile.as_deref().or(global_profile),
            api_base_url,
            page_size,
            no_activate,
        ),
        ConfigCommands::Show { profile } => run_config_show(profile.as_deref().or(global_profile)),
    }
}

pub fn run_config_init(
    profile_name: Option<&str>,
    api_base_url: Option<String>,
    page_size: Option<u32>,
    no_activate: bool,
) -> Result<(), CliError> {
    let mut config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(profile_name);

    let merged_api_base_url = normalize_text_option(api_base_url).or_else(|| {
        normalize_text_option(std::env::var(notefeed_core::config::API_URL_ENV).ok())
    });

    let profile = config.profile_mut_or_default(&profile_name);
    if let Some(value) = merged_api_base_url {
        profile.api_base_url = Some(value);
    }
    if let Some(value) = page_size {
        profile.page_size = Some(value);
    }
    profile.validate().map_err(CliError::Config)?;
    let ready = profile.api_base_url().is_some();

    if !no_activate {
        config.active_profile = Some(profile_name.clone());
    }

    let path = config.save().map_err(CliError::Config)?;
    println!(
        "Profile '{}' initialized at {}",
        profile_name,
        path.display()
    );
    if ready {
        println!(
            "Profile '{profile_name}' is ready. Run `notefeed auth login --username <name> --password <password>`."
        );
    } else {
        println!("Profile '{profile_name}' is missing: api_base_url");
    }

    Ok(())
}

fn run_config_show(profile_name: Option<&str>) -> Result<(), CliError> {
    let config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(profile_name);
    let Some(profile) = config.profile(&profile_name) else {
        println!("Profile '{profile_name}' is not configured.");
        return Ok(());
    };

    let resolved = profile.client_config(None).map_err(CliError::Config)?;
    println!("profile:       {profile_name}");
    println!("api_base_url:  {}", resolved.api_base_url);
    println!("page_size:     {}", resolved.page_size);
    println!("toast_ttl_ms:  {}", resolved.toast_ttl_ms);
    match &resolved.bypass_header {
        Some(header) => println!("bypass_header: {}: {}", header.name, header.value),
        None => println!("bypass_header: (none)"),
    }
    Ok(())
}
