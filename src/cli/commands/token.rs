use serde_json::json;

use crate::auth::Authenticator;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;

pub async fn handle(username: &str, password: &str, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let auth = Authenticator::from_config(&config.security)?;
    let login = auth.login(username, password)?;

    match output_format {
        OutputFormat::Text => {
            println!("{}", login.token);
            Ok(())
        }
        OutputFormat::Json => output_success(
            &output_format,
            &login.message,
            Some(json!({ "token": login.token, "user": login.user })),
        ),
    }
}
