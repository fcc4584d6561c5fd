use clap::Args;
use serde_json::json;

use crate::auth::JwtKeys;
use crate::cli::OutputFormat;
use crate::config;

#[derive(Args, Debug)]
pub struct TokenArgs {
    #[arg(long, help = "Account the token is scoped to")]
    pub account: i64,

    #[arg(long, default_value_t = 1, help = "User id recorded in the token")]
    pub user: i64,

    #[arg(long, help = "Locale tag, e.g. fr or pt-BR")]
    pub locale: Option<String>,
}

pub fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let security = &config::config().security;
    let keys = JwtKeys::new(&security.jwt_secret, security.jwt_expiry_hours)?;
    let token = keys.issue(args.account, args.user, args.locale)?;

    match output_format {
        OutputFormat::Json => println!(
            "{}",
            json!({ "token": token, "expires_in_hours": security.jwt_expiry_hours })
        ),
        OutputFormat::Text => println!("{}", token),
    }
    Ok(())
}
