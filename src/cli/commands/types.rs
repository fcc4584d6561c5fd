use clap::Args;
use std::sync::Arc;

use crate::cli::OutputFormat;
use crate::config;
use crate::database::MemoryGenderStore;
use crate::i18n::Translator;
use crate::services::GenderService;

#[derive(Args, Debug)]
pub struct TypesArgs {
    #[arg(long, help = "Locale tag used for labels and ordering")]
    pub locale: Option<String>,
}

pub fn handle(args: TypesArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    // The type list never touches storage
    let service = GenderService::new(
        Arc::new(MemoryGenderStore::new()),
        Translator::new(&config::config().locale.default_locale),
    );
    let ctx = service.context(0, args.locale.as_deref());
    let types = service.types(&ctx);

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&types)?),
        OutputFormat::Text => {
            for t in types {
                println!("{}  {}", t.id, t.name);
            }
        }
    }
    Ok(())
}
