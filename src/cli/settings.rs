use colored::Colorize;

use crate::error::{Result, TallyError};
use crate::settings::{load_settings, save_settings, Settings};

fn format_settings(s: &Settings) -> String {
    let company = if s.company_name.is_empty() {
        "(not set)".dimmed().to_string()
    } else {
        s.company_name.clone()
    };
    format!(
        "Company:          {company}\nCurrency prefix:  {}\nExport directory: {}",
        s.currency_prefix, s.export_dir
    )
}

pub fn run(
    company: Option<String>,
    currency: Option<String>,
    export_dir: Option<String>,
) -> Result<()> {
    let mut settings = load_settings();
    let changed = company.is_some() || currency.is_some() || export_dir.is_some();

    if let Some(name) = company {
        settings.company_name = name.trim().to_string();
    }
    if let Some(prefix) = currency {
        let prefix = prefix.trim().to_string();
        if prefix.is_empty() {
            return Err(TallyError::Settings("currency prefix cannot be empty".into()));
        }
        settings.currency_prefix = prefix;
    }
    if let Some(dir) = export_dir {
        settings.export_dir = dir;
    }

    if changed {
        save_settings(&settings)?;
        println!("{}", "Settings saved.".green());
    }
    println!("{}", format_settings(&settings));
    Ok(())
}
