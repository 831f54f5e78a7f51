use comfy_table::Table;

use crate::engine::ReportKind;
use crate::error::Result;

pub fn format_kinds() -> String {
    let mut table = Table::new();
    table.set_header(vec!["Kind", "Title", "File Prefix"]);
    for kind in ReportKind::ALL {
        table.add_row(vec![
            kind.key().to_string(),
            kind.title().to_string(),
            kind.file_prefix(),
        ]);
    }
    table.to_string()
}

pub fn run() -> Result<()> {
    println!("{}", format_kinds());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_every_kind() {
        let out = format_kinds();
        for kind in ReportKind::ALL {
            assert!(out.contains(&kind.file_prefix()), "{kind}");
        }
    }
}
