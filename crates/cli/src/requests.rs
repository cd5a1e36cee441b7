//! Shared first step of every command: settings, then the request sheet.

use zippkg_config::Settings;
use zippkg_core::{parse_requests, ParsedSheet};
use zippkg_io::xlsx::read_sheet_rows;

use crate::{CliError, GlobalArgs};

pub fn load_requests(global: &GlobalArgs) -> Result<(Settings, ParsedSheet), CliError> {
    let (mut settings, warnings) = Settings::load(&global.config);
    log::debug!(
        "settings from {} ({} warning(s))",
        global.config.display(),
        warnings.len()
    );
    settings.parse.sheet_name = global.sheet.clone();

    let rows = read_sheet_rows(&global.excel, &settings.parse.sheet_name)?;
    let parsed = parse_requests(&rows, &settings.parse);
    if parsed.schema.is_empty() {
        return Err(CliError::spreadsheet(format!(
            "no recognized columns in the header row of '{}' in {}",
            global.sheet,
            global.excel.display()
        ))
        .with_hint("the first row must name the columns, e.g. RefID, FileName, MimeType"));
    }
    Ok((settings, parsed))
}

pub fn print_parsed(global: &GlobalArgs, parsed: &ParsedSheet) {
    println!(
        "Parsed {} requests from sheet '{}' ({} rows skipped)",
        parsed.requests.len(),
        global.sheet,
        parsed.ignored_rows
    );
}
