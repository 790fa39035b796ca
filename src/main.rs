#[macro_use]
extern crate rust_i18n;

i18n!("locales");

use ana_skills::cli;
use ana_skills::error::AnaSkillsError;
use ana_skills::init_locale;

fn main() {
    init_locale();

    if let Err(e) = cli::run() {
        let message = e
            .downcast_ref::<AnaSkillsError>()
            .map(AnaSkillsError::display_localized)
            .unwrap_or_else(|| format!("{e:#}"));
        eprintln!("{}", t!("messages.error", error = message));
        std::process::exit(1);
    }
}
