use std::collections::HashMap;

use fluent_templates::{
    fluent_bundle::{FluentArgs, FluentValue},
    static_loader, Loader,
};
use once_cell::sync::Lazy;
use unic_langid::LanguageIdentifier;

use crate::storage::{load_session, SessionStore};

static_loader! {
    static LOCALES = {
        locales: "./locales",
        fallback_language: "en",
        // Telegram HTML does not need bidi isolation marks around arguments
        customise: |bundle| bundle.set_use_isolating(false),
    };
}

/// Supported languages (code, human-readable name).
pub static SUPPORTED_LANGS: &[(&str, &str)] = &[("en", "🇬🇧 English"), ("uk", "🇺🇦 Українська"), ("ru", "🇷🇺 Русский")];

/// Default language identifier used as a fallback.
static DEFAULT_LANG: Lazy<LanguageIdentifier> = Lazy::new(|| "en".parse().unwrap_or_default());

/// Normalizes a language code into a LanguageIdentifier (falls back to default).
pub fn lang_from_code(code: &str) -> LanguageIdentifier {
    match is_language_supported(code) {
        Some(supported) => supported.parse().unwrap_or_else(|_| DEFAULT_LANG.clone()),
        None => DEFAULT_LANG.clone(),
    }
}

/// Resolves the language stored in the user's preferences.
pub fn user_lang(store: &dyn SessionStore, user_id: i64) -> LanguageIdentifier {
    lang_from_code(&load_session(store, user_id).preferences.language)
}

/// Returns a localized string for the given key.
/// Converts literal `\n` sequences to actual newlines for proper Telegram formatting.
pub fn t(lang: &LanguageIdentifier, key: &str) -> String {
    let text = LOCALES
        .lookup(lang, key)
        .unwrap_or_else(|| LOCALES.lookup(&DEFAULT_LANG, key).unwrap_or_else(|| key.to_string()));
    text.replace("\\n", "\n")
}

/// Returns a localized string with arguments for interpolation.
/// Converts literal `\n` sequences to actual newlines for proper Telegram formatting.
pub fn t_args(lang: &LanguageIdentifier, key: &str, args: &FluentArgs) -> String {
    let args_map: HashMap<String, FluentValue> = args.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();

    let text = LOCALES.lookup_with_args(lang, key, &args_map).unwrap_or_else(|| {
        LOCALES
            .lookup_with_args(&DEFAULT_LANG, key, &args_map)
            .unwrap_or_else(|| key.to_string())
    });
    text.replace("\\n", "\n")
}

/// Finds a human-friendly name for a language code.
pub fn language_name(code: &str) -> &str {
    SUPPORTED_LANGS
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
        .unwrap_or("Unknown")
}

/// Checks if a language code is supported by the bot.
/// Returns the normalized language code if supported, None otherwise.
pub fn is_language_supported(code: &str) -> Option<&'static str> {
    // Normalize the code (e.g., "en-US" -> "en", "uk-UA" -> "uk")
    let normalized = code.split('-').next().unwrap_or(code).to_lowercase();

    SUPPORTED_LANGS
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(&normalized))
        .map(|(c, _)| *c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_known_translation() {
        let uk = lang_from_code("uk");
        let en = lang_from_code("en");

        assert_eq!(t(&en, "back"), "⬅️ Back");
        assert_eq!(t(&uk, "back"), "⬅️ Назад");
    }

    #[test]
    fn interpolates_arguments() {
        let en = lang_from_code("en");
        let mut args = FluentArgs::new();
        args.set("name", "Ann");
        assert_eq!(t_args(&en, "welcome", &args), "👋 Welcome, Ann!");
    }

    #[test]
    fn converts_newlines() {
        let en = lang_from_code("en");
        let text = t(&en, "file-too-large-hint");

        assert!(text.contains('\n'));
        assert!(!text.contains("\\n"));
    }

    #[test]
    fn falls_back_to_key_and_default_language() {
        let ru = lang_from_code("ru");
        assert_eq!(t(&ru, "definitely-missing-key"), "definitely-missing-key");
        assert_eq!(lang_from_code("de"), lang_from_code("en"));
    }

    #[test]
    fn test_is_language_supported() {
        assert_eq!(is_language_supported("en"), Some("en"));
        assert_eq!(is_language_supported("uk-UA"), Some("uk"));
        assert_eq!(is_language_supported("RU"), Some("ru"));
        assert_eq!(is_language_supported("fr"), None);
        assert_eq!(language_name("uk"), "🇺🇦 Українська");
    }
}
