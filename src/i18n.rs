//! Internationalization (i18n) support for Chess Master.
//!
//! Provides locale detection from the command line, environment
//! variables, and system locale settings.
//!
//! Supported languages: en, de.

/// All locales supported by Chess Master.
pub const SUPPORTED_LOCALES: &[&str] = &["en", "de"];

/// Detects the best locale.
///
/// Priority:
/// 1. Explicit `requested` value (the `--lang` flag)
/// 2. `CHESSMASTER_LANG` environment variable
/// 3. System locale (via `sys-locale` crate)
/// 4. Fallback to `"en"`
pub fn detect_locale(requested: Option<&str>) -> String {
    // 1. Command line
    if let Some(locale) = requested.and_then(normalize_locale) {
        return locale;
    }

    // 2. Explicit environment variable
    if let Ok(lang) = std::env::var("CHESSMASTER_LANG")
        && let Some(locale) = normalize_locale(&lang)
    {
        return locale;
    }

    // 3. System locale
    if let Some(locale_str) = sys_locale::get_locale()
        && let Some(locale) = normalize_locale(&locale_str)
    {
        return locale;
    }

    // 4. Fallback
    "en".to_string()
}

/// Detects the locale and makes it the active one for `t!` lookups.
pub fn init_locale(requested: Option<&str>) -> String {
    let locale = detect_locale(requested);
    rust_i18n::set_locale(&locale);
    log::debug!("Using locale {}", locale);
    locale
}

/// Normalizes a locale string to one of the supported locales.
///
/// Accepts common formats: "en-US", "de_DE.UTF-8", "de", etc.
/// Returns `None` if the language is not supported.
pub fn normalize_locale(input: &str) -> Option<String> {
    let lower = input.trim().to_lowercase();
    // Strip encoding suffix (e.g. ".utf-8")
    let tag = lower.split('.').next().unwrap_or(&lower);
    // Normalize separator
    let tag = tag.replace('_', "-");
    let primary = tag.split('-').next().unwrap_or("");

    SUPPORTED_LOCALES
        .iter()
        .find(|&&l| l == primary)
        .map(|l| l.to_string())
}
