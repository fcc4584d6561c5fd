//! Translation lookup for the labels and messages this service renders.
//!
//! Keys follow the `group.key` convention of the web application's
//! translation files. Unknown keys come back verbatim.

use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const FALLBACK_LOCALE: &str = "en";

macro_rules! genders_key {
    ($suffix:literal) => {
        concat!("settings.personalization_genders_", $suffix)
    };
}

pub const GENDERS_MODAL_ERROR: &str = genders_key!("modal_error");

/// Translation key of a gender type label, e.g. `settings.personalization_genders_male`
pub fn gender_type_key(label: &str) -> String {
    format!("{}{}", genders_key!(""), label)
}

type Catalog = HashMap<&'static str, &'static str>;

static CATALOGS: Lazy<HashMap<&'static str, Catalog>> = Lazy::new(|| {
    let mut catalogs = HashMap::new();
    catalogs.insert(
        "en",
        catalog(&[
            (genders_key!("male"), "Male"),
            (genders_key!("female"), "Female"),
            (genders_key!("other"), "Other"),
            (genders_key!("unknown"), "Unknown"),
            (genders_key!("none"), "Rather not say"),
            (genders_key!("modal_error"), "Please choose a valid gender from the list."),
        ]),
    );
    catalogs.insert(
        "fr",
        catalog(&[
            (genders_key!("male"), "Masculin"),
            (genders_key!("female"), "Féminin"),
            (genders_key!("other"), "Autre"),
            (genders_key!("unknown"), "Inconnu"),
            (genders_key!("none"), "Ne souhaite pas préciser"),
            (genders_key!("modal_error"), "Veuillez choisir un genre valide dans la liste."),
        ]),
    );
    catalogs.insert(
        "de",
        catalog(&[
            (genders_key!("male"), "Männlich"),
            (genders_key!("female"), "Weiblich"),
            (genders_key!("other"), "Divers"),
            (genders_key!("unknown"), "Unbekannt"),
            (genders_key!("none"), "Keine Angabe"),
            (genders_key!("modal_error"), "Bitte wähle ein gültiges Geschlecht aus der Liste."),
        ]),
    );
    catalogs.insert(
        "es",
        catalog(&[
            (genders_key!("male"), "Masculino"),
            (genders_key!("female"), "Femenino"),
            (genders_key!("other"), "Otro"),
            (genders_key!("unknown"), "Desconocido"),
            (genders_key!("none"), "Prefiero no decirlo"),
            (genders_key!("modal_error"), "Por favor, elige un género válido de la lista."),
        ]),
    );
    catalogs.insert(
        "pt",
        catalog(&[
            (genders_key!("male"), "Masculino"),
            (genders_key!("female"), "Feminino"),
            (genders_key!("other"), "Outro"),
            (genders_key!("unknown"), "Desconhecido"),
            (genders_key!("none"), "Prefiro não dizer"),
            (genders_key!("modal_error"), "Por favor, escolha um gênero válido da lista."),
        ]),
    );
    catalogs
});

fn catalog(entries: &[(&'static str, &'static str)]) -> Catalog {
    entries.iter().copied().collect()
}

/// Resolves locales against the available catalogs and looks up keys
#[derive(Debug, Clone)]
pub struct Translator {
    default_locale: &'static str,
}

impl Translator {
    pub fn new(default_locale: &str) -> Self {
        let default_locale = supported(default_locale).unwrap_or_else(|| {
            tracing::warn!(
                "Default locale '{}' has no catalog, using '{}'",
                default_locale,
                FALLBACK_LOCALE
            );
            FALLBACK_LOCALE
        });
        Self { default_locale }
    }

    pub fn default_locale(&self) -> &'static str {
        self.default_locale
    }

    /// Pick the catalog for a requested tag (`fr`, `fr-CA`, `pt_BR`, ...),
    /// falling back to its language, then to the default locale.
    pub fn resolve(&self, requested: Option<&str>) -> &'static str {
        requested.and_then(supported).unwrap_or(self.default_locale)
    }

    pub fn trans(&self, locale: &str, key: &str) -> String {
        [locale, self.default_locale]
            .iter()
            .find_map(|l| CATALOGS.get(l).and_then(|c| c.get(key)))
            .map(|s| s.to_string())
            .unwrap_or_else(|| key.to_string())
    }
}

fn supported(tag: &str) -> Option<&'static str> {
    let normalized = tag.trim().replace('_', "-").to_ascii_lowercase();
    let language = normalized.split('-').next().unwrap_or_default();
    CATALOGS.keys().copied().find(|k| *k == normalized || *k == language)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_region_tags_to_language() {
        let t = Translator::new("en");
        assert_eq!(t.resolve(Some("fr_FR")), "fr");
        assert_eq!(t.resolve(Some("pt-BR")), "pt");
        assert_eq!(t.resolve(Some("DE")), "de");
    }

    #[test]
    fn unknown_locale_falls_back_to_default() {
        let t = Translator::new("fr");
        assert_eq!(t.resolve(Some("tlh")), "fr");
        assert_eq!(t.resolve(None), "fr");
    }

    #[test]
    fn unsupported_default_becomes_english() {
        assert_eq!(Translator::new("xx").default_locale(), "en");
    }

    #[test]
    fn translates_type_labels() {
        let t = Translator::new("en");
        assert_eq!(t.trans("fr", "settings.personalization_genders_female"), "Féminin");
        assert_eq!(t.trans("en", "settings.personalization_genders_male"), "Male");
    }

    #[test]
    fn missing_key_returns_key() {
        let t = Translator::new("en");
        assert_eq!(t.trans("de", "settings.nope"), "settings.nope");
    }
}
