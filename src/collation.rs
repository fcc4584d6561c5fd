//! Locale-aware ordering of display names.

use icu::collator::{Collator, CollatorOptions};
use icu::locid::Locale;

/// Build a collator for a BCP-47-ish tag. Unparseable tags get the root collation.
pub fn collator_for(tag: &str) -> Option<Collator> {
    let locale: Locale = tag.replace('_', "-").parse().unwrap_or_default();
    let data_locale = (&locale).into();

    match Collator::try_new(&data_locale, CollatorOptions::new()) {
        Ok(collator) => Some(collator),
        Err(e) => {
            tracing::warn!("No collator for locale '{}': {}", tag, e);
            None
        }
    }
}

/// Stable sort of `items` by the string `key` returns, using the collation
/// rules of `locale`. Falls back to code-point order only when no collator
/// can be built at all.
pub fn sort_by_collator<T, F>(items: &mut [T], locale: &str, key: F)
where
    F: Fn(&T) -> &str,
{
    match collator_for(locale) {
        Some(collator) => items.sort_by(|a, b| collator.compare(key(a), key(b))),
        None => items.sort_by(|a, b| key(a).cmp(key(b))),
    }
}
