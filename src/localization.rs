use anyhow::Result;
use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource};
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::error;
use unic_langid::LanguageIdentifier;

pub const DEFAULT_LANGUAGE: &str = "en";

/// Fluent resources compiled into the binary, keyed by language
const RESOURCES: &[(&str, &str)] = &[
    ("en", include_str!("../locales/en/main.ftl")),
    ("fr", include_str!("../locales/fr/main.ftl")),
];

/// Localization manager for the bot's user-facing strings
pub struct LocalizationManager {
    bundles: HashMap<String, FluentBundle<FluentResource>>,
}

impl LocalizationManager {
    /// Create a new localization manager with every embedded language loaded
    pub fn new() -> Result<Self> {
        let mut bundles = HashMap::new();

        for (language, source) in RESOURCES {
            let locale: LanguageIdentifier = language.parse()?;
            bundles.insert(language.to_string(), Self::create_bundle(locale, source));
        }

        Ok(Self { bundles })
    }

    /// Create a fluent bundle for a specific locale
    fn create_bundle(locale: LanguageIdentifier, source: &str) -> FluentBundle<FluentResource> {
        let mut bundle = FluentBundle::new_concurrent(vec![locale.clone()]);
        // Replies are plain Telegram text, no bidi isolation marks around arguments
        bundle.set_use_isolating(false);

        match FluentResource::try_new(source.to_string()) {
            Ok(resource) => {
                if let Err(errors) = bundle.add_resource(resource) {
                    error!(locale = %locale, ?errors, "Conflicting messages in locale resource");
                }
            }
            Err((_, errors)) => {
                error!(locale = %locale, ?errors, "Failed to parse locale resource");
            }
        }

        bundle
    }

    /// Whether a language (or its primary subtag) has a bundle
    pub fn is_language_supported(&self, language: &str) -> bool {
        self.bundles.contains_key(primary_subtag(language))
    }

    /// Get a localized message, falling back to English for unknown languages
    pub fn get_message_in_language(
        &self,
        key: &str,
        language: &str,
        args: Option<&HashMap<&str, &str>>,
    ) -> String {
        let bundle = match self
            .bundles
            .get(primary_subtag(language))
            .or_else(|| self.bundles.get(DEFAULT_LANGUAGE))
        {
            Some(bundle) => bundle,
            None => return format!("Missing translation: {key}"),
        };

        let pattern = match bundle.get_message(key).and_then(|msg| msg.value()) {
            Some(pattern) => pattern,
            None => return format!("Missing translation: {key}"),
        };

        let fluent_args = args.map(|args| {
            let mut fluent_args = FluentArgs::new();
            for (name, value) in args {
                fluent_args.set(*name, *value);
            }
            fluent_args
        });

        let mut errors = vec![];
        let value = bundle.format_pattern(pattern, fluent_args.as_ref(), &mut errors);
        if !errors.is_empty() {
            error!(key, ?errors, "Errors while formatting localized message");
        }
        value.into_owned()
    }
}

/// `fr-CA` → `fr`
fn primary_subtag(language: &str) -> &str {
    language.split(['-', '_']).next().unwrap_or(language)
}

static LOCALIZATION_MANAGER: LazyLock<Option<LocalizationManager>> =
    LazyLock::new(|| match LocalizationManager::new() {
        Ok(manager) => Some(manager),
        Err(e) => {
            error!(error = %e, "Failed to initialize localization");
            None
        }
    });

/// Localized message in the user's language, English when unknown
pub fn t_lang(key: &str, language_code: Option<&str>) -> String {
    t_args_lang(key, &[], language_code)
}

/// Localized message with arguments in the user's language
pub fn t_args_lang(key: &str, args: &[(&str, &str)], language_code: Option<&str>) -> String {
    let Some(manager) = LOCALIZATION_MANAGER.as_ref() else {
        return format!("Missing translation: {key}");
    };
    let language = language_code.unwrap_or(DEFAULT_LANGUAGE);
    if args.is_empty() {
        manager.get_message_in_language(key, language, None)
    } else {
        let args_map: HashMap<&str, &str> = args.iter().cloned().collect();
        manager.get_message_in_language(key, language, Some(&args_map))
    }
}
