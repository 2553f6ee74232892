//! Catalogue backed by Fluent (`.ftl`) sources.
//!
//! Sources are registered per culture as embedded strings and/or discovered
//! under a directory root laid out as `<root>/<culture>/*.ftl`. Loading
//! parses every source with `fluent-syntax` and flattens messages, message
//! attributes (`message.attribute`), and terms (`-term`) into one lookup
//! table per culture. Later sources override earlier ones.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use fluent_syntax::ast::{Attribute, Entry};
use fluent_syntax::parser;
use unic_langid::LanguageIdentifier;

use super::{CatalogError, LookupCatalog, Template};

const EMBEDDED_ORIGIN: &str = "<embedded>";

/// A source text and where it came from.
struct Source {
    origin: Cow<'static, str>,
    text: String,
}

/// [`LookupCatalog`] over embedded Fluent strings and `.ftl` directories.
///
/// # Examples
///
/// ```rust
/// use content_loc::{FluentCatalog, LookupCatalog, langid};
///
/// let mut catalog = FluentCatalog::new()
///     .with_resource(langid!("en-US"), "hud.health = Health: { $value }");
/// catalog.load_culture(&langid!("en-US")).expect("source parses");
/// assert!(catalog.resolve("hud.health", &langid!("en-US")).is_some());
/// ```
#[derive(Default)]
pub struct FluentCatalog {
    embedded: HashMap<LanguageIdentifier, Vec<String>>,
    root: Option<Utf8PathBuf>,
    loaded: HashMap<LanguageIdentifier, HashMap<String, Template>>,
}

impl FluentCatalog {
    /// Creates a catalogue with no sources.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an embedded Fluent source for `culture`.
    #[must_use]
    pub fn with_resource(mut self, culture: LanguageIdentifier, source: impl Into<String>) -> Self {
        self.embedded.entry(culture).or_default().push(source.into());
        self
    }

    /// Reads `<root>/<culture>/*.ftl` whenever a culture is loaded or reloaded.
    #[must_use]
    pub fn with_directory(mut self, root: impl Into<Utf8PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Number of addressable entries loaded for `culture`.
    #[must_use]
    pub fn entry_count(&self, culture: &LanguageIdentifier) -> usize {
        self.loaded.get(culture).map_or(0, HashMap::len)
    }

    fn sources_for(&self, culture: &LanguageIdentifier) -> Result<Vec<Source>, CatalogError> {
        let mut sources: Vec<Source> = self
            .embedded
            .get(culture)
            .into_iter()
            .flatten()
            .map(|text| Source {
                origin: Cow::Borrowed(EMBEDDED_ORIGIN),
                text: text.clone(),
            })
            .collect();
        if let Some(root) = &self.root {
            sources.extend(read_directory(&root.join(culture.to_string()))?);
        }
        Ok(sources)
    }

    fn build(&self, culture: &LanguageIdentifier) -> Result<HashMap<String, Template>, CatalogError> {
        let mut entries = HashMap::new();
        for source in self.sources_for(culture)? {
            let resource = parser::parse(dash_dotted_ids(&source.text)).map_err(
                |(_resource, errors)| CatalogError::Parser {
                    locale: culture.clone(),
                    origin: source.origin.clone().into_owned(),
                    errors,
                },
            )?;
            for entry in resource.body {
                collect_entry(&mut entries, entry, culture);
            }
        }
        Ok(entries)
    }
}

impl LookupCatalog for FluentCatalog {
    fn load_culture(&mut self, culture: &LanguageIdentifier) -> Result<(), CatalogError> {
        if self.loaded.contains_key(culture) {
            return Ok(());
        }
        let entries = self.build(culture)?;
        tracing::debug!(culture = %culture, entries = entries.len(), "loaded catalogue");
        self.loaded.insert(culture.clone(), entries);
        Ok(())
    }

    fn has_culture(&self, culture: &LanguageIdentifier) -> bool {
        self.loaded.contains_key(culture)
    }

    fn reload_all(&mut self) -> Result<(), CatalogError> {
        let rebuilt = self
            .loaded
            .keys()
            .map(|culture| Ok((culture.clone(), self.build(culture)?)))
            .collect::<Result<HashMap<_, _>, CatalogError>>()?;
        self.loaded = rebuilt;
        Ok(())
    }

    fn resolve(&self, id: &str, culture: &LanguageIdentifier) -> Option<&Template> {
        let entries = self.loaded.get(culture)?;
        entries
            .get(id)
            .or_else(|| entries.get(&*dash_identifier(id)))
    }
}

impl fmt::Debug for FluentCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FluentCatalog")
            .field("embedded_cultures", &self.embedded.keys().collect::<Vec<_>>())
            .field("root", &self.root)
            .field("loaded_cultures", &self.loaded.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn collect_entry(
    entries: &mut HashMap<String, Template>,
    entry: Entry<String>,
    culture: &LanguageIdentifier,
) {
    let (key, value, attributes) = match entry {
        Entry::Message(message) => (message.id.name, message.value, message.attributes),
        Entry::Term(term) => (format!("-{}", term.id.name), Some(term.value), term.attributes),
        Entry::Junk { content } => {
            tracing::debug!(culture = %culture, junk = %content.trim(), "skipping junk entry");
            return;
        }
        _ => return,
    };
    for Attribute { id, value } in attributes {
        insert_entry(entries, format!("{key}.{}", id.name), value, culture);
    }
    if let Some(value) = value {
        insert_entry(entries, key, value, culture);
    }
}

fn insert_entry(
    entries: &mut HashMap<String, Template>,
    key: String,
    value: Template,
    culture: &LanguageIdentifier,
) {
    if entries.contains_key(&key) {
        tracing::debug!(culture = %culture, id = %key, "later catalogue source overrides entry");
    }
    entries.insert(key, value);
}

fn read_directory(dir: &Utf8Path) -> Result<Vec<Source>, CatalogError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let io_error = |failed: &Utf8Path| {
        let path = failed.to_path_buf();
        move |source| CatalogError::Io { path, source }
    };

    let mut paths = Vec::new();
    for item in dir.read_dir_utf8().map_err(io_error(dir))? {
        let entry = item.map_err(io_error(dir))?;
        let path = entry.path();
        if path.extension() == Some("ftl") && path.is_file() {
            paths.push(path.to_path_buf());
        }
    }
    paths.sort();

    paths
        .into_iter()
        .map(|path| {
            let text = std::fs::read_to_string(&path).map_err(io_error(&path))?;
            Ok(Source {
                origin: Cow::Owned(path.into_string()),
                text,
            })
        })
        .collect()
}

/// Fluent identifiers cannot contain `.`; dotted ids map onto dashes.
fn dash_identifier(id: &str) -> Cow<'_, str> {
    if id.contains('.') {
        Cow::Owned(id.replace('.', "-"))
    } else {
        Cow::Borrowed(id)
    }
}

/// A candidate message id starts with a letter and continues with letters,
/// digits, `-`, `_`, or `.`.
fn looks_like_message_id(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    chars.next().is_some_and(char::is_alphabetic)
        && chars.all(|ch| ch.is_alphanumeric() || matches!(ch, '-' | '_' | '.'))
}

/// Rewrites dotted top-level message ids (`hud.health = ...`) to the dashed
/// form Fluent accepts. Indented lines, comments, and terms pass through.
fn dash_dotted_ids(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    for (index, line) in source.lines().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        let rewritten = line
            .split_once('=')
            .filter(|(head, _)| !head.starts_with(char::is_whitespace))
            .and_then(|(head, tail)| {
                let id = head.trim_end();
                let padding = head.strip_prefix(id).unwrap_or_default();
                (id.contains('.') && looks_like_message_id(id))
                    .then(|| format!("{}{padding}={tail}", dash_identifier(id)))
            });
        match rewritten {
            Some(line) => out.push_str(&line),
            None => out.push_str(line),
        }
    }
    out
}
