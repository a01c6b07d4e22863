use std::{
    collections::{HashMap, HashSet},
    fmt,
    sync::Arc,
};

use async_trait::async_trait;
use futures::future::BoxFuture;

use super::{
    content::{Content, ContentSink},
    error::{ComposeError, require_name},
};

/// Deferred producer of a named section.
///
/// Invoked by the composer when a layout pulls the section; it writes straight
/// into whatever sink is active at that moment.
#[async_trait]
pub trait SectionRenderer: Send + Sync {
    async fn render(&self, sink: &mut dyn ContentSink) -> Result<(), ComposeError>;
}

/// Pre-rendered markup acts as its own renderer.
#[async_trait]
impl SectionRenderer for Content {
    async fn render(&self, sink: &mut dyn ContentSink) -> Result<(), ComposeError> {
        sink.write(self).await?;
        Ok(())
    }
}

/// Adapter turning a closure into a [`SectionRenderer`]. Build it with
/// [`section_fn`].
pub struct FnSection<F> {
    render: F,
}

/// Wrap a closure returning a boxed future as a section renderer.
///
/// ```ignore
/// let scripts = section_fn(|sink| Box::pin(async move {
///     sink.write_str("<script src=\"/app.js\"></script>").await?;
///     Ok(())
/// }));
/// ```
pub fn section_fn<F>(render: F) -> FnSection<F>
where
    F: for<'a> Fn(&'a mut dyn ContentSink) -> BoxFuture<'a, Result<(), ComposeError>>
        + Send
        + Sync,
{
    FnSection { render }
}

#[async_trait]
impl<F> SectionRenderer for FnSection<F>
where
    F: for<'a> Fn(&'a mut dyn ContentSink) -> BoxFuture<'a, Result<(), ComposeError>>
        + Send
        + Sync,
{
    async fn render(&self, sink: &mut dyn ContentSink) -> Result<(), ComposeError> {
        (self.render)(sink).await
    }
}

/// Case-insensitive section identifier. Keeps the spelling it was created
/// with for messages.
#[derive(Clone)]
pub struct SectionName {
    display: String,
    folded: String,
}

impl SectionName {
    pub fn new(name: &str) -> Self {
        Self {
            display: name.to_string(),
            folded: fold(name),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.display
    }

    pub(crate) fn key(&self) -> &str {
        &self.folded
    }
}

impl PartialEq for SectionName {
    fn eq(&self, other: &Self) -> bool {
        self.folded == other.folded
    }
}

impl Eq for SectionName {}

impl std::hash::Hash for SectionName {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.folded.hash(state);
    }
}

impl fmt::Debug for SectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.display, f)
    }
}

impl fmt::Display for SectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

pub(crate) fn fold(name: &str) -> String {
    name.to_lowercase()
}

struct SectionEntry {
    name: SectionName,
    renderer: Arc<dyn SectionRenderer>,
}

/// Sections a content page hands to its layout.
#[derive(Default)]
pub struct SectionRegistry {
    entries: Vec<SectionEntry>,
    index: HashMap<String, usize>,
}

impl SectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `renderer` under `name`. A name may be defined once per registry.
    pub fn define(
        &mut self,
        name: &str,
        renderer: Arc<dyn SectionRenderer>,
    ) -> Result<(), ComposeError> {
        require_name(name, "name")?;
        let name = SectionName::new(name);
        if self.index.contains_key(name.key()) {
            return Err(ComposeError::conflict(name.as_str()));
        }

        self.index.insert(name.key().to_string(), self.entries.len());
        self.entries.push(SectionEntry { name, renderer });
        Ok(())
    }

    pub fn has(&self, name: &str) -> bool {
        self.index.contains_key(&fold(name))
    }

    /// Look up a renderer. Absence is not an error here; callers decide
    /// whether the section was required.
    pub fn get(&self, name: &str) -> Option<Arc<dyn SectionRenderer>> {
        self.index
            .get(&fold(name))
            .map(|&position| Arc::clone(&self.entries[position].renderer))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Defined names in definition order.
    pub fn names(&self) -> impl Iterator<Item = &SectionName> {
        self.entries.iter().map(|entry| &entry.name)
    }

    /// Defined names missing from both `rendered` and `ignored`.
    pub(crate) fn unconsumed(
        &self,
        rendered: &HashSet<SectionName>,
        ignored: &HashSet<SectionName>,
    ) -> Vec<SectionName> {
        self.names()
            .filter(|name| !rendered.contains(*name) && !ignored.contains(*name))
            .cloned()
            .collect()
    }
}

impl fmt::Debug for SectionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SectionRegistry")
            .field("sections", &self.names().collect::<Vec<_>>())
            .finish()
    }
}
