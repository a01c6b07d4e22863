use std::collections::HashSet;

use crate::domain::sections::SectionName;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum BodyDisposition {
    #[default]
    Pending,
    Rendered,
    Ignored,
}

/// Consumption bookkeeping for one layout execution.
///
/// Rendering is recorded as a fact and always wins over an ignore request, so
/// a name never ends up both rendered and ignored, and the body is never both.
#[derive(Debug, Default)]
pub struct RenderState {
    rendered_sections: HashSet<SectionName>,
    ignored_sections: HashSet<SectionName>,
    body: BodyDisposition,
}

impl RenderState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_section_rendered(&self, name: &SectionName) -> bool {
        self.rendered_sections.contains(name)
    }

    pub fn is_section_ignored(&self, name: &SectionName) -> bool {
        self.ignored_sections.contains(name)
    }

    pub(crate) fn mark_section_rendered(&mut self, name: SectionName) {
        self.ignored_sections.remove(&name);
        self.rendered_sections.insert(name);
    }

    pub(crate) fn mark_section_ignored(&mut self, name: SectionName) {
        if !self.rendered_sections.contains(&name) {
            self.ignored_sections.insert(name);
        }
    }

    pub(crate) fn rendered_sections(&self) -> &HashSet<SectionName> {
        &self.rendered_sections
    }

    pub(crate) fn ignored_sections(&self) -> &HashSet<SectionName> {
        &self.ignored_sections
    }

    pub fn body_rendered(&self) -> bool {
        self.body == BodyDisposition::Rendered
    }

    pub fn body_ignored(&self) -> bool {
        self.body == BodyDisposition::Ignored
    }

    pub(crate) fn mark_body_rendered(&mut self) {
        self.body = BodyDisposition::Rendered;
    }

    pub(crate) fn mark_body_ignored(&mut self) {
        if self.body == BodyDisposition::Pending {
            self.body = BodyDisposition::Ignored;
        }
    }
}
