use super::{Axis, MarkupSelector, SelectableElement};
use crate::error::MarkupError;
use crate::handler::AttributeSpans;
use crate::mode::TemplateMode;
use crate::span::Span;

/// Tracks the element structure of a parse and reports which selectors match
/// each element once its start tag is complete.
///
/// Callers feed it the element events of one document in order. Selector
/// indices refer to the order the selectors were supplied in.
pub trait NodeSelection {
    fn element_start(&mut self, buffer: &str, name: Span);

    fn attribute(&mut self, buffer: &str, attribute: &AttributeSpans);

    /// The start tag begun by the last `element_start` is complete. Returns
    /// the indices of the matching selectors, ascending. A non-standalone
    /// element stays open until `element_end`.
    fn element_start_complete(&mut self, standalone: bool) -> &[usize];

    /// The innermost open element was closed, explicitly or implicitly.
    fn element_end(&mut self);
}

/// Step prefixes matched for one open element, flattened over all selectors.
/// Selector `i` owns slots `offsets[i]..=offsets[i] + steps`; slot `k` of it
/// stands for its first `k` steps.
#[derive(Clone, Debug)]
struct PrefixMatches {
    /// The first `k` steps match with step `k - 1` on this element.
    here: Vec<bool>,
    /// Union of `here` over this element and all its ancestors.
    within: Vec<bool>,
}

/// [`NodeSelection`] over [`MarkupSelector`] paths.
///
/// Keeps, for every open element, the elements already started at its depth
/// under the same parent. The innermost entry of each level is the open
/// element itself, so the current path is the last entry of every level.
///
/// Matching is incremental: each open element records which step prefixes of
/// each selector end on it, so a new element only extends its parent's
/// record.
#[derive(Debug)]
pub struct PathNodeSelection {
    mode: TemplateMode,
    selectors: Vec<MarkupSelector>,
    offsets: Vec<usize>,
    prefix_slots: usize,
    levels: Vec<Vec<SelectableElement>>,
    /// One record per open element, innermost last.
    open: Vec<PrefixMatches>,
    pending: Option<SelectableElement>,
    matched: Vec<usize>,
}

impl PathNodeSelection {
    pub fn new(selectors: Vec<MarkupSelector>, mode: TemplateMode) -> Self {
        let mut offsets = Vec::with_capacity(selectors.len());
        let mut prefix_slots = 0;
        for selector in &selectors {
            offsets.push(prefix_slots);
            prefix_slots += selector.steps().len() + 1;
        }
        Self {
            mode,
            selectors,
            offsets,
            prefix_slots,
            levels: vec![Vec::new()],
            open: Vec::new(),
            pending: None,
            matched: Vec::new(),
        }
    }

    pub fn parse<S: AsRef<str>>(
        selectors: impl IntoIterator<Item = S>,
        mode: TemplateMode,
    ) -> Result<Self, MarkupError> {
        let selectors = selectors
            .into_iter()
            .map(|s| MarkupSelector::parse(s.as_ref(), mode))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(selectors, mode))
    }

    pub fn selectors(&self) -> &[MarkupSelector] {
        &self.selectors
    }

    /// Number of currently open elements.
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }
}

impl NodeSelection for PathNodeSelection {
    fn element_start(&mut self, buffer: &str, name: Span) {
        self.pending = Some(SelectableElement {
            name: self.mode.normalize_name(name.slice(buffer)),
            attributes: Vec::new(),
        });
    }

    fn attribute(&mut self, buffer: &str, attribute: &AttributeSpans) {
        if let Some(element) = self.pending.as_mut() {
            element.attributes.push((
                self.mode.normalize_name(attribute.name.slice(buffer)),
                attribute.value_content.slice(buffer).to_string(),
            ));
        }
    }

    fn element_start_complete(&mut self, standalone: bool) -> &[usize] {
        self.matched.clear();
        let Some(element) = self.pending.take() else {
            return &self.matched;
        };
        let depth = self.depth();
        let level = &mut self.levels[depth];
        level.push(element);
        let Some((element, preceding)) = level.split_last() else {
            return &self.matched;
        };
        let parent = self.open.last();
        let mut record = PrefixMatches {
            here: vec![false; self.prefix_slots],
            within: Vec::new(),
        };
        for ((i, selector), &offset) in self.selectors.iter().enumerate().zip(&self.offsets) {
            record.here[offset] = true;
            for (k, step) in selector.steps().iter().enumerate() {
                let prefix = offset + k;
                let reached = match (step.axis, k, parent) {
                    (Axis::Child, 0, _) => depth == 0,
                    (Axis::Descendant, 0, _) => true,
                    (_, _, None) => false,
                    (Axis::Child, _, Some(parent)) => parent.here[prefix],
                    (Axis::Descendant, _, Some(parent)) => parent.within[prefix],
                };
                if reached && step.matches(element, preceding) {
                    record.here[prefix + 1] = true;
                }
            }
            if record.here[offset + selector.steps().len()] {
                self.matched.push(i);
            }
        }
        if !standalone {
            record.within = match parent {
                Some(parent) => parent
                    .within
                    .iter()
                    .zip(&record.here)
                    .map(|(&above, &here)| above || here)
                    .collect(),
                None => record.here.clone(),
            };
            self.open.push(record);
            self.levels.push(Vec::new());
        }
        &self.matched
    }

    fn element_end(&mut self) {
        if self.levels.len() > 1 {
            self.levels.pop();
            self.open.pop();
        }
    }
}
