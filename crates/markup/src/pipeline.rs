//! Template parsing pipeline:
//! parser -> decoupled logic injection (when there is any) -> model builder.

use crate::decoupled::{
    DecoupledLogicCache, DecoupledLogicMarkupHandler, DecoupledLogicResolver,
    DecoupledTemplateLogic, StandardDecoupledLogicResolver, parse_decoupled_logic,
};
use crate::error::MarkupError;
use crate::mode::TemplateMode;
use crate::model::{TemplateModel, TemplateModelHandler};
use crate::parser::MarkupParser;
use crate::selector::PathNodeSelection;
use std::path::Path;
use std::sync::Arc;
use text::TextRepository;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParserConfig {
    pub mode: TemplateMode,
    /// Look up and apply decoupled logic resources for template files.
    pub decoupled_logic: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            mode: TemplateMode::Html,
            decoupled_logic: true,
        }
    }
}

pub struct MarkupTemplateParser<R: TextRepository> {
    config: ParserConfig,
    repository: R,
    resolver: Box<dyn DecoupledLogicResolver>,
    cache: DecoupledLogicCache,
}

impl<R: TextRepository> MarkupTemplateParser<R> {
    pub fn new(config: ParserConfig, repository: R) -> Self {
        Self {
            config,
            repository,
            resolver: Box::new(StandardDecoupledLogicResolver::default()),
            cache: DecoupledLogicCache::new(),
        }
    }

    pub fn with_resolver(mut self, resolver: impl DecoupledLogicResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn cache(&self) -> &DecoupledLogicCache {
        &self.cache
    }

    /// Parse `template`, injecting the attributes of `logic` if given.
    pub fn parse(
        &self,
        template: &str,
        logic: Option<&Arc<DecoupledTemplateLogic>>,
    ) -> Result<TemplateModel, MarkupError> {
        let mode = self.config.mode;
        let parser = MarkupParser::new(mode);
        let mut model = TemplateModelHandler::new(&self.repository);

        let Some(logic) = logic.filter(|logic| logic.has_injected_attributes()) else {
            parser.parse(template, &mut model)?;
            return Ok(model.into_model());
        };
        let selection = PathNodeSelection::parse(logic.selectors(), mode)?;
        let mut chain = DecoupledLogicMarkupHandler::new(Arc::clone(logic), selection, model);
        parser.parse(template, &mut chain)?;
        Ok(chain.into_next().into_model())
    }

    /// Decoupled logic for the template at `path`, parsed once and cached by
    /// resource name.
    pub fn decoupled_logic_for(
        &self,
        path: &Path,
    ) -> Result<Option<Arc<DecoupledTemplateLogic>>, MarkupError> {
        if !self.config.decoupled_logic {
            return Ok(None);
        }
        let Some(resource) = self.resolver.resolve(path)? else {
            log::trace!(
                target: "markup.decoupled",
                "no decoupled logic for {}",
                path.display()
            );
            return Ok(None);
        };
        self.cache
            .get_or_build(&resource.name, || {
                parse_decoupled_logic(&resource.name, &resource.content, TemplateMode::Xml)
            })
            .map(Some)
    }

    /// Read and parse the template file at `path` together with its decoupled
    /// logic.
    pub fn parse_file(&self, path: &Path) -> Result<TemplateModel, MarkupError> {
        let template = std::fs::read_to_string(path).map_err(|source| MarkupError::Io {
            resource: path.display().to_string(),
            source,
        })?;
        let logic = self.decoupled_logic_for(path)?;
        self.parse(&template, logic.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoupled::InjectedAttribute;
    use text::NoCacheTextRepository;

    #[test]
    fn parse_without_logic_round_trips() {
        let parser = MarkupTemplateParser::new(ParserConfig::default(), NoCacheTextRepository);
        let input = "<form action=\"/go\">\n  <input name=q>\n</form>";
        let model = parser.parse(input, None).expect("parses");
        assert_eq!(model.to_markup(), input);
    }

    #[test]
    fn parse_with_logic_injects() {
        let parser = MarkupTemplateParser::new(ParserConfig::default(), NoCacheTextRepository);
        let mut logic = DecoupledTemplateLogic::new();
        logic.add_injected_attribute("//form", InjectedAttribute::new("class", Some("x")));
        logic.add_injected_attribute("//form", InjectedAttribute::new("data-y", Some("1")));
        let logic = Arc::new(logic);
        let model = parser.parse("<form></form>", Some(&logic)).expect("parses");
        assert_eq!(model.to_markup(), "<form class=\"x\" data-y=\"1\"></form>");
    }

    #[test]
    fn invalid_selector_in_logic_fails_parse() {
        let parser = MarkupTemplateParser::new(ParserConfig::default(), NoCacheTextRepository);
        let mut logic = DecoupledTemplateLogic::new();
        logic.add_injected_attribute("//a[", InjectedAttribute::new("x", None));
        let err = parser
            .parse("<a></a>", Some(&Arc::new(logic)))
            .expect_err("bad selector");
        assert!(matches!(err, MarkupError::Selector { .. }), "{err:?}");
    }
}
