//! Decoupled template logic: attributes kept in a separate resource and
//! merged into the template's event stream during parsing.

mod builder;
mod cache;
mod handler;
mod model;
mod resolver;

pub use builder::DecoupledLogicBuilder;
pub use cache::DecoupledLogicCache;
pub use handler::DecoupledLogicMarkupHandler;
pub use model::{DecoupledTemplateLogic, InjectedAttribute};
pub use resolver::{
    DEFAULT_DECOUPLED_LOGIC_SUFFIX, DecoupledLogicResolver, DecoupledLogicResource,
    StandardDecoupledLogicResolver,
};

use crate::error::MarkupError;
use crate::mode::TemplateMode;
use crate::parser::MarkupParser;

/// Parse a decoupled logic resource.
pub fn parse_decoupled_logic(
    resource: &str,
    content: &str,
    mode: TemplateMode,
) -> Result<DecoupledTemplateLogic, MarkupError> {
    let mut builder = DecoupledLogicBuilder::new(resource, mode);
    MarkupParser::new(mode).parse(content, &mut builder)?;
    let logic = builder.into_logic();
    log::debug!(
        target: "markup.decoupled",
        "parsed {resource}: {} selectors",
        logic.selectors().len()
    );
    Ok(logic)
}
