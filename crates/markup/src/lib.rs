//! Event-based markup parsing with decoupled template logic.
//!
//! [`MarkupParser`] drives a [`MarkupHandler`] chain in one forward pass.
//! [`decoupled`] merges attributes defined in a separate resource into that
//! stream, and [`model`] turns it into an interned [`TemplateModel`].

pub mod decoupled;
pub mod model;
pub mod selector;
pub mod trace;

mod error;
mod handler;
mod mode;
mod parser;
mod pipeline;
mod span;

pub use crate::decoupled::{
    DecoupledLogicBuilder, DecoupledLogicCache, DecoupledLogicMarkupHandler,
    DecoupledLogicResolver, DecoupledTemplateLogic, InjectedAttribute,
    StandardDecoupledLogicResolver, parse_decoupled_logic,
};
pub use crate::error::MarkupError;
pub use crate::handler::{AttributeSpans, HandlerResult, MarkupHandler};
pub use crate::mode::TemplateMode;
pub use crate::model::{TemplateModel, TemplateModelHandler};
pub use crate::parser::MarkupParser;
pub use crate::pipeline::{MarkupTemplateParser, ParserConfig};
pub use crate::selector::{MarkupSelector, NodeSelection, PathNodeSelection};
pub use crate::span::{Position, Span};
pub use crate::trace::EventTrace;
