//! `weft`: parse a markup template, apply its decoupled logic and print the
//! resulting markup (or the raw handler event stream).

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use markup::{
    DecoupledLogicMarkupHandler, EventTrace, MarkupParser, MarkupTemplateParser, ParserConfig,
    PathNodeSelection, TemplateMode, parse_decoupled_logic,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use text::{TextRepositories, TextRepositoryConfig};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser, Debug)]
#[command(name = "weft", about = "Parse a markup template with its decoupled logic", version)]
struct Args {
    /// Template file to parse
    #[arg(value_name = "TEMPLATE")]
    template: PathBuf,

    #[arg(long, value_enum, default_value = "html")]
    mode: ModeArg,

    /// Decoupled logic resource to apply instead of the one resolved next to
    /// the template
    #[arg(long, value_name = "PATH")]
    logic: Option<PathBuf>,

    /// Do not look up or apply decoupled logic
    #[arg(long, conflicts_with = "logic")]
    no_decoupled_logic: bool,

    /// Text repository budget in bytes (overrides WEFT_TEXT_REPOSITORY_MAX_BYTES)
    #[arg(long, value_name = "BYTES")]
    max_bytes: Option<usize>,

    /// Disable text interning
    #[arg(long)]
    no_cache: bool,

    /// Print one line per parser event instead of the markup
    #[arg(long)]
    events: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Html,
    Xml,
}

impl From<ModeArg> for TemplateMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Html => TemplateMode::Html,
            ModeArg::Xml => TemplateMode::Xml,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let mut repository_config = TextRepositoryConfig::from_env();
    if let Some(bytes) = args.max_bytes {
        repository_config.max_size_in_bytes = bytes;
    }
    repository_config.cache = !args.no_cache;
    let repository = TextRepositories::from_config(&repository_config);

    let config = ParserConfig {
        mode: args.mode.into(),
        decoupled_logic: !args.no_decoupled_logic,
    };
    let parser = MarkupTemplateParser::new(config, repository);

    let template = std::fs::read_to_string(&args.template)
        .with_context(|| format!("reading template {}", args.template.display()))?;
    let logic = match &args.logic {
        Some(path) => Some(Arc::new(load_logic(path)?)),
        None => parser
            .decoupled_logic_for(&args.template)
            .with_context(|| format!("loading decoupled logic for {}", args.template.display()))?,
    };
    log::debug!(
        "parsing {} ({:?}, decoupled logic: {})",
        args.template.display(),
        config.mode,
        logic.is_some()
    );

    if args.events {
        for event in trace_events(&template, config.mode, logic)? {
            println!("{event}");
        }
        return Ok(());
    }

    let model = parser
        .parse(&template, logic.as_ref())
        .with_context(|| format!("parsing {}", args.template.display()))?;
    print!("{}", model.to_markup());
    Ok(())
}

fn load_logic(path: &Path) -> Result<markup::DecoupledTemplateLogic> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading decoupled logic {}", path.display()))?;
    let logic = parse_decoupled_logic(&path.display().to_string(), &content, TemplateMode::Xml)?;
    Ok(logic)
}

fn trace_events(
    template: &str,
    mode: TemplateMode,
    logic: Option<Arc<markup::DecoupledTemplateLogic>>,
) -> Result<Vec<String>> {
    let parser = MarkupParser::new(mode);
    let Some(logic) = logic else {
        let mut trace = EventTrace::default();
        parser.parse(template, &mut trace)?;
        return Ok(trace.into_events());
    };
    let selection = PathNodeSelection::parse(logic.selectors(), mode)?;
    let mut chain = DecoupledLogicMarkupHandler::new(logic, selection, EventTrace::default());
    parser.parse(template, &mut chain)?;
    Ok(chain.into_next().into_events())
}
