use std::fs;
use std::path::PathBuf;

use anyhow::{Context, anyhow};
use indexmap::IndexMap;
use sgraph_json_schema::{Config, to_json_schema};
use sgraph_schema::{Export, SchemaModule, SchemaNodeId};
use tracing::debug;

use crate::util::{BigIntFormat, DateFormat, UndefinedFormat, read_input, sort_keys};

/// Export used as the main type when `--type` is not given
const DEFAULT_EXPORT: &str = "default";

#[derive(clap::Args)]
pub struct Args {
    /// Path to the schema module (JSON, use - for stdin)
    pub file: PathBuf,
    /// Export path of the main type (default: the `default` export)
    #[arg(short = 't', long = "type")]
    pub main_type: Option<String>,
    /// Export paths of the definitions: a namespace, or a single schema.
    /// Defaults to every top-level schema export except `default`
    #[arg(short, long, value_delimiter = ',')]
    pub definitions: Vec<String>,
    /// Output file (default: stdout)
    #[arg(short, long)]
    pub out: Option<PathBuf>,
    /// Close objects without a rest schema (`additionalProperties: false`)
    #[arg(long)]
    pub strict_object_types: bool,
    #[arg(long, value_enum)]
    pub date_strategy: Option<DateFormat>,
    #[arg(long, value_enum)]
    pub bigint_strategy: Option<BigIntFormat>,
    #[arg(long, value_enum)]
    pub undefined_strategy: Option<UndefinedFormat>,
    /// Skip validations that have no JSON Schema equivalent
    #[arg(long)]
    pub ignore_unknown_validation: bool,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            strict_object_types: self.strict_object_types,
            date_strategy: self.date_strategy.map(Into::into),
            bigint_strategy: self.bigint_strategy.map(Into::into),
            undefined_strategy: self.undefined_strategy.map(Into::into),
            ignore_unknown_validation: self.ignore_unknown_validation,
            ..Default::default()
        }
    }
}

pub fn run(args: Args) -> anyhow::Result<()> {
    let source = read_input(&args.file)?;
    let module = SchemaModule::from_json_str(&source)
        .with_context(|| format!("Invalid schema module {}", args.file.display()))?;
    let file = args.file.display().to_string();

    let main = match &args.main_type {
        Some(path) => Some(
            module
                .node(path)
                .ok_or_else(|| anyhow!("Main type '{path}' could not be found in {file}"))?,
        ),
        None => module.node(DEFAULT_EXPORT),
    };
    let definitions = collect_definitions(&module, &args.definitions, &file)?;
    debug!(
        main = ?main,
        definitions = definitions.as_ref().map_or(0, IndexMap::len),
        "resolved exports"
    );

    let schema = to_json_schema(module.graph(), main, definitions.as_ref(), &args.config())?;
    let output = serde_json::to_string_pretty(&sort_keys(schema.to_value()?))?;

    match &args.out {
        Some(path) => fs::write(path, output)
            .with_context(|| format!("Error writing file {}", path.display()))?,
        None => println!("{output}"),
    }
    Ok(())
}

/// Named definitions selected on the command line.
///
/// Without explicit paths every top-level schema export except `default` is a
/// definition.
fn collect_definitions(
    module: &SchemaModule,
    paths: &[String],
    file: &str,
) -> anyhow::Result<Option<IndexMap<String, SchemaNodeId>>> {
    if paths.is_empty() {
        let all = module
            .exports()
            .nodes()
            .filter(|(name, _)| *name != DEFAULT_EXPORT)
            .map(|(name, id)| (name.to_string(), id))
            .collect();
        return Ok(Some(all));
    }

    let mut definitions = IndexMap::new();
    for path in paths {
        let export = module
            .lookup(path)
            .ok_or_else(|| anyhow!("Definitions path '{path}' could not be found in {file}"))?;
        match export {
            Export::Node(id) => {
                let name = path.rsplit('.').next().unwrap_or(path);
                definitions.insert(name.to_string(), *id);
            }
            Export::Namespace(namespace) => {
                for (name, id) in namespace.nodes() {
                    definitions.insert(name.to_string(), id);
                }
            }
        }
    }
    Ok(Some(definitions))
}
